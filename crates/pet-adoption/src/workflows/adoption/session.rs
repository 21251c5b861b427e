use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{Alternative, AlternativeId, FormSessionId, PetId, Question, QuestionId, UserId};
use super::evaluation::{evaluate, EligibilityVerdict, RecordedAnswer};

/// Lifecycle of a stored session. A missing row is the implicit not-started state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    Completed,
}

impl SessionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Completed => "completed",
        }
    }
}

/// One adopter's walkthrough of one pet's questionnaire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSession {
    pub id: FormSessionId,
    pub adopter_id: UserId,
    pub pet_id: PetId,
    /// Questionnaire order frozen when the session started.
    pub question_ids: Vec<QuestionId>,
    pub step: usize,
    pub answers: Vec<RecordedAnswer>,
    pub running_score: i32,
    pub status: SessionStatus,
    pub verdict: Option<EligibilityVerdict>,
    /// Optimistic concurrency token, bumped by the repository on every update.
    pub version: u64,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl FormSession {
    pub fn start(
        id: FormSessionId,
        adopter_id: UserId,
        pet_id: PetId,
        questions: &[Question],
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            adopter_id,
            pet_id,
            question_ids: questions.iter().map(|question| question.id).collect(),
            step: 0,
            answers: Vec::new(),
            running_score: 0,
            status: SessionStatus::InProgress,
            verdict: None,
            version: 0,
            started_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    pub fn total_steps(&self) -> usize {
        self.question_ids.len()
    }

    pub fn is_completed(&self) -> bool {
        self.status == SessionStatus::Completed
    }

    /// Question the session is waiting on, `None` once completed.
    pub fn expected_question(&self) -> Option<QuestionId> {
        match self.status {
            SessionStatus::Completed => None,
            SessionStatus::InProgress => self.question_ids.get(self.step).copied(),
        }
    }

    /// Check that `question_id` is the one this session accepts next.
    pub fn ensure_expects(&self, question_id: QuestionId) -> Result<(), TransitionError> {
        let expected = self
            .expected_question()
            .ok_or(TransitionError::AlreadyCompleted)?;

        if expected == question_id {
            return Ok(());
        }

        if self
            .answers
            .iter()
            .any(|answer| answer.question_id == question_id)
        {
            Err(TransitionError::AlreadyAnswered(question_id))
        } else {
            Err(TransitionError::OutOfOrder {
                expected,
                received: question_id,
            })
        }
    }

    /// Produce the next state after answering the expected question.
    ///
    /// `self` is left untouched so a rejected answer never moves the step or score.
    /// Completing the last question freezes the verdict against `min_score`.
    pub fn apply_answer(
        &self,
        question_id: QuestionId,
        alternative_id: AlternativeId,
        alternatives: &[Alternative],
        min_score: i32,
        now: DateTime<Utc>,
    ) -> Result<FormSession, TransitionError> {
        self.ensure_expects(question_id)?;

        let alternative = alternatives
            .iter()
            .find(|alternative| alternative.id == alternative_id)
            .ok_or(TransitionError::UnknownAlternative {
                question: question_id,
                alternative: alternative_id,
            })?;

        let running_score = self
            .running_score
            .checked_add(alternative.points)
            .ok_or(TransitionError::ScoreOverflow(question_id))?;

        let mut next = self.clone();
        next.answers.push(RecordedAnswer {
            question_id,
            alternative_id,
            points: alternative.points,
        });
        next.running_score = running_score;
        next.step += 1;
        next.updated_at = now;

        if next.step >= next.total_steps() {
            next.status = SessionStatus::Completed;
            next.verdict = Some(evaluate(next.running_score, min_score));
            next.completed_at = Some(now);
        }

        Ok(next)
    }

    pub fn progress(&self, next_question: Option<Question>) -> FormProgress {
        FormProgress {
            session_id: self.id.clone(),
            pet_id: self.pet_id,
            status: self.status.label(),
            step: self.step,
            total_steps: self.total_steps(),
            running_score: self.running_score,
            completed: self.is_completed(),
            next_question,
            verdict: self.verdict,
        }
    }
}

/// Rejected session transitions. None of them mutate the session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("questionnaire already completed")]
    AlreadyCompleted,
    #[error("question {0} was already answered")]
    AlreadyAnswered(QuestionId),
    #[error("question {received} answered out of order, expected question {expected}")]
    OutOfOrder {
        expected: QuestionId,
        received: QuestionId,
    },
    #[error("alternative {alternative} does not belong to question {question}")]
    UnknownAlternative {
        question: QuestionId,
        alternative: AlternativeId,
    },
    #[error("answering question {0} would overflow the running score")]
    ScoreOverflow(QuestionId),
}

/// Progress exposed to the adopter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormProgress {
    pub session_id: FormSessionId,
    pub pet_id: PetId,
    pub status: &'static str,
    pub step: usize,
    pub total_steps: usize,
    pub running_score: i32,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_question: Option<Question>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<EligibilityVerdict>,
}
