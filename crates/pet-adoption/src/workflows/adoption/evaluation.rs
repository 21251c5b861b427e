use serde::{Deserialize, Serialize};

use super::domain::{AlternativeId, QuestionId};

/// Answer captured during a questionnaire walkthrough, with the points it earned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedAnswer {
    pub question_id: QuestionId,
    pub alternative_id: AlternativeId,
    pub points: i32,
}

/// Eligibility outcome of a completed questionnaire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityVerdict {
    pub eligible: bool,
    pub total_score: i32,
    pub min_score: i32,
}

impl EligibilityVerdict {
    /// Distance from the threshold; negative when the adopter fell short.
    pub fn margin(&self) -> i32 {
        self.total_score.saturating_sub(self.min_score)
    }

    pub fn summary(&self) -> String {
        if self.eligible {
            format!(
                "eligible: scored {} against minimum {}",
                self.total_score, self.min_score
            )
        } else {
            format!(
                "not eligible: scored {} against minimum {} ({} short)",
                self.total_score,
                self.min_score,
                self.min_score.saturating_sub(self.total_score)
            )
        }
    }
}

/// Sum of awarded points, saturating at `i32::MAX`. Order of answers does not affect the result.
pub fn total_score(answers: &[RecordedAnswer]) -> i32 {
    answers
        .iter()
        .fold(0i32, |total, answer| total.saturating_add(answer.points))
}

pub fn evaluate(total_score: i32, min_score: i32) -> EligibilityVerdict {
    EligibilityVerdict {
        eligible: total_score >= min_score,
        total_score,
        min_score,
    }
}
