use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::directory::{NeedCatalog, PetDirectory, QuestionBank};
use super::domain::{
    AdoptionRequestId, AlternativeId, FormSessionId, Need, Pet, PetId, QuestionId, User, UserId,
    UserRole,
};
use super::error::AdoptionError;
use super::evaluation::EligibilityVerdict;
use super::ledger::{AdoptionRequest, AdoptionRequestLedger};
use super::repository::{AdoptionRepository, RepositoryError};
use super::session::{FormProgress, FormSession, TransitionError};

/// Result of a submitted answer. `verdict` and `request_id` are set only on the
/// answer that completed the questionnaire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerOutcome {
    pub progress: FormProgress,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<EligibilityVerdict>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<AdoptionRequestId>,
}

/// Service composing the catalog, session repository, and request ledger.
pub struct AdoptionFormService<C, R> {
    catalog: Arc<C>,
    repository: Arc<R>,
    ledger: AdoptionRequestLedger<C, R>,
}

static SESSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_session_id() -> FormSessionId {
    let id = SESSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    FormSessionId(format!("form-{id:06}"))
}

impl<C, R> AdoptionFormService<C, R>
where
    C: PetDirectory + QuestionBank + NeedCatalog + 'static,
    R: AdoptionRepository + 'static,
{
    pub fn new(catalog: Arc<C>, repository: Arc<R>) -> Self {
        let ledger = AdoptionRequestLedger::new(catalog.clone(), repository.clone());
        Self {
            catalog,
            repository,
            ledger,
        }
    }

    pub fn ledger(&self) -> &AdoptionRequestLedger<C, R> {
        &self.ledger
    }

    /// Current progress for the adopter on this pet, starting a session on first access.
    pub fn get_progress(
        &self,
        adopter_id: UserId,
        pet_id: PetId,
    ) -> Result<FormProgress, AdoptionError> {
        self.adopter(adopter_id)?;
        let pet = self.catalog.active_pet(pet_id)?;

        let session = match self.repository.find_session(adopter_id, pet_id)? {
            Some(session) => session,
            None => self.start_session(adopter_id, &pet)?,
        };

        self.progress_for(&pet, &session)
    }

    /// Answer the session's current question.
    pub fn answer(
        &self,
        adopter_id: UserId,
        pet_id: PetId,
        question_id: QuestionId,
        alternative_id: AlternativeId,
    ) -> Result<AnswerOutcome, AdoptionError> {
        self.adopter(adopter_id)?;
        let pet = self.catalog.active_pet(pet_id)?;

        let session = self.started_session(adopter_id, pet_id)?;

        if let Err(error) = session.ensure_expects(question_id) {
            warn!(session = %session.id, question = %question_id, %error, "answer rejected");
            return Err(error.into());
        }

        let alternatives = self.catalog.alternatives_for(question_id)?;
        let next = session
            .apply_answer(
                question_id,
                alternative_id,
                &alternatives,
                pet.min_score,
                Utc::now(),
            )
            .map_err(|error| {
                warn!(session = %session.id, question = %question_id, %error, "answer rejected");
                AdoptionError::from(error)
            })?;

        if next.is_completed() {
            let (stored, request) = self.ledger.complete(next, session.version)?;
            info!(
                session = %stored.id,
                pet = %pet_id,
                adopter = %adopter_id,
                eligible = request.eligible,
                "questionnaire completed"
            );
            return Ok(AnswerOutcome {
                progress: self.progress_for(&pet, &stored)?,
                verdict: stored.verdict,
                request_id: Some(request.id),
            });
        }

        let stored = match self.repository.update_session(next, session.version) {
            Ok(stored) => stored,
            Err(RepositoryError::Conflict) => {
                warn!(session = %session.id, version = session.version, "concurrent answer lost");
                return Err(AdoptionError::Conflict(format!(
                    "session {} was updated concurrently, retry the answer",
                    session.id
                )));
            }
            Err(other) => return Err(other.into()),
        };

        debug!(
            session = %stored.id,
            step = stored.step,
            total = stored.total_steps(),
            score = stored.running_score,
            "answer accepted"
        );

        Ok(AnswerOutcome {
            progress: self.progress_for(&pet, &stored)?,
            verdict: None,
            request_id: None,
        })
    }

    /// Answer whichever question the session is waiting on. Used by clients that only
    /// send the chosen alternative.
    pub fn answer_current(
        &self,
        adopter_id: UserId,
        pet_id: PetId,
        alternative_id: AlternativeId,
    ) -> Result<AnswerOutcome, AdoptionError> {
        self.adopter(adopter_id)?;
        self.catalog.active_pet(pet_id)?;

        let question_id = self
            .started_session(adopter_id, pet_id)?
            .expected_question()
            .ok_or_else(|| AdoptionError::from(TransitionError::AlreadyCompleted))?;

        self.answer(adopter_id, pet_id, question_id, alternative_id)
    }

    /// Requests for a pet, restricted to its owner.
    pub fn list_requests(
        &self,
        pet_id: PetId,
        requester_id: UserId,
    ) -> Result<Vec<AdoptionRequest>, AdoptionError> {
        self.ledger.list_for_pet(pet_id, requester_id)
    }

    /// Request detail for the pet's owner or the adopter who filed it.
    pub fn request_detail(
        &self,
        viewer_id: UserId,
        request_id: &AdoptionRequestId,
    ) -> Result<AdoptionRequest, AdoptionError> {
        let request = self.ledger.get(request_id)?;
        if request.adopter_id == viewer_id {
            return Ok(request);
        }

        let pet = self.catalog.pet(request.pet_id)?;
        if pet.is_owned_by(viewer_id) {
            Ok(request)
        } else {
            Err(AdoptionError::Forbidden(format!(
                "user {viewer_id} may not view adoption request {request_id}"
            )))
        }
    }

    pub fn active_needs(&self) -> Result<Vec<Need>, AdoptionError> {
        Ok(self.catalog.active_needs()?)
    }

    fn adopter(&self, adopter_id: UserId) -> Result<User, AdoptionError> {
        let user = self.catalog.user(adopter_id)?;
        if user.role != UserRole::Adopter {
            return Err(AdoptionError::Forbidden(format!(
                "user {adopter_id} is a {} and cannot fill adoption forms",
                user.role.label()
            )));
        }
        Ok(user)
    }

    fn started_session(
        &self,
        adopter_id: UserId,
        pet_id: PetId,
    ) -> Result<FormSession, AdoptionError> {
        self.repository
            .find_session(adopter_id, pet_id)?
            .ok_or_else(|| {
                AdoptionError::InvalidState(format!(
                    "no questionnaire started for pet {pet_id}; fetch progress first"
                ))
            })
    }

    fn start_session(&self, adopter_id: UserId, pet: &Pet) -> Result<FormSession, AdoptionError> {
        let questions = self.catalog.questions_for(pet)?;
        let session = FormSession::start(
            next_session_id(),
            adopter_id,
            pet.id,
            &questions,
            Utc::now(),
        );

        match self.repository.insert_session(session) {
            Ok(stored) => {
                info!(
                    session = %stored.id,
                    pet = %pet.id,
                    adopter = %adopter_id,
                    questions = stored.total_steps(),
                    "questionnaire started"
                );
                Ok(stored)
            }
            Err(RepositoryError::Conflict) => self
                .repository
                .find_session(adopter_id, pet.id)?
                .ok_or_else(|| {
                    AdoptionError::Conflict(format!(
                        "session for pet {} could not be created, retry the request",
                        pet.id
                    ))
                }),
            Err(other) => Err(other.into()),
        }
    }

    fn progress_for(&self, pet: &Pet, session: &FormSession) -> Result<FormProgress, AdoptionError> {
        let next_question = match session.expected_question() {
            None => None,
            Some(question_id) => {
                let question = self
                    .catalog
                    .questions_for(pet)?
                    .into_iter()
                    .find(|question| question.id == question_id)
                    .ok_or_else(|| {
                        AdoptionError::NotFound(format!(
                            "question {question_id} is no longer offered for pet {}",
                            pet.id
                        ))
                    })?;
                Some(question)
            }
        };

        Ok(session.progress(next_question))
    }
}
