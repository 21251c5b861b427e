use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::directory::PetDirectory;
use super::domain::{AdoptionRequestId, FormSessionId, PetId, UserId};
use super::error::AdoptionError;
use super::evaluation::{EligibilityVerdict, RecordedAnswer};
use super::repository::{AdoptionRepository, RepositoryError};
use super::session::FormSession;

/// Terminal record of a completed questionnaire, visible to the pet's protector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdoptionRequest {
    pub id: AdoptionRequestId,
    pub session_id: FormSessionId,
    pub adopter_id: UserId,
    pub pet_id: PetId,
    pub final_score: i32,
    /// Threshold in force when the questionnaire was completed.
    pub min_score: i32,
    pub eligible: bool,
    pub answers: Vec<RecordedAnswer>,
    pub completed_at: DateTime<Utc>,
}

impl AdoptionRequest {
    pub fn verdict(&self) -> EligibilityVerdict {
        EligibilityVerdict {
            eligible: self.eligible,
            total_score: self.final_score,
            min_score: self.min_score,
        }
    }

    pub fn summary(&self) -> AdoptionRequestSummary {
        AdoptionRequestSummary {
            request_id: self.id.clone(),
            adopter_id: self.adopter_id,
            final_score: self.final_score,
            eligible: self.eligible,
            completed_at: self.completed_at,
            rationale: self.verdict().summary(),
        }
    }
}

/// Listing row shown to protectors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdoptionRequestSummary {
    pub request_id: AdoptionRequestId,
    pub adopter_id: UserId,
    pub final_score: i32,
    pub eligible: bool,
    pub completed_at: DateTime<Utc>,
    pub rationale: String,
}

static REQUEST_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_request_id() -> AdoptionRequestId {
    let id = REQUEST_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    AdoptionRequestId(format!("req-{id:06}"))
}

/// Write-once ledger of completed questionnaires.
pub struct AdoptionRequestLedger<D, R> {
    directory: Arc<D>,
    repository: Arc<R>,
}

impl<D, R> AdoptionRequestLedger<D, R>
where
    D: PetDirectory + 'static,
    R: AdoptionRepository + 'static,
{
    pub fn new(directory: Arc<D>, repository: Arc<R>) -> Self {
        Self {
            directory,
            repository,
        }
    }

    /// Ledger entry describing a completed session. Nothing is stored.
    pub fn entry_for(&self, session: &FormSession) -> Result<AdoptionRequest, AdoptionError> {
        let (verdict, completed_at) = match (session.verdict, session.completed_at) {
            (Some(verdict), Some(completed_at)) if session.is_completed() => {
                (verdict, completed_at)
            }
            _ => {
                return Err(AdoptionError::InvalidState(format!(
                    "session {} is not completed",
                    session.id
                )))
            }
        };

        Ok(AdoptionRequest {
            id: next_request_id(),
            session_id: session.id.clone(),
            adopter_id: session.adopter_id,
            pet_id: session.pet_id,
            final_score: verdict.total_score,
            min_score: verdict.min_score,
            eligible: verdict.eligible,
            answers: session.answers.clone(),
            completed_at,
        })
    }

    /// Store the completing session and its ledger entry in a single repository write,
    /// so a failure never leaves a completed session without a request.
    pub fn complete(
        &self,
        session: FormSession,
        expected_version: u64,
    ) -> Result<(FormSession, AdoptionRequest), AdoptionError> {
        let request = self.entry_for(&session)?;
        let session_id = session.id.clone();

        match self
            .repository
            .complete_session(session, expected_version, request)
        {
            Ok((stored, request)) => {
                info!(
                    request = %request.id,
                    session = %stored.id,
                    pet = %request.pet_id,
                    eligible = request.eligible,
                    score = request.final_score,
                    "adoption request recorded"
                );
                Ok((stored, request))
            }
            Err(RepositoryError::Conflict) => {
                warn!(
                    session = %session_id,
                    version = expected_version,
                    "completion lost to a concurrent update"
                );
                Err(AdoptionError::Conflict(format!(
                    "session {session_id} was updated concurrently, retry the answer"
                )))
            }
            Err(other) => Err(other.into()),
        }
    }

    /// Record the outcome of an already stored completed session. At most one entry per session.
    pub fn record(&self, session: &FormSession) -> Result<AdoptionRequest, AdoptionError> {
        let request = self.entry_for(session)?;

        match self.repository.insert_request(request) {
            Ok(stored) => {
                info!(
                    request = %stored.id,
                    session = %stored.session_id,
                    pet = %stored.pet_id,
                    eligible = stored.eligible,
                    score = stored.final_score,
                    "adoption request recorded"
                );
                Ok(stored)
            }
            Err(RepositoryError::Conflict) => {
                warn!(session = %session.id, "duplicate adoption request rejected");
                Err(AdoptionError::Conflict(format!(
                    "adoption request already recorded for session {}",
                    session.id
                )))
            }
            Err(other) => Err(other.into()),
        }
    }

    /// Requests filed for a pet, oldest first. Only the pet's owner may list them.
    pub fn list_for_pet(
        &self,
        pet_id: PetId,
        requester_id: UserId,
    ) -> Result<Vec<AdoptionRequest>, AdoptionError> {
        let pet = self.directory.pet(pet_id)?;
        if !pet.is_owned_by(requester_id) {
            warn!(pet = %pet_id, requester = %requester_id, "request listing denied");
            return Err(AdoptionError::Forbidden(format!(
                "user {requester_id} does not own pet {pet_id}"
            )));
        }

        let mut requests: Vec<AdoptionRequest> = self
            .repository
            .requests_for_pet(pet_id)?
            .into_iter()
            .filter(|request| request.pet_id == pet_id)
            .collect();
        requests.sort_by(|left, right| {
            left.completed_at
                .cmp(&right.completed_at)
                .then_with(|| left.id.cmp(&right.id))
        });
        Ok(requests)
    }

    pub fn get(&self, request_id: &AdoptionRequestId) -> Result<AdoptionRequest, AdoptionError> {
        self.repository
            .fetch_request(request_id)?
            .ok_or_else(|| AdoptionError::NotFound(format!("adoption request {request_id}")))
    }
}
