use super::domain::{AdoptionRequestId, PetId, UserId};
use super::ledger::AdoptionRequest;
use super::session::FormSession;

/// Durable storage for sessions and ledger entries.
///
/// Session updates are compare-and-swap on `FormSession::version` so two writers
/// starting from the same state cannot both succeed.
pub trait AdoptionRepository: Send + Sync {
    /// Store a new session. `Conflict` if the adopter already has one for the pet.
    fn insert_session(&self, session: FormSession) -> Result<FormSession, RepositoryError>;

    fn find_session(
        &self,
        adopter_id: UserId,
        pet_id: PetId,
    ) -> Result<Option<FormSession>, RepositoryError>;

    /// Replace the session if the stored version still equals `expected_version`.
    /// Returns the stored copy with its bumped version.
    fn update_session(
        &self,
        session: FormSession,
        expected_version: u64,
    ) -> Result<FormSession, RepositoryError>;

    /// Store the completed session together with its ledger entry.
    ///
    /// Both writes happen or neither does: `Conflict` if the stored version moved or
    /// the session already has an entry, and any other failure leaves the session as
    /// it was at `expected_version`.
    fn complete_session(
        &self,
        session: FormSession,
        expected_version: u64,
        request: AdoptionRequest,
    ) -> Result<(FormSession, AdoptionRequest), RepositoryError>;

    /// Store a ledger entry. `Conflict` if the session already has one.
    fn insert_request(&self, request: AdoptionRequest) -> Result<AdoptionRequest, RepositoryError>;

    fn fetch_request(
        &self,
        id: &AdoptionRequestId,
    ) -> Result<Option<AdoptionRequest>, RepositoryError>;

    fn requests_for_pet(&self, pet_id: PetId) -> Result<Vec<AdoptionRequest>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists or was modified concurrently")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
