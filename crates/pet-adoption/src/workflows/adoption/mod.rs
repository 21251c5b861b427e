//! Adoption eligibility engine.
//!
//! An adopter walks a pet's questionnaire one answer at a time. Each answer adds the
//! chosen alternative's points to a running score; answering the last question freezes
//! an eligibility verdict against the pet's minimum score and files an adoption request
//! that the pet's protector can review.

pub mod catalog;
pub mod directory;
pub mod domain;
pub mod error;
pub mod evaluation;
pub mod ledger;
pub mod memory;
pub mod repository;
pub mod router;
pub mod service;
pub mod session;

#[cfg(test)]
mod tests;

pub use catalog::{CatalogSeed, SeedCatalog, SeedError};
pub use directory::{LookupError, NeedCatalog, PetDirectory, QuestionBank};
pub use domain::{
    AdoptionRequestId, Alternative, AlternativeId, FormSessionId, Need, NeedId, Pet, PetGender,
    PetId, PetKind, PetSize, Question, QuestionId, QuestionScope, RecordStatus, User, UserId,
    UserRole,
};
pub use error::AdoptionError;
pub use evaluation::{evaluate, total_score, EligibilityVerdict, RecordedAnswer};
pub use ledger::{AdoptionRequest, AdoptionRequestLedger, AdoptionRequestSummary};
pub use memory::InMemoryAdoptionRepository;
pub use repository::{AdoptionRepository, RepositoryError};
pub use router::{adoption_router, AnswerRequest, CALLER_HEADER};
pub use service::{AdoptionFormService, AnswerOutcome};
pub use session::{FormProgress, FormSession, SessionStatus, TransitionError};
