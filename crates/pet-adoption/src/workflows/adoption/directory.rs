use super::domain::{Alternative, Need, Pet, PetId, Question, QuestionId, User, UserId};

/// Lookup of pets and users owned by the CRUD side of the platform.
pub trait PetDirectory: Send + Sync {
    /// Any pet regardless of status. Owners keep access to deactivated pets.
    fn pet(&self, id: PetId) -> Result<Pet, LookupError>;

    /// Pets open for adoption; inactive or soft-deleted pets are reported as missing.
    fn active_pet(&self, id: PetId) -> Result<Pet, LookupError> {
        let pet = self.pet(id)?;
        if pet.is_active() {
            Ok(pet)
        } else {
            Err(LookupError::PetNotFound(id))
        }
    }

    fn user(&self, id: UserId) -> Result<User, LookupError>;
}

/// Read-only questionnaire source.
pub trait QuestionBank: Send + Sync {
    /// Ordered questionnaire for the pet.
    fn questions_for(&self, pet: &Pet) -> Result<Vec<Question>, LookupError>;
    fn alternatives_for(&self, question_id: QuestionId) -> Result<Vec<Alternative>, LookupError>;
}

/// Read-only set of needs pets may be registered with.
pub trait NeedCatalog: Send + Sync {
    fn active_needs(&self) -> Result<Vec<Need>, LookupError>;
    fn needs_for(&self, pet: &Pet) -> Result<Vec<Need>, LookupError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("pet {0} not found")]
    PetNotFound(PetId),
    #[error("pet {0} has no active questionnaire")]
    NoQuestionnaire(PetId),
    #[error("question {0} not found")]
    QuestionNotFound(QuestionId),
    #[error("user {0} not found")]
    UserNotFound(UserId),
    #[error("lookup unavailable: {0}")]
    Unavailable(String),
}
