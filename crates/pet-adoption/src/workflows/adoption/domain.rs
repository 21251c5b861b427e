use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(
    /// Identifier of a registered user (adopter or protector).
    UserId
);
numeric_id!(PetId);
numeric_id!(NeedId);
numeric_id!(QuestionId);
numeric_id!(AlternativeId);

/// Identifier wrapper for questionnaire sessions.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormSessionId(pub String);

/// Identifier wrapper for ledger entries.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdoptionRequestId(pub String);

impl fmt::Display for FormSessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for AdoptionRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Soft-delete state shared by pets and needs. Reads filter on it explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    #[default]
    Active,
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PetKind {
    Dog,
    Cat,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PetGender {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PetSize {
    Small,
    Medium,
    Large,
}

/// Pet offered for adoption. Relations are carried as explicit ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pet {
    pub id: PetId,
    pub name: String,
    pub owner_id: UserId,
    pub min_score: i32,
    pub kind: PetKind,
    pub gender: PetGender,
    pub size: PetSize,
    #[serde(default)]
    pub need_ids: Vec<NeedId>,
    #[serde(default)]
    pub status: RecordStatus,
    #[serde(default)]
    pub deleted_on: Option<DateTime<Utc>>,
}

impl Pet {
    pub fn is_active(&self) -> bool {
        self.status == RecordStatus::Active && self.deleted_on.is_none()
    }

    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.owner_id == user_id
    }
}

/// Named requirement a pet may carry, e.g. "fenced yard".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Need {
    pub id: NeedId,
    pub name: String,
    #[serde(default)]
    pub status: RecordStatus,
    #[serde(default)]
    pub deleted_on: Option<DateTime<Utc>>,
}

impl Need {
    pub fn is_active(&self) -> bool {
        self.status == RecordStatus::Active && self.deleted_on.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Adopter,
    Protector,
}

impl UserRole {
    pub const fn label(self) -> &'static str {
        match self {
            UserRole::Adopter => "adopter",
            UserRole::Protector => "protector",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub role: UserRole,
}

/// Which pets a question applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum QuestionScope {
    Universal,
    Kind(PetKind),
    Pet(PetId),
}

impl QuestionScope {
    pub fn applies_to(&self, pet: &Pet) -> bool {
        match self {
            QuestionScope::Universal => true,
            QuestionScope::Kind(kind) => *kind == pet.kind,
            QuestionScope::Pet(id) => *id == pet.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alternative {
    pub id: AlternativeId,
    pub label: String,
    pub points: i32,
}

/// Questionnaire item. `need_id` limits the question to pets carrying that need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub position: u32,
    pub prompt: String,
    pub scope: QuestionScope,
    #[serde(default)]
    pub need_id: Option<NeedId>,
    pub alternatives: Vec<Alternative>,
}
