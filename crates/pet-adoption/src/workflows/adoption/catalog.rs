use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::directory::{LookupError, NeedCatalog, PetDirectory, QuestionBank};
use super::domain::{
    Alternative, AlternativeId, Need, NeedId, Pet, PetGender, PetId, PetKind, PetSize, Question,
    QuestionId, QuestionScope, RecordStatus, User, UserId, UserRole,
};

/// Serialized form of the reference data the engine reads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub pets: Vec<Pet>,
    #[serde(default)]
    pub needs: Vec<Need>,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl CatalogSeed {
    /// Small catalog used by the demo command and when no seed file is configured.
    pub fn demo() -> Self {
        let users = vec![
            User {
                id: UserId(1),
                name: "Patas Felizes".to_string(),
                role: UserRole::Protector,
            },
            User {
                id: UserId(2),
                name: "Ana".to_string(),
                role: UserRole::Adopter,
            },
            User {
                id: UserId(3),
                name: "Bruno".to_string(),
                role: UserRole::Adopter,
            },
        ];

        let needs = vec![
            Need {
                id: NeedId(1),
                name: "Fenced yard".to_string(),
                status: RecordStatus::Active,
                deleted_on: None,
            },
            Need {
                id: NeedId(2),
                name: "Daily medication".to_string(),
                status: RecordStatus::Active,
                deleted_on: None,
            },
            Need {
                id: NeedId(3),
                name: "Rural property".to_string(),
                status: RecordStatus::Inactive,
                deleted_on: None,
            },
        ];

        let pets = vec![
            Pet {
                id: PetId(10),
                name: "Thor".to_string(),
                owner_id: UserId(1),
                min_score: 5,
                kind: PetKind::Dog,
                gender: PetGender::Male,
                size: PetSize::Large,
                need_ids: vec![NeedId(1)],
                status: RecordStatus::Active,
                deleted_on: None,
            },
            Pet {
                id: PetId(11),
                name: "Mia".to_string(),
                owner_id: UserId(1),
                min_score: 3,
                kind: PetKind::Cat,
                gender: PetGender::Female,
                size: PetSize::Small,
                need_ids: vec![NeedId(2)],
                status: RecordStatus::Active,
                deleted_on: None,
            },
        ];

        let questions = vec![
            question(
                1,
                1,
                "How many hours a day would the pet spend alone?",
                QuestionScope::Universal,
                None,
                &[(1, "More than eight", 0), (2, "Four to eight", 2), (3, "Less than four", 3)],
            ),
            question(
                2,
                2,
                "Is your yard fenced?",
                QuestionScope::Kind(PetKind::Dog),
                Some(NeedId(1)),
                &[(4, "No", 0), (5, "Partially", 2), (6, "Yes", 4)],
            ),
            question(
                3,
                2,
                "Can you give medication at fixed times every day?",
                QuestionScope::Universal,
                Some(NeedId(2)),
                &[(7, "No", 0), (8, "Yes", 3)],
            ),
            question(
                4,
                3,
                "Are your windows screened?",
                QuestionScope::Kind(PetKind::Cat),
                None,
                &[(9, "No", 0), (10, "Yes", 2)],
            ),
        ];

        Self {
            users,
            pets,
            needs,
            questions,
        }
    }
}

fn question(
    id: u32,
    position: u32,
    prompt: &str,
    scope: QuestionScope,
    need_id: Option<NeedId>,
    alternatives: &[(u32, &str, i32)],
) -> Question {
    Question {
        id: QuestionId(id),
        position,
        prompt: prompt.to_string(),
        scope,
        need_id,
        alternatives: alternatives
            .iter()
            .map(|(id, label, points)| Alternative {
                id: AlternativeId(*id),
                label: (*label).to_string(),
                points: *points,
            })
            .collect(),
    }
}

/// Validation failures raised while loading a catalog seed.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("unable to read catalog seed {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("catalog seed is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("user {0} declared more than once")]
    DuplicateUser(UserId),
    #[error("pet {0} declared more than once")]
    DuplicatePet(PetId),
    #[error("need {0} declared more than once")]
    DuplicateNeed(NeedId),
    #[error("question {0} declared more than once")]
    DuplicateQuestion(QuestionId),
    #[error("alternative {alternative} declared more than once (question {question})")]
    DuplicateAlternative {
        question: QuestionId,
        alternative: AlternativeId,
    },
    #[error("question {0} has no alternatives")]
    EmptyQuestion(QuestionId),
    #[error("alternative {alternative} of question {question} has negative points")]
    NegativePoints {
        question: QuestionId,
        alternative: AlternativeId,
    },
    #[error("best possible score for pet {0} does not fit in a 32-bit score")]
    ScoreOverflow(PetId),
    #[error("pet {pet} is owned by {owner}, who is not a registered protector")]
    InvalidOwner { pet: PetId, owner: UserId },
    #[error("{context} references unknown need {need}")]
    UnknownNeed { context: String, need: NeedId },
}

/// In-memory reference data backing the pet directory, question bank and need catalog.
#[derive(Debug, Clone, Default)]
pub struct SeedCatalog {
    users: HashMap<UserId, User>,
    pets: HashMap<PetId, Pet>,
    needs: BTreeMap<NeedId, Need>,
    questions: Vec<Question>,
}

impl SeedCatalog {
    pub fn from_seed(seed: CatalogSeed) -> Result<Self, SeedError> {
        let mut users = HashMap::new();
        for user in seed.users {
            if users.contains_key(&user.id) {
                return Err(SeedError::DuplicateUser(user.id));
            }
            users.insert(user.id, user);
        }

        let mut needs = BTreeMap::new();
        for need in seed.needs {
            if needs.contains_key(&need.id) {
                return Err(SeedError::DuplicateNeed(need.id));
            }
            needs.insert(need.id, need);
        }

        let mut pets = HashMap::new();
        for pet in seed.pets {
            if pets.contains_key(&pet.id) {
                return Err(SeedError::DuplicatePet(pet.id));
            }
            let owner_is_protector = users
                .get(&pet.owner_id)
                .map(|owner: &User| owner.role == UserRole::Protector)
                .unwrap_or(false);
            if !owner_is_protector {
                return Err(SeedError::InvalidOwner {
                    pet: pet.id,
                    owner: pet.owner_id,
                });
            }
            if let Some(need) = pet.need_ids.iter().find(|id| !needs.contains_key(*id)) {
                return Err(SeedError::UnknownNeed {
                    context: format!("pet {}", pet.id),
                    need: *need,
                });
            }
            pets.insert(pet.id, pet);
        }

        let mut question_ids = HashSet::new();
        let mut alternative_ids = HashSet::new();
        for question in &seed.questions {
            if !question_ids.insert(question.id) {
                return Err(SeedError::DuplicateQuestion(question.id));
            }
            if question.alternatives.is_empty() {
                return Err(SeedError::EmptyQuestion(question.id));
            }
            if let Some(need) = question.need_id {
                if !needs.contains_key(&need) {
                    return Err(SeedError::UnknownNeed {
                        context: format!("question {}", question.id),
                        need,
                    });
                }
            }
            for alternative in &question.alternatives {
                if !alternative_ids.insert(alternative.id) {
                    return Err(SeedError::DuplicateAlternative {
                        question: question.id,
                        alternative: alternative.id,
                    });
                }
                if alternative.points < 0 {
                    return Err(SeedError::NegativePoints {
                        question: question.id,
                        alternative: alternative.id,
                    });
                }
            }
        }

        let mut questions = seed.questions;
        questions.sort_by_key(|question| (question.position, question.id));

        // Upper bound over every question in scope, whatever the need filter keeps.
        for pet in pets.values() {
            questions
                .iter()
                .filter(|question| question.scope.applies_to(pet))
                .filter_map(|question| question.alternatives.iter().map(|alt| alt.points).max())
                .try_fold(0i32, |total, points| total.checked_add(points))
                .ok_or(SeedError::ScoreOverflow(pet.id))?;
        }

        debug!(
            users = users.len(),
            pets = pets.len(),
            needs = needs.len(),
            questions = questions.len(),
            "catalog loaded"
        );

        Ok(Self {
            users,
            pets,
            needs,
            questions,
        })
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SeedError> {
        let seed: CatalogSeed = serde_json::from_reader(reader)?;
        Self::from_seed(seed)
    }

    pub fn from_path(path: &Path) -> Result<Self, SeedError> {
        let file = File::open(path).map_err(|source| SeedError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn demo() -> Result<Self, SeedError> {
        Self::from_seed(CatalogSeed::demo())
    }

    pub fn pet_count(&self) -> usize {
        self.pets.len()
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    /// All pets regardless of status, ordered by id.
    pub fn pets(&self) -> Vec<&Pet> {
        let mut pets: Vec<&Pet> = self.pets.values().collect();
        pets.sort_by_key(|pet| pet.id);
        pets
    }

    fn need_is_satisfied(&self, question: &Question, pet: &Pet) -> bool {
        match question.need_id {
            None => true,
            Some(need_id) => {
                pet.need_ids.contains(&need_id)
                    && self
                        .needs
                        .get(&need_id)
                        .map(Need::is_active)
                        .unwrap_or(false)
            }
        }
    }
}

impl PetDirectory for SeedCatalog {
    fn pet(&self, id: PetId) -> Result<Pet, LookupError> {
        self.pets.get(&id).cloned().ok_or(LookupError::PetNotFound(id))
    }

    fn user(&self, id: UserId) -> Result<User, LookupError> {
        self.users
            .get(&id)
            .cloned()
            .ok_or(LookupError::UserNotFound(id))
    }
}

impl QuestionBank for SeedCatalog {
    fn questions_for(&self, pet: &Pet) -> Result<Vec<Question>, LookupError> {
        let questions: Vec<Question> = self
            .questions
            .iter()
            .filter(|question| question.scope.applies_to(pet))
            .filter(|question| self.need_is_satisfied(question, pet))
            .cloned()
            .collect();

        if questions.is_empty() {
            return Err(LookupError::NoQuestionnaire(pet.id));
        }
        Ok(questions)
    }

    fn alternatives_for(&self, question_id: QuestionId) -> Result<Vec<Alternative>, LookupError> {
        self.questions
            .iter()
            .find(|question| question.id == question_id)
            .map(|question| question.alternatives.clone())
            .ok_or(LookupError::QuestionNotFound(question_id))
    }
}

impl NeedCatalog for SeedCatalog {
    fn active_needs(&self) -> Result<Vec<Need>, LookupError> {
        Ok(self
            .needs
            .values()
            .filter(|need| need.is_active())
            .cloned()
            .collect())
    }

    fn needs_for(&self, pet: &Pet) -> Result<Vec<Need>, LookupError> {
        Ok(pet
            .need_ids
            .iter()
            .filter_map(|id| self.needs.get(id))
            .cloned()
            .collect())
    }
}
