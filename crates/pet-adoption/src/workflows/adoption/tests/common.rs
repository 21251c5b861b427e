use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::Response;
use chrono::{TimeZone, Utc};
use serde_json::Value;

use crate::workflows::adoption::catalog::{CatalogSeed, SeedCatalog};
use crate::workflows::adoption::domain::{
    AdoptionRequestId, Alternative, AlternativeId, FormSessionId, Need, NeedId, Pet, PetGender,
    PetId, PetKind, PetSize, Question, QuestionId, QuestionScope, RecordStatus, User, UserId,
    UserRole,
};
use crate::workflows::adoption::ledger::AdoptionRequest;
use crate::workflows::adoption::memory::InMemoryAdoptionRepository;
use crate::workflows::adoption::repository::{AdoptionRepository, RepositoryError};
use crate::workflows::adoption::session::FormSession;
use crate::workflows::adoption::{adoption_router, AdoptionFormService};

pub(super) const PROTECTOR: UserId = UserId(1);
pub(super) const ADOPTER: UserId = UserId(2);
pub(super) const OTHER_ADOPTER: UserId = UserId(3);
pub(super) const OTHER_PROTECTOR: UserId = UserId(4);

/// Two-question dog: alternatives worth {3, 2} then {1, 4}, minimum score 5.
pub(super) const SCENARIO_PET: PetId = PetId(100);
pub(super) const CAT_PET: PetId = PetId(200);
pub(super) const RETIRED_PET: PetId = PetId(300);
pub(super) const UNLISTED_PET: PetId = PetId(999);

pub(super) const Q1: QuestionId = QuestionId(1);
pub(super) const Q2: QuestionId = QuestionId(2);
pub(super) const Q1_WORTH_3: AlternativeId = AlternativeId(11);
pub(super) const Q1_WORTH_2: AlternativeId = AlternativeId(12);
pub(super) const Q2_WORTH_1: AlternativeId = AlternativeId(21);
pub(super) const Q2_WORTH_4: AlternativeId = AlternativeId(22);

pub(super) type TestService = AdoptionFormService<SeedCatalog, InMemoryAdoptionRepository>;

fn user(id: UserId, name: &str, role: UserRole) -> User {
    User {
        id,
        name: name.to_string(),
        role,
    }
}

fn pet(id: PetId, kind: PetKind, min_score: i32, need_ids: Vec<NeedId>) -> Pet {
    Pet {
        id,
        name: format!("pet-{id}"),
        owner_id: PROTECTOR,
        min_score,
        kind,
        gender: PetGender::Female,
        size: PetSize::Medium,
        need_ids,
        status: RecordStatus::Active,
        deleted_on: None,
    }
}

pub(super) fn alternatives(pairs: &[(u32, i32)]) -> Vec<Alternative> {
    pairs
        .iter()
        .map(|(id, points)| Alternative {
            id: AlternativeId(*id),
            label: format!("alternative {id}"),
            points: *points,
        })
        .collect()
}

pub(super) fn question(
    id: u32,
    position: u32,
    scope: QuestionScope,
    need_id: Option<NeedId>,
    pairs: &[(u32, i32)],
) -> Question {
    Question {
        id: QuestionId(id),
        position,
        prompt: format!("question {id}"),
        scope,
        need_id,
        alternatives: alternatives(pairs),
    }
}

pub(super) fn seed() -> CatalogSeed {
    let mut retired = pet(RETIRED_PET, PetKind::Dog, 1, Vec::new());
    retired.status = RecordStatus::Inactive;
    retired.deleted_on = Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());

    CatalogSeed {
        users: vec![
            user(PROTECTOR, "Abrigo Central", UserRole::Protector),
            user(ADOPTER, "Ana", UserRole::Adopter),
            user(OTHER_ADOPTER, "Bruno", UserRole::Adopter),
            user(OTHER_PROTECTOR, "Lar Temporario", UserRole::Protector),
        ],
        needs: vec![
            Need {
                id: NeedId(1),
                name: "Fenced yard".to_string(),
                status: RecordStatus::Active,
                deleted_on: None,
            },
            Need {
                id: NeedId(2),
                name: "Quiet home".to_string(),
                status: RecordStatus::Inactive,
                deleted_on: None,
            },
        ],
        pets: vec![
            pet(SCENARIO_PET, PetKind::Dog, 5, vec![NeedId(1)]),
            pet(CAT_PET, PetKind::Cat, 2, vec![NeedId(2)]),
            retired,
        ],
        questions: vec![
            question(
                1,
                1,
                QuestionScope::Pet(SCENARIO_PET),
                None,
                &[(11, 3), (12, 2)],
            ),
            question(
                2,
                2,
                QuestionScope::Kind(PetKind::Dog),
                Some(NeedId(1)),
                &[(21, 1), (22, 4)],
            ),
            question(3, 1, QuestionScope::Kind(PetKind::Cat), None, &[(31, 0), (32, 2)]),
            question(
                4,
                2,
                QuestionScope::Universal,
                Some(NeedId(2)),
                &[(41, 0), (42, 5)],
            ),
        ],
    }
}

pub(super) fn catalog() -> SeedCatalog {
    SeedCatalog::from_seed(seed()).expect("fixture catalog is valid")
}

pub(super) fn build_service() -> (
    TestService,
    Arc<SeedCatalog>,
    Arc<InMemoryAdoptionRepository>,
) {
    let catalog = Arc::new(catalog());
    let repository = Arc::new(InMemoryAdoptionRepository::default());
    let service = AdoptionFormService::new(catalog.clone(), repository.clone());
    (service, catalog, repository)
}

pub(super) fn started_session(questions: &[Question]) -> FormSession {
    FormSession::start(
        FormSessionId("form-test".to_string()),
        ADOPTER,
        SCENARIO_PET,
        questions,
        Utc.with_ymd_and_hms(2025, 5, 20, 9, 0, 0).unwrap(),
    )
}

pub(super) fn scenario_questions() -> Vec<Question> {
    vec![
        question(1, 1, QuestionScope::Pet(SCENARIO_PET), None, &[(11, 3), (12, 2)]),
        question(2, 2, QuestionScope::Pet(SCENARIO_PET), None, &[(21, 1), (22, 4)]),
    ]
}

/// Walk the scenario pet's questionnaire with the given alternatives.
pub(super) fn complete_scenario(
    service: &TestService,
    adopter: UserId,
    first: AlternativeId,
    second: AlternativeId,
) -> AdoptionRequestId {
    service
        .get_progress(adopter, SCENARIO_PET)
        .expect("progress starts session");
    service
        .answer(adopter, SCENARIO_PET, Q1, first)
        .expect("first answer accepted");
    let outcome = service
        .answer(adopter, SCENARIO_PET, Q2, second)
        .expect("second answer accepted");
    outcome.request_id.expect("completion files a request")
}

pub(super) struct UnavailableRepository;

impl AdoptionRepository for UnavailableRepository {
    fn insert_session(&self, _session: FormSession) -> Result<FormSession, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn find_session(
        &self,
        _adopter_id: UserId,
        _pet_id: PetId,
    ) -> Result<Option<FormSession>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update_session(
        &self,
        _session: FormSession,
        _expected_version: u64,
    ) -> Result<FormSession, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn complete_session(
        &self,
        _session: FormSession,
        _expected_version: u64,
        _request: AdoptionRequest,
    ) -> Result<(FormSession, AdoptionRequest), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert_request(
        &self,
        _request: AdoptionRequest,
    ) -> Result<AdoptionRequest, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_request(
        &self,
        _id: &AdoptionRequestId,
    ) -> Result<Option<AdoptionRequest>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn requests_for_pet(&self, _pet_id: PetId) -> Result<Vec<AdoptionRequest>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// In-memory store whose first completion write fails, as a dropped connection would.
#[derive(Default)]
pub(super) struct FlakyCompletionRepository {
    pub(super) inner: InMemoryAdoptionRepository,
    failed_once: AtomicBool,
}

impl AdoptionRepository for FlakyCompletionRepository {
    fn insert_session(&self, session: FormSession) -> Result<FormSession, RepositoryError> {
        self.inner.insert_session(session)
    }

    fn find_session(
        &self,
        adopter_id: UserId,
        pet_id: PetId,
    ) -> Result<Option<FormSession>, RepositoryError> {
        self.inner.find_session(adopter_id, pet_id)
    }

    fn update_session(
        &self,
        session: FormSession,
        expected_version: u64,
    ) -> Result<FormSession, RepositoryError> {
        self.inner.update_session(session, expected_version)
    }

    fn complete_session(
        &self,
        session: FormSession,
        expected_version: u64,
        request: AdoptionRequest,
    ) -> Result<(FormSession, AdoptionRequest), RepositoryError> {
        if !self.failed_once.swap(true, Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("connection reset".to_string()));
        }
        self.inner
            .complete_session(session, expected_version, request)
    }

    fn insert_request(&self, request: AdoptionRequest) -> Result<AdoptionRequest, RepositoryError> {
        self.inner.insert_request(request)
    }

    fn fetch_request(
        &self,
        id: &AdoptionRequestId,
    ) -> Result<Option<AdoptionRequest>, RepositoryError> {
        self.inner.fetch_request(id)
    }

    fn requests_for_pet(&self, pet_id: PetId) -> Result<Vec<AdoptionRequest>, RepositoryError> {
        self.inner.requests_for_pet(pet_id)
    }
}

pub(super) fn router_with_service(service: TestService) -> axum::Router {
    adoption_router(Arc::new(service))
}

pub(super) fn assert_status(response: &Response, expected: StatusCode) {
    assert_eq!(response.status(), expected);
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
