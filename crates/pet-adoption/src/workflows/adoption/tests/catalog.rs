use super::common::*;
use crate::workflows::adoption::catalog::{CatalogSeed, SeedCatalog, SeedError};
use crate::workflows::adoption::directory::{LookupError, NeedCatalog, PetDirectory, QuestionBank};
use crate::workflows::adoption::domain::{NeedId, QuestionId, QuestionScope, UserId};

#[test]
fn questions_follow_scope_need_and_position() {
    let catalog = catalog();
    let pet = catalog.pet(SCENARIO_PET).expect("pet exists");

    let ids: Vec<QuestionId> = catalog
        .questions_for(&pet)
        .expect("scenario pet has a questionnaire")
        .into_iter()
        .map(|question| question.id)
        .collect();

    assert_eq!(ids, vec![Q1, Q2]);
}

#[test]
fn questions_tied_to_inactive_needs_are_skipped() {
    let catalog = catalog();
    let cat = catalog.pet(CAT_PET).expect("pet exists");

    let questions = catalog.questions_for(&cat).expect("cat questionnaire");

    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].id, QuestionId(3));
}

#[test]
fn pet_without_matching_questions_has_no_questionnaire() {
    let catalog = catalog();
    let retired = catalog.pet(RETIRED_PET).expect("pet exists regardless of status");

    assert_eq!(
        catalog.questions_for(&retired),
        Err(LookupError::NoQuestionnaire(RETIRED_PET))
    );
}

#[test]
fn active_pet_lookup_filters_on_status() {
    let catalog = catalog();

    assert!(catalog.active_pet(SCENARIO_PET).is_ok());
    assert_eq!(
        catalog.active_pet(RETIRED_PET),
        Err(LookupError::PetNotFound(RETIRED_PET))
    );
    assert_eq!(
        catalog.pet(UNLISTED_PET),
        Err(LookupError::PetNotFound(UNLISTED_PET))
    );
}

#[test]
fn alternatives_are_looked_up_by_question() {
    let catalog = catalog();

    let alternatives = catalog.alternatives_for(Q2).expect("question exists");
    let points: Vec<i32> = alternatives.iter().map(|alt| alt.points).collect();
    assert_eq!(points, vec![1, 4]);

    assert_eq!(
        catalog.alternatives_for(QuestionId(77)),
        Err(LookupError::QuestionNotFound(QuestionId(77)))
    );
}

#[test]
fn need_catalog_offers_only_active_needs() {
    let catalog = catalog();

    let active: Vec<NeedId> = catalog
        .active_needs()
        .expect("needs listed")
        .into_iter()
        .map(|need| need.id)
        .collect();
    assert_eq!(active, vec![NeedId(1)]);

    let cat = catalog.pet(CAT_PET).expect("pet exists");
    let cat_needs = catalog.needs_for(&cat).expect("needs resolved");
    assert_eq!(cat_needs.len(), 1);
    assert!(!cat_needs[0].is_active());
}

#[test]
fn seed_rejects_negative_points() {
    let mut seed = seed();
    seed.questions[0].alternatives[0].points = -1;

    match SeedCatalog::from_seed(seed) {
        Err(SeedError::NegativePoints { question, .. }) => assert_eq!(question, Q1),
        other => panic!("expected negative points error, got {other:?}"),
    }
}

#[test]
fn seed_rejects_duplicate_alternatives_and_empty_questions() {
    let mut duplicated = seed();
    duplicated
        .questions
        .push(question(9, 9, QuestionScope::Universal, None, &[(11, 1)]));
    assert!(matches!(
        SeedCatalog::from_seed(duplicated),
        Err(SeedError::DuplicateAlternative { .. })
    ));

    let mut empty = seed();
    empty
        .questions
        .push(question(9, 9, QuestionScope::Universal, None, &[]));
    assert!(matches!(
        SeedCatalog::from_seed(empty),
        Err(SeedError::EmptyQuestion(QuestionId(9)))
    ));
}

#[test]
fn seed_rejects_pets_owned_by_adopters() {
    let mut seed = seed();
    seed.pets[0].owner_id = ADOPTER;

    match SeedCatalog::from_seed(seed) {
        Err(SeedError::InvalidOwner { owner, .. }) => assert_eq!(owner, UserId(2)),
        other => panic!("expected invalid owner error, got {other:?}"),
    }
}

#[test]
fn seed_round_trips_through_json_reader() {
    let json = serde_json::to_vec(&seed()).expect("seed serializes");

    let catalog = SeedCatalog::from_reader(json.as_slice()).expect("seed parses");

    assert_eq!(catalog.pet_count(), 3);
    assert_eq!(catalog.question_count(), 4);
}

#[test]
fn malformed_seed_reports_parse_error() {
    let result = SeedCatalog::from_reader("{\"pets\": 7}".as_bytes());

    assert!(matches!(result, Err(SeedError::Parse(_))));
}

#[test]
fn demo_catalog_is_valid() {
    let demo = SeedCatalog::demo().expect("demo seed is consistent");

    assert_eq!(demo.pet_count(), CatalogSeed::demo().pets.len());
}

#[test]
fn seed_rejects_pets_whose_best_score_overflows() {
    let mut seed = seed();
    seed.questions[0].alternatives[0].points = i32::MAX;

    match SeedCatalog::from_seed(seed) {
        Err(SeedError::ScoreOverflow(pet)) => assert_eq!(pet, SCENARIO_PET),
        other => panic!("expected score overflow error, got {other:?}"),
    }
}
