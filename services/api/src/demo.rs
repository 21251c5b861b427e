use clap::Args;
use pet_adoption::error::AppError;
use pet_adoption::workflows::adoption::{
    AdoptionError, AdoptionFormService, Alternative, InMemoryAdoptionRepository, LookupError,
    PetDirectory, PetId, QuestionBank, SeedCatalog, UserId,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Pet whose questionnaire the demo adopters fill in
    #[arg(long, default_value_t = 10)]
    pub(crate) pet: u32,
    /// Optional catalog seed to run the demo against instead of the bundled one
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct CatalogCheckArgs {
    /// Path to the catalog seed JSON file
    #[arg(long)]
    pub(crate) path: PathBuf,
}

/// How a scripted adopter picks among the offered alternatives.
#[derive(Debug, Clone, Copy)]
enum Strategy {
    Generous,
    Cautious,
}

impl Strategy {
    fn pick(self, alternatives: &[Alternative]) -> Option<&Alternative> {
        match self {
            Strategy::Generous => alternatives.iter().max_by_key(|alt| alt.points),
            Strategy::Cautious => alternatives.iter().min_by_key(|alt| alt.points),
        }
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let catalog = match &args.catalog {
        Some(path) => SeedCatalog::from_path(path)?,
        None => SeedCatalog::demo()?,
    };
    let catalog = Arc::new(catalog);
    let repository = Arc::new(InMemoryAdoptionRepository::default());
    let service = AdoptionFormService::new(catalog.clone(), repository.clone());

    let pet_id = PetId(args.pet);
    let pet = catalog.active_pet(pet_id).map_err(AdoptionError::from)?;
    println!("Adoption questionnaire demo");
    println!("Pet {} ({}) | minimum score {}", pet.name, pet.id, pet.min_score);

    let adopters = [
        (UserId(2), Strategy::Generous),
        (UserId(3), Strategy::Cautious),
    ];
    for (adopter_id, strategy) in adopters {
        let adopter = match catalog.user(adopter_id) {
            Ok(user) => user,
            Err(err) => {
                println!("\n- Skipping adopter {adopter_id}: {err}");
                continue;
            }
        };
        println!("\n{} ({:?} answers)", adopter.name, strategy);

        let mut progress = service.get_progress(adopter_id, pet_id)?;
        while let Some(question) = progress.next_question.clone() {
            let Some(choice) = strategy.pick(&question.alternatives) else {
                println!("  Question {} offers no alternatives", question.id);
                break;
            };
            let outcome = service.answer(adopter_id, pet_id, question.id, choice.id)?;
            println!(
                "  [{}/{}] {} -> {} (+{}, running {})",
                outcome.progress.step,
                outcome.progress.total_steps,
                question.prompt,
                choice.label,
                choice.points,
                outcome.progress.running_score
            );
            if let (Some(verdict), Some(request_id)) = (&outcome.verdict, &outcome.request_id) {
                println!("  Verdict: {} -> request {}", verdict.summary(), request_id);
            }
            progress = outcome.progress;
        }
    }

    println!("\nRequests visible to the owner ({})", pet.owner_id);
    for request in service.list_requests(pet_id, pet.owner_id)? {
        let summary = request.summary();
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{json}"),
            Err(err) => println!("  Summary unavailable: {err}"),
        }
    }
    println!(
        "\nStored sessions: {} | stored requests: {}",
        repository.session_count(),
        repository.request_count()
    );

    Ok(())
}

pub(crate) fn run_catalog_check(args: CatalogCheckArgs) -> Result<(), AppError> {
    let catalog = SeedCatalog::from_path(&args.path)?;
    println!(
        "Catalog {} is valid: {} pets, {} questions",
        args.path.display(),
        catalog.pet_count(),
        catalog.question_count()
    );

    for pet in catalog.pets() {
        let status = if pet.is_active() { "active" } else { "inactive" };
        match catalog.questions_for(pet) {
            Ok(questions) => {
                let max_score: i32 = questions
                    .iter()
                    .filter_map(|question| question.alternatives.iter().map(|alt| alt.points).max())
                    .sum();
                let reachable = if max_score >= pet.min_score {
                    "reachable"
                } else {
                    "unreachable"
                };
                println!(
                    "- {} {} ({status}): {} questions, max score {} vs minimum {} ({reachable})",
                    pet.id,
                    pet.name,
                    questions.len(),
                    max_score,
                    pet.min_score
                );
            }
            Err(LookupError::NoQuestionnaire(_)) => {
                println!("- {} {} ({status}): no questionnaire", pet.id, pet.name);
            }
            Err(err) => println!("- {} {} ({status}): {err}", pet.id, pet.name),
        }
    }

    Ok(())
}
