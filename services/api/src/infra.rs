use metrics_exporter_prometheus::PrometheusHandle;
use pet_adoption::config::CatalogConfig;
use pet_adoption::workflows::adoption::{SeedCatalog, SeedError};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Catalog from the configured seed file, or the bundled demo data when none is set.
pub(crate) fn load_catalog(config: &CatalogConfig) -> Result<SeedCatalog, SeedError> {
    match &config.seed_path {
        Some(path) => {
            let catalog = SeedCatalog::from_path(path)?;
            info!(path = %path.display(), pets = catalog.pet_count(), "catalog seed loaded");
            Ok(catalog)
        }
        None => {
            info!("no catalog seed configured; using demo catalog");
            SeedCatalog::demo()
        }
    }
}
