use metrics_exporter_prometheus::PrometheusHandle;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tenderforce::config::CatalogConfig;
use tenderforce::error::AppError;
use tenderforce::obligations::{BundledSource, CatalogSource, DirectorySource, ObligationService};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) service: Arc<ObligationService>,
    pub(crate) source: Arc<dyn CatalogSource>,
}

impl AppState {
    /// Listening and serving a snapshot.
    pub(crate) fn is_ready(&self) -> bool {
        self.readiness.load(Ordering::Relaxed) && self.service.is_ready()
    }
}

/// Flags shared by every command that reads the catalog.
#[derive(clap::Args, Debug, Default, Clone)]
pub(crate) struct CatalogArgs {
    /// Load obligations and rules from this directory instead of the bundled data
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
    /// Apply the general EED fallback and append the standard obligations
    #[arg(long)]
    pub(crate) baseline: bool,
}

impl CatalogArgs {
    pub(crate) fn apply(self, config: &mut CatalogConfig) {
        if let Some(dir) = self.data_dir {
            config.data_dir = Some(dir);
        }
        if self.baseline {
            config.baseline = true;
        }
    }
}

pub(crate) fn catalog_source(config: &CatalogConfig) -> Arc<dyn CatalogSource> {
    match &config.data_dir {
        Some(dir) => Arc::new(DirectorySource::new(dir)),
        None => Arc::new(BundledSource),
    }
}

/// Initial load. Failure here is fatal because there is nothing to fall back on.
pub(crate) fn load_service(
    config: &CatalogConfig,
    source: &dyn CatalogSource,
) -> Result<ObligationService, AppError> {
    let service = ObligationService::load(source, config.baseline_policy(), config.reload_policy)?;
    Ok(service)
}
