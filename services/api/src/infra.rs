use aprovechamiento::aprovechamiento::{AprovechamientoService, UnitSizePolicy};
use aprovechamiento::catalog::CatalogBackend;
use aprovechamiento::config::AppConfig;
use aprovechamiento::error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn load_policy(config: &AppConfig) -> Result<UnitSizePolicy, AppError> {
    match &config.policy.unit_policy_path {
        Some(path) => Ok(UnitSizePolicy::from_path(path)?),
        None => Ok(UnitSizePolicy::default()),
    }
}

pub(crate) fn build_service(
    config: &AppConfig,
) -> Result<Arc<AprovechamientoService<CatalogBackend>>, AppError> {
    let policy = load_policy(config)?;
    let catalog = CatalogBackend::from_config(&config.catalog)?;
    tracing::debug!(catalog = catalog.describe(), "treatment catalog configured");
    Ok(Arc::new(AprovechamientoService::new(
        Arc::new(catalog),
        policy,
    )))
}
