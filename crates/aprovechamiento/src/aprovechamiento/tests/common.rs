use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::aprovechamiento::{
    aprovechamiento_router, AprovechamientoEngine, AprovechamientoService, TreatmentParameters,
    UnitSizePolicy,
};
use crate::catalog::{CatalogError, StaticTreatmentCatalog, TreatmentCatalog, TreatmentTable};

/// Treatment with the indices used throughout the worked examples.
pub(super) fn consolidation() -> TreatmentParameters {
    TreatmentParameters {
        code: "CN1".to_string(),
        name: "Consolidación Nivel 1".to_string(),
        indice_ocupacion: 0.7,
        indice_construccion: 2.5,
        altura_maxima: 5,
        area_minima_lote: 120.0,
        retiro_frontal: 3.0,
        retiro_lateral: 1.5,
        retiro_posterior: 3.0,
    }
}

pub(super) fn renewal() -> TreatmentParameters {
    TreatmentParameters {
        code: "R".to_string(),
        name: "Renovación Urbana".to_string(),
        indice_ocupacion: 0.6,
        indice_construccion: 4.5,
        altura_maxima: 12,
        area_minima_lote: 500.0,
        retiro_frontal: 5.0,
        retiro_lateral: 3.0,
        retiro_posterior: 4.0,
    }
}

pub(super) fn engine() -> AprovechamientoEngine {
    AprovechamientoEngine::new(UnitSizePolicy::default())
}

pub(super) fn static_catalog() -> StaticTreatmentCatalog {
    StaticTreatmentCatalog::new([consolidation(), renewal()])
}

pub(super) fn build_service() -> AprovechamientoService<StaticTreatmentCatalog> {
    AprovechamientoService::new(Arc::new(static_catalog()), UnitSizePolicy::default())
}

pub(super) fn router_with_service<C>(service: AprovechamientoService<C>) -> axum::Router
where
    C: TreatmentCatalog + 'static,
{
    aprovechamiento_router(Arc::new(service))
}

/// Catalog whose upstream is down.
pub(super) struct UnavailableCatalog;

impl TreatmentCatalog for UnavailableCatalog {
    async fn list_treatments(&self) -> Result<TreatmentTable, CatalogError> {
        Err(CatalogError::Upstream {
            endpoint: "GET http://catalog.invalid/api/tratamientos".to_string(),
            status: 503,
            body: "maintenance".to_string(),
        })
    }
}

/// Catalog that counts how often it is consulted.
#[derive(Default)]
pub(super) struct CountingCatalog {
    pub(super) calls: AtomicUsize,
}

impl TreatmentCatalog for CountingCatalog {
    async fn list_treatments(&self) -> Result<TreatmentTable, CatalogError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(TreatmentTable::new([consolidation()]))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("json body")
}

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
