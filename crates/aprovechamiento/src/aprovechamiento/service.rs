use std::sync::Arc;

use super::domain::{CalculationRequest, CalculationResult, TreatmentParameters};
use super::engine::AprovechamientoEngine;
use super::policy::UnitSizePolicy;
use crate::catalog::{CatalogError, TreatmentCatalog, TreatmentTable};

/// Service composing the treatment catalog and the buildability engine.
pub struct AprovechamientoService<C> {
    catalog: Arc<C>,
    engine: Arc<AprovechamientoEngine>,
}

impl<C> AprovechamientoService<C>
where
    C: TreatmentCatalog + 'static,
{
    pub fn new(catalog: Arc<C>, policy: UnitSizePolicy) -> Self {
        Self {
            catalog,
            engine: Arc::new(AprovechamientoEngine::new(policy)),
        }
    }

    pub fn engine(&self) -> &AprovechamientoEngine {
        &self.engine
    }

    /// Resolve the treatment and run the engine.
    ///
    /// Domain problems come back as flags on the result; only a catalog
    /// failure fills `error`.
    pub async fn calculate(&self, request: &CalculationRequest) -> CalculationResult {
        match self.catalog.lookup(&request.treatment_code).await {
            Ok(parameters) => {
                self.engine
                    .calculate(parameters.as_ref(), request.lot_area, request.typology)
            }
            Err(err) => {
                tracing::warn!(
                    treatment = %request.treatment_code,
                    error = %err,
                    "treatment catalog unavailable"
                );
                CalculationResult::unavailable(request.typology, err.to_string())
            }
        }
    }

    pub async fn treatments(&self) -> Result<TreatmentTable, CatalogError> {
        self.catalog.list_treatments().await
    }

    pub async fn treatment(&self, code: &str) -> Result<Option<TreatmentParameters>, CatalogError> {
        self.catalog.lookup(code).await
    }
}
