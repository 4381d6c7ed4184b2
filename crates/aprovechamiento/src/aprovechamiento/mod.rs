//! Aprovechamiento urbanístico: buildability figures for a lot under a POT
//! zoning treatment.
//!
//! [`AprovechamientoEngine`] is a pure function of the treatment parameters,
//! lot area and typology. [`AprovechamientoService`] resolves the treatment
//! through a [`crate::catalog::TreatmentCatalog`] first, and
//! [`aprovechamiento_router`] exposes both over HTTP.

pub mod domain;
pub mod engine;
pub mod policy;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    CalculationRequest, CalculationResult, ComputedMetrics, ParameterIssue, Setbacks,
    TreatmentParameters, Typology, UnknownTypology,
};
pub use engine::AprovechamientoEngine;
pub use policy::{PolicyError, UnitSizePolicy, UnitSizeRule};
pub use router::aprovechamiento_router;
pub use service::AprovechamientoService;

use crate::catalog::TreatmentTable;

/// Calculate against an already resolved catalog with the default unit policy.
pub fn calculate_aprovechamiento(
    table: &TreatmentTable,
    treatment_code: &str,
    lot_area: f64,
    typology: Typology,
) -> CalculationResult {
    AprovechamientoEngine::default().calculate(table.get(treatment_code), lot_area, typology)
}
