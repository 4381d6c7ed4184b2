use super::domain::{CalculationResult, ComputedMetrics, TreatmentParameters, Typology};
use super::policy::UnitSizePolicy;

/// Stateless evaluator that applies the treatment indices to a lot.
#[derive(Debug, Clone, Default)]
pub struct AprovechamientoEngine {
    policy: UnitSizePolicy,
}

impl AprovechamientoEngine {
    pub fn new(policy: UnitSizePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &UnitSizePolicy {
        &self.policy
    }

    /// Derives the buildability figures for a lot.
    ///
    /// `parameters` is `None` when the treatment code did not resolve. Invalid
    /// inputs never fail: they come back with `treatment_valid == false`.
    pub fn calculate(
        &self,
        parameters: Option<&TreatmentParameters>,
        lot_area: f64,
        typology: Typology,
    ) -> CalculationResult {
        let Some(parameters) = parameters else {
            return CalculationResult::not_found(typology);
        };

        let mut result = CalculationResult {
            treatment_valid: false,
            treatment_found: true,
            typology,
            normative_parameters: parameters.clone(),
            computed_metrics: ComputedMetrics::default(),
            setbacks: parameters.setbacks(),
            error: None,
        };

        let lot_area_valid = lot_area.is_finite() && lot_area > 0.0;
        if !lot_area_valid || parameters.validate().is_err() {
            return result;
        }

        let max_construction_area = lot_area * parameters.indice_construccion;
        let meets_minimum_area = lot_area >= parameters.area_minima_lote;

        // Below-minimum lots keep their figures; only the validity flag flips.
        result.computed_metrics = ComputedMetrics {
            max_occupation_area: lot_area * parameters.indice_ocupacion,
            max_construction_area,
            max_floors: parameters.altura_maxima,
            estimated_units: self.policy.estimate_units(typology, max_construction_area),
            meets_minimum_area,
            nominal_unit_area: self.policy.nominal_area(typology),
        };
        result.treatment_valid = meets_minimum_area;
        result
    }
}
