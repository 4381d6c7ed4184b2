use super::common::*;
use crate::aprovechamiento::{
    calculate_aprovechamiento, ComputedMetrics, Setbacks, TreatmentParameters, Typology,
};
use crate::catalog::TreatmentTable;

#[test]
fn computes_indices_for_a_lot_above_minimum() {
    let parameters = consolidation();

    let result = engine().calculate(Some(&parameters), 200.0, Typology::Multifamiliar);

    assert!(result.treatment_valid);
    assert!(result.treatment_found);
    assert!(result.error.is_none());
    assert_close(result.computed_metrics.max_occupation_area, 140.0);
    assert_eq!(result.computed_metrics.max_construction_area, 500.0);
    assert_eq!(result.computed_metrics.max_floors, 5);
    assert!(result.computed_metrics.meets_minimum_area);
    assert_eq!(result.computed_metrics.estimated_units, 8);
    assert_eq!(result.normative_parameters, parameters);
}

#[test]
fn lot_below_minimum_keeps_figures_but_is_not_valid() {
    let result = engine().calculate(Some(&consolidation()), 80.0, Typology::Multifamiliar);

    assert!(!result.treatment_valid);
    assert!(result.treatment_found);
    assert!(!result.computed_metrics.meets_minimum_area);
    assert_close(result.computed_metrics.max_occupation_area, 56.0);
    assert_eq!(result.computed_metrics.max_construction_area, 200.0);
    assert!(result.error.is_none());
}

#[test]
fn lot_exactly_at_minimum_is_valid() {
    let result = engine().calculate(Some(&consolidation()), 120.0, Typology::Unifamiliar);

    assert!(result.treatment_valid);
    assert!(result.computed_metrics.meets_minimum_area);
    assert_eq!(result.computed_metrics.estimated_units, 1);
}

#[test]
fn unknown_treatment_returns_zeroed_result_without_error() {
    let table = TreatmentTable::new([consolidation()]);

    let result = calculate_aprovechamiento(&table, "nonexistent", 200.0, Typology::Multifamiliar);

    assert!(!result.treatment_valid);
    assert!(!result.treatment_found);
    assert_eq!(result.normative_parameters, TreatmentParameters::default());
    assert_eq!(result.computed_metrics, ComputedMetrics::default());
    assert_eq!(result.setbacks, Setbacks::default());
    assert!(result.error.is_none());
}

#[test]
fn non_positive_and_non_finite_areas_are_invalid() {
    for area in [0.0, -15.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let result = engine().calculate(Some(&consolidation()), area, Typology::Multifamiliar);

        assert!(!result.treatment_valid, "area {area} should be invalid");
        assert!(result.treatment_found);
        assert_eq!(result.computed_metrics, ComputedMetrics::default());
        assert_eq!(result.normative_parameters.code, "CN1");
    }
}

#[test]
fn treatment_with_missing_index_is_invalid() {
    let mut parameters = consolidation();
    parameters.indice_construccion = 0.0;

    let result = engine().calculate(Some(&parameters), 400.0, Typology::Multifamiliar);

    assert!(!result.treatment_valid);
    assert!(result.treatment_found);
    assert_eq!(result.computed_metrics, ComputedMetrics::default());
}

#[test]
fn setbacks_pass_through_unchanged() {
    let result = engine().calculate(Some(&renewal()), 50.0, Typology::Multifamiliar);

    assert_eq!(
        result.setbacks,
        Setbacks {
            frontal: 5.0,
            lateral: 3.0,
            posterior: 4.0,
        }
    );
}

#[test]
fn typology_changes_unit_estimate_only() {
    let parameters = renewal();
    let multifamiliar = engine().calculate(Some(&parameters), 600.0, Typology::Multifamiliar);
    let bifamiliar = engine().calculate(Some(&parameters), 600.0, Typology::BifamiliarPisosDiferentes);

    assert_eq!(multifamiliar.computed_metrics.estimated_units, 45);
    assert_eq!(bifamiliar.computed_metrics.estimated_units, 2);
    assert_eq!(
        multifamiliar.computed_metrics.max_construction_area,
        bifamiliar.computed_metrics.max_construction_area
    );
    assert_eq!(bifamiliar.typology, Typology::BifamiliarPisosDiferentes);
}

#[test]
fn identical_inputs_produce_identical_results() {
    let engine = engine();
    let parameters = consolidation();

    let first = engine.calculate(Some(&parameters), 233.4, Typology::Trifamiliar);
    let second = engine.calculate(Some(&parameters), 233.4, Typology::Trifamiliar);

    assert_eq!(first, second);
}
