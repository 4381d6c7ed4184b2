use crate::infra::build_service;
use aprovechamiento::aprovechamiento::{CalculationRequest, CalculationResult, Typology};
use aprovechamiento::catalog::TreatmentTable;
use aprovechamiento::config::AppConfig;
use aprovechamiento::error::AppError;
use clap::Args;

#[derive(Args, Debug)]
pub(crate) struct CalculationArgs {
    /// Treatment code as published in the POT (e.g. CN1)
    #[arg(long)]
    pub(crate) tratamiento: String,
    /// Lot area in square meters
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) area: f64,
    /// Housing typology (defaults to multifamiliar)
    #[arg(long)]
    pub(crate) tipologia: Option<String>,
    /// Print the raw JSON payload instead of the text report
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct TreatmentListArgs {
    /// Print the raw JSON payload instead of the text listing
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) async fn run_calculation(args: CalculationArgs) -> Result<(), AppError> {
    let CalculationArgs {
        tratamiento,
        area,
        tipologia,
        json,
    } = args;

    let config = AppConfig::load()?;
    let service = build_service(&config)?;

    let typology = tipologia
        .as_deref()
        .map(Typology::from_label)
        .unwrap_or_default();
    let request = CalculationRequest::new(tratamiento, area, typology);
    let result = service.calculate(&request).await;

    if json {
        match serde_json::to_string_pretty(&result) {
            Ok(payload) => println!("{}", payload),
            Err(err) => println!("Calculation payload unavailable: {}", err),
        }
    } else {
        println!("{}", render_calculation(&request, &result));
    }

    Ok(())
}

pub(crate) async fn run_treatment_listing(args: TreatmentListArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = build_service(&config)?;
    let table = service.treatments().await?;

    if args.json {
        match serde_json::to_string_pretty(&table.sorted()) {
            Ok(payload) => println!("{}", payload),
            Err(err) => println!("Treatment payload unavailable: {}", err),
        }
    } else {
        println!("{}", render_treatments(&table));
    }

    Ok(())
}

pub(crate) fn render_calculation(request: &CalculationRequest, result: &CalculationResult) -> String {
    let mut lines = vec![format!(
        "Aprovechamiento for treatment {} on a {:.2} m² lot ({})",
        request.treatment_code, request.lot_area, result.typology
    )];

    if let Some(error) = &result.error {
        lines.push(format!("Calculation unavailable: {}", error));
        return lines.join("\n");
    }

    if !result.treatment_found {
        lines.push("Treatment not found in the catalog".to_string());
        return lines.join("\n");
    }

    let parameters = &result.normative_parameters;
    lines.push(String::new());
    lines.push(format!("Normative parameters: {}", parameters.name));
    lines.push(format!(
        "- Índice de ocupación {:.2} | Índice de construcción {:.2}",
        parameters.indice_ocupacion, parameters.indice_construccion
    ));
    lines.push(format!(
        "- Altura máxima {} pisos | Área mínima de lote {:.2} m²",
        parameters.altura_maxima, parameters.area_minima_lote
    ));

    let metrics = &result.computed_metrics;
    lines.push(String::new());
    lines.push("Buildability".to_string());
    lines.push(format!(
        "- Max occupation area: {:.2} m²",
        metrics.max_occupation_area
    ));
    lines.push(format!(
        "- Max construction area: {:.2} m²",
        metrics.max_construction_area
    ));
    lines.push(format!("- Max floors: {}", metrics.max_floors));
    lines.push(format!(
        "- Estimated units: {} (nominal {:.0} m² per unit)",
        metrics.estimated_units, metrics.nominal_unit_area
    ));

    lines.push(String::new());
    lines.push(format!(
        "Setbacks: frontal {:.2} m | lateral {:.2} m | posterior {:.2} m",
        result.setbacks.frontal, result.setbacks.lateral, result.setbacks.posterior
    ));

    lines.push(String::new());
    if result.treatment_valid {
        lines.push("Result: treatment applies to this lot".to_string());
    } else if !metrics.meets_minimum_area && metrics.max_floors > 0 {
        lines.push(format!(
            "Result: lot is below the {:.2} m² minimum for this treatment",
            parameters.area_minima_lote
        ));
    } else {
        lines.push("Result: lot area or treatment parameters are not valid".to_string());
    }

    lines.join("\n")
}

pub(crate) fn render_treatments(table: &TreatmentTable) -> String {
    let mut lines = vec![format!(
        "{} treatments (fetched {})",
        table.len(),
        table.fetched_at().format("%Y-%m-%d %H:%M:%S UTC")
    )];
    for parameters in table.sorted() {
        lines.push(format!(
            "- {}: {} | IO {:.2} | IC {:.2} | {} pisos | mín. {:.0} m²",
            parameters.code,
            parameters.name,
            parameters.indice_ocupacion,
            parameters.indice_construccion,
            parameters.altura_maxima,
            parameters.area_minima_lote
        ));
    }
    lines.join("\n")
}
