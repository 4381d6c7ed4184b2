use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Normative indices attached to a POT zoning treatment.
///
/// Field names follow the wire format of the treatment backend; camelCase
/// aliases are accepted for records exported by the web client. Numeric fields
/// take numbers, numeric strings (decimal comma allowed) or `null`, which reads
/// as missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreatmentParameters {
    #[serde(rename = "codigo", alias = "code", default)]
    pub code: String,
    #[serde(rename = "nombre", alias = "name", default)]
    pub name: String,
    #[serde(alias = "indiceOcupacion", default, deserialize_with = "lenient_decimal")]
    pub indice_ocupacion: f64,
    #[serde(alias = "indiceConstruccion", default, deserialize_with = "lenient_decimal")]
    pub indice_construccion: f64,
    #[serde(alias = "alturaMaxima", default, deserialize_with = "lenient_floors")]
    pub altura_maxima: u32,
    #[serde(alias = "areaMinimaLote", default, deserialize_with = "lenient_decimal")]
    pub area_minima_lote: f64,
    #[serde(alias = "retiroFrontal", default, deserialize_with = "lenient_decimal")]
    pub retiro_frontal: f64,
    #[serde(alias = "retiroLateral", default, deserialize_with = "lenient_decimal")]
    pub retiro_lateral: f64,
    #[serde(alias = "retiroPosterior", default, deserialize_with = "lenient_decimal")]
    pub retiro_posterior: f64,
}

impl TreatmentParameters {
    pub fn setbacks(&self) -> Setbacks {
        Setbacks {
            frontal: self.retiro_frontal,
            lateral: self.retiro_lateral,
            posterior: self.retiro_posterior,
        }
    }

    /// Checks the indices are present and inside their regulatory ranges.
    pub fn validate(&self) -> Result<(), ParameterIssue> {
        let fields = [
            ("indice_ocupacion", self.indice_ocupacion),
            ("indice_construccion", self.indice_construccion),
            ("area_minima_lote", self.area_minima_lote),
            ("retiro_frontal", self.retiro_frontal),
            ("retiro_lateral", self.retiro_lateral),
            ("retiro_posterior", self.retiro_posterior),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(ParameterIssue::OutOfRange { field, value });
            }
        }

        if self.indice_ocupacion == 0.0 {
            return Err(ParameterIssue::Missing("indice_ocupacion"));
        }
        if self.indice_ocupacion > 1.0 {
            return Err(ParameterIssue::OutOfRange {
                field: "indice_ocupacion",
                value: self.indice_ocupacion,
            });
        }
        if self.indice_construccion == 0.0 {
            return Err(ParameterIssue::Missing("indice_construccion"));
        }
        if self.altura_maxima == 0 {
            return Err(ParameterIssue::Missing("altura_maxima"));
        }

        Ok(())
    }
}

/// Reason a treatment record cannot feed the calculation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParameterIssue {
    #[error("required parameter {0} is missing")]
    Missing(&'static str),
    #[error("parameter {field} out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
}

/// Mandatory setbacks in meters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Setbacks {
    pub frontal: f64,
    pub lateral: f64,
    pub posterior: f64,
}

/// Housing typology requested for the lot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Typology {
    Unifamiliar,
    BifamiliarPisosDiferentes,
    BifamiliarMismoPiso,
    Trifamiliar,
    #[default]
    Multifamiliar,
}

impl Typology {
    pub const ALL: [Typology; 5] = [
        Typology::Unifamiliar,
        Typology::BifamiliarPisosDiferentes,
        Typology::BifamiliarMismoPiso,
        Typology::Trifamiliar,
        Typology::Multifamiliar,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Typology::Unifamiliar => "unifamiliar",
            Typology::BifamiliarPisosDiferentes => "bifamiliar_pisos_diferentes",
            Typology::BifamiliarMismoPiso => "bifamiliar_mismo_piso",
            Typology::Trifamiliar => "trifamiliar",
            Typology::Multifamiliar => "multifamiliar",
        }
    }

    /// Lenient parse used for user input: unknown values fall back to multifamiliar.
    pub fn from_label(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl fmt::Display for Typology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Typology {
    type Err = UnknownTypology;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        Typology::ALL
            .into_iter()
            .find(|typology| typology.as_str() == normalized)
            .ok_or_else(|| UnknownTypology(value.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown typology '{0}'")]
pub struct UnknownTypology(pub String);

/// Inputs for a single buildability calculation.
///
/// Deserializes from the form payload `{treatment, area_lote, tipologia}`. The
/// lot area accepts numbers or numeric strings; anything else becomes NaN and
/// is reported as an invalid lot rather than a rejected request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationRequest {
    #[serde(rename = "treatment", alias = "tratamiento")]
    pub treatment_code: String,
    #[serde(
        rename = "area_lote",
        default = "missing_area",
        deserialize_with = "deserialize_lot_area"
    )]
    pub lot_area: f64,
    #[serde(
        rename = "tipologia",
        default,
        deserialize_with = "deserialize_typology"
    )]
    pub typology: Typology,
}

impl CalculationRequest {
    pub fn new(treatment_code: impl Into<String>, lot_area: f64, typology: Typology) -> Self {
        Self {
            treatment_code: treatment_code.into(),
            lot_area,
            typology,
        }
    }
}

fn missing_area() -> f64 {
    f64::NAN
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumericInput {
    Number(f64),
    Text(String),
    Other(serde::de::IgnoredAny),
}

impl NumericInput {
    /// Unparseable text and non-numeric values become NaN.
    fn into_f64(self) -> f64 {
        match self {
            NumericInput::Number(value) => value,
            NumericInput::Text(raw) => raw
                .trim()
                .replace(',', ".")
                .parse::<f64>()
                .unwrap_or(f64::NAN),
            NumericInput::Other(_) => f64::NAN,
        }
    }
}

fn deserialize_lot_area<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<NumericInput>::deserialize(deserializer)?
        .map(NumericInput::into_f64)
        .unwrap_or(f64::NAN))
}

fn lenient_decimal<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<NumericInput>::deserialize(deserializer)?
        .map(NumericInput::into_f64)
        .unwrap_or_default())
}

fn lenient_floors<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = lenient_decimal(deserializer)?;
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= f64::from(u32::MAX) {
        Ok(value as u32)
    } else {
        Err(serde::de::Error::custom(format!(
            "floor count must be a whole non-negative number, got {value}"
        )))
    }
}

fn deserialize_typology<'de, D>(deserializer: D) -> Result<Typology, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().map(Typology::from_label).unwrap_or_default())
}

/// Buildability figures derived from the treatment indices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ComputedMetrics {
    #[serde(rename = "area_ocupacion_maxima")]
    pub max_occupation_area: f64,
    #[serde(rename = "area_construccion_maxima")]
    pub max_construction_area: f64,
    #[serde(rename = "pisos_maximos")]
    pub max_floors: u32,
    #[serde(rename = "unidades_estimadas")]
    pub estimated_units: u32,
    #[serde(rename = "cumple_area_minima")]
    pub meets_minimum_area: bool,
    #[serde(rename = "area_unidad_nominal")]
    pub nominal_unit_area: f64,
}

/// Outcome of a calculation.
///
/// `treatment_valid` keeps its combined meaning (found, usable and large
/// enough); `treatment_found` and `computed_metrics.meets_minimum_area` expose
/// the individual conditions. `error` is only set when the catalog could not
/// be consulted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    #[serde(rename = "tratamiento_valido")]
    pub treatment_valid: bool,
    #[serde(rename = "tratamiento_encontrado")]
    pub treatment_found: bool,
    #[serde(rename = "tipologia")]
    pub typology: Typology,
    #[serde(rename = "parametros_normativos")]
    pub normative_parameters: TreatmentParameters,
    #[serde(rename = "calculos_aprovechamiento")]
    pub computed_metrics: ComputedMetrics,
    #[serde(rename = "retiros")]
    pub setbacks: Setbacks,
    #[serde(default)]
    pub error: Option<String>,
}

impl CalculationResult {
    pub(crate) fn not_found(typology: Typology) -> Self {
        Self {
            treatment_valid: false,
            treatment_found: false,
            typology,
            normative_parameters: TreatmentParameters::default(),
            computed_metrics: ComputedMetrics::default(),
            setbacks: Setbacks::default(),
            error: None,
        }
    }

    pub(crate) fn unavailable(typology: Typology, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::not_found(typology)
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
