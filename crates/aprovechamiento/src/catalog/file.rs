use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use super::{CatalogError, TreatmentTable};
use crate::aprovechamiento::TreatmentParameters;

/// Loader for treatment exports in CSV form.
///
/// Expected headers: `codigo,nombre,indice_ocupacion,indice_construccion,
/// altura_maxima,area_minima_lote,retiro_frontal,retiro_lateral,retiro_posterior`.
/// Setback columns may be blank. Decimal commas are accepted. Codes must be
/// unique, ignoring case.
pub struct CsvTreatmentCatalog;

impl CsvTreatmentCatalog {
    pub fn from_path(path: impl AsRef<Path>) -> Result<TreatmentTable, CatalogError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<TreatmentTable, CatalogError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut treatments = Vec::new();
        let mut seen = HashSet::new();

        for record in csv_reader.deserialize::<TreatmentRow>() {
            let row = record?;
            let parameters = row.into_parameters();
            parameters
                .validate()
                .map_err(|issue| CatalogError::InvalidRecord {
                    code: parameters.code.clone(),
                    issue,
                })?;
            if !seen.insert(parameters.code.to_ascii_uppercase()) {
                return Err(CatalogError::DuplicateCode {
                    code: parameters.code,
                });
            }
            treatments.push(parameters);
        }

        Ok(TreatmentTable::new(treatments))
    }
}

#[derive(Debug, Deserialize)]
struct TreatmentRow {
    #[serde(alias = "code")]
    codigo: String,
    #[serde(alias = "name", default)]
    nombre: String,
    #[serde(deserialize_with = "decimal")]
    indice_ocupacion: f64,
    #[serde(deserialize_with = "decimal")]
    indice_construccion: f64,
    altura_maxima: u32,
    #[serde(deserialize_with = "decimal")]
    area_minima_lote: f64,
    #[serde(default, deserialize_with = "decimal")]
    retiro_frontal: f64,
    #[serde(default, deserialize_with = "decimal")]
    retiro_lateral: f64,
    #[serde(default, deserialize_with = "decimal")]
    retiro_posterior: f64,
}

impl TreatmentRow {
    fn into_parameters(self) -> TreatmentParameters {
        TreatmentParameters {
            code: self.codigo,
            name: self.nombre,
            indice_ocupacion: self.indice_ocupacion,
            indice_construccion: self.indice_construccion,
            altura_maxima: self.altura_maxima,
            area_minima_lote: self.area_minima_lote,
            retiro_frontal: self.retiro_frontal,
            retiro_lateral: self.retiro_lateral,
            retiro_posterior: self.retiro_posterior,
        }
    }
}

fn decimal<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    trimmed
        .replace(',', ".")
        .parse::<f64>()
        .map_err(|err| serde::de::Error::custom(format!("'{trimmed}' is not a number ({err})")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "codigo,nombre,indice_ocupacion,indice_construccion,altura_maxima,area_minima_lote,retiro_frontal,retiro_lateral,retiro_posterior\n";

    #[test]
    fn parses_rows_with_decimal_commas_and_blank_setbacks() {
        let csv = format!(
            "{HEADER}CN1,Consolidación Nivel 1,0.7,2.5,5,120,3,1.5,3\nMI,Mejoramiento Integral,\"0,8\",\"1,6\",3,54,,,\n"
        );

        let table = CsvTreatmentCatalog::from_reader(csv.as_bytes()).expect("catalog parses");

        assert_eq!(table.len(), 2);
        let mi = table.get("MI").expect("MI present");
        assert_eq!(mi.indice_ocupacion, 0.8);
        assert_eq!(mi.indice_construccion, 1.6);
        assert_eq!(mi.retiro_frontal, 0.0);
        assert_eq!(table.get("CN1").map(|p| p.retiro_lateral), Some(1.5));
    }

    #[test]
    fn rejects_out_of_range_occupation_index() {
        let csv = format!("{HEADER}X,Roto,1.4,2.0,4,90,0,0,0\n");

        let err = CsvTreatmentCatalog::from_reader(csv.as_bytes()).expect_err("invalid record");

        assert!(matches!(err, CatalogError::InvalidRecord { ref code, .. } if code == "X"));
    }

    #[test]
    fn reports_malformed_numbers() {
        let csv = format!("{HEADER}X,Roto,abc,2.0,4,90,0,0,0\n");

        let err = CsvTreatmentCatalog::from_reader(csv.as_bytes()).expect_err("bad number");

        assert!(matches!(err, CatalogError::Csv(_)));
    }

    #[test]
    fn rejects_duplicate_codes() {
        let csv = format!("{HEADER}CN1,Consolidación,0.7,2.5,5,120,3,1.5,3\ncn1,Copia,0.6,2.0,4,90,0,0,0\n");

        let err = CsvTreatmentCatalog::from_reader(csv.as_bytes()).expect_err("duplicate code");

        assert!(matches!(err, CatalogError::DuplicateCode { ref code } if code == "cn1"));
    }
}
