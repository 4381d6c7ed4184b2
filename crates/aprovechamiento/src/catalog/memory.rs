use super::{CatalogError, TreatmentCatalog, TreatmentTable};
use crate::aprovechamiento::TreatmentParameters;

/// Fixed in-memory catalog, used for file-backed deployments and tests.
#[derive(Debug, Clone)]
pub struct StaticTreatmentCatalog {
    table: TreatmentTable,
}

impl StaticTreatmentCatalog {
    pub fn new(treatments: impl IntoIterator<Item = TreatmentParameters>) -> Self {
        Self::from_table(TreatmentTable::new(treatments))
    }

    pub fn from_table(table: TreatmentTable) -> Self {
        Self { table }
    }

    /// Sample consolidation, renewal and development treatments for demos
    /// and local development when no catalog source is configured.
    pub fn reference() -> Self {
        let treatments = [
            ("CN1", "Consolidación Nivel 1", 0.7, 2.5, 5, 120.0, (3.0, 1.5, 3.0)),
            ("CN2", "Consolidación Nivel 2", 0.7, 3.0, 6, 150.0, (3.0, 2.0, 3.0)),
            ("CN3", "Consolidación Nivel 3", 0.6, 2.0, 4, 96.0, (2.0, 1.0, 2.0)),
            ("R", "Renovación Urbana", 0.6, 4.5, 12, 500.0, (5.0, 3.0, 4.0)),
            ("D", "Desarrollo", 0.5, 1.8, 5, 1000.0, (5.0, 3.0, 5.0)),
            ("MI", "Mejoramiento Integral", 0.8, 1.6, 3, 54.0, (0.0, 0.0, 2.0)),
        ]
        .into_iter()
        .map(
            |(code, name, ocupacion, construccion, altura, area_minima, (frontal, lateral, posterior))| {
                TreatmentParameters {
                    code: code.to_string(),
                    name: name.to_string(),
                    indice_ocupacion: ocupacion,
                    indice_construccion: construccion,
                    altura_maxima: altura,
                    area_minima_lote: area_minima,
                    retiro_frontal: frontal,
                    retiro_lateral: lateral,
                    retiro_posterior: posterior,
                }
            },
        );

        Self::new(treatments)
    }
}

impl TreatmentCatalog for StaticTreatmentCatalog {
    async fn list_treatments(&self) -> Result<TreatmentTable, CatalogError> {
        Ok(self.table.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_catalog_records_are_valid() {
        let catalog = StaticTreatmentCatalog::reference();
        assert_eq!(catalog.table.len(), 6);
        for parameters in catalog.table.sorted() {
            assert_eq!(parameters.validate(), Ok(()), "{} invalid", parameters.code);
        }
    }
}
