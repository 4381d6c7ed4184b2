use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::domain::Typology;

/// Nominal unit size and optional unit cap applied to a typology.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitSizeRule {
    /// Average built area per dwelling unit, in m².
    pub nominal_area: f64,
    #[serde(default)]
    pub max_units: Option<u32>,
}

/// Typology table used to turn built area into an estimated unit count.
///
/// The defaults are placeholders until the municipal regulation is confirmed;
/// deployments override them with a JSON file keyed by typology.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitSizePolicy {
    rules: BTreeMap<Typology, UnitSizeRule>,
}

impl Default for UnitSizePolicy {
    fn default() -> Self {
        let rules = [
            (Typology::Unifamiliar, 120.0, Some(1)),
            (Typology::BifamiliarPisosDiferentes, 90.0, Some(2)),
            (Typology::BifamiliarMismoPiso, 80.0, Some(2)),
            (Typology::Trifamiliar, 75.0, Some(3)),
            (Typology::Multifamiliar, 60.0, None),
        ]
        .into_iter()
        .map(|(typology, nominal_area, max_units)| {
            (
                typology,
                UnitSizeRule {
                    nominal_area,
                    max_units,
                },
            )
        })
        .collect();

        Self { rules }
    }
}

impl UnitSizePolicy {
    /// Loads overrides from JSON, e.g. `{"multifamiliar": {"nominal_area": 55}}`.
    ///
    /// Typologies absent from the document keep their default rule.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, PolicyError> {
        let overrides: BTreeMap<String, UnitSizeRule> = serde_json::from_reader(reader)?;
        let mut policy = Self::default();

        for (label, rule) in overrides {
            let typology = label
                .parse::<Typology>()
                .map_err(|_| PolicyError::UnknownTypology(label.clone()))?;
            policy.set_rule(typology, rule)?;
        }

        Ok(policy)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn set_rule(&mut self, typology: Typology, rule: UnitSizeRule) -> Result<(), PolicyError> {
        if !rule.nominal_area.is_finite() || rule.nominal_area <= 0.0 {
            return Err(PolicyError::InvalidNominalArea {
                typology,
                value: rule.nominal_area,
            });
        }
        self.rules.insert(typology, rule);
        Ok(())
    }

    pub fn rule(&self, typology: Typology) -> Option<&UnitSizeRule> {
        self.rules.get(&typology)
    }

    pub fn nominal_area(&self, typology: Typology) -> f64 {
        self.rule(typology)
            .map(|rule| rule.nominal_area)
            .unwrap_or_default()
    }

    pub fn estimate_units(&self, typology: Typology, construction_area: f64) -> u32 {
        let Some(rule) = self.rule(typology) else {
            return 0;
        };
        if rule.nominal_area <= 0.0 || !construction_area.is_finite() || construction_area <= 0.0
        {
            return 0;
        }

        // `as` saturates, so very large areas clamp to u32::MAX.
        let units = (construction_area / rule.nominal_area).floor() as u32;
        match rule.max_units {
            Some(cap) => units.min(cap),
            None => units,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("failed to read unit size policy: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid unit size policy document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unit size policy references unknown typology '{0}'")]
    UnknownTypology(String),
    #[error("nominal area for {typology} must be a positive number, got {value}")]
    InvalidNominalArea { typology: Typology, value: f64 },
}
