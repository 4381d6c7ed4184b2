//! Treatment catalog: the keyed source of POT normative parameters.
//!
//! The engine never talks to a catalog directly. The service resolves a code
//! through a [`TreatmentCatalog`] and hands the parameters over, so tests can
//! swap the remote backend for a static table.

mod cache;
mod file;
mod http;
mod memory;

pub use cache::CachedTreatmentCatalog;
pub use file::CsvTreatmentCatalog;
pub use http::HttpTreatmentCatalog;
pub use memory::StaticTreatmentCatalog;

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::aprovechamiento::{ParameterIssue, TreatmentParameters};
use crate::config::{CatalogConfig, CatalogSource};

/// Source of treatment parameters keyed by treatment code.
pub trait TreatmentCatalog: Send + Sync {
    fn list_treatments(&self)
        -> impl Future<Output = Result<TreatmentTable, CatalogError>> + Send;

    /// Resolve a single code; `Ok(None)` means the code is not in the catalog.
    fn lookup(
        &self,
        code: &str,
    ) -> impl Future<Output = Result<Option<TreatmentParameters>, CatalogError>> + Send {
        async move {
            let table = self.list_treatments().await?;
            Ok(table.get(code).cloned())
        }
    }
}

/// Snapshot of the catalog at the time it was read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreatmentTable {
    fetched_at: DateTime<Utc>,
    treatments: HashMap<String, TreatmentParameters>,
}

impl TreatmentTable {
    pub fn new(treatments: impl IntoIterator<Item = TreatmentParameters>) -> Self {
        Self::with_fetched_at(treatments, Utc::now())
    }

    pub fn with_fetched_at(
        treatments: impl IntoIterator<Item = TreatmentParameters>,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        let mut table = HashMap::new();
        for parameters in treatments {
            if let Some(previous) = table.insert(parameters.code.clone(), parameters) {
                tracing::warn!(code = %previous.code, "duplicate treatment code, keeping the last record");
            }
        }
        Self {
            fetched_at,
            treatments: table,
        }
    }

    /// Exact match first, then a case-insensitive match on the trimmed code.
    pub fn get(&self, code: &str) -> Option<&TreatmentParameters> {
        if let Some(parameters) = self.treatments.get(code) {
            return Some(parameters);
        }

        let trimmed = code.trim();
        if trimmed.is_empty() {
            return None;
        }
        self.treatments
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(trimmed))
            .map(|(_, parameters)| parameters)
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn len(&self) -> usize {
        self.treatments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.treatments.is_empty()
    }

    /// Treatments ordered by code for stable listings.
    pub fn sorted(&self) -> Vec<&TreatmentParameters> {
        let mut entries: Vec<_> = self.treatments.values().collect();
        entries.sort_by(|a, b| a.code.cmp(&b.code));
        entries
    }
}

/// Infrastructure failure while reading the catalog.
///
/// A code that is simply absent is not an error; see [`TreatmentCatalog::lookup`].
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("treatment catalog unreachable at {endpoint}: {source}")]
    Transport {
        endpoint: String,
        source: reqwest::Error,
    },
    #[error("treatment catalog {endpoint} returned {status}: {body}")]
    Upstream {
        endpoint: String,
        status: u16,
        body: String,
    },
    #[error("failed to decode treatment catalog from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        source: reqwest::Error,
    },
    #[error("failed to read treatment catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid treatment catalog CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("treatment {code} is invalid: {issue}")]
    InvalidRecord { code: String, issue: ParameterIssue },
    #[error("treatment {code} appears more than once")]
    DuplicateCode { code: String },
    #[error("failed to build treatment catalog client: {0}")]
    Client(reqwest::Error),
}

/// Catalog selected from configuration at startup.
pub enum CatalogBackend {
    Static(StaticTreatmentCatalog),
    Remote(CachedTreatmentCatalog<HttpTreatmentCatalog>),
}

impl CatalogBackend {
    pub fn from_config(config: &CatalogConfig) -> Result<Self, CatalogError> {
        match &config.source {
            CatalogSource::Builtin => Ok(Self::Static(StaticTreatmentCatalog::reference())),
            CatalogSource::File(path) => {
                let table = CsvTreatmentCatalog::from_path(path)?;
                Ok(Self::Static(StaticTreatmentCatalog::from_table(table)))
            }
            CatalogSource::Remote(url) => {
                let client =
                    HttpTreatmentCatalog::new(url.clone(), Duration::from_secs(config.timeout_secs))?;
                let ttl = Duration::from_secs(config.cache_ttl_secs);
                Ok(Self::Remote(CachedTreatmentCatalog::new(client, ttl)))
            }
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            CatalogBackend::Static(_) => "static",
            CatalogBackend::Remote(_) => "remote",
        }
    }
}

impl TreatmentCatalog for CatalogBackend {
    async fn list_treatments(&self) -> Result<TreatmentTable, CatalogError> {
        match self {
            CatalogBackend::Static(catalog) => catalog.list_treatments().await,
            CatalogBackend::Remote(catalog) => catalog.list_treatments().await,
        }
    }
}
