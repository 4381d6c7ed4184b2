//! Remote treatment catalog backed by the platform's REST API.
//!
//! The backend answers with an object keyed by treatment code
//! (`{"CN1": {...}, "CN2": {...}}`); a plain array of records is also
//! accepted. Each record is decoded on its own; records that fail to decode or
//! validate are skipped with a warning so a single bad entry does not take the
//! whole catalog down.

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use super::{CatalogError, TreatmentCatalog, TreatmentTable};
use crate::aprovechamiento::TreatmentParameters;

/// Maximum number of retry attempts after the initial request.
const MAX_RETRIES: u32 = 3;

/// Base delay between retries (doubles each attempt: 200ms, 400ms, 800ms).
const BASE_DELAY_MS: u64 = 200;

#[derive(Debug, Clone)]
pub struct HttpTreatmentCatalog {
    http: reqwest::Client,
    url: Url,
}

impl HttpTreatmentCatalog {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, CatalogError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(CatalogError::Client)?;
        Ok(Self::with_client(http, url))
    }

    pub fn with_client(http: reqwest::Client, url: Url) -> Self {
        Self { http, url }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl TreatmentCatalog for HttpTreatmentCatalog {
    async fn list_treatments(&self) -> Result<TreatmentTable, CatalogError> {
        let endpoint = format!("GET {}", self.url);

        let resp = retry_send(|| self.http.get(self.url.clone()).send())
            .await
            .map_err(|source| CatalogError::Transport {
                endpoint: endpoint.clone(),
                source,
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(CatalogError::Upstream {
                endpoint,
                status,
                body,
            });
        }

        let payload: CatalogPayload =
            resp.json()
                .await
                .map_err(|source| CatalogError::Decode {
                    endpoint: endpoint.clone(),
                    source,
                })?;

        Ok(TreatmentTable::new(payload.into_valid_records()))
    }
}

/// Records stay as raw JSON until each one is decoded on its own.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CatalogPayload {
    Keyed(HashMap<String, serde_json::Value>),
    List(Vec<serde_json::Value>),
}

impl CatalogPayload {
    fn into_valid_records(self) -> Vec<TreatmentParameters> {
        let entries: Vec<(Option<String>, serde_json::Value)> = match self {
            CatalogPayload::Keyed(entries) => entries
                .into_iter()
                .map(|(code, value)| (Some(code), value))
                .collect(),
            CatalogPayload::List(entries) => entries.into_iter().map(|value| (None, value)).collect(),
        };

        entries
            .into_iter()
            .filter_map(|(key, value)| {
                let mut parameters = match serde_json::from_value::<TreatmentParameters>(value) {
                    Ok(parameters) => parameters,
                    Err(err) => {
                        tracing::warn!(key = ?key, error = %err, "skipping undecodable treatment record");
                        return None;
                    }
                };
                if parameters.code.trim().is_empty() {
                    parameters.code = key.unwrap_or_default();
                }
                if parameters.code.trim().is_empty() {
                    tracing::warn!("skipping treatment record without a code");
                    return None;
                }
                match parameters.validate() {
                    Ok(()) => Some(parameters),
                    Err(issue) => {
                        tracing::warn!(code = %parameters.code, %issue, "skipping invalid treatment record");
                        None
                    }
                }
            })
            .collect()
    }
}

/// Send a request, retrying transport failures with exponential backoff.
///
/// Only [`reqwest::Error`] transport failures trigger a retry; status codes are
/// left to the caller.
async fn retry_send<F, Fut>(f: F) -> Result<reqwest::Response, reqwest::Error>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
{
    for attempt in 0..MAX_RETRIES {
        match f().await {
            Ok(resp) => return Ok(resp),
            Err(e) => {
                let delay = Duration::from_millis(BASE_DELAY_MS * 2u64.pow(attempt));
                tracing::warn!(
                    attempt = attempt + 1,
                    max_retries = MAX_RETRIES,
                    "treatment catalog request failed, retrying in {delay:?}: {e}"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
    f().await
}
