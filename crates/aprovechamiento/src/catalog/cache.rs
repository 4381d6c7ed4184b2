use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use super::{CatalogError, TreatmentCatalog, TreatmentTable};

/// Keeps the last successful listing of an inner catalog for `ttl`.
///
/// Failures are never cached. A zero TTL disables caching.
pub struct CachedTreatmentCatalog<C> {
    inner: C,
    ttl: Duration,
    snapshot: RwLock<Option<(Instant, TreatmentTable)>>,
}

impl<C> CachedTreatmentCatalog<C> {
    pub fn new(inner: C, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            snapshot: RwLock::new(None),
        }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub async fn invalidate(&self) {
        self.snapshot.write().await.take();
    }
}

impl<C: TreatmentCatalog> TreatmentCatalog for CachedTreatmentCatalog<C> {
    async fn list_treatments(&self) -> Result<TreatmentTable, CatalogError> {
        if self.ttl.is_zero() {
            return self.inner.list_treatments().await;
        }

        if let Some((stored_at, table)) = self.snapshot.read().await.as_ref() {
            if stored_at.elapsed() < self.ttl {
                return Ok(table.clone());
            }
        }

        let table = self.inner.list_treatments().await?;
        tracing::debug!(treatments = table.len(), "treatment catalog refreshed");
        *self.snapshot.write().await = Some((Instant::now(), table.clone()));
        Ok(table)
    }
}
