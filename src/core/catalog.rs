//! Model catalog cache
//!
//! Per-provider TTL cache over `list_models`, with three load-shedding
//! behaviors: fresh entries answer without touching the network,
//! concurrent refreshes for one provider collapse into a single vendor
//! call, and a failed refresh falls back to the previous (stale) data
//! when any exists. Staleness is preferable to unavailability here.

use crate::core::error::ProviderError;
use crate::core::providers::LLMProvider;
use crate::core::types::{CacheEntry, CatalogEntry, Provider};
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

type RefreshResult = Result<Vec<CatalogEntry>, ProviderError>;
type SharedRefresh = Shared<BoxFuture<'static, RefreshResult>>;

/// TTL cache of "what models does this provider offer".
pub struct ModelCatalog {
    ttl: Duration,
    entries: Arc<RwLock<HashMap<Provider, CacheEntry<Vec<CatalogEntry>>>>>,
    /// One shared refresh future per provider. Concurrent callers during
    /// an in-flight refresh await the same outcome instead of issuing
    /// duplicate vendor calls; the map entry removes itself on completion.
    inflight: Arc<Mutex<HashMap<Provider, SharedRefresh>>>,
}

impl ModelCatalog {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Arc::new(RwLock::new(HashMap::new())),
            inflight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Catalog for one provider: cached when fresh, refreshed through
    /// `adapter` otherwise.
    pub async fn get(
        &self,
        provider: Provider,
        adapter: Arc<dyn LLMProvider>,
    ) -> Result<Vec<CatalogEntry>, ProviderError> {
        if let Some(entry) = self.entries.read().await.get(&provider) {
            if !entry.is_expired(self.ttl) {
                debug!(%provider, "serving cached model catalog");
                return Ok(entry.value.clone());
            }
        }

        let refresh = self.join_refresh(provider, adapter).await;
        match refresh.await {
            Ok(models) => Ok(models),
            Err(err) => {
                // Any previous population, fresh or expired, beats an error.
                if let Some(entry) = self.entries.read().await.get(&provider) {
                    warn!(%provider, error = %err, "catalog refresh failed, serving stale data");
                    return Ok(entry.value.clone());
                }
                Err(err)
            }
        }
    }

    /// Drop cached entries. Must be called after a provider's credential
    /// changes so the next listing reflects the new key.
    pub async fn invalidate(&self, provider: Option<Provider>) {
        let mut entries = self.entries.write().await;
        let mut inflight = self.inflight.lock().await;
        match provider {
            Some(p) => {
                entries.remove(&p);
                inflight.remove(&p);
                info!(provider = %p, "model catalog invalidated");
            }
            None => {
                entries.clear();
                inflight.clear();
                info!("model catalog invalidated for all providers");
            }
        }
    }

    /// Join the provider's in-flight refresh or start one.
    async fn join_refresh(&self, provider: Provider, adapter: Arc<dyn LLMProvider>) -> SharedRefresh {
        let mut inflight = self.inflight.lock().await;
        if let Some(existing) = inflight.get(&provider) {
            debug!(%provider, "joining in-flight catalog refresh");
            return existing.clone();
        }

        let entries = Arc::clone(&self.entries);
        let pending = Arc::clone(&self.inflight);
        let refresh = async move {
            debug!(%provider, "refreshing model catalog");
            let result = adapter.list_models().await;
            if let Ok(models) = &result {
                entries
                    .write()
                    .await
                    .insert(provider, CacheEntry::new(models.clone()));
            }
            pending.lock().await.remove(&provider);
            result
        }
        .boxed()
        .shared();
        inflight.insert(provider, refresh.clone());
        refresh
    }
}
