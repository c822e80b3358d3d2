//! Inference orchestration facade
//!
//! Wires the pipeline for a single request: defaults and the system-prompt
//! source are applied first, then the response cache is consulted, then
//! the registry resolves an adapter whose call runs under the retry
//! executor. Comparison runs two of those pipelines concurrently.
//!
//! `infer` never returns an error for provider-side failures: every
//! outcome is an [`InferenceResult`] whose `error` field carries the
//! normalized failure. A comparison must be able to report "side A
//! failed, side B succeeded" as a plain value.

use crate::config::OrchestratorConfig;
use crate::core::catalog::ModelCatalog;
use crate::core::error::{ErrorKind, ProviderError};
use crate::core::providers::{InferenceOutput, ProviderRegistry};
use crate::core::response_cache::{ResponseCache, fingerprint};
use crate::core::retry::retry_with_backoff;
use crate::core::traits::{CredentialSource, NoDefaultPrompts, SystemPromptSource};
use crate::core::types::{
    CatalogEntry, InferenceError, InferenceRequest, InferenceResult, ModelId, Provider,
};
use crate::utils::net;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Construction failure; only the HTTP client can actually fail to build.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("failed to construct HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Process-wide orchestration state: the registry, both caches, and the
/// injected collaborator seams. Construct once at startup and share.
pub struct Orchestrator {
    config: OrchestratorConfig,
    registry: ProviderRegistry,
    catalog: ModelCatalog,
    responses: ResponseCache,
    credentials: Arc<dyn CredentialSource>,
    system_prompts: Arc<dyn SystemPromptSource>,
}

impl Orchestrator {
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::default()
    }

    /// Run one inference. Infallible for provider-side failures: the
    /// result's `error` field carries whatever went wrong.
    pub async fn infer(&self, model: &ModelId, request: &InferenceRequest) -> InferenceResult {
        let started = Instant::now();
        let resolved = self.resolve_request(model, request).await;

        let cacheable = resolved
            .temperature
            .is_some_and(|t| t <= self.config.determinism_threshold);
        let key = fingerprint(model, &resolved);
        if cacheable {
            if let Some(hit) = self.responses.get(&key) {
                info!(model = %model, "serving cached inference result");
                return hit;
            }
        }

        info!(model = %model, cacheable, "dispatching inference");
        match self.execute(model, &resolved).await {
            Ok(output) => {
                let result = InferenceResult::success(
                    model.clone(),
                    output.text,
                    output.usage,
                    started.elapsed().as_secs_f64(),
                );
                if cacheable {
                    self.responses.insert(key, &result);
                }
                info!(
                    model = %model,
                    elapsed_secs = result.elapsed_secs,
                    "inference completed"
                );
                result
            }
            Err(err) => {
                let error = normalize_failure(model, &err);
                InferenceResult::failure(model.clone(), error, started.elapsed().as_secs_f64())
            }
        }
    }

    /// Run two full inference pipelines concurrently and pair the
    /// results. `infer` already folds failures into its result, so one
    /// side's failure cannot cancel, delay, or corrupt the other.
    pub async fn compare(
        &self,
        left: (&ModelId, &InferenceRequest),
        right: (&ModelId, &InferenceRequest),
    ) -> (InferenceResult, InferenceResult) {
        info!(left = %left.0, right = %right.0, "running comparison inference");
        tokio::join!(self.infer(left.0, left.1), self.infer(right.0, right.1))
    }

    /// Catalog for one provider, or the union across every provider a
    /// credential exists for. Missing credentials mean "unavailable", not
    /// an error; individual listing failures are logged and skipped.
    pub async fn list_catalog(
        &self,
        provider: Option<Provider>,
    ) -> Result<Vec<CatalogEntry>, ProviderError> {
        match provider {
            Some(provider) => {
                let adapter = self
                    .registry
                    .resolve(provider, self.credentials.as_ref())
                    .await?;
                self.catalog.get(provider, adapter).await
            }
            None => {
                let mut lookups = Vec::new();
                for provider in Provider::ALL {
                    match self
                        .registry
                        .resolve(provider, self.credentials.as_ref())
                        .await
                    {
                        Ok(adapter) => lookups.push(async move {
                            (provider, self.catalog.get(provider, adapter).await)
                        }),
                        Err(_) => {
                            debug!(%provider, "no credential configured, skipping provider")
                        }
                    }
                }

                let mut all = Vec::new();
                for (provider, outcome) in join_all(lookups).await {
                    match outcome {
                        Ok(models) => all.extend(models),
                        Err(err) => {
                            error!(%provider, error = %err, "failed to load model catalog")
                        }
                    }
                }
                info!(count = all.len(), "assembled model catalog");
                Ok(all)
            }
        }
    }

    /// Drop cached catalogs; call after a credential change.
    pub async fn invalidate_catalog(&self, provider: Option<Provider>) {
        self.catalog.invalidate(provider).await;
    }

    /// Wipe cached responses, optionally only one provider's segment.
    pub fn clear_response_cache(&self, provider: Option<Provider>) {
        match provider {
            Some(provider) => self.responses.clear(Some(&format!("{provider}/"))),
            None => self.responses.clear(None),
        }
    }

    /// Fill defaults and the fallback system prompt so the adapter sees a
    /// fully resolved request.
    async fn resolve_request(
        &self,
        model: &ModelId,
        request: &InferenceRequest,
    ) -> InferenceRequest {
        let mut resolved = request.clone();
        if resolved.temperature.is_none() {
            resolved.temperature = Some(self.config.default_temperature);
        }
        if resolved.max_tokens.is_none() {
            resolved.max_tokens = Some(self.config.default_max_tokens);
        }
        if resolved.system_prompt.is_none() {
            resolved.system_prompt = self.system_prompts.default_system_prompt(model).await;
        }
        resolved
    }

    async fn execute(
        &self,
        model: &ModelId,
        request: &InferenceRequest,
    ) -> Result<InferenceOutput, ProviderError> {
        let adapter = self
            .registry
            .resolve(model.provider, self.credentials.as_ref())
            .await?;
        retry_with_backoff(&self.config.retry, || {
            let adapter = Arc::clone(&adapter);
            let name = model.name.clone();
            let request = request.clone();
            async move { adapter.infer(&name, &request).await }
        })
        .await
    }
}

/// Fold a provider error into the user-facing envelope error. Unclassified
/// failures get an incident id so a support report can be matched to logs
/// without exposing the vendor payload.
fn normalize_failure(model: &ModelId, err: &ProviderError) -> InferenceError {
    match err.kind() {
        ErrorKind::Unknown => {
            let incident: String = Uuid::new_v4().simple().to_string()[..8].to_string();
            error!(model = %model, incident, error = %err, "unclassified provider failure");
            InferenceError {
                kind: ErrorKind::Unknown,
                message: format!(
                    "An internal error occurred while processing the request (incident {incident})."
                ),
            }
        }
        kind => {
            warn!(model = %model, error = %err, "inference failed");
            InferenceError {
                kind,
                message: err.user_message(),
            }
        }
    }
}

/// Builder for [`Orchestrator`]; only a credential source is required.
#[derive(Default)]
pub struct OrchestratorBuilder {
    config: Option<OrchestratorConfig>,
    credentials: Option<Arc<dyn CredentialSource>>,
    system_prompts: Option<Arc<dyn SystemPromptSource>>,
    registry: Option<ProviderRegistry>,
}

impl OrchestratorBuilder {
    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_credentials(mut self, credentials: impl CredentialSource + 'static) -> Self {
        self.credentials = Some(Arc::new(credentials));
        self
    }

    pub fn with_system_prompts(mut self, source: impl SystemPromptSource + 'static) -> Self {
        self.system_prompts = Some(Arc::new(source));
        self
    }

    /// Inject a preconfigured registry (base-URL overrides, custom HTTP
    /// client). Otherwise one is built from the config's HTTP settings.
    pub fn with_registry(mut self, registry: ProviderRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn build(self) -> Result<Orchestrator, SetupError> {
        let config = self.config.unwrap_or_default();
        let registry = match self.registry {
            Some(registry) => registry,
            None => ProviderRegistry::new(net::http_client(config.http_timeout)?),
        };
        Ok(Orchestrator {
            catalog: ModelCatalog::new(config.models_cache_ttl),
            responses: ResponseCache::new(config.response_cache_ttl),
            registry,
            credentials: self
                .credentials
                .unwrap_or_else(|| Arc::new(crate::core::traits::EnvCredentials)),
            system_prompts: self
                .system_prompts
                .unwrap_or_else(|| Arc::new(NoDefaultPrompts)),
            config,
        })
    }
}
