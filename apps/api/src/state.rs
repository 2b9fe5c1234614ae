use std::sync::Arc;

use crate::llm_client::LlmClient;
use crate::storage::Storage;
use crate::tasks::decomposer::{KeywordDecomposer, LlmDecomposer, TaskDecomposer};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Typed key/value persistence; the backend is chosen by `STORAGE_BACKEND`.
    pub storage: Storage,
    /// `None` when no API key is configured: every AI operation uses its fallback.
    pub llm: Option<LlmClient>,
    /// Pluggable decomposer. LlmDecomposer when a key is set, KeywordDecomposer otherwise.
    pub decomposer: Arc<dyn TaskDecomposer>,
}

impl AppState {
    pub fn new(storage: Storage, llm: Option<LlmClient>) -> Self {
        let decomposer: Arc<dyn TaskDecomposer> = match &llm {
            Some(client) => Arc::new(LlmDecomposer(client.clone())),
            None => Arc::new(KeywordDecomposer),
        };
        Self {
            storage,
            llm,
            decomposer,
        }
    }
}

#[cfg(test)]
impl AppState {
    pub fn in_memory() -> Self {
        Self::new(Storage::in_memory(), None)
    }
}
