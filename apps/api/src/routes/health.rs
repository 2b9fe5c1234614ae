use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Service version plus which storage backend and AI mode are active.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "secretary-api",
        "storage": state.storage.backend(),
        "llm": state.llm.is_some(),
        "decomposer": state.decomposer.backend(),
    }))
}
