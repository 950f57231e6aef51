//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub nodes_loaded: usize,
    pub pack_name: String,
    pub precomputed_loaded: usize,
    pub provider: String,
}

/// Liveness probe with a summary of what was loaded at startup
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let store = state.comparator.store();

    Json(HealthResponse {
        status: "healthy".to_string(),
        nodes_loaded: store.items.len(),
        pack_name: store.pack_name.clone(),
        precomputed_loaded: store.precomputed.len(),
        provider: state.comparator.provider().to_string(),
    })
}
