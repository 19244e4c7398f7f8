use axum::Json;
use axum::extract::State;
use axum::response::Response;
use serde_json::{Value, json};

use crate::api::response::bid_response;
use crate::api::state::AppState;
use crate::core::error::CotacaoError;

/// `GET /cotacao`
pub async fn get_cotacao(State(state): State<AppState>) -> Result<Response, CotacaoError> {
    let quote = state.orchestrator.handle().await?;
    Ok(bid_response(&quote))
}

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
