//! Health proxy endpoint, relaying the model service's own health check.

use axum::extract::State;
use axum::Json;
use serde_json::json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::model_client::UpstreamHealth;

/// `GET /api/health` — forward to the model service health path.
///
/// Relays the upstream body (`upstream` when JSON, `upstream_text`
/// otherwise); an unreachable or unhealthy upstream is a 502.
pub async fn check(State(ctx): State<ApiContext>) -> Result<Json<serde_json::Value>, ApiError> {
    match ctx.model.health().await {
        Ok(UpstreamHealth::Json(value)) => Ok(Json(json!({ "upstream": value }))),
        Ok(UpstreamHealth::Text(text)) => Ok(Json(json!({ "upstream_text": text }))),
        Err(e) => {
            tracing::warn!(error = %e, "health proxy failed");
            Err(ApiError::Upstream(e.to_string()))
        }
    }
}
