use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

pub async fn get_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    // Only include non-secret runtime data.
    let v = json!({
        "ok": true,
        "version": env!("CARGO_PKG_VERSION"),
        "bind": state.config.server.bind,
        "reputation": {
            "configured": state.reputation_configured,
            "endpoint": state.config.reputation.endpoint,
            "timeout_secs": state.config.reputation.timeout_secs,
        },
        "scoring": {
            "medium_flag_count": state.config.scoring.medium_flag_count,
        },
    });

    (StatusCode::OK, Json(v)).into_response()
}
