use crate::envelope;
use crate::introspection;
use crate::state::AppState;
use crate::status;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{info, warn};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/status", get(status::get_status))
        .route("/v1/schema", get(get_schema))
        .route("/v1/phishing/score", post(score_message))
        .with_state(state)
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "ok": true })))
}

pub async fn get_schema() -> impl IntoResponse {
    (StatusCode::OK, Json(introspection::assessment_schema()))
}

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    /// Sealed message envelope, base64(nonce || ciphertext).
    pub message: String,
}

/// Open the inbound envelope, score the plaintext, seal the assessment.
///
/// Scoring itself never fails; only envelope handling can reject a request.
pub async fn score_message(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ScoreRequest>,
) -> impl IntoResponse {
    let plaintext = match envelope::open(&state.envelope_key, &req.message) {
        Ok(p) => p,
        Err(e) => {
            warn!("rejecting score request: {e}");
            return introspection::json_error(
                StatusCode::BAD_REQUEST,
                "invalid message envelope",
                json!({ "detail": e.to_string() }),
            )
            .into_response();
        }
    };

    let assessment = state.scorer.score(&plaintext).await;

    // Log a digest, never the content.
    let digest = hex::encode(Sha256::digest(plaintext.as_bytes()));
    let digest_prefix = &digest[..16];
    info!(
        message_sha256 = %digest_prefix,
        urls = assessment.found_urls.len(),
        risk = ?assessment.overall_risk,
        "scored message"
    );

    let body = match serde_json::to_string(&assessment) {
        Ok(b) => b,
        Err(e) => {
            return introspection::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to serialize assessment",
                json!({ "detail": e.to_string() }),
            )
            .into_response();
        }
    };

    match envelope::seal(&state.envelope_key, &body) {
        Ok(sealed) => (StatusCode::OK, Json(json!({ "encrypted": sealed }))).into_response(),
        Err(e) => introspection::json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "failed to seal response",
            json!({ "detail": e.to_string() }),
        )
        .into_response(),
    }
}
