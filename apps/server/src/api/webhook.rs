use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState};
use axum::{
    body::Bytes,
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    routing::post,
    Router,
};
use goalpost_core::webhook::IngestOutcome;

/// Ko-fi donation notification. Authenticated by the verification token in the
/// payload, not by the access gate.
#[utoipa::path(
    post,
    path = "/api/v1/webhook/kofi",
    request_body(content = String, description = "JSON payload, or form field `data` holding the JSON payload"),
    responses(
        (status = 200, description = "Applied or already seen"),
        (status = 400, description = "Malformed body or invalid amount"),
        (status = 401, description = "Verification token mismatch"),
        (status = 500, description = "Goal could not be updated; safe to retry")
    )
)]
pub async fn receive_kofi(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<StatusCode> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());
    match state.webhook_ingestor.ingest(&body, content_type).await? {
        IngestOutcome::Applied(goal) => {
            tracing::debug!("Goal total now {}", goal.primary_amount_minor_units);
        }
        IngestOutcome::Duplicate { event_id } => {
            tracing::info!("Acknowledged duplicate webhook {}", event_id);
        }
    }
    Ok(StatusCode::OK)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/webhook/kofi", post(receive_kofi))
}
