use std::{convert::Infallible, sync::Arc, time::Duration};

use crate::{
    error::{ApiError, ApiResult},
    events::goal_event_stream,
    main_lib::AppState,
    models::{Goal, GoalForm, SecondaryVisibilityRequest},
};
use axum::{
    body::Bytes,
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap},
    response::sse::{Event as SseEvent, KeepAlive, Sse},
    routing::{get, put},
    Json, Router,
};
use futures_core::stream::Stream;

#[utoipa::path(get, path = "/api/v1/goal", responses((status = 200, body = Goal)))]
pub async fn get_goal(State(state): State<Arc<AppState>>) -> ApiResult<Json<Goal>> {
    let goal = state.goal_service.get_goal()?;
    Ok(Json(Goal::from(goal)))
}

/// Admin form submission; replaces every field of the goal.
#[utoipa::path(
    post,
    path = "/api/v1/goal",
    request_body(content = GoalForm, content_type = "application/x-www-form-urlencoded"),
    responses((status = 200, body = Goal), (status = 400, description = "Invalid amount"))
)]
pub async fn update_goal(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<Json<Goal>> {
    let form: GoalForm = serde_urlencoded::from_bytes(&body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid form body: {e}")))?;
    let updated = state.goal_service.replace_goal(form.into_update()?).await?;
    Ok(Json(Goal::from(updated)))
}

#[utoipa::path(
    put,
    path = "/api/v1/goal/secondary-visibility",
    request_body = SecondaryVisibilityRequest,
    responses((status = 200, body = Goal))
)]
pub async fn set_secondary_visibility(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<Goal>> {
    let is_json = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_ascii_lowercase().contains("json"))
        .unwrap_or(false);
    let request: SecondaryVisibilityRequest = if is_json {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {e}")))?
    } else {
        serde_urlencoded::from_bytes(&body)
            .map_err(|e| ApiError::BadRequest(format!("Invalid form body: {e}")))?
    };
    let updated = state
        .goal_service
        .set_secondary_visibility(request.show())
        .await?;
    Ok(Json(Goal::from(updated)))
}

/// Live goal snapshots for the overlay: the current state first, then every change.
#[utoipa::path(
    get,
    path = "/api/v1/goal/stream",
    responses((status = 200, description = "text/event-stream of `goal` events"))
)]
pub async fn stream_goal(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Sse<impl Stream<Item = Result<SseEvent, Infallible>>>> {
    let snapshots = state.goal_service.subscribe()?;
    tracing::debug!(
        "Viewer subscribed ({} live)",
        state.notifier.subscriber_count()
    );

    Ok(Sse::new(goal_event_stream(snapshots)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    ))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/goal", get(get_goal).post(update_goal))
        .route("/goal/secondary-visibility", put(set_secondary_visibility))
        .route("/goal/stream", get(stream_goal))
}
