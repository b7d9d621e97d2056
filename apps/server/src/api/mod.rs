use std::{path::PathBuf, sync::Arc};

use crate::{
    auth::require_basic_auth,
    config::Config,
    main_lib::AppState,
    models::{Goal, GoalForm, SecondaryVisibilityRequest},
};
use axum::{http::HeaderValue, middleware, routing::get, Json, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::{ServeDir, ServeFile},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;

mod goals;
mod health;
mod webhook;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthz,
        health::readyz,
        goals::get_goal,
        goals::update_goal,
        goals::set_secondary_visibility,
        goals::stream_goal,
        webhook::receive_kofi
    ),
    components(schemas(Goal, GoalForm, SecondaryVisibilityRequest)),
    tags((name = "goalpost"))
)]
pub struct ApiDoc;

/// Builds the full application: API routes, OpenAPI document and the static
/// presentation files, all behind the access gate.
pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let cors = if config.cors_allow.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins = config
            .cors_allow
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(origin) => Some(origin),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin {}", o);
                    None
                }
            })
            .collect::<Vec<_>>();
        CorsLayer::new().allow_origin(origins)
    };

    let openapi = ApiDoc::openapi();

    let static_dir = PathBuf::from(&config.static_dir);
    let index_file = static_dir.join("index.html");
    let static_service = ServeDir::new(static_dir).fallback(ServeFile::new(index_file));

    let api = Router::new()
        .merge(health::router())
        .merge(goals::router())
        .merge(webhook::router());

    Router::new()
        .nest("/api/v1", api)
        .route("/openapi.json", get(|| async { Json(openapi) }))
        .fallback_service(static_service)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_basic_auth,
        ))
        .with_state(state)
        .layer(cors)
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http())
}
