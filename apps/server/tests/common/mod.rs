#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, Response},
    Router,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use goalpost_server::{api::app_router, build_state, config::Config, AppState};
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;

pub const WEBHOOK_TOKEN: &str = "test-kofi-token";
pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASS: &str = "pa:ss";

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    _db_dir: TempDir,
    pub static_dir: TempDir,
}

pub async fn build_test_app() -> TestApp {
    let db_dir = tempdir().unwrap();
    let static_dir = tempdir().unwrap();
    std::fs::write(static_dir.path().join("index.html"), "<html>index</html>").unwrap();
    std::fs::create_dir_all(static_dir.path().join("overlay")).unwrap();
    std::fs::write(
        static_dir.path().join("overlay").join("index.html"),
        "<html>overlay</html>",
    )
    .unwrap();

    let vars: HashMap<&str, String> = HashMap::from([
        (
            "GP_DB_PATH",
            db_dir.path().join("test.db").to_string_lossy().to_string(),
        ),
        (
            "GP_STATIC_DIR",
            static_dir.path().to_string_lossy().to_string(),
        ),
        ("GP_WEBHOOK_TOKEN", WEBHOOK_TOKEN.to_string()),
        ("GP_AUTH_USER", ADMIN_USER.to_string()),
        ("GP_AUTH_PASS", ADMIN_PASS.to_string()),
    ]);
    let config = Config::from_lookup(|key| vars.get(key).cloned()).unwrap();
    let state = build_state(&config).await.unwrap();
    let router = app_router(state.clone(), &config);

    TestApp {
        router,
        state,
        _db_dir: db_dir,
        static_dir,
    }
}

pub fn basic_auth(user: &str, pass: &str) -> String {
    format!("Basic {}", BASE64.encode(format!("{user}:{pass}")))
}

pub fn admin_auth() -> String {
    basic_auth(ADMIN_USER, ADMIN_PASS)
}

pub async fn send(app: &TestApp, request: Request<Body>) -> Response<Body> {
    app.router.clone().oneshot(request).await.unwrap()
}

pub async fn get_authed(app: &TestApp, uri: &str) -> Response<Body> {
    send(
        app,
        Request::builder()
            .uri(uri)
            .header(header::AUTHORIZATION, admin_auth())
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

pub async fn post_webhook(app: &TestApp, content_type: &str, body: String) -> Response<Body> {
    send(
        app,
        Request::builder()
            .method(Method::POST)
            .uri("/api/v1/webhook/kofi")
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap(),
    )
    .await
}

pub fn kofi_payload(token: &str, amount: &str, transaction_id: &str) -> serde_json::Value {
    serde_json::json!({
        "verification_token": token,
        "message_id": format!("msg-{transaction_id}"),
        "timestamp": "2025-06-01T12:00:00Z",
        "type": "Donation",
        "from_name": "Jo Example",
        "amount": amount,
        "currency": "USD",
        "kofi_transaction_id": transaction_id
    })
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn current_total(app: &TestApp) -> i64 {
    let json = body_json(get_authed(app, "/api/v1/goal").await).await;
    json["primaryAmountMinorUnits"].as_i64().unwrap()
}
