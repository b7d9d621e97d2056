mod common;

use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use common::*;
use futures::StreamExt;

fn form_request(method: Method, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, admin_auth())
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn admin_form_replaces_the_goal() {
    let app = build_test_app().await;

    let response = send(
        &app,
        form_request(
            Method::POST,
            "/api/v1/goal",
            "amount=12.345&goalText=New+microphone&showSecondHalf=on&secondHalfAmount=250&displayImage=on",
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["primaryAmountMinorUnits"], 1235);
    assert_eq!(json["primaryAmount"], "12.35");
    assert_eq!(json["goalText"], "New microphone");
    assert_eq!(json["showSecondaryGoal"], true);
    assert_eq!(json["secondaryAmountMinorUnits"], 25_000);
    assert_eq!(json["displayImage"], true);

    let reread = body_json(get_authed(&app, "/api/v1/goal").await).await;
    assert_eq!(reread["goalText"], "New microphone");
    assert_eq!(reread["primaryAmountMinorUnits"], 1235);
}

#[tokio::test]
async fn invalid_form_amount_is_a_bad_request() {
    let app = build_test_app().await;

    let response = send(
        &app,
        form_request(Method::POST, "/api/v1/goal", "amount=lots&goalText=x"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], 400);
    assert_eq!(current_total(&app).await, 0);
}

#[tokio::test]
async fn secondary_visibility_only_touches_the_flag() {
    let app = build_test_app().await;
    send(
        &app,
        form_request(
            Method::POST,
            "/api/v1/goal",
            "amount=5&goalText=Desk&secondHalfAmount=10",
        ),
    )
    .await;

    let response = send(
        &app,
        Request::builder()
            .method(Method::PUT)
            .uri("/api/v1/goal/secondary-visibility")
            .header(header::AUTHORIZATION, admin_auth())
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"showSecondHalf": true}"#))
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["showSecondaryGoal"], true);
    assert_eq!(json["goalText"], "Desk");
    assert_eq!(json["primaryAmountMinorUnits"], 500);
    assert_eq!(json["secondaryAmountMinorUnits"], 1000);

    let hidden = send(
        &app,
        form_request(
            Method::PUT,
            "/api/v1/goal/secondary-visibility",
            "showSecondHalf=off",
        ),
    )
    .await;
    assert_eq!(body_json(hidden).await["showSecondaryGoal"], false);
}

async fn next_frame(stream: &mut axum::body::BodyDataStream) -> String {
    let chunk = tokio::time::timeout(Duration::from_secs(5), stream.next())
        .await
        .expect("timed out waiting for SSE frame")
        .expect("stream ended")
        .unwrap();
    String::from_utf8(chunk.to_vec()).unwrap()
}

#[tokio::test]
async fn stream_sends_current_snapshot_then_changes() {
    let app = build_test_app().await;
    app.state.goal_service.increment_goal(700).await.unwrap();

    let response = get_authed(&app, "/api/v1/goal/stream").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));

    let mut frames = response.into_body().into_data_stream();
    let first = next_frame(&mut frames).await;
    assert!(first.contains("event: goal"), "{first}");
    assert!(first.contains("\"primaryAmountMinorUnits\":700"), "{first}");

    let payload = kofi_payload(WEBHOOK_TOKEN, "2.00", "stream-txn");
    let response = post_webhook(&app, "application/json", payload.to_string()).await;
    assert_eq!(response.status(), StatusCode::OK);

    let second = next_frame(&mut frames).await;
    assert!(second.contains("event: goal"), "{second}");
    assert!(second.contains("\"primaryAmountMinorUnits\":900"), "{second}");
}

#[tokio::test]
async fn closed_stream_deregisters_the_viewer() {
    let app = build_test_app().await;

    let response = get_authed(&app, "/api/v1/goal/stream").await;
    let mut frames = response.into_body().into_data_stream();
    next_frame(&mut frames).await;
    assert_eq!(app.state.notifier.subscriber_count(), 1);

    drop(frames);
    assert_eq!(app.state.notifier.subscriber_count(), 0);
}
