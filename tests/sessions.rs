//! End-to-end behavior of `/v1/sessions`, driven through the router.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::{Method, StatusCode};
use serde_json::Value;
use sessions_fixture::logger::{LogEntry, MemorySink};
use sessions_fixture::sessions::{self, GET_LOCATION_CODE, POST_LOCATION_CODE, PATH};
use sessions_fixture::{Phase, Request, Router};
use tokio::time::Instant;
use tracing::Level;
use uuid::Uuid;

fn app() -> (Router, Arc<MemorySink>) {
    let sink = MemorySink::new();
    (sessions::router(sessions::Options::default(), sink.clone()), sink)
}

fn get(cookie: Option<&str>) -> Request {
    let mut builder = http::Request::get(PATH).header("x-real-ip", "203.0.113.7");
    if let Some(cookie) = cookie {
        builder = builder.header("cookie", cookie);
    }
    Request::from_http(builder.body(Bytes::new()).unwrap(), None)
}

fn post(body: &str) -> Request {
    let http = http::Request::post(PATH)
        .header("content-type", "application/json")
        .body(Bytes::from(body.to_owned()))
        .unwrap();
    Request::from_http(http, Some("[::1]:40000".parse().unwrap()))
}

fn body(res: &sessions_fixture::Response) -> Value {
    serde_json::from_slice(res.body()).unwrap()
}

fn alarms(sink: &MemorySink) -> Vec<LogEntry> {
    sink.named("TooManyRequestsError")
        .into_iter()
        .filter(|e| e.event["context"]["type"] == sessions::TAG)
        .collect()
}

fn assert_snake_case_keys(value: &Value) {
    for key in value.as_object().unwrap().keys() {
        assert!(
            key.chars().all(|c| c.is_ascii_lowercase() || c == '_'),
            "key `{key}` is not snake_case"
        );
    }
}

// ── GET ───────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn get_without_cookie_is_forbidden() {
    let (app, sink) = app();

    let outcome = app.handle(get(None)).await;

    assert_eq!(outcome.phase(), Phase::Handled);
    let res = outcome.response();
    assert_eq!(res.status_code(), StatusCode::FORBIDDEN);
    let json = body(res);
    assert_eq!(json["error_location_code"], GET_LOCATION_CODE);
    assert_eq!(json["name"], "ForbiddenError");
    assert_eq!(json["status_code"], 403);
    assert_eq!(json["message"], "Usuário não pode executar esta operação.");
    assert_snake_case_keys(&json);
    assert_eq!(alarms(&sink).len(), 1);
}

#[tokio::test]
async fn get_with_well_formed_cookie_is_still_forbidden() {
    let (app, _sink) = app();

    let res = app.dispatch(get(Some("session_id=4f2c9a; theme=dark"))).await;

    assert_eq!(res.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(body(&res)["error_location_code"], GET_LOCATION_CODE);
}

#[tokio::test]
async fn get_with_empty_cookie_fails_validation() {
    let (app, sink) = app();

    let outcome = app.handle(get(Some("session_id="))).await;

    assert_eq!(outcome.phase(), Phase::Rejected);
    assert_eq!(outcome.response().status_code(), StatusCode::BAD_REQUEST);
    let json = body(outcome.response());
    assert_eq!(json["key"], "session_id");
    assert_eq!(json["type"], "string.empty");
    assert!(sink.named("ForbiddenError").is_empty());
    assert_eq!(alarms(&sink).len(), 1);
}

#[tokio::test]
async fn duplicate_cookie_keeps_the_first_value() {
    let (app, _sink) = app();

    let res = app.dispatch(get(Some("session_id=abc; session_id="))).await;

    assert_eq!(res.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(body(&res)["error_location_code"], GET_LOCATION_CODE);
}

#[tokio::test]
async fn quoted_empty_cookie_fails_validation() {
    let (app, sink) = app();

    let outcome = app.handle(get(Some(r#"session_id="""#))).await;

    assert_eq!(outcome.phase(), Phase::Rejected);
    assert_eq!(outcome.response().status_code(), StatusCode::BAD_REQUEST);
    let json = body(outcome.response());
    assert_eq!(json["key"], "session_id");
    assert_eq!(json["type"], "string.empty");
    assert!(sink.named("ForbiddenError").is_empty());
}

#[tokio::test]
async fn head_is_answered_like_get_without_a_body() {
    let (app, sink) = app();

    let head = http::Request::head(PATH).body(Bytes::new()).unwrap();
    let outcome = app.handle(Request::from_http(head, None)).await;

    assert_eq!(outcome.phase(), Phase::Handled);
    let res = outcome.response();
    assert_eq!(res.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(res.header("content-type"), Some("application/json"));
    assert!(res.body().is_empty());
    assert_eq!(sink.named("ForbiddenError").len(), 1);
    assert_eq!(alarms(&sink).len(), 1);
}

// ── POST ──────────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn valid_post_is_unauthorized_after_the_delay() {
    let (app, sink) = app();

    let start = Instant::now();
    let outcome = app.handle(post(r#"{"email":"a@b.c","password":"hunter22"}"#)).await;
    let elapsed = start.elapsed();

    assert_eq!(outcome.phase(), Phase::Handled);
    let res = outcome.response();
    assert_eq!(res.status_code(), StatusCode::UNAUTHORIZED);
    let json = body(res);
    assert_eq!(json["error_location_code"], POST_LOCATION_CODE);
    assert_eq!(json["name"], "UnauthorizedError");
    assert_snake_case_keys(&json);

    assert!(elapsed >= Duration::from_millis(100), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(1000), "{elapsed:?}");

    assert_eq!(alarms(&sink).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn post_missing_credentials_never_reaches_the_handler() {
    for payload in [
        r#"{"password":"hunter22"}"#,
        r#"{"email":"a@b.c"}"#,
        r#"{"email":"","password":"hunter22"}"#,
        "",
        "not json",
    ] {
        let (app, sink) = app();

        let start = Instant::now();
        let outcome = app.handle(post(payload)).await;

        assert_eq!(outcome.phase(), Phase::Rejected, "payload {payload:?}");
        assert_eq!(outcome.response().status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(body(outcome.response())["name"], "ValidationError");
        // The handler would have slept for at least 100 ms.
        assert!(start.elapsed() < Duration::from_millis(100));
        assert!(sink.named("UnauthorizedError").is_empty());
        assert_eq!(alarms(&sink).len(), 1);
    }
}

#[tokio::test(start_paused = true)]
async fn missing_email_is_reported_first() {
    let (app, _sink) = app();

    let res = app.dispatch(post("{}")).await;

    let json = body(&res);
    assert_eq!(json["key"], "email");
    assert_eq!(json["type"], "any.required");
}

// ── Logging ───────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn every_request_logs_exactly_one_alarm() {
    let (app, sink) = app();

    app.dispatch(get(None)).await;
    app.dispatch(get(Some("session_id="))).await;
    app.dispatch(post(r#"{"email":"a@b.c","password":"hunter22"}"#)).await;
    app.dispatch(post("{}")).await;

    let alarms = alarms(&sink);
    assert_eq!(alarms.len(), 4);
    assert!(alarms.iter().all(|e| e.level == Level::ERROR));
    assert!(alarms.iter().all(|e| e.event["status_code"] == 429));
    assert_snake_case_keys(&alarms[0].event);
    assert_snake_case_keys(&alarms[0].event["context"]);
}

#[tokio::test(start_paused = true)]
async fn alarm_context_describes_the_request_without_secrets() {
    let (app, sink) = app();

    app.dispatch(post(r#"{"email":"a@b.c","password":"hunter22"}"#)).await;

    let ctx = &alarms(&sink)[0].event["context"];
    assert_eq!(ctx["method"], "POST");
    assert_eq!(ctx["url"], PATH);
    assert_eq!(ctx["client_ip"], "127.0.0.1");
    assert_eq!(ctx["body"]["email"], "[Redacted]");
    assert_eq!(ctx["body"]["password"], "[Redacted]");
}

#[tokio::test]
async fn proxy_header_sets_client_ip() {
    let (app, sink) = app();

    app.dispatch(get(None)).await;

    assert_eq!(alarms(&sink)[0].event["context"]["client_ip"], "203.0.113.7");
}

// ── Correlation ids ───────────────────────────────────────────────────────────

#[tokio::test]
async fn correlation_ids_are_uuids_and_fresh() {
    let (app, _sink) = app();

    let a = body(&app.dispatch(get(None)).await);
    let b = body(&app.dispatch(get(None)).await);

    for json in [&a, &b] {
        Uuid::parse_str(json["request_id"].as_str().unwrap()).unwrap();
        Uuid::parse_str(json["error_id"].as_str().unwrap()).unwrap();
    }
    assert_ne!(a["request_id"], b["request_id"]);
    assert_ne!(a["error_id"], b["error_id"]);
}

// ── Fallbacks ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn other_methods_and_paths_fall_back() {
    let (app, sink) = app();

    let put = http::Request::builder().method(Method::PUT).uri(PATH).body(Bytes::new()).unwrap();
    let res = app.dispatch(Request::from_http(put, None)).await;
    assert_eq!(res.status_code(), StatusCode::METHOD_NOT_ALLOWED);

    let other = http::Request::get("/v1/users").body(Bytes::new()).unwrap();
    let res = app.dispatch(Request::from_http(other, None)).await;
    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);

    // Unrouted requests skip the layers, so no alarm.
    assert!(alarms(&sink).is_empty());
}
