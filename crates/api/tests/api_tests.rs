use std::sync::Arc;

use axum::{
    body::Body,
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_ORIGIN,
            ACCESS_CONTROL_REQUEST_HEADERS, ACCESS_CONTROL_REQUEST_METHOD, CONTENT_TYPE, ORIGIN,
        },
        HeaderValue, Method, Request, Response, StatusCode,
    },
    Router,
};
use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use http_body_util::BodyExt;
use lobby_api::{build_router, AppState};
use lobby_config::DatabaseConfig;
use lobby_database::initialize_database;
use lobby_room::{ChatRoom, ManualClock};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

type TestResult<T = ()> = anyhow::Result<T>;

struct TestContext {
    _temp_dir: TempDir,
    clock: Arc<ManualClock>,
    room: ChatRoom,
}

impl TestContext {
    async fn new() -> TestResult<Self> {
        let temp_dir = TempDir::new()?;
        let config = DatabaseConfig {
            url: format!("sqlite://{}", temp_dir.path().join("api.sqlite").display()),
            max_connections: 4,
        };
        let pool = initialize_database(&config).await?;
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 6, 1, 14, 0, 0).unwrap(),
        ));
        let room = ChatRoom::with_sqlite(pool, clock.clone());

        Ok(Self {
            _temp_dir: temp_dir,
            clock,
            room,
        })
    }

    fn router(&self) -> Router {
        build_router(AppState::new(self.room.clone()))
    }

    async fn send(&self, request: Request<Body>) -> TestResult<Response<Body>> {
        Ok(self.router().oneshot(request).await?)
    }

    async fn join(&self, name: &str) -> TestResult<StatusCode> {
        let response = self
            .send(json_request(Method::POST, "/participants", None, json!({ "name": name }))?)
            .await?;
        Ok(response.status())
    }
}

fn json_request(
    method: Method,
    uri: &str,
    user: Option<&str>,
    body: Value,
) -> TestResult<Request<Body>> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(user) = user {
        builder = builder.header("user", HeaderValue::from_bytes(user.as_bytes())?);
    }
    Ok(builder.body(Body::from(serde_json::to_vec(&body)?))?)
}

fn empty_request(method: Method, uri: &str, user: Option<&str>) -> TestResult<Request<Body>> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("user", HeaderValue::from_bytes(user.as_bytes())?);
    }
    Ok(builder.body(Body::empty())?)
}

async fn body_json(response: Response<Body>) -> TestResult<Value> {
    let body = response.into_body().collect().await?.to_bytes();
    Ok(serde_json::from_slice(&body)?)
}

#[tokio::test]
async fn health_check_reports_ok() -> TestResult {
    let ctx = TestContext::new().await?;
    let response = ctx.send(empty_request(Method::GET, "/health", None)?).await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await?["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn openapi_document_is_served() -> TestResult {
    let ctx = TestContext::new().await?;
    let response = ctx
        .send(empty_request(Method::GET, "/docs/openapi.json", None)?)
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let doc = body_json(response).await?;
    assert!(doc["paths"]["/participants"].is_object());
    assert!(doc["paths"]["/messages/{id}"]["delete"].is_object());
    Ok(())
}

#[tokio::test]
async fn join_then_duplicate_conflicts() -> TestResult {
    let ctx = TestContext::new().await?;

    assert_eq!(ctx.join("Ann").await?, StatusCode::CREATED);
    assert_eq!(ctx.join("Ann").await?, StatusCode::CONFLICT);

    let response = ctx.send(empty_request(Method::GET, "/participants", None)?).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let participants = body_json(response).await?;
    assert_eq!(participants.as_array().map(Vec::len), Some(1));
    assert_eq!(participants[0]["name"], "Ann");
    assert!(participants[0]["last_seen"].as_str().is_some());
    Ok(())
}

#[tokio::test]
async fn join_rejects_invalid_bodies() -> TestResult {
    let ctx = TestContext::new().await?;

    let missing = ctx
        .send(json_request(Method::POST, "/participants", None, json!({}))?)
        .await?;
    assert_eq!(missing.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = body_json(missing).await?;
    assert_eq!(payload["details"][0], "name is required");

    let malformed = ctx
        .send(
            Request::builder()
                .method(Method::POST)
                .uri("/participants")
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))?,
        )
        .await?;
    assert_eq!(malformed.status(), StatusCode::UNPROCESSABLE_ENTITY);
    Ok(())
}

#[tokio::test]
async fn post_then_read_latest_message() -> TestResult {
    let ctx = TestContext::new().await?;
    ctx.join("Ann").await?;

    let created = ctx
        .send(json_request(
            Method::POST,
            "/messages",
            Some("Ann"),
            json!({ "to": "everyone", "text": "hi", "type": "message" }),
        )?)
        .await?;
    assert_eq!(created.status(), StatusCode::CREATED);
    let created = body_json(created).await?;
    assert_eq!(created["type"], "message");
    assert_eq!(created["time"], "14:00:00");

    let response = ctx
        .send(empty_request(Method::GET, "/messages?limit=1", None)?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let messages = body_json(response).await?;
    assert_eq!(messages.as_array().map(Vec::len), Some(1));
    assert_eq!(messages[0]["id"], created["id"]);
    assert_eq!(messages[0]["text"], "hi");
    Ok(())
}

#[tokio::test]
async fn post_message_validation_and_unknown_sender() -> TestResult {
    let ctx = TestContext::new().await?;
    ctx.join("Ann").await?;

    let invalid = ctx
        .send(json_request(
            Method::POST,
            "/messages",
            Some("Ann"),
            json!({ "to": "everyone", "type": "status" }),
        )?)
        .await?;
    assert_eq!(invalid.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let details = body_json(invalid).await?["details"].clone();
    assert_eq!(details.as_array().map(Vec::len), Some(2));

    let unknown = ctx
        .send(json_request(
            Method::POST,
            "/messages",
            Some("Ghost"),
            json!({ "to": "everyone", "text": "boo", "type": "message" }),
        )?)
        .await?;
    assert_eq!(unknown.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let anonymous = ctx
        .send(json_request(
            Method::POST,
            "/messages",
            None,
            json!({ "to": "everyone", "text": "boo", "type": "message" }),
        )?)
        .await?;
    assert_eq!(anonymous.status(), StatusCode::UNPROCESSABLE_ENTITY);
    Ok(())
}

#[tokio::test]
async fn private_messages_are_filtered_per_reader() -> TestResult {
    let ctx = TestContext::new().await?;
    for name in ["Ann", "Bob", "Cid"] {
        ctx.join(name).await?;
    }
    ctx.send(json_request(
        Method::POST,
        "/messages",
        Some("Ann"),
        json!({ "to": "Bob", "text": "psst", "type": "private_message" }),
    )?)
    .await?;

    let readers = [
        (Some("Ann"), true),
        (Some("Bob"), true),
        (Some("Cid"), false),
        (None, false),
    ];
    for (reader, sees) in readers {
        let response = ctx.send(empty_request(Method::GET, "/messages", reader)?).await?;
        let messages = body_json(response).await?;
        let found = messages
            .as_array()
            .into_iter()
            .flatten()
            .any(|message| message["text"] == "psst");
        assert_eq!(found, sees, "reader {reader:?}");
    }
    Ok(())
}

#[tokio::test]
async fn non_ascii_participant_is_recognised_by_user_header() -> TestResult {
    let ctx = TestContext::new().await?;
    assert_eq!(ctx.join("João").await?, StatusCode::CREATED);

    let heartbeat = ctx
        .send(empty_request(Method::POST, "/status", Some("João"))?)
        .await?;
    assert_eq!(heartbeat.status(), StatusCode::OK);

    let posted = ctx
        .send(json_request(
            Method::POST,
            "/messages",
            Some("João"),
            json!({ "to": "everyone", "text": "olá", "type": "message" }),
        )?)
        .await?;
    assert_eq!(posted.status(), StatusCode::CREATED);
    assert_eq!(body_json(posted).await?["from"], "João");
    Ok(())
}

#[tokio::test]
async fn non_numeric_limit_is_rejected() -> TestResult {
    let ctx = TestContext::new().await?;
    let response = ctx
        .send(empty_request(Method::GET, "/messages?limit=abc", None)?)
        .await?;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    Ok(())
}

#[tokio::test]
async fn delete_message_status_codes() -> TestResult {
    let ctx = TestContext::new().await?;
    ctx.join("Ann").await?;
    let created = ctx
        .send(json_request(
            Method::POST,
            "/messages",
            Some("Ann"),
            json!({ "to": "everyone", "text": "oops", "type": "message" }),
        )?)
        .await?;
    let id = body_json(created).await?["id"].as_i64().unwrap_or_default();
    let uri = format!("/messages/{id}");

    let unknown_user = ctx.send(empty_request(Method::DELETE, &uri, Some("Ghost"))?).await?;
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);

    let missing_user = ctx.send(empty_request(Method::DELETE, &uri, None)?).await?;
    assert_eq!(missing_user.status(), StatusCode::UNAUTHORIZED);

    let deleted = ctx.send(empty_request(Method::DELETE, &uri, Some("Ann"))?).await?;
    assert_eq!(deleted.status(), StatusCode::OK);

    let again = ctx.send(empty_request(Method::DELETE, &uri, Some("Ann"))?).await?;
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn heartbeat_keeps_participant_through_sweep() -> TestResult {
    let ctx = TestContext::new().await?;
    ctx.join("Ann").await?;
    ctx.join("Bob").await?;

    ctx.clock.advance(ChronoDuration::seconds(8));
    let ok = ctx.send(empty_request(Method::POST, "/status", Some("Bob"))?).await?;
    assert_eq!(ok.status(), StatusCode::OK);

    let unknown = ctx.send(empty_request(Method::POST, "/status", Some("Ghost"))?).await?;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);

    ctx.clock.advance(ChronoDuration::seconds(8));
    let report = ctx
        .room
        .sweeper(std::time::Duration::from_secs(10))
        .sweep_once()
        .await?;
    assert_eq!(report.evicted, vec!["Ann".to_string()]);

    let response = ctx.send(empty_request(Method::GET, "/messages", None)?).await?;
    let messages = body_json(response).await?;
    let last = messages
        .as_array()
        .and_then(|messages| messages.last())
        .cloned()
        .unwrap_or_default();
    assert_eq!(last["from"], "Ann");
    assert_eq!(last["text"], "left the room");
    assert_eq!(last["type"], "status");
    Ok(())
}

#[tokio::test]
async fn cors_preflight_allows_user_header() -> TestResult {
    let ctx = TestContext::new().await?;
    let response = ctx
        .send(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/messages")
                .header(ORIGIN, "https://example.com")
                .header(ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .header(ACCESS_CONTROL_REQUEST_HEADERS, "user, content-type")
                .body(Body::empty())?,
        )
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|value| value.to_str().ok()),
        Some("*")
    );
    let allowed = response
        .headers()
        .get(ACCESS_CONTROL_ALLOW_HEADERS)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();
    assert!(allowed.contains("user"));
    Ok(())
}
