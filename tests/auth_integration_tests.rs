//! Integration Tests for token validation
//!
//! Runs loopback mock upstreams and drives them through the real reqwest
//! transport: call counting, cache expiry, timeouts, non-JSON errors.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use orcidlink_auth::client::{ReqwestTransport, Transport};
use orcidlink_auth::clients::{OrcidOAuthClient, OrcidOAuthParams};
use orcidlink_auth::{
    create_router, AppState, AuthError, AuthValidator, AuthValidatorParams, ErrorKind,
};
use serde_json::{json, Value};
use tower::ServiceExt;

const TOKEN_PATH: &str = "/services/auth/api/V2/token";

// == Mock Upstreams ==

#[derive(Clone, Default)]
struct Hits(Arc<AtomicUsize>);

impl Hits {
    fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

fn auth_error(status: StatusCode, appcode: i64, apperror: &str) -> Response {
    let body = json!({
        "error": {
            "httpcode": status.as_u16(),
            "httpstatus": status.canonical_reason(),
            "appcode": appcode,
            "apperror": apperror,
            "message": format!("{appcode} {apperror}"),
            "callid": "1234",
            "time": 1_700_000_000_000u64
        }
    });
    (status, Json(body)).into_response()
}

async fn token_handler(State(hits): State<Hits>, headers: HeaderMap) -> Response {
    hits.0.fetch_add(1, Ordering::SeqCst);
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    match token {
        "" => auth_error(StatusCode::BAD_REQUEST, 10010, "No authentication token"),
        "foo" | "bar" => Json(json!({
            "type": "Login",
            "id": "67bb1a3c",
            "expires": 1_900_000_000_000u64,
            "created": 1_700_000_000_000u64,
            "name": null,
            "user": token,
            "custom": {},
            "cachefor": 300000
        }))
        .into_response(),
        "internal_server_error" => {
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
        "slow" => {
            tokio::time::sleep(Duration::from_millis(500)).await;
            Json(json!({"user": "slow"})).into_response()
        }
        _ => auth_error(StatusCode::UNAUTHORIZED, 10020, "Invalid Token"),
    }
}

async fn revoke_handler(body: String) -> Response {
    let token = body
        .split('&')
        .find_map(|pair| pair.strip_prefix("token="))
        .unwrap_or_default()
        .to_string();
    let body = json!({
        "error": "invalid_token",
        "error_description": format!("Invalid access token: {token}")
    });
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

async fn spawn_upstream(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn spawn_identity_service() -> (String, Hits) {
    let hits = Hits::default();
    let app = Router::new()
        .route(TOKEN_PATH, get(token_handler))
        .with_state(hits.clone());
    let addr = spawn_upstream(app).await;
    (format!("http://{addr}{TOKEN_PATH}"), hits)
}

fn transport(timeout: Duration) -> Arc<dyn Transport> {
    Arc::new(ReqwestTransport::new(timeout).unwrap())
}

fn validator(auth_url: &str, lifetime: Duration, timeout: Duration) -> AuthValidator {
    AuthValidator::new(
        AuthValidatorParams::new(auth_url, 3, lifetime),
        transport(timeout),
    )
    .unwrap()
}

// == Validation Tests ==

#[tokio::test]
async fn test_get_username_then_cached() {
    let (url, hits) = spawn_identity_service().await;
    let validator = validator(&url, Duration::from_secs(3), Duration::from_secs(5));

    assert_eq!(validator.get_username("foo").await.unwrap(), "foo");
    assert_eq!(hits.count(), 1);

    assert_eq!(validator.get_username("foo").await.unwrap(), "foo");
    assert_eq!(hits.count(), 1, "second lookup must not reach the identity service");
}

#[tokio::test]
async fn test_identity_record_fields() {
    let (url, _) = spawn_identity_service().await;
    let validator = validator(&url, Duration::from_secs(3), Duration::from_secs(5));

    let identity = validator.get_identity("bar").await.unwrap();

    assert_eq!(identity.user(), "bar");
    assert_eq!(identity.name(), None);
    assert_eq!(identity.token_type(), Some("Login"));
    assert_eq!(
        identity.created().map(|t| t.timestamp_millis()),
        Some(1_700_000_000_000)
    );
}

#[tokio::test]
async fn test_expiry_causes_exactly_one_new_call() {
    let (url, hits) = spawn_identity_service().await;
    let validator = validator(&url, Duration::from_millis(200), Duration::from_secs(5));

    validator.get_identity("foo").await.unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;
    validator.get_identity("foo").await.unwrap();
    validator.get_identity("foo").await.unwrap();

    assert_eq!(hits.count(), 2);
}

#[tokio::test]
async fn test_invalid_token() {
    let (url, hits) = spawn_identity_service().await;
    let validator = validator(&url, Duration::from_secs(3), Duration::from_secs(5));

    let err = validator.get_username("x").await.unwrap_err();
    let AuthError::InvalidToken(typed) = err else {
        panic!("expected InvalidToken");
    };
    assert_eq!(typed.kind, ErrorKind::InvalidToken);
    assert_eq!(typed.message, "10020 Invalid Token");

    validator.get_username("x").await.unwrap_err();
    assert_eq!(hits.count(), 2, "failures are never cached");
}

#[tokio::test]
async fn test_text_error_is_upstream() {
    let (url, _) = spawn_identity_service().await;
    let validator = validator(&url, Duration::from_secs(3), Duration::from_secs(5));

    let err = validator
        .get_username("internal_server_error")
        .await
        .unwrap_err();

    let AuthError::Upstream(typed) = err else {
        panic!("expected Upstream");
    };
    assert_eq!(typed.kind, ErrorKind::UpstreamError);
    assert_eq!(typed.original_status(), Some(500));
    assert_eq!(typed.original_text(), Some("Internal Server Error"));
}

#[tokio::test]
async fn test_timeout_is_connection_failure() {
    let (url, _) = spawn_identity_service().await;
    let validator = validator(&url, Duration::from_secs(3), Duration::from_millis(100));

    let err = validator.get_username("slow").await.unwrap_err();

    assert!(!err.is_invalid_token());
    let typed = err.typed().unwrap();
    assert_eq!(typed.kind, ErrorKind::ConnectionFailed);
    assert_eq!(typed.original_status(), None);
}

#[tokio::test]
async fn test_control_character_token_is_invalid_not_unreachable() {
    let (url, hits) = spawn_identity_service().await;
    let validator = validator(&url, Duration::from_secs(3), Duration::from_secs(5));

    let err = validator.get_identity("bad\ntoken").await.unwrap_err();

    let AuthError::InvalidToken(typed) = err else {
        panic!("expected InvalidToken");
    };
    assert_eq!(typed.kind, ErrorKind::InvalidToken);
    assert_eq!(hits.count(), 0);
}

#[tokio::test]
async fn test_unreachable_identity_service() {
    // Bind then drop to get a port nothing listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let validator = validator(
        &format!("http://{addr}{TOKEN_PATH}"),
        Duration::from_secs(3),
        Duration::from_secs(2),
    );
    let err = validator.get_username("foo").await.unwrap_err();

    assert!(matches!(err, AuthError::Upstream(ref t) if t.kind == ErrorKind::ConnectionFailed));
}

// == Redaction ==

#[tokio::test]
async fn test_revoke_unauthorized_strips_description() {
    let app = Router::new().route("/oauth/revoke", post(revoke_handler));
    let addr = spawn_upstream(app).await;

    let client = OrcidOAuthClient::new(
        OrcidOAuthParams {
            base_url: Some(format!("http://{addr}/oauth")),
            client_id: Some("client-id".into()),
            client_secret: Some("client-secret".into()),
        },
        transport(Duration::from_secs(5)),
    )
    .unwrap();

    let err = client.revoke_token("secret-access-token").await.unwrap_err();

    assert_eq!(err.http_status, 400);
    assert_eq!(err.source(), Some("revoke_link"));
    assert_eq!(err.original_status(), Some(401));
    let original = err.original_json().unwrap();
    assert_eq!(original["error"], "invalid_token");
    assert!(original.get("error_description").is_none());
    assert!(!serde_json::to_string(&err).unwrap().contains("secret-access-token"));
}

// == Router End To End ==

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_whoami_and_status_through_router() {
    let (url, hits) = spawn_identity_service().await;
    let app = create_router(AppState::new(validator(
        &url,
        Duration::from_secs(3),
        Duration::from_secs(5),
    )));

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/whoami")
                    .header("Authorization", "foo")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_to_json(response.into_body()).await;
        assert_eq!(json["username"], "foo");
    }
    assert_eq!(hits.count(), 1);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["token_cache"]["hits"].as_u64(), Some(1));
    assert_eq!(json["token_cache"]["misses"].as_u64(), Some(1));
    assert_eq!(json["token_cache"]["total_entries"].as_u64(), Some(1));
}

#[tokio::test]
async fn test_whoami_invalid_token_through_router() {
    let (url, _) = spawn_identity_service().await;
    let app = create_router(AppState::new(validator(
        &url,
        Duration::from_secs(3),
        Duration::from_secs(5),
    )));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/whoami")
                .header("Authorization", "nope")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["code"], "invalidToken");
    assert_eq!(json["data"]["originalStatusCode"], 401);
}
