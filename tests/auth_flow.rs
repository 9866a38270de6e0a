//! End-to-end login and guarded-route behaviour over the full router.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{Value, json};
use tower::ServiceExt;

use todose::account::{MemoryStore, TodoStore, User, UserStore};
use todose::user_auth::{
    AuthGuard, Claims, KeyMaterial, TokenIssuer, TokenValidator, UserAuthService, hash_password,
};
use todose::{AppState, build_router};

const SIGNING_PRIVATE: &str = include_str!("../fixtures/keys/signing.pem");
const SIGNING_PUBLIC: &str = include_str!("../fixtures/keys/signing.pub.pem");
const OTHER_PRIVATE: &str = include_str!("../fixtures/keys/other.pem");
const OTHER_PUBLIC: &str = include_str!("../fixtures/keys/other.pub.pem");

struct TestApp {
    router: Router,
    validator: TokenValidator,
    alice: User,
}

async fn setup() -> TestApp {
    let alice = User {
        id: "u-alice".to_string(),
        name: "Alice".to_string(),
        username: "alice".to_string(),
        password_hash: hash_password("secret").unwrap(),
        scope: vec!["todos:read".to_string(), "todos:write".to_string()],
    };
    let store = Arc::new(MemoryStore::new());
    UserStore::insert(&*store, alice.clone()).await.unwrap();

    let users: Arc<dyn UserStore> = store.clone();
    let todos: Arc<dyn TodoStore> = store;

    let keys = Arc::new(KeyMaterial::from_pem(SIGNING_PRIVATE, SIGNING_PUBLIC).unwrap());
    let user_auth = Arc::new(UserAuthService::new(
        users.clone(),
        TokenIssuer::new(keys.clone()),
    ));
    let validator = TokenValidator::new(keys.clone());
    let guard = AuthGuard::new(Arc::new(TokenValidator::new(keys)));
    let state = Arc::new(AppState::new(user_auth, users, todos));

    TestApp {
        router: build_router(state, guard),
        validator,
        alice,
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, body)
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn authed(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"));
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn login(app: &Router, username: &str, password: &str) -> (StatusCode, Value) {
    let body = json!({ "username": username, "password": password }).to_string();
    send(app, post_json("/api/v1/login", &body)).await
}

#[tokio::test]
async fn login_issues_token_that_validates() {
    let app = setup().await;
    let (status, body) = login(&app.router, "alice", "secret").await;
    assert_eq!(status, StatusCode::OK);

    let token = body["token"].as_str().expect("token in body");
    let claims = app.validator.validate(token).unwrap();
    assert_eq!(claims.sub, app.alice.id);
    assert_eq!(claims.username, "alice");
    assert_eq!(claims.name, "Alice");
    assert_eq!(claims.scope, app.alice.scope);
    assert_eq!(claims.exp - claims.iat, 15 * 60);
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let app = setup().await;

    let (wrong_status, wrong_body) = login(&app.router, "alice", "wrong").await;
    let (unknown_status, unknown_body) = login(&app.router, "mallory", "secret").await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, unknown_body);
    assert!(wrong_body.get("token").is_none());
}

#[tokio::test]
async fn login_with_undecodable_body_is_bad_request() {
    let app = setup().await;

    for body in ["not json", "{\"username\":\"alice\"}", "[]"] {
        let (status, _) = send(&app.router, post_json("/api/v1/login", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {body:?}");
    }
}

#[tokio::test]
async fn protected_route_requires_bearer_header() {
    let app = setup().await;

    let (status, _) = send(
        &app.router,
        Request::builder()
            .uri("/api/v1/todos")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app.router,
        Request::builder()
            .uri("/api/v1/todos")
            .header(header::AUTHORIZATION, "Basic YWxpY2U6c2VjcmV0")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn forged_tokens_are_rejected() {
    let app = setup().await;
    let now = Utc::now();
    let claims = Claims {
        sub: app.alice.id.clone(),
        username: "alice".to_string(),
        name: "Alice".to_string(),
        scope: vec!["admin".to_string()],
        iss: "todose".to_string(),
        iat: now.timestamp(),
        exp: now.timestamp() + 900,
    };
    let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap());

    // alg "none", empty signature
    let none_header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let unsigned = format!("{none_header}.{payload}.");

    // HS256 keyed with the public verification key
    let hs256 = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(SIGNING_PUBLIC.as_bytes()),
    )
    .unwrap();

    // Correct algorithm, wrong private key
    let other_keys = Arc::new(KeyMaterial::from_pem(OTHER_PRIVATE, OTHER_PUBLIC).unwrap());
    let other_signed = TokenIssuer::new(other_keys).issue(&app.alice).unwrap();

    // Genuine signature, past expiry
    let signing_keys = Arc::new(KeyMaterial::from_pem(SIGNING_PRIVATE, SIGNING_PUBLIC).unwrap());
    let expired = TokenIssuer::new(signing_keys)
        .issue_at(&app.alice, now - Duration::minutes(30))
        .unwrap();

    for (label, token) in [
        ("none", unsigned),
        ("hs256", hs256),
        ("other key", other_signed),
        ("expired", expired),
    ] {
        let (status, _) = send(&app.router, authed("GET", "/api/v1/todos", &token, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{label} token accepted");
    }
}

#[tokio::test]
async fn todo_crud_with_token() {
    let app = setup().await;
    let (_, body) = login(&app.router, "alice", "secret").await;
    let token = body["token"].as_str().unwrap().to_string();

    let (status, created) = send(
        &app.router,
        authed(
            "POST",
            "/api/v1/todos",
            &token,
            Some(json!({ "id": "t-1", "title": "Buy milk", "status": "open" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["owner_id"], "u-alice");

    let (status, fetched) = send(&app.router, authed("GET", "/api/v1/todos/t-1", &token, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["title"], "Buy milk");

    let (status, updated) = send(
        &app.router,
        authed(
            "PUT",
            "/api/v1/todos/t-1",
            &token,
            Some(json!({ "title": "Buy milk", "status": "done", "owner_id": "u-alice" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "done");

    let (status, list) = send(&app.router, authed("GET", "/api/v1/todos", &token, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, _) = send(&app.router, authed("DELETE", "/api/v1/todos/t-1", &token, None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app.router, authed("GET", "/api/v1/todos/t-1", &token, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn registered_user_can_log_in() {
    let app = setup().await;

    let body = json!({ "name": "Bob", "username": "bob", "password": "hunter2", "scope": ["todos:read"] })
        .to_string();
    let (status, created) = send(&app.router, post_json("/api/v1/users", &body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(created.get("password_hash").is_none());
    assert!(!created.to_string().contains("hunter2"));

    let (status, _) = send(&app.router, post_json("/api/v1/users", &body)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = login(&app.router, "bob", "hunter2").await;
    assert_eq!(status, StatusCode::OK);
    let claims = app
        .validator
        .validate(body["token"].as_str().unwrap())
        .unwrap();
    assert_eq!(claims.scope, vec!["todos:read"]);
}

#[tokio::test]
async fn user_listing_is_guarded_and_hides_hashes() {
    let app = setup().await;

    let (status, _) = send(
        &app.router,
        Request::builder()
            .uri("/api/v1/users")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, body) = login(&app.router, "alice", "secret").await;
    let token = body["token"].as_str().unwrap();
    let (status, users) = send(&app.router, authed("GET", "/api/v1/users", token, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users[0]["username"], "alice");
    assert!(!users.to_string().contains("argon2"));
}

#[tokio::test]
async fn healthz_is_public() {
    let app = setup().await;
    let (status, body) = send(
        &app.router,
        Request::builder()
            .uri("/api/v1/healthz")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("OK".to_string()));
}
