//! Behaviour when the backing store is unreachable.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use todose::account::{StoreError, Todo, TodoStore, User, UserStore};
use todose::user_auth::{AuthGuard, KeyMaterial, TokenIssuer, TokenValidator, UserAuthService};
use todose::{AppState, build_router};

const SIGNING_PRIVATE: &str = include_str!("../fixtures/keys/signing.pem");
const SIGNING_PUBLIC: &str = include_str!("../fixtures/keys/signing.pub.pem");

/// Every call fails the way an exhausted pool does.
struct UnreachableStore;

fn down() -> StoreError {
    StoreError::Database(sqlx::Error::PoolTimedOut)
}

#[async_trait]
impl UserStore for UnreachableStore {
    async fn find_by_username(&self, _: &str) -> Result<Option<User>, StoreError> {
        Err(down())
    }

    async fn find_by_id(&self, _: &str) -> Result<Option<User>, StoreError> {
        Err(down())
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        Err(down())
    }

    async fn insert(&self, _: User) -> Result<(), StoreError> {
        Err(down())
    }

    async fn replace(&self, _: User) -> Result<bool, StoreError> {
        Err(down())
    }

    async fn delete(&self, _: &str) -> Result<bool, StoreError> {
        Err(down())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(down())
    }
}

#[async_trait]
impl TodoStore for UnreachableStore {
    async fn list(&self) -> Result<Vec<Todo>, StoreError> {
        Err(down())
    }

    async fn find_by_id(&self, _: &str) -> Result<Option<Todo>, StoreError> {
        Err(down())
    }

    async fn insert(&self, _: Todo) -> Result<(), StoreError> {
        Err(down())
    }

    async fn replace(&self, _: Todo) -> Result<bool, StoreError> {
        Err(down())
    }

    async fn delete(&self, _: &str) -> Result<bool, StoreError> {
        Err(down())
    }
}

fn setup() -> (Router, TokenIssuer) {
    let store = Arc::new(UnreachableStore);
    let users: Arc<dyn UserStore> = store.clone();
    let todos: Arc<dyn TodoStore> = store;

    let keys = Arc::new(KeyMaterial::from_pem(SIGNING_PRIVATE, SIGNING_PUBLIC).unwrap());
    let issuer = TokenIssuer::new(keys.clone());
    let user_auth = Arc::new(UserAuthService::new(users.clone(), issuer.clone()));
    let guard = AuthGuard::new(Arc::new(TokenValidator::new(keys)));
    let state = Arc::new(AppState::new(user_auth, users, todos));
    (build_router(state, guard), issuer)
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

fn generic_upstream_body() -> Value {
    json!({
        "code": 5000,
        "error": "UPSTREAM_FAILURE",
        "message": "internal server error"
    })
}

#[tokio::test]
async fn login_reports_generic_500_when_store_is_down() {
    let (app, _) = setup();
    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "username": "alice", "password": "secret" }).to_string(),
        ))
        .unwrap();

    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, generic_upstream_body());
    assert!(body.get("token").is_none());
}

#[tokio::test]
async fn guarded_route_reports_generic_500_when_store_is_down() {
    let (app, issuer) = setup();
    let alice = User {
        id: "u-alice".to_string(),
        name: "Alice".to_string(),
        username: "alice".to_string(),
        password_hash: String::new(),
        scope: vec![],
    };
    let token = issuer.issue(&alice).unwrap();

    let req = Request::builder()
        .uri("/api/v1/todos")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, generic_upstream_body());
}

#[tokio::test]
async fn healthz_reports_503_when_store_is_down() {
    let (app, _) = setup();
    let req = Request::builder()
        .uri("/api/v1/healthz")
        .body(Body::empty())
        .unwrap();

    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
