pub mod handlers;
pub mod openapi;
pub mod state;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::user_auth::{AuthGuard, jwt_auth_middleware};
use state::AppState;

/// Build the full application router.
///
/// Every route except health, login and registration goes through `guard`.
pub fn build_router(state: Arc<AppState>, guard: AuthGuard) -> Router {
    // ==========================================================================
    // Public Routes (no auth required)
    // ==========================================================================
    let public_routes = Router::new()
        .route("/healthz", get(handlers::health_check))
        .route("/login", post(crate::user_auth::handlers::login))
        .route("/users", post(handlers::create_user));

    // ==========================================================================
    // Protected Routes (bearer token required)
    // ==========================================================================
    let protected_routes = Router::new()
        .route("/users", get(handlers::get_users))
        .route(
            "/users/{user_id}",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        .route(
            "/todos",
            get(handlers::get_todos).post(handlers::create_todo),
        )
        .route(
            "/todos/{todo_id}",
            get(handlers::get_todo)
                .put(handlers::update_todo)
                .delete(handlers::delete_todo),
        )
        .route_layer(from_fn_with_state(guard, jwt_auth_middleware));

    Router::new()
        .nest("/api/v1", public_routes.merge(protected_routes))
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
}

/// Bind and serve until Ctrl-C or SIGTERM.
pub async fn run_server(
    host: &str,
    port: u16,
    state: Arc<AppState>,
    guard: AuthGuard,
) -> std::io::Result<()> {
    let app = build_router(state, guard);

    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        tracing::error!("Failed to bind to {}: {}", addr, e);
        e
    })?;

    tracing::info!("Gateway listening on http://{}", addr);
    tracing::info!("API Docs: http://{}/docs", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server gracefully stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
