//! todose - entry point
//!
//! ```text
//! ┌──────────┐    ┌─────────────┐    ┌──────────┐    ┌──────────┐
//! │  Config  │───▶│ KeyMaterial │───▶│  Store   │───▶│ Gateway  │
//! │  (YAML)  │    │  (RS256)    │    │ (PG/mem) │    │  (axum)  │
//! └──────────┘    └─────────────┘    └──────────┘    └──────────┘
//! ```
//!
//! Key material is validated before the listener is bound; a bad key never
//! reaches a request.

use std::sync::Arc;

use anyhow::Context;

use todose::account::{MemoryStore, PgStore, TodoStore, UserStore};
use todose::config::AppConfig;
use todose::gateway::{run_server, state::AppState};
use todose::user_auth::{
    AuthGuard, KeyMaterial, TokenIssuer, TokenValidator, UserAuthService, prime_dummy_hash,
};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

#[tokio::main]
async fn main() {
    let env = get_env();
    let app_config = match AppConfig::load(&env) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("FATAL: {}", e);
            std::process::exit(1);
        }
    };
    let _log_guard = todose::logging::init_logging(&app_config);

    tracing::info!("Starting todose in {} mode", env);

    if let Err(e) = run(app_config).await {
        tracing::error!("FATAL: {:#}", e);
        eprintln!("FATAL: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(app_config: AppConfig) -> anyhow::Result<()> {
    let keys = Arc::new(
        KeyMaterial::from_config(&app_config.rsa).context("Failed to load RSA key material")?,
    );
    tracing::info!("RSA key material loaded");

    let primed = tokio::task::spawn_blocking(prime_dummy_hash)
        .await
        .context("Failed to prepare login hashing")?;
    if !primed {
        tracing::warn!("Unknown-user login timing guard disabled: dummy hash unavailable");
    }

    let (users, todos): (Arc<dyn UserStore>, Arc<dyn TodoStore>) = match &app_config.postgres_url
    {
        Some(url) => {
            let store = Arc::new(
                PgStore::connect(url)
                    .await
                    .context("Failed to connect to PostgreSQL")?,
            );
            let users: Arc<dyn UserStore> = store.clone();
            let todos: Arc<dyn TodoStore> = store;
            (users, todos)
        }
        None => {
            tracing::warn!("No postgres_url configured, records are kept in memory only");
            let store = Arc::new(MemoryStore::new());
            let users: Arc<dyn UserStore> = store.clone();
            let todos: Arc<dyn TodoStore> = store;
            (users, todos)
        }
    };

    let user_auth = Arc::new(UserAuthService::new(
        users.clone(),
        TokenIssuer::new(keys.clone()),
    ));
    let guard = AuthGuard::new(Arc::new(TokenValidator::new(keys)));
    let state = Arc::new(AppState::new(user_auth, users, todos));

    let port = get_port_override().unwrap_or(app_config.gateway.port);
    run_server(&app_config.gateway.host, port, state, guard)
        .await
        .context("Gateway server error")?;
    Ok(())
}
