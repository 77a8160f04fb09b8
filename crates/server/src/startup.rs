use std::net::SocketAddr;

use axum::Router;
use common::env::{ensure_env, load_dotenv};
use common::utils::logging::init_logging_from_env;
use configs::AppConfig;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::origin::build_cors;
use crate::routes;
use crate::state::ServerState;

/// `config.toml` (or `CONFIG_PATH`) first; without a file, environment variables only.
pub fn load_config() -> Result<AppConfig, StartupError> {
    match configs::load_default() {
        Ok(mut cfg) => {
            cfg.normalize_and_validate().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
            Ok(cfg)
        }
        Err(e) => {
            warn!(error = %e, "config file unavailable, falling back to environment");
            AppConfig::from_env().map_err(|e| StartupError::InvalidConfig(e.to_string()))
        }
    }
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("server address: {e}")))
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    load_dotenv();
    init_logging_from_env();

    let cfg = load_config()?;
    ensure_env(&cfg.server.static_dir)
        .await
        .map_err(|e| StartupError::Runtime(e.to_string()))?;

    // DB connection + schema
    let db = models::db::connect_with_config(&models::db::DatabaseConfig::from(&cfg.database)).await?;
    models::db::migrate(&db).await?;

    let origins = cfg.server.allowed_origins.clone();
    let state = ServerState::new(db, &cfg.auth, &cfg.catalog).with_allowed_origins(origins.clone());
    let app: Router = routes::build_router(state, build_cors(&origins), &cfg.server.static_dir);

    // Bind and serve
    let addr = bind_addr(&cfg)?;
    info!(%addr, enforce_ownership = cfg.catalog.enforce_ownership, "starting catalog server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
