//! `svcregd` — the service-catalog server binary.
//!
//! Usage:
//!   svcregd -c <context-name-or-path> [--listen <addr>]
//!
//! The context name resolves to `/etc/svcreg/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly.

mod auth_middleware;
mod bootstrap;
mod config;
mod routes;

use std::sync::Arc;

use clap::Parser;
use tracing::info;

use svcreg_core::Module;

use auth_middleware::JwtState;
use config::ServerConfig;

/// Service catalog server.
#[derive(Parser, Debug)]
#[command(name = "svcregd", about = "Service catalog server")]
struct Cli {
    /// Context name or path to config file.
    #[arg(short = 'c', long = "config", required = true)]
    config: String,

    /// Listen address (overrides the config file).
    #[arg(long = "listen")]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config_path = ServerConfig::resolve_path(&cli.config);
    info!("Loading configuration from {}", config_path.display());
    let server_config = ServerConfig::load(&config_path)?;
    bootstrap::verify_config(&server_config)?;

    let listen = cli
        .listen
        .or_else(|| server_config.listen.clone())
        .unwrap_or_else(|| "0.0.0.0:8080".to_string());

    // Initialize storage.
    let data_dir = std::path::PathBuf::from(&server_config.storage.data_dir);
    std::fs::create_dir_all(&data_dir)?;

    let core_config = svcreg_core::ServiceConfig {
        data_dir: Some(data_dir),
        listen: listen.clone(),
        ..Default::default()
    };

    let sql: Arc<dyn svcreg_sql::SQLStore> = Arc::new(
        svcreg_sql::SqliteStore::open(&core_config.resolve_sqlite_path())
            .map_err(|e| anyhow::anyhow!("failed to open SQL store: {}", e))?,
    );

    let catalog_module = catalog::CatalogModule::new(Arc::clone(&sql))?;
    bootstrap::ensure_organizations(catalog_module.service(), &server_config.organizations)?;
    info!("Catalog module initialized");

    let jwt_state = Arc::new(JwtState::new(&server_config.jwt.secret));
    let app = routes::build_router(
        jwt_state,
        vec![(catalog_module.name(), catalog_module.routes())],
    );

    info!("Listening on {}", listen);
    let listener = tokio::net::TcpListener::bind(&listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
