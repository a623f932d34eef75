//! Homestead game server binary.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `$HOMESTEAD_CONFIG` or `homestead.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Open the configured store, migrating and seeding `PostgreSQL`
//! 4. Serve the API until `Ctrl-C`

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use homestead_core::{GameConfig, StoreBackend, SystemClock};
use homestead_db::{Catalog, FarmStore, MemoryFarmStore, PgFarmStore};
use homestead_server::{AppState, build_router, start_server};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Config file read when `HOMESTEAD_CONFIG` is unset.
const DEFAULT_CONFIG_PATH: &str = "homestead.yaml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;
    init_tracing(&config);

    info!(
        host = config.server.host,
        port = config.server.port,
        backend = ?config.store.backend,
        "homestead-server starting"
    );

    match config.store.backend {
        StoreBackend::Memory => {
            info!("Using in-memory store; state is lost on restart");
            serve(MemoryFarmStore::new(), &config).await
        }
        StoreBackend::Postgres => {
            let store = PgFarmStore::connect(&config.database.url, config.database.max_connections)
                .await
                .context("failed to connect to PostgreSQL")?;
            if config.database.run_migrations {
                store.migrate().await.context("failed to run migrations")?;
            }
            store
                .seed_catalog(&Catalog::starter())
                .await
                .context("failed to seed catalog")?;
            let result = serve(store.clone(), &config).await;
            store.close().await;
            result
        }
    }
}

async fn serve<S: FarmStore>(store: S, config: &GameConfig) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(
        Arc::new(store),
        Arc::new(SystemClock),
        config,
    ));
    start_server(&config.server, build_router(state)).await?;
    Ok(())
}

fn load_config() -> anyhow::Result<GameConfig> {
    let path = std::env::var_os("HOMESTEAD_CONFIG")
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    if path.exists() {
        GameConfig::from_file(&path)
            .with_context(|| format!("failed to load config from {}", path.display()))
    } else {
        GameConfig::parse("").context("invalid default configuration")
    }
}

fn init_tracing(config: &GameConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if config.logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
