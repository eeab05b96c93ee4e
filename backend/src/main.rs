//! Backend entry-point: loads settings, prepares storage and serves the API.

mod server;

use actix_web::web;
use color_eyre::eyre::{Result, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use farm_backend::inbound::http::health::HealthState;
use farm_backend::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use server::{BuildMode, FarmSettings, ServerConfig, create_server, load_session_key};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings =
        FarmSettings::load().map_err(|err| eyre!("failed to load settings: {err}"))?;
    let key = load_session_key(
        &settings.session_key_file(),
        BuildMode::from_debug_assertions(),
    )?;
    let bind_addr = settings.bind_addr()?;
    let mut config = ServerConfig::new(key, settings.cookie_secure, bind_addr)
        .with_protected_roles(settings.protected_roles());

    if let Some(database_url) = settings.database_url.as_deref() {
        run_migrations(database_url).await?;
        let mut pool_config = PoolConfig::new(database_url);
        if let Some(size) = settings.db_pool_size {
            pool_config = pool_config.with_max_size(size);
        }
        config = config.with_db_pool(DbPool::new(pool_config).await?);
    }

    let health_state = web::Data::new(HealthState::new(server::storage_backend(&config)));
    let server = create_server(health_state, config)?;
    info!(%bind_addr, "farm backend listening");
    server.await?;
    Ok(())
}
