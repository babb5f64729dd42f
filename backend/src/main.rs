//! Backend entry-point: loads settings, prepares the database and serves the
//! REST API, health checks and OpenAPI docs.

mod server;

use actix_web::web;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use ortho_config::OrthoConfig;
use recipe_backend::domain::PublicUrls;
use recipe_backend::inbound::http::health::HealthState;
use recipe_backend::outbound::persistence::{DbPool, PoolConfig, apply_migrations};
use server::{AppSettings, ServerConfig, build_http_state, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().map_err(|e| std::io::Error::other(e.to_string()))?;
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;
    let database_url = settings.database_url().map_err(std::io::Error::other)?;

    let pool_config = PoolConfig::new(database_url)
        .with_max_size(settings.pool_max_size())
        .with_connect_attempts(settings.pool_connect_attempts());
    let pool = DbPool::new(pool_config)
        .await
        .map_err(std::io::Error::other)?;

    if settings.run_migrations {
        apply_migrations(database_url)
            .await
            .map_err(std::io::Error::other)?;
        info!("database migrations applied");
    }
    let urls = PublicUrls::new(settings.base_url().map_err(std::io::Error::other)?);
    let http_state = build_http_state(&pool, urls, settings.media_root())
        .map_err(std::io::Error::other)?;

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(
        health_state.clone(),
        web::Data::new(http_state),
        ServerConfig::new(bind_addr),
    )?;

    health_state.mark_ready();
    info!(%bind_addr, "listening");
    let outcome = server.await;
    health_state.mark_unhealthy();
    outcome
}
