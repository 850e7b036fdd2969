//! Elegant Vogue storefront service

use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use elegant_vogue::publisher::EventPublisher;
use elegant_vogue::seed::CatalogSeed;
use elegant_vogue::store::{MemoryStore, PgStore, Store};
use elegant_vogue::{router, AppConfig, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env()?;
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();

    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new().max_connections(config.db_max_connections).connect(url).await.context("connecting to DATABASE_URL")?;
            let store = PgStore::new(pool);
            store.migrate().await.context("running migrations")?;
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using the in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    let nats = match &config.nats_url {
        Some(url) => match async_nats::connect(url.as_str()).await {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::warn!(error = %e, "NATS unavailable, domain events disabled");
                None
            }
        },
        None => None,
    };

    let state = AppState::new(store, &config, EventPublisher::new(nats));
    if config.seed_db && state.catalog.seed_if_empty(&CatalogSeed::demo(Utc::now())).await? {
        tracing::info!("seeded demo catalog");
    }

    let addr = config.bind_addr();
    tracing::info!("Elegant Vogue storefront listening on {}", addr);
    axum::serve(tokio::net::TcpListener::bind(&addr).await?, router(state)).await?;
    Ok(())
}
