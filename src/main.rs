//! Storefront Catalog Gateway
//!
//! A REST gateway over an upstream storefront API that serves the category
//! taxonomy, breadcrumb trails and filtered, sorted, paginated product
//! listings, backed by an in-process cache and an optional Redis tier.
//!
//! # Architecture
//!
//! - **Domain**: Taxonomy and product records, cache entries, source traits
//! - **Application**: Taxonomy store, category resolver, listing pipeline, product cache
//! - **Infrastructure**: Upstream HTTP client, Redis
//! - **API**: HTTP handlers, routing, and middleware
//!
//! # Configuration
//!
//! The gateway is configured via `config.yaml` and environment variables:
//! - `UPSTREAM_API_URL`: Storefront API endpoint (overrides `upstream.base_url`)
//! - `REDIS_URL`: Redis connection string (optional; memory-only without it)
//! - `PORT`: Listen port (overrides `server.port`)
//! - `CONFIG_PATH`: Alternate config file (default: `config.yaml`)
//! - `RUST_LOG` / `LOG_FORMAT`: Log filter and `json` output
//!
//! # Quick Start
//!
//! ```bash
//! export UPSTREAM_API_URL="https://erp.example.com/api"
//! export REDIS_URL="redis://localhost:6379"
//!
//! cargo run --release
//!
//! curl http://localhost:3010/health
//! curl "http://localhost:3010/v1/categories/shoes-running/products?color=Red&sortBy=priceLowToHigh"
//! ```

use anyhow::Context;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::env;
use std::sync::Arc;
use std::time::Duration;
use storefront_catalog_gateway::api::routes::create_router;
use storefront_catalog_gateway::api::state::AppState;
use storefront_catalog_gateway::application::{
    FacetRegistry, ProductCache, RetryPolicy, StorefrontService, TaxonomyStore,
};
use storefront_catalog_gateway::config::Config;
use storefront_catalog_gateway::domain::{CacheRepository, Clock, SystemClock};
use storefront_catalog_gateway::infrastructure::{RedisRepository, StorefrontApiClient};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let env_filter = EnvFilter::new(env::var("RUST_LOG").unwrap_or_else(|_| "info".into()));

    if log_format.eq_ignore_ascii_case("json") {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    // Load Config
    let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());
    let config = Config::load(&config_path)?;

    let metrics = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    // Infrastructure
    let redis_url = env::var("REDIS_URL").ok();
    if redis_url.is_none() {
        tracing::warn!("REDIS_URL not set - caching in process memory only");
    }
    let redis_repo = Arc::new(RedisRepository::new(redis_url));
    let upstream = Arc::new(StorefrontApiClient::new(
        &config.upstream.base_url,
        Duration::from_secs(config.upstream.request_timeout_secs),
    )?);
    tracing::info!("Upstream storefront API: {}", upstream.base_url());

    // Application
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let remote: Arc<dyn CacheRepository> = redis_repo.clone();

    let taxonomy_store = Arc::new(TaxonomyStore::with_settings(
        upstream.clone(),
        remote.clone(),
        clock.clone(),
        config.cache.taxonomy_ttl_secs,
        RetryPolicy::default(),
    ));
    let product_cache = Arc::new(ProductCache::with_ttl(
        upstream,
        remote,
        clock,
        config.cache.products_ttl_secs,
    ));
    let storefront = Arc::new(StorefrontService::new(
        taxonomy_store,
        product_cache,
        FacetRegistry::default(),
    ));

    let state = AppState {
        storefront,
        redis: redis_repo,
        metrics,
    };

    let app = create_router(state, config.server.allowed_origins.clone());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to address {}", addr))?;
    tracing::info!("Storefront catalog gateway running at http://{}", addr);

    // Graceful shutdown handling
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error during operation")?;

    Ok(())
}

/// Wait for SIGTERM or SIGINT (Ctrl+C) to initiate graceful shutdown
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
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
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        },
    }
}
