use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mood2anime_server::{
    cache::{spawn_sweeper, RecommendationCache},
    catalog::{init_proxy_cache, jikan::JikanClient},
    config::Config,
    pipeline::{FilterPolicy, RecommendationPipeline},
    routes::{create_router, AppState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mood2anime_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let cache = Arc::new(RecommendationCache::new(config.cache_ttl()));
    let sweeper = spawn_sweeper(cache.clone(), config.cache_ttl());

    let jikan = JikanClient::new(config.clone())?;
    tracing::info!("Upstream catalog at {}", jikan.anime_url());
    let pipeline = Arc::new(RecommendationPipeline::new(
        jikan,
        cache,
        FilterPolicy::from(&config),
    ));

    let bind_addr = config.bind_addr.clone();
    let state = AppState {
        proxy_cache: init_proxy_cache(config.proxy_cache_ttl()),
        config: Arc::new(config),
        pipeline,
    };

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Server starting on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
