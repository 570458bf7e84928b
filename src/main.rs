use anyhow::Context;
use scholar_rewards::config::{Config, StoreBackend};
use scholar_rewards::{
    api, init_db, CachedDataSource, Repository, SnapshotStore, SplinterlandsDataSource,
    SupabaseStore,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

async fn build_store(config: &Config) -> anyhow::Result<Option<Arc<dyn SnapshotStore>>> {
    let store: Option<Arc<dyn SnapshotStore>> = match &config.store {
        StoreBackend::Sqlite { database_path } => {
            let pool = init_db(database_path)
                .await
                .with_context(|| format!("failed to initialize database at {}", database_path))?;
            Some(Arc::new(Repository::new(pool)))
        }
        StoreBackend::Supabase { url, key } => {
            Some(Arc::new(SupabaseStore::new(url, key)))
        }
        StoreBackend::None => {
            tracing::warn!("No snapshot store configured; sync and history are disabled");
            None
        }
    };
    Ok(store)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    let config = Config::from_env().context("configuration error")?;
    let port = config.port;

    let upstream = Arc::new(SplinterlandsDataSource::new(
        config.splinterlands_api_url.clone(),
        config.prices_api_url.clone(),
    ));
    let datasource = Arc::new(CachedDataSource::new(
        upstream,
        Duration::from_secs(config.cache_ttl_secs),
    ));
    let store = build_store(&config).await?;

    let app = api::create_router(api::AppState::new(datasource, store, config));

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
