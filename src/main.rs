//! 服务入口

use anyhow::Context;
use inventario::{
    app::{create_router, signing_key, AppState},
    config::{Config, StorageBackend},
    infrastructure::{logger::Logger, memory::MemoryStore},
};
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tracing::info;

/// 内存后端启动时预置的分类
const MEMORY_CATEGORIES: [&str; 4] = ["Electrónica", "Oficina", "Hogar", "Alimentos"];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    Logger::init(&config.logging.level);

    let key = signing_key(config.auth.secret_key.as_deref());
    let state = match config.storage.backend {
        StorageBackend::Memory => {
            info!("using in-memory storage");
            let store = Arc::new(MemoryStore::with_categories(MEMORY_CATEGORIES));
            AppState::new(
                store.clone(),
                store,
                key,
                config.auth.bcrypt_cost,
                config.products_json.clone(),
            )
        }
        StorageBackend::Postgres => postgres_state(&config, key).await?,
    };

    let app = create_router(state, Duration::from_secs(config.http.timeout_seconds));

    let listener = TcpListener::bind(&config.http.bind_address)
        .await
        .with_context(|| format!("failed to bind {}", config.http.bind_address))?;
    info!("🚀 inventario listening on http://{}", config.http.bind_address);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

#[cfg(feature = "database")]
async fn postgres_state(
    config: &Config,
    key: axum_extra::extract::cookie::Key,
) -> anyhow::Result<AppState> {
    use inventario::infrastructure::{database::DatabaseManager, postgres::PgStore};

    let url = config
        .storage
        .database_url
        .as_deref()
        .context("DATABASE_URL is required for the postgres backend")?;
    let database = DatabaseManager::new(url, config.storage.max_connections)
        .await
        .context("failed to connect to database")?;
    database.migrate().await.context("failed to create tables")?;

    let store = Arc::new(PgStore::new(database.get_pool().clone()));
    Ok(AppState::new(
        store.clone(),
        store,
        key,
        config.auth.bcrypt_cost,
        config.products_json.clone(),
    ))
}

#[cfg(not(feature = "database"))]
async fn postgres_state(
    _config: &Config,
    _key: axum_extra::extract::cookie::Key,
) -> anyhow::Result<AppState> {
    anyhow::bail!("built without the `database` feature, set INVENTARIO_STORAGE=memory")
}
