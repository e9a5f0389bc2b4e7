use std::path::Path;

use anyhow::{Context, Result};
use storefront_backend::storage::SqliteProductStore;

/// Open the product database and run migrations / 打开数据库并运行迁移
pub async fn open_store(database_url: &str) -> Result<SqliteProductStore> {
    let store = SqliteProductStore::connect(database_url)
        .await
        .with_context(|| format!("Failed to open database {}", database_url))?;

    run_migrations(&store).await?;
    Ok(store)
}

/// Run database migrations / 运行数据库迁移
pub async fn run_migrations(store: &SqliteProductStore) -> Result<()> {
    store.init().await.context("Failed to create product tables")?;
    tracing::info!("Database migrations complete");
    Ok(())
}

/// Import the seed catalog once, into an empty store / 导入初始商品数据
pub async fn seed_catalog(store: &SqliteProductStore, seed_file: &Path) -> Result<()> {
    let existing = store.count().await?;
    if existing > 0 {
        tracing::info!("Catalog already holds {} products, skipping seed {:?}", existing, seed_file);
        return Ok(());
    }

    let imported = store.import_file(seed_file).await?;
    tracing::info!("Seeded {} products from {:?}", imported, seed_file);
    Ok(())
}
