//! SQLite product store / SQLite 商品存储
//!
//! Storage layout:
//! - `products`: one row per product, `pk` is the stable insertion order
//! - `products_fts`: FTS5 external-content index over name/description/category/tags,
//!   kept in sync by triggers
//!
//! The index tokenizer (`porter unicode61 remove_diacritics 2`) folds case,
//! strips diacritics and stems English words.

use std::path::Path;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Executor, Pool, QueryBuilder, Sqlite};

use super::{ProductStore, StoreError, TEXT_INDEX_TABLE};
use crate::models::{NewProduct, Product, SearchHit};
use crate::search::schema::{SearchFilters, FIELD_WEIGHTS};
use crate::search::tokenizer::TextQuery;

const PRODUCT_COLUMNS: &str = "p.id, p.name, p.description, p.category, p.tags, \
     p.original_price, p.discount_price, p.stock, p.shop_id, p.sold_out, p.created_at";

/// SQLite-backed product store / SQLite 商品存储
#[derive(Clone)]
pub struct SqliteProductStore {
    db: Pool<Sqlite>,
}

impl SqliteProductStore {
    /// Use an existing connection pool / 使用现有连接池
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }

    /// Open the database at `url` in WAL mode / 打开数据库（WAL模式）
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let db = SqlitePoolOptions::new().max_connections(8).connect(url).await?;

        // 启用WAL模式，提高并发读性能
        sqlx::query("PRAGMA journal_mode=WAL").execute(&db).await?;
        sqlx::query("PRAGMA busy_timeout=5000").execute(&db).await?;
        sqlx::query("PRAGMA synchronous=NORMAL").execute(&db).await?;

        tracing::info!("Product database opened: {} (WAL mode)", url);
        Ok(Self { db })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.db
    }

    /// Close the connection pool / 关闭连接池
    pub async fn close(&self) {
        self.db.close().await;
    }

    /// Create tables, text index and sync triggers if missing / 初始化表结构
    pub async fn init(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS products (
                pk INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                name_lower TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                category TEXT NOT NULL DEFAULT '',
                tags TEXT NOT NULL DEFAULT '',
                original_price REAL,
                discount_price REAL,
                stock INTEGER NOT NULL DEFAULT 0,
                shop_id TEXT NOT NULL DEFAULT '',
                sold_out INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.db)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_products_category ON products(category)")
            .execute(&self.db)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_products_shop ON products(shop_id, created_at)")
            .execute(&self.db)
            .await?;

        let columns = index_columns();
        sqlx::query(&format!(
            "CREATE VIRTUAL TABLE IF NOT EXISTS {table} USING fts5(\
                {columns}, content='products', content_rowid='pk', \
                tokenize='porter unicode61 remove_diacritics 2')",
            table = TEXT_INDEX_TABLE,
        ))
        .execute(&self.db)
        .await?;

        let new_values = prefixed_columns("new.");
        let old_values = prefixed_columns("old.");

        sqlx::query(&format!(
            "CREATE TRIGGER IF NOT EXISTS products_ai AFTER INSERT ON products BEGIN \
                INSERT INTO {t}(rowid, {columns}) VALUES (new.pk, {new_values}); \
             END",
            t = TEXT_INDEX_TABLE,
        ))
        .execute(&self.db)
        .await?;

        sqlx::query(&format!(
            "CREATE TRIGGER IF NOT EXISTS products_ad AFTER DELETE ON products BEGIN \
                INSERT INTO {t}({t}, rowid, {columns}) VALUES ('delete', old.pk, {old_values}); \
             END",
            t = TEXT_INDEX_TABLE,
        ))
        .execute(&self.db)
        .await?;

        sqlx::query(&format!(
            "CREATE TRIGGER IF NOT EXISTS products_au AFTER UPDATE ON products BEGIN \
                INSERT INTO {t}({t}, rowid, {columns}) VALUES ('delete', old.pk, {old_values}); \
                INSERT INTO {t}(rowid, {columns}) VALUES (new.pk, {new_values}); \
             END",
            t = TEXT_INDEX_TABLE,
        ))
        .execute(&self.db)
        .await?;

        Ok(())
    }

    /// Insert one product / 新增商品
    pub async fn insert_product(&self, new: &NewProduct) -> Result<Product, StoreError> {
        insert_with(&self.db, new).await
    }

    /// Insert a batch of products in one transaction / 批量导入商品
    pub async fn import_catalog(&self, products: &[NewProduct]) -> Result<usize, StoreError> {
        let mut tx = self.db.begin().await?;
        for new in products {
            insert_with(&mut *tx, new).await?;
        }
        tx.commit().await?;

        tracing::info!("Imported {} products", products.len());
        Ok(products.len())
    }

    /// Load a JSON array of products from `path` and import it / 从JSON文件导入
    pub async fn import_file(&self, path: &Path) -> anyhow::Result<usize> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read catalog file {:?}", path))?;
        let products: Vec<NewProduct> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse catalog file {:?}", path))?;

        Ok(self.import_catalog(&products).await?)
    }

    /// Number of stored products / 商品数量
    pub async fn count(&self) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products")
            .fetch_one(&self.db)
            .await?;
        Ok(count)
    }

    pub async fn get_product(&self, id: &str) -> Result<Option<Product>, StoreError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products p WHERE p.id = ?",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(product)
    }

    /// All products, newest first / 全部商品（最新优先）
    pub async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products p ORDER BY p.created_at DESC, p.pk DESC",
            PRODUCT_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;
        Ok(products)
    }

    /// Products of one shop, newest first / 店铺商品
    pub async fn list_shop_products(&self, shop_id: &str) -> Result<Vec<Product>, StoreError> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products p WHERE p.shop_id = ? ORDER BY p.created_at DESC, p.pk DESC",
            PRODUCT_COLUMNS
        ))
        .bind(shop_id)
        .fetch_all(&self.db)
        .await?;
        Ok(products)
    }
}

#[async_trait]
impl ProductStore for SqliteProductStore {
    async fn text_search(
        &self,
        query: &TextQuery,
        filters: &SearchFilters,
        limit: usize,
    ) -> Result<Vec<SearchHit>, StoreError> {
        let Some(expr) = query.to_match_expression() else {
            return Ok(Vec::new());
        };

        let weights = FIELD_WEIGHTS
            .iter()
            .map(|(_, w)| format!("{:.1}", w))
            .collect::<Vec<_>>()
            .join(", ");

        // bm25 is lower-is-better, negate so the score reads as relevance
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {columns}, -bm25({t}, {weights}) AS score \
             FROM {t} JOIN products p ON p.pk = {t}.rowid \
             WHERE {t} MATCH ",
            columns = PRODUCT_COLUMNS,
            t = TEXT_INDEX_TABLE,
        ));
        qb.push_bind(expr);

        if let Some(category) = filters.category() {
            qb.push(" AND p.category = ");
            qb.push_bind(category.to_string());
        }

        if filters.has_price_bound() {
            // Either price representation may satisfy the bound
            qb.push(" AND (");
            push_price_bound(&mut qb, "p.discount_price", filters);
            qb.push(" OR ");
            push_price_bound(&mut qb, "p.original_price", filters);
            qb.push(")");
        }

        qb.push(" ORDER BY score DESC, p.pk ASC LIMIT ");
        qb.push_bind(limit_param(limit));

        let hits = qb.build_query_as::<SearchHit>().fetch_all(&self.db).await?;
        Ok(hits)
    }

    async fn names_containing(&self, fragment: &str, limit: usize) -> Result<Vec<String>, StoreError> {
        let names = sqlx::query_scalar::<_, String>(
            "SELECT name FROM products WHERE instr(name_lower, ?) > 0 ORDER BY pk LIMIT ?",
        )
        .bind(fragment.to_lowercase())
        .bind(limit_param(limit))
        .fetch_all(&self.db)
        .await?;
        Ok(names)
    }
}

async fn insert_with<'e, E>(executor: E, new: &NewProduct) -> Result<Product, StoreError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let product = Product {
        id: uuid::Uuid::new_v4().to_string(),
        name: new.name.clone(),
        description: new.description.clone(),
        category: new.category.clone(),
        tags: new.tags.clone(),
        original_price: new.original_price,
        discount_price: new.discount_price,
        stock: new.stock,
        shop_id: new.shop_id.clone(),
        sold_out: 0,
        created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    };

    sqlx::query(
        "INSERT INTO products (id, name, name_lower, description, category, tags, \
         original_price, discount_price, stock, shop_id, sold_out, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&product.id)
    .bind(&product.name)
    .bind(product.name.to_lowercase())
    .bind(&product.description)
    .bind(&product.category)
    .bind(&product.tags)
    .bind(product.original_price)
    .bind(product.discount_price)
    .bind(product.stock)
    .bind(&product.shop_id)
    .bind(product.sold_out)
    .bind(&product.created_at)
    .execute(executor)
    .await?;

    Ok(product)
}

fn push_price_bound(qb: &mut QueryBuilder<'_, Sqlite>, column: &str, filters: &SearchFilters) {
    qb.push("(");
    if let Some(min) = filters.min_price {
        qb.push(column);
        qb.push(" >= ");
        qb.push_bind(min);
    }
    if filters.min_price.is_some() && filters.max_price.is_some() {
        qb.push(" AND ");
    }
    if let Some(max) = filters.max_price {
        qb.push(column);
        qb.push(" <= ");
        qb.push_bind(max);
    }
    qb.push(")");
}

fn index_columns() -> String {
    FIELD_WEIGHTS.iter().map(|(name, _)| *name).collect::<Vec<_>>().join(", ")
}

fn prefixed_columns(prefix: &str) -> String {
    FIELD_WEIGHTS
        .iter()
        .map(|(name, _)| format!("{}{}", prefix, name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn limit_param(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    async fn memory_store() -> SqliteProductStore {
        // Single connection so every query sees the same in-memory database
        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let store = SqliteProductStore::new(db);
        store.init().await.unwrap();
        store
    }

    fn product(name: &str) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            ..Default::default()
        }
    }

    async fn search(store: &SqliteProductStore, q: &str, filters: &SearchFilters, limit: usize) -> Vec<String> {
        store
            .text_search(&TextQuery::parse(q), filters, limit)
            .await
            .unwrap()
            .into_iter()
            .map(|h| h.product.name)
            .collect()
    }

    #[tokio::test]
    async fn test_init_is_idempotent() {
        let store = memory_store().await;
        store.init().await.unwrap();
        store.insert_product(&product("Oak Lamp")).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_name_outranks_tags() {
        let store = memory_store().await;
        store
            .insert_product(&NewProduct {
                tags: "lamp".to_string(),
                ..product("Desk Light")
            })
            .await
            .unwrap();
        store.insert_product(&product("Oak Lamp")).await.unwrap();
        store.insert_product(&product("Table")).await.unwrap();

        let names = search(&store, "lamp", &SearchFilters::new(), 20).await;
        assert_eq!(names, vec!["Oak Lamp", "Desk Light"]);
    }

    #[tokio::test]
    async fn test_case_and_diacritic_insensitive() {
        let store = memory_store().await;
        store.insert_product(&product("Café Chair")).await.unwrap();

        for q in ["cafe chair", "CAFÉ CHAIR", "Cafe"] {
            let names = search(&store, q, &SearchFilters::new(), 20).await;
            assert_eq!(names, vec!["Café Chair"], "query {:?}", q);
        }
    }

    #[tokio::test]
    async fn test_any_term_matches() {
        let store = memory_store().await;
        store.insert_product(&product("Oak Lamp")).await.unwrap();
        store.insert_product(&product("Pine Desk")).await.unwrap();

        let names = search(&store, "lamp desk", &SearchFilters::new(), 20).await;
        assert_eq!(names.len(), 2);
    }

    #[tokio::test]
    async fn test_category_and_price_filters_combine() {
        let store = memory_store().await;
        store
            .insert_product(&NewProduct {
                category: "Electronics".to_string(),
                discount_price: Some(150.0),
                ..product("Smart Speaker")
            })
            .await
            .unwrap();
        store
            .insert_product(&NewProduct {
                category: "Electronics".to_string(),
                original_price: Some(50.0),
                ..product("Mini Speaker")
            })
            .await
            .unwrap();
        store
            .insert_product(&NewProduct {
                category: "Home".to_string(),
                original_price: Some(200.0),
                ..product("Speaker Stand")
            })
            .await
            .unwrap();

        let filters = SearchFilters::new().with_category("Electronics").with_min_price(100.0);
        let names = search(&store, "speaker", &filters, 20).await;
        assert_eq!(names, vec!["Smart Speaker"]);
    }

    #[tokio::test]
    async fn test_price_bound_accepts_either_price() {
        let store = memory_store().await;
        store
            .insert_product(&NewProduct {
                discount_price: Some(50.0),
                ..product("Discounted Mug")
            })
            .await
            .unwrap();
        store
            .insert_product(&NewProduct {
                original_price: Some(55.0),
                ..product("Full Price Mug")
            })
            .await
            .unwrap();
        store
            .insert_product(&NewProduct {
                original_price: Some(80.0),
                ..product("Premium Mug")
            })
            .await
            .unwrap();
        store
            .insert_product(&NewProduct {
                original_price: Some(90.0),
                discount_price: Some(45.0),
                ..product("Sale Mug")
            })
            .await
            .unwrap();

        let filters = SearchFilters::new().with_min_price(40.0).with_max_price(60.0);
        let mut names = search(&store, "mug", &filters, 20).await;
        names.sort();
        assert_eq!(names, vec!["Discounted Mug", "Full Price Mug", "Sale Mug"]);

        let filters = SearchFilters::new().with_max_price(46.0);
        let names = search(&store, "mug", &filters, 20).await;
        assert_eq!(names, vec!["Sale Mug"]);
    }

    #[tokio::test]
    async fn test_limit_bounds_results() {
        let store = memory_store().await;
        for i in 0..5 {
            store.insert_product(&product(&format!("Lamp {}", i))).await.unwrap();
        }

        assert_eq!(search(&store, "lamp", &SearchFilters::new(), 3).await.len(), 3);
        assert_eq!(search(&store, "lamp", &SearchFilters::new(), 1).await.len(), 1);
        assert_eq!(search(&store, "lamp", &SearchFilters::new(), 50).await.len(), 5);
    }

    #[tokio::test]
    async fn test_equal_scores_keep_insertion_order() {
        let store = memory_store().await;
        store.insert_product(&product("Blue Lamp")).await.unwrap();
        store.insert_product(&product("Gray Lamp")).await.unwrap();
        store.insert_product(&product("Pink Lamp")).await.unwrap();

        let names = search(&store, "lamp", &SearchFilters::new(), 20).await;
        assert_eq!(names, vec!["Blue Lamp", "Gray Lamp", "Pink Lamp"]);
    }

    #[tokio::test]
    async fn test_phrase_and_exclusion() {
        let store = memory_store().await;
        store.insert_product(&product("Reading Light Pro")).await.unwrap();
        store.insert_product(&product("Light for reading")).await.unwrap();
        store.insert_product(&product("Plastic Lamp")).await.unwrap();
        store.insert_product(&product("Oak Lamp")).await.unwrap();

        let names = search(&store, r#""reading light""#, &SearchFilters::new(), 20).await;
        assert_eq!(names, vec!["Reading Light Pro"]);

        let names = search(&store, "lamp -plastic", &SearchFilters::new(), 20).await;
        assert_eq!(names, vec!["Oak Lamp"]);
    }

    #[tokio::test]
    async fn test_negated_phrase_excludes() {
        let store = memory_store().await;
        store.insert_product(&product("Plastic Shade Lamp")).await.unwrap();
        store.insert_product(&product("Oak Lamp")).await.unwrap();
        store.insert_product(&product("Plastic Desk Lamp")).await.unwrap();

        let names = search(&store, r#"lamp -"plastic shade""#, &SearchFilters::new(), 20).await;
        assert_eq!(names, vec!["Oak Lamp", "Plastic Desk Lamp"]);
    }

    #[tokio::test]
    async fn test_index_tracks_updates_and_deletes() {
        let store = memory_store().await;
        let p = store.insert_product(&product("Oak Lamp")).await.unwrap();

        sqlx::query("UPDATE products SET name = 'Oak Table' WHERE id = ?")
            .bind(&p.id)
            .execute(store.pool())
            .await
            .unwrap();
        assert!(search(&store, "lamp", &SearchFilters::new(), 20).await.is_empty());
        assert_eq!(search(&store, "table", &SearchFilters::new(), 20).await, vec!["Oak Table"]);

        sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(&p.id)
            .execute(store.pool())
            .await
            .unwrap();
        assert!(search(&store, "table", &SearchFilters::new(), 20).await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_index_is_reported() {
        let store = memory_store().await;
        store.insert_product(&product("Oak Lamp")).await.unwrap();
        sqlx::query("DROP TABLE products_fts").execute(store.pool()).await.unwrap();

        let err = store
            .text_search(&TextQuery::parse("lamp"), &SearchFilters::new(), 20)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::IndexMissing(_)), "{:?}", err);
        assert!(err.to_string().contains("products_fts"));
    }

    #[tokio::test]
    async fn test_names_containing_substring() {
        let store = memory_store().await;
        for name in ["Wooden Spoon", "Table", "Cool Fan", "wooden spoon"] {
            store.insert_product(&product(name)).await.unwrap();
        }

        let names = store.names_containing("oo", 10).await.unwrap();
        assert_eq!(names, vec!["Wooden Spoon", "Cool Fan", "wooden spoon"]);

        let names = store.names_containing("WOODEN SPOON", 10).await.unwrap();
        assert_eq!(names, vec!["Wooden Spoon", "wooden spoon"]);

        let names = store.names_containing("oo", 2).await.unwrap();
        assert_eq!(names, vec!["Wooden Spoon", "Cool Fan"]);
    }

    #[tokio::test]
    async fn test_names_containing_is_literal() {
        let store = memory_store().await;
        store.insert_product(&product("Abc Kettle")).await.unwrap();
        store.insert_product(&product("A.C Adapter")).await.unwrap();
        store.insert_product(&product("ÉCLAIR Tin")).await.unwrap();

        assert_eq!(store.names_containing("a.c", 10).await.unwrap(), vec!["A.C Adapter"]);
        assert!(store.names_containing("%", 10).await.unwrap().is_empty());
        assert_eq!(store.names_containing("éclair", 10).await.unwrap(), vec!["ÉCLAIR Tin"]);
    }

    #[tokio::test]
    async fn test_list_shop_products_newest_first() {
        let store = memory_store().await;
        for (name, shop) in [("Oak Lamp", "s1"), ("Pine Desk", "s2"), ("Oak Chair", "s1")] {
            store
                .insert_product(&NewProduct {
                    shop_id: shop.to_string(),
                    ..product(name)
                })
                .await
                .unwrap();
        }

        let names: Vec<String> = store
            .list_shop_products("s1")
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Oak Chair", "Oak Lamp"]);

        let all = store.list_products().await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].name, "Oak Chair");
    }

    #[tokio::test]
    async fn test_import_file_makes_products_searchable() {
        let store = memory_store().await;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"name": "Wooden Spoon", "category": "Kitchen", "originalPrice": 4.5}},
                {{"name": "Cool Fan", "tags": "summer", "discountPrice": 19.0, "shopId": "s9"}}
            ]"#
        )
        .unwrap();

        let imported = store.import_file(file.path()).await.unwrap();
        assert_eq!(imported, 2);
        assert_eq!(store.count().await.unwrap(), 2);

        let hits = store
            .text_search(&TextQuery::parse("summer"), &SearchFilters::new(), 20)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].product.shop_id, "s9");
        assert!(hits[0].score > 0.0);

        let fetched = store.get_product(&hits[0].product.id).await.unwrap();
        assert_eq!(fetched, Some(hits[0].product.clone()));
    }

    #[tokio::test]
    async fn test_import_file_rejects_bad_json() {
        let store = memory_store().await;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        assert!(store.import_file(file.path()).await.is_err());
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
