//! Product store - the collection both search functions read from / 商品存储
//!
//! The store only exposes primitive read operations; validation, default
//! limits and error labelling belong to the search module.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::SearchHit;
use crate::search::schema::SearchFilters;
use crate::search::tokenizer::TextQuery;

pub mod sqlite;

pub use sqlite::SqliteProductStore;

/// Name of the text index table / 文本索引表名
pub const TEXT_INDEX_TABLE: &str = "products_fts";

/// Store-level fault / 存储错误
#[derive(Debug, Error)]
pub enum StoreError {
    /// The weighted text index is absent / 文本索引缺失
    #[error("text index required for text search: {0}")]
    IndexMissing(String),

    #[error("{0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err)
                if db_err.message().contains(&format!("no such table: {}", TEXT_INDEX_TABLE)) =>
            {
                StoreError::IndexMissing(db_err.message().to_string())
            }
            _ => StoreError::Database(err),
        }
    }
}

/// Product store interface / 商品存储接口
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Weighted full-text search, best match first / 加权全文搜索
    ///
    /// Filters AND with the text condition. Returns at most `limit` hits.
    async fn text_search(
        &self,
        query: &TextQuery,
        filters: &SearchFilters,
        limit: usize,
    ) -> Result<Vec<SearchHit>, StoreError>;

    /// Names containing `fragment`, case-insensitive, in insertion order / 名称子串匹配
    async fn names_containing(&self, fragment: &str, limit: usize) -> Result<Vec<String>, StoreError>;
}
