//! Search module - relevance search and name suggestions / 搜索模块
//!
//! Architecture principles / 架构原则：
//! - Search only validates input, builds the query and labels failures
//! - Matching and ranking are delegated to the product store's text index
//! - Call direction: API → Search → Storage (unidirectional) / 调用方向
//!
//! Index features / 索引特性：
//! - Weighted fields: name=5, description=3, category=2, tags=1
//! - Case and diacritic insensitive, English stemming
//! - Category and price filters composed with AND

pub mod engine;
pub mod error;
pub mod schema;
pub mod tokenizer;

pub use engine::{search_products, suggest_names};
pub use error::SearchError;
pub use schema::{SearchFilters, DEFAULT_SEARCH_LIMIT, DEFAULT_SUGGESTION_LIMIT};
pub use tokenizer::TextQuery;
