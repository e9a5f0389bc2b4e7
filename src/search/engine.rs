//! Search engine - validation, query building and failure labelling / 搜索引擎
//!
//! Both operations are single read-only round trips to the product store.
//! No retries, no caching, no fallback.

use super::error::SearchError;
use super::schema::{
    effective_query, resolve_limit, SearchFilters, DEFAULT_SEARCH_LIMIT, DEFAULT_SUGGESTION_LIMIT,
};
use super::tokenizer::TextQuery;
use crate::models::SearchHit;
use crate::storage::ProductStore;

/// Relevance search over the weighted text index / 相关性搜索
///
/// A blank or absent query is a successful no-op and never reaches the store.
/// `limit` below one falls back to [`DEFAULT_SEARCH_LIMIT`].
pub async fn search_products(
    store: &dyn ProductStore,
    query: Option<&str>,
    filters: &SearchFilters,
    limit: Option<i64>,
) -> Result<Vec<SearchHit>, SearchError> {
    let Some(query) = effective_query(query) else {
        return Ok(Vec::new());
    };
    let limit = resolve_limit(limit, DEFAULT_SEARCH_LIMIT);

    let text = TextQuery::parse(query);
    if text.is_empty() {
        tracing::debug!("Search query {:?} has no searchable terms", query);
        return Ok(Vec::new());
    }

    tracing::debug!(query, ?filters, limit, "Product search");

    store.text_search(&text, filters, limit).await.map_err(|e| {
        tracing::error!("Product search error: {}", e);
        SearchError::Search(e)
    })
}

/// Name suggestions for autocomplete / 名称联想
///
/// Case-insensitive substring match on product names, store order,
/// duplicates kept. `limit` below one falls back to [`DEFAULT_SUGGESTION_LIMIT`].
pub async fn suggest_names(
    store: &dyn ProductStore,
    query: Option<&str>,
    limit: Option<i64>,
) -> Result<Vec<String>, SearchError> {
    let Some(fragment) = query.filter(|q| effective_query(Some(*q)).is_some()) else {
        return Ok(Vec::new());
    };
    let limit = resolve_limit(limit, DEFAULT_SUGGESTION_LIMIT);

    store.names_containing(fragment, limit).await.map_err(|e| {
        tracing::error!("Product name search error: {}", e);
        SearchError::Suggest(e)
    })
}
