use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use storefront_backend::search::schema::resolve_limit;
use storefront_backend::search::{search_products, suggest_names, SearchFilters};

use super::types::*;
use crate::api::ApiError;
use crate::state::AppState;

const QUERY_REQUIRED: &str = "Search query is required";

/// GET /api/v2/product/search - 商品搜索
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let query = required_query(params.q.as_deref())?;

    let filters = SearchFilters {
        category: params.category.filter(|c| !c.is_empty()),
        min_price: parse_price("minPrice", params.min_price.as_deref()),
        max_price: parse_price("maxPrice", params.max_price.as_deref()),
    };
    let limit = resolve_limit(parse_limit(params.limit.as_deref()), state.search.default_limit);

    let products = search_products(&*state.store, Some(query), &filters, Some(limit as i64)).await?;

    Ok(Json(SearchResponse {
        success: true,
        count: products.len(),
        products,
    }))
}

/// GET /api/v2/product/search-suggestions - 名称联想
pub async fn search_suggestions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SuggestionParams>,
) -> Result<Json<SuggestionResponse>, ApiError> {
    let query = required_query(params.q.as_deref())?;
    let limit = resolve_limit(parse_limit(params.limit.as_deref()), state.search.suggestion_limit);

    let suggestions = suggest_names(&*state.store, Some(query), Some(limit as i64)).await?;

    Ok(Json(SuggestionResponse {
        success: true,
        suggestions,
    }))
}

/// Missing or empty `q` is a client error; whitespace is passed through / 检查查询参数
fn required_query(q: Option<&str>) -> Result<&str, ApiError> {
    q.filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::bad_request(QUERY_REQUIRED))
}
