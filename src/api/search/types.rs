use serde::{Deserialize, Serialize};

use storefront_backend::models::SearchHit;

/// GET /search query string / 搜索参数
///
/// Every field is kept as raw text so malformed numbers degrade to defaults
/// instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub q: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub limit: Option<String>,
}

/// GET /search-suggestions query string / 联想参数
#[derive(Debug, Default, Deserialize)]
pub struct SuggestionParams {
    pub q: Option<String>,
    pub limit: Option<String>,
}

/// 搜索响应
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub success: bool,
    pub count: usize,
    pub products: Vec<SearchHit>,
}

/// 联想响应
#[derive(Debug, Serialize)]
pub struct SuggestionResponse {
    pub success: bool,
    pub suggestions: Vec<String>,
}

/// Parse a numeric `limit`; fractions truncate, junk is ignored / 解析数量
pub fn parse_limit(raw: Option<&str>) -> Option<i64> {
    let value = raw?.trim().parse::<f64>().ok()?;
    value.is_finite().then(|| value.trunc() as i64)
}

/// Parse a price bound; blank means absent / 解析价格
pub fn parse_price(name: &str, raw: Option<&str>) -> Option<f64> {
    let raw = raw.map(str::trim).filter(|r| !r.is_empty())?;
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        _ => {
            tracing::warn!("Ignoring non-numeric {} filter: {:?}", name, raw);
            None
        }
    }
}
