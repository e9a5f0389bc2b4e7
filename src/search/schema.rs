//! Search query schema / 搜索查询定义

use serde::{Deserialize, Serialize};

/// Default number of relevance search results / 默认搜索结果数
pub const DEFAULT_SEARCH_LIMIT: usize = 20;
/// Default number of name suggestions / 默认联想结果数
pub const DEFAULT_SUGGESTION_LIMIT: usize = 10;

/// Text index fields and their relevance weights / 文本索引字段及权重
///
/// Order matches the column order of the `products_fts` table.
pub const FIELD_WEIGHTS: [(&str, f64); 4] = [
    ("name", 5.0),
    ("description", 3.0),
    ("category", 2.0),
    ("tags", 1.0),
];

/// Optional filters narrowing a relevance search / 搜索过滤条件
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    /// Exact category match / 分类精确匹配
    pub category: Option<String>,
    /// Lower price bound (inclusive) / 最低价格
    pub min_price: Option<f64>,
    /// Upper price bound (inclusive) / 最高价格
    pub max_price: Option<f64>,
}

impl SearchFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_min_price(mut self, price: f64) -> Self {
        self.min_price = Some(price);
        self
    }

    pub fn with_max_price(mut self, price: f64) -> Self {
        self.max_price = Some(price);
        self
    }

    /// Category to match, blank categories count as absent / 有效分类
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref().filter(|c| !c.is_empty())
    }

    pub fn has_price_bound(&self) -> bool {
        self.min_price.is_some() || self.max_price.is_some()
    }

    /// No filter clause needed / 无过滤条件
    pub fn is_empty(&self) -> bool {
        self.category().is_none() && !self.has_price_bound()
    }
}

/// Resolve a requested result bound, falling back when absent or below one / 解析结果数量
pub fn resolve_limit(requested: Option<i64>, default: usize) -> usize {
    match requested {
        Some(n) if n >= 1 => usize::try_from(n).unwrap_or(default),
        _ => default,
    }
}

/// Returns the query text when there is something to search for / 有效查询
pub fn effective_query(query: Option<&str>) -> Option<&str> {
    query.map(str::trim).filter(|q| !q.is_empty())
}
