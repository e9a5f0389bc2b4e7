use serde::{Deserialize, Serialize};

/// Product record / 商品记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub tags: String,
    pub original_price: Option<f64>,
    pub discount_price: Option<f64>,
    pub stock: i64,
    pub shop_id: String,
    pub sold_out: i64,
    pub created_at: String,
}

/// Product creation payload (catalog import) / 新建商品
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub original_price: Option<f64>,
    #[serde(default)]
    pub discount_price: Option<f64>,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub shop_id: String,
}

/// Ranked search hit / 带相关性分数的搜索结果
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SearchHit {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub product: Product,
    /// Weighted relevance, higher is better / 相关性分数
    pub score: f64,
}
