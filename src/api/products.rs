use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use storefront_backend::models::Product;

use crate::api::ApiError;
use crate::state::AppState;

/// 商品列表响应
#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub success: bool,
    pub products: Vec<Product>,
}

/// GET /api/v2/product/get-all-products - 全部商品（最新优先）
pub async fn get_all_products(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ProductListResponse>, ApiError> {
    let products = state.store.list_products().await?;
    Ok(Json(ProductListResponse {
        success: true,
        products,
    }))
}

/// GET /api/v2/product/get-all-products-shop/:id - 店铺商品
pub async fn get_shop_products(
    State(state): State<Arc<AppState>>,
    Path(shop_id): Path<String>,
) -> Result<Json<ProductListResponse>, ApiError> {
    let products = state.store.list_shop_products(&shop_id).await?;
    Ok(Json(ProductListResponse {
        success: true,
        products,
    }))
}
