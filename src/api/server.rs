use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};

/// GET /api/health - 健康检查
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "Storefront 服务运行正常",
        "build_time": env!("BUILD_TIME"),
    }))
}

/// GET /api/v2/product/test - 商品接口连通性测试
pub async fn product_api_test() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "Product API is working!",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}
