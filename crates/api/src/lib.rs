//! # Fleet API
//!
//! 配送单与机器人管理、机器人分配的 REST 接口。
//!
//! ## API 端点
//!
//! - `GET /health` - 健康检查
//! - `POST /deliveries` - 创建配送单
//! - `GET /deliveries/{id}` - 获取配送单
//! - `GET /deliveries/creator/{creator_id}` - 按创建者查询
//! - `GET /deliveries/by-date?date=YYYY-MM-DD` - 按创建日期（UTC）查询
//! - `PUT /deliveries/assign-bot/{id}` - 为配送单分配最近的可用机器人
//! - `POST /bots` - 注册机器人
//! - `GET /bots/{id}` - 获取机器人
//! - `GET /bots/by-zone/{zone_id}` - 区域内全部机器人
//! - `GET /metrics` - Prometheus 指标（启用时）
//!
//! ## 响应格式
//!
//! ```json
//! { "success": true, "data": { ... }, "message": null, "timestamp": "2024-01-01T00:00:00Z" }
//! ```
//!
//! 错误响应：
//!
//! ```json
//! { "success": false, "error": { "code": "no_bot_available", "message": "..." }, "timestamp": "..." }
//! ```
//!
//! | 错误 | 状态码 |
//! |------|--------|
//! | 配送单/机器人不存在 | 404 |
//! | 配送单已分配 | 409 |
//! | 区域内没有可用机器人 | 503 |
//! | 参数错误、坐标越界 | 400 |
//! | 存储故障 | 500 |

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod validation;

use std::time::Duration;

use axum::Router;
use fleet_core::config::AppConfig;
use tower::ServiceBuilder;

use middleware::{cors_layer, request_logging, request_timeout, trace_layer};
pub use routes::{create_routes, AppState};

/// 创建完整的API应用
pub fn create_app(state: AppState, config: &AppConfig) -> Router {
    let timeout = Duration::from_secs(config.api.request_timeout_seconds);

    let router = create_routes(state, &config.observability.metrics_endpoint).layer(
        ServiceBuilder::new()
            .layer(trace_layer())
            .layer(axum::middleware::from_fn(request_logging))
            .layer(axum::middleware::from_fn_with_state(timeout, request_timeout)),
    );

    if config.api.cors_enabled {
        router.layer(cors_layer(&config.api.cors_origins))
    } else {
        router
    }
}
