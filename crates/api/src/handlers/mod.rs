pub mod bots;
pub mod deliveries;
pub mod health;
pub mod metrics;

use axum::extract::rejection::JsonRejection;

use crate::error::ApiError;

/// 请求体解析失败统一按 400 返回
pub(crate) fn bad_body(rejection: JsonRejection) -> ApiError {
    ApiError::BadRequest(format!("请求体格式错误: {}", rejection.body_text()))
}
