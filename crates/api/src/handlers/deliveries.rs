use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    response::IntoResponse,
    Json,
};
use fleet_core::{
    models::{Delivery, NewDelivery},
    FleetError,
};
use serde::Deserialize;
use tracing::info;

use crate::{
    error::ApiResult,
    handlers::bad_body,
    response::{created, success, ApiResponse},
    routes::AppState,
    validation::{require_id, utc_day_range},
};

/// 按日期查询参数
#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

/// 创建配送单
pub async fn create_delivery(
    State(state): State<AppState>,
    body: Result<Json<NewDelivery>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = body.map_err(bad_body)?;
    let delivery = Delivery::new(request)?;
    let delivery = state.deliveries.create(&delivery).await?;

    info!("创建配送单: {} (区域: {})", delivery.id, delivery.zone_id);
    Ok(created(delivery))
}

/// 获取单个配送单
pub async fn get_delivery(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = require_id("配送单ID", &id)?;
    let delivery = state
        .deliveries
        .get_by_id(id)
        .await?
        .ok_or_else(|| FleetError::DeliveryNotFound { id: id.to_string() })?;
    Ok(success(delivery))
}

/// 获取某个用户创建的配送单
pub async fn list_deliveries_by_creator(
    State(state): State<AppState>,
    Path(creator_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let creator_id = require_id("创建者ID", &creator_id)?;
    let deliveries = state.deliveries.list_by_creator(creator_id).await?;
    Ok(success(deliveries))
}

/// 获取某个UTC日创建的配送单
pub async fn list_deliveries_by_date(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> ApiResult<impl IntoResponse> {
    let (from, to) = utc_day_range(query.date.as_deref())?;
    let deliveries = state.deliveries.list_created_between(from, to).await?;
    Ok(success(deliveries))
}

/// 为配送单分配机器人
pub async fn assign_bot(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = require_id("配送单ID", &id)?;
    let assignment = state.coordinator.assign(id).await?;
    let message = format!("已分配机器人 {}", assignment.bot_id);
    Ok(ApiResponse::success(assignment).with_message(message))
}
