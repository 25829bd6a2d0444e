use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::IntoResponse,
    Json,
};
use fleet_core::{
    models::{Bot, NewBot},
    FleetError,
};
use tracing::info;

use crate::{
    error::ApiResult,
    handlers::bad_body,
    response::{created, success},
    routes::AppState,
    validation::require_id,
};

/// 注册机器人
pub async fn create_bot(
    State(state): State<AppState>,
    body: Result<Json<NewBot>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = body.map_err(bad_body)?;
    let bot = Bot::new(request)?;
    let bot = state.bots.create(&bot).await?;

    info!("注册机器人: {} (区域: {}, 状态: {})", bot.id, bot.zone_id, bot.status);
    Ok(created(bot))
}

pub async fn get_bot(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = require_id("机器人ID", &id)?;
    let bot = state
        .bots
        .get_by_id(id)
        .await?
        .ok_or_else(|| FleetError::BotNotFound { id: id.to_string() })?;
    Ok(success(bot))
}

/// 区域内全部机器人
pub async fn list_bots_by_zone(
    State(state): State<AppState>,
    Path(zone_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let zone_id = require_id("区域ID", &zone_id)?;
    let bots = state.bots.list_by_zone(zone_id).await?;
    Ok(success(bots))
}
