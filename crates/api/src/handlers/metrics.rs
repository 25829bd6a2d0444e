use axum::{extract::State, http::header, response::IntoResponse};

use crate::{error::ApiError, routes::AppState};

/// Prometheus 文本格式的指标
pub async fn render_metrics(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let handle = state
        .metrics
        .as_ref()
        .ok_or_else(|| ApiError::NotFound("指标未启用".to_string()))?;

    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    ))
}
