//! 请求参数校验

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use crate::error::ApiError;

/// 路径中的ID不能为空白
pub fn require_id<'a>(name: &str, value: &'a str) -> Result<&'a str, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::BadRequest(format!("{name}不能为空")));
    }
    Ok(trimmed)
}

/// 把 `YYYY-MM-DD` 解析为该UTC日的半开区间 `[00:00, 次日00:00)`
pub fn utc_day_range(date: Option<&str>) -> Result<(DateTime<Utc>, DateTime<Utc>), ApiError> {
    let raw = date
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| ApiError::BadRequest("缺少查询参数 date (YYYY-MM-DD)".to_string()))?;

    let day = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ApiError::BadRequest(format!("日期格式无效: {raw}，应为 YYYY-MM-DD")))?;
    let start = Utc.from_utc_datetime(&day.and_time(chrono::NaiveTime::MIN));

    Ok((start, start + Duration::days(1)))
}
