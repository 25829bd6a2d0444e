use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{FleetError, Result};
use crate::geo::Coordinate;

/// 配送单
///
/// `assigned_bot_id` 非空当且仅当 `state == Assigned`，且 `Pending → Assigned`
/// 只会发生一次。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delivery {
    pub id: String,
    pub creation_timestamp: DateTime<Utc>,
    pub state: DeliveryState,
    pub pickup: Coordinate,
    pub dropoff: Coordinate,
    pub zone_id: String,
    pub creator_id: String,
    pub assigned_bot_id: Option<String>,
}

/// 配送单状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryState {
    Pending,
    Assigned,
}

impl DeliveryState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryState::Pending => "pending",
            DeliveryState::Assigned => "assigned",
        }
    }
}

impl fmt::Display for DeliveryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryState {
    type Err = FleetError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(DeliveryState::Pending),
            "assigned" => Ok(DeliveryState::Assigned),
            other => Err(FleetError::Serialization(format!(
                "无效的配送单状态: {other}"
            ))),
        }
    }
}

/// 创建配送单请求（已由请求层解析）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDelivery {
    pub pickup: Coordinate,
    pub dropoff: Coordinate,
    pub zone_id: String,
    pub creator_id: String,
}

impl NewDelivery {
    pub fn validate(&self) -> Result<()> {
        self.pickup.validate()?;
        self.dropoff.validate()?;
        if self.zone_id.trim().is_empty() {
            return Err(FleetError::Validation("zone_id不能为空".to_string()));
        }
        if self.creator_id.trim().is_empty() {
            return Err(FleetError::Validation("creator_id不能为空".to_string()));
        }
        Ok(())
    }
}

impl Delivery {
    /// 校验请求并生成待分配的配送单
    pub fn new(request: NewDelivery) -> Result<Self> {
        request.validate()?;
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            creation_timestamp: Utc::now(),
            state: DeliveryState::Pending,
            pickup: request.pickup,
            dropoff: request.dropoff,
            zone_id: request.zone_id,
            creator_id: request.creator_id,
            assigned_bot_id: None,
        })
    }

    pub fn is_pending(&self) -> bool {
        self.state == DeliveryState::Pending && self.assigned_bot_id.is_none()
    }
}
