use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{FleetError, Result};
use crate::geo::Coordinate;

/// 配送机器人
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bot {
    pub id: String,
    pub status: BotStatus,
    pub location: Coordinate,
    pub zone_id: String,
}

/// 机器人状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BotStatus {
    #[default]
    Available,
    Busy,
}

impl BotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BotStatus::Available => "available",
            BotStatus::Busy => "busy",
        }
    }
}

impl fmt::Display for BotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BotStatus {
    type Err = FleetError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "available" => Ok(BotStatus::Available),
            "busy" => Ok(BotStatus::Busy),
            other => Err(FleetError::Serialization(format!("无效的机器人状态: {other}"))),
        }
    }
}

/// 注册机器人请求
///
/// 新机器人总是 `available`；`busy` 只能由分配提交产生，请求里不接受 `status`。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewBot {
    pub location: Coordinate,
    pub zone_id: String,
}

impl Bot {
    pub fn new(request: NewBot) -> Result<Self> {
        request.location.validate()?;
        if request.zone_id.trim().is_empty() {
            return Err(FleetError::Validation("zone_id不能为空".to_string()));
        }
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            status: BotStatus::Available,
            location: request.location,
            zone_id: request.zone_id,
        })
    }

    pub fn is_available(&self) -> bool {
        self.status == BotStatus::Available
    }

    /// 是否可作为指定区域的候选
    pub fn is_candidate_for(&self, zone_id: &str) -> bool {
        self.is_available() && self.zone_id == zone_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_bot_defaults_to_available() {
        let request: NewBot = serde_json::from_str(
            r#"{"location": {"lat": 40.7, "lon": -74.0}, "zone_id": "Z1"}"#,
        )
        .unwrap();
        let bot = Bot::new(request).unwrap();
        assert_eq!(bot.status, BotStatus::Available);
        assert!(bot.is_candidate_for("Z1"));
        assert!(!bot.is_candidate_for("Z2"));
    }

    #[test]
    fn test_status_in_request_is_rejected() {
        let result = serde_json::from_str::<NewBot>(
            r#"{"location": {"lat": 40.7, "lon": -74.0}, "zone_id": "Z1", "status": "busy"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_busy_bot_is_not_candidate() {
        let mut bot = Bot::new(NewBot {
            location: Coordinate::new(0.0, 0.0),
            zone_id: "Z1".to_string(),
        })
        .unwrap();
        bot.status = BotStatus::Busy;
        assert!(!bot.is_available());
        assert!(!bot.is_candidate_for("Z1"));
    }

    #[test]
    fn test_new_bot_validation() {
        let bad_location = NewBot {
            location: Coordinate::new(95.0, 0.0),
            zone_id: "Z1".to_string(),
        };
        assert!(matches!(
            Bot::new(bad_location),
            Err(FleetError::InvalidCoordinate(_))
        ));

        let no_zone = NewBot {
            location: Coordinate::new(0.0, 0.0),
            zone_id: String::new(),
        };
        assert!(matches!(Bot::new(no_zone), Err(FleetError::Validation(_))));
    }

    #[test]
    fn test_status_string_mapping() {
        assert_eq!("busy".parse::<BotStatus>().unwrap(), BotStatus::Busy);
        assert_eq!(BotStatus::Available.to_string(), "available");
        assert!("offline".parse::<BotStatus>().is_err());
    }
}
