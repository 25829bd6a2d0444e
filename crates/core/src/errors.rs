use thiserror::Error;

/// 分配引擎错误类型定义
#[derive(Debug, Error)]
pub enum FleetError {
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("数据库操作错误: {0}")]
    DatabaseOperation(String),

    #[error("配送单未找到: {id}")]
    DeliveryNotFound { id: String },

    #[error("机器人未找到: {id}")]
    BotNotFound { id: String },

    #[error("配送单 {delivery_id} 已分配给机器人 {bot_id}")]
    AlreadyAssigned { delivery_id: String, bot_id: String },

    #[error("区域 {zone_id} 内没有可用机器人 (配送单: {delivery_id})")]
    NoBotAvailable {
        delivery_id: String,
        zone_id: String,
    },

    #[error("无效的坐标: {0}")]
    InvalidCoordinate(String),

    #[error("参数校验失败: {0}")]
    Validation(String),

    #[error("序列化错误: {0}")]
    Serialization(String),

    #[error("配置错误: {0}")]
    Configuration(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

impl FleetError {
    /// 记录存储无法完成读写
    pub fn is_store_failure(&self) -> bool {
        matches!(self, FleetError::Database(_) | FleetError::DatabaseOperation(_))
    }

    /// 调用方稍后重试可能成功
    pub fn is_retryable(&self) -> bool {
        matches!(self, FleetError::NoBotAvailable { .. }) || self.is_store_failure()
    }

    /// 用于日志与指标标签的稳定错误码
    pub fn code(&self) -> &'static str {
        match self {
            FleetError::Database(_) | FleetError::DatabaseOperation(_) => "store_failure",
            FleetError::DeliveryNotFound { .. } => "delivery_not_found",
            FleetError::BotNotFound { .. } => "bot_not_found",
            FleetError::AlreadyAssigned { .. } => "already_assigned",
            FleetError::NoBotAvailable { .. } => "no_bot_available",
            FleetError::InvalidCoordinate(_) => "invalid_coordinate",
            FleetError::Validation(_) => "validation",
            FleetError::Serialization(_) => "serialization",
            FleetError::Configuration(_) => "configuration",
            FleetError::Internal(_) => "internal",
        }
    }
}

impl From<serde_json::Error> for FleetError {
    fn from(err: serde_json::Error) -> Self {
        FleetError::Serialization(err.to_string())
    }
}

/// 统一的Result类型
pub type Result<T> = std::result::Result<T, FleetError>;
