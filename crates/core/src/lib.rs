//! # Fleet Core
//!
//! 配送机器人分配系统的核心定义：数据模型、地理计算、存储接口、错误类型与配置。
//!
//! 其他 crate 只依赖这里的抽象：
//!
//! - [`models`] - 配送单、机器人、分配结果
//! - [`geo`] - 坐标与 haversine 距离
//! - [`traits`] - 记录存储接口
//! - [`config`] - 应用配置
//! - [`errors`] - 统一错误类型

pub mod config;
pub mod errors;
pub mod geo;
pub mod models;
pub mod traits;

pub use errors::*;
pub use geo::{haversine_km, Coordinate};
pub use models::{
    Assignment, Bot, BotStatus, CommitOutcome, Delivery, DeliveryState, NewBot, NewDelivery,
};

/// 统一的Result类型
pub type FleetResult<T> = std::result::Result<T, FleetError>;
