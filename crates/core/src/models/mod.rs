//! # 数据模型
//!
//! 配送单、机器人与分配结果。
//!
//! ## 状态流转
//!
//! ```text
//! Delivery: pending ──assign──▶ assigned
//! Bot:      available ──assign──▶ busy
//! ```
//!
//! 两个迁移只能由分配协调器在一次条件提交中同时完成。

pub mod assignment;
pub mod bot;
pub mod delivery;

pub use assignment::*;
pub use bot::*;
pub use delivery::*;
