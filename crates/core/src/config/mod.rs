//! 配置管理
//!
//! 配置按以下顺序叠加，后者覆盖前者：
//!
//! 1. 内置默认值
//! 2. TOML 配置文件
//! 3. `FLEET_` 前缀的环境变量，层级用 `__` 分隔，例如 `FLEET_DATABASE__URL`
//!
//! ```rust,no_run
//! use fleet_core::config::AppConfig;
//!
//! let config = AppConfig::load(Some("config/fleet.toml")).expect("加载配置失败");
//! println!("监听地址: {}", config.api.bind_address);
//! ```

pub mod models;

pub use models::*;
