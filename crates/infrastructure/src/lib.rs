//! 记录存储实现
//!
//! - [`memory::InMemoryFleetStore`]：进程内存储，嵌入模式与测试使用
//! - [`database::DatabaseManager`]：基于 sqlx 的 PostgreSQL / SQLite 存储

pub mod database;
pub mod memory;

use std::sync::Arc;

use fleet_core::traits::{AssignmentStore, BotRepository, DeliveryRepository};

pub use database::{DatabaseManager, DatabaseType};
pub use memory::InMemoryFleetStore;

/// 同一后端上的一组存储接口
#[derive(Clone)]
pub struct FleetStores {
    pub deliveries: Arc<dyn DeliveryRepository>,
    pub bots: Arc<dyn BotRepository>,
    pub assignments: Arc<dyn AssignmentStore>,
}

impl FleetStores {
    /// 三个接口共享同一个内存存储
    pub fn in_memory(store: Arc<InMemoryFleetStore>) -> Self {
        Self {
            deliveries: store.clone(),
            bots: store.clone(),
            assignments: store,
        }
    }
}
