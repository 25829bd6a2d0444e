//! 机器人与配送单的匹配和分配
//!
//! - [`ZoneIndex`]：区域内可用机器人的只读视图
//! - [`MatchSelector`]：按大圆距离选择最近的可用机器人
//! - [`AssignmentCoordinator`]：加载、选择、条件提交与冲突重试
//! - [`CompensatingAssignmentStore`]：无联合事务时的两步写入加补偿

pub mod compensating_store;
pub mod coordinator;
pub mod keyed_lock;
pub mod metrics;
pub mod selector;
pub mod zone_index;

pub use compensating_store::CompensatingAssignmentStore;
pub use coordinator::AssignmentCoordinator;
pub use selector::{nearest_candidate, MatchSelector, Selection};
pub use zone_index::ZoneIndex;
