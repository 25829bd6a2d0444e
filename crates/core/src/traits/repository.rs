//! 记录存储接口定义
//!
//! 此模块定义了分配引擎依赖的持久化抽象：
//! - 配送单仓储接口 (DeliveryRepository)
//! - 机器人仓储接口 (BotRepository)
//! - 分配提交接口 (AssignmentStore)
//!
//! ## 设计原则
//!
//! ### 条件写入
//! 所有改变 `state` / `status` 的操作都是条件写入：只有当实体仍处于预期状态时
//! 才会生效，并通过返回值告诉调用方是否生效。并发请求因此无法重复占用同一个
//! 机器人或重复分配同一个配送单。
//!
//! ### 抽象解耦
//! 接口与具体实现分离，支持多种存储后端：
//! - 内存实现（嵌入模式与测试）
//! - PostgreSQL 实现
//! - SQLite 实现
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use fleet_core::traits::{AssignmentStore, BotRepository};
//!
//! async fn try_assign(
//!     bots: &dyn BotRepository,
//!     store: &dyn AssignmentStore,
//!     delivery_id: &str,
//! ) -> FleetResult<bool> {
//!     let candidates = bots.get_available_bots("Z1").await?;
//!     if let Some(bot) = candidates.first() {
//!         let outcome = store.commit_assignment(delivery_id, &bot.id).await?;
//!         return Ok(outcome.is_committed());
//!     }
//!     Ok(false)
//! }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{Bot, CommitOutcome, Delivery};
use crate::FleetResult;

/// 配送单仓储接口
#[async_trait]
pub trait DeliveryRepository: Send + Sync {
    /// 持久化一个新配送单，返回存储后的实体
    async fn create(&self, delivery: &Delivery) -> FleetResult<Delivery>;

    /// 根据ID获取配送单
    async fn get_by_id(&self, id: &str) -> FleetResult<Option<Delivery>>;

    /// 获取某个用户创建的全部配送单，按创建时间升序
    async fn list_by_creator(&self, creator_id: &str) -> FleetResult<Vec<Delivery>>;

    /// 获取创建时间位于 `[from, to)` 的配送单，按创建时间升序
    async fn list_created_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> FleetResult<Vec<Delivery>>;

    /// 条件写入：仅当配送单仍为 `pending` 时标记为 `assigned` 并绑定机器人
    ///
    /// 返回 `false` 表示配送单不存在或已不是待分配状态。
    async fn mark_assigned(&self, delivery_id: &str, bot_id: &str) -> FleetResult<bool>;
}

/// 机器人仓储接口
#[async_trait]
pub trait BotRepository: Send + Sync {
    /// 注册新机器人
    async fn create(&self, bot: &Bot) -> FleetResult<Bot>;

    /// 根据ID获取机器人
    async fn get_by_id(&self, id: &str) -> FleetResult<Option<Bot>>;

    /// 获取区域内全部机器人（不区分状态）
    async fn list_by_zone(&self, zone_id: &str) -> FleetResult<Vec<Bot>>;

    /// 获取区域内当前可用的机器人
    async fn get_available_bots(&self, zone_id: &str) -> FleetResult<Vec<Bot>>;

    /// 条件写入：仅当机器人仍为 `available` 时标记为 `busy`
    async fn claim(&self, bot_id: &str) -> FleetResult<bool>;

    /// 把 `busy` 的机器人恢复为 `available`
    ///
    /// 只用于分两步提交失败后的补偿，不是配送完成流程。
    async fn release(&self, bot_id: &str) -> FleetResult<()>;
}

/// 分配提交接口
///
/// 在一个原子单元内把配送单置为 `assigned`、把机器人置为 `busy`。
/// 任意一方的前置条件失效时不做任何修改，并返回对应的冲突结果。
#[async_trait]
pub trait AssignmentStore: Send + Sync {
    async fn commit_assignment(
        &self,
        delivery_id: &str,
        bot_id: &str,
    ) -> FleetResult<CommitOutcome>;
}
