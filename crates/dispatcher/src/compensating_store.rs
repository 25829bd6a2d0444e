use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, warn};

use fleet_core::{
    models::CommitOutcome,
    traits::{AssignmentStore, BotRepository, DeliveryRepository},
    FleetError, FleetResult,
};

/// 基于两次单实体条件写入的分配提交
///
/// 用于无法在一个事务里同时更新两个实体的存储：先占用机器人，再写配送单，
/// 配送单写入失败或前置条件失效时把机器人恢复为 `available`。
/// 恢复本身失败时记录错误日志并作为存储错误返回，不会被吞掉。
pub struct CompensatingAssignmentStore {
    deliveries: Arc<dyn DeliveryRepository>,
    bots: Arc<dyn BotRepository>,
}

impl CompensatingAssignmentStore {
    pub fn new(deliveries: Arc<dyn DeliveryRepository>, bots: Arc<dyn BotRepository>) -> Self {
        Self { deliveries, bots }
    }

    async fn revert_claim(&self, delivery_id: &str, bot_id: &str) -> FleetResult<()> {
        self.bots.release(bot_id).await.map_err(|e| {
            error!(
                "补偿失败: 机器人 {} 已被占用但配送单 {} 未写入，恢复机器人状态出错: {}",
                bot_id, delivery_id, e
            );
            FleetError::DatabaseOperation(format!(
                "机器人 {bot_id} 状态恢复失败，需要人工处理: {e}"
            ))
        })
    }
}

#[async_trait]
impl AssignmentStore for CompensatingAssignmentStore {
    async fn commit_assignment(
        &self,
        delivery_id: &str,
        bot_id: &str,
    ) -> FleetResult<CommitOutcome> {
        if !self.bots.claim(bot_id).await? {
            debug!("机器人 {} 已不可用", bot_id);
            return Ok(CommitOutcome::BotConflict);
        }

        match self.deliveries.mark_assigned(delivery_id, bot_id).await {
            Ok(true) => Ok(CommitOutcome::Committed),
            Ok(false) => {
                debug!("配送单 {} 已不是待分配状态，释放机器人 {}", delivery_id, bot_id);
                self.revert_claim(delivery_id, bot_id).await?;
                Ok(CommitOutcome::DeliveryConflict)
            }
            Err(e) => {
                warn!(
                    "写入配送单 {} 失败，释放机器人 {}: {}",
                    delivery_id, bot_id, e
                );
                self.revert_claim(delivery_id, bot_id).await?;
                Err(e)
            }
        }
    }
}
