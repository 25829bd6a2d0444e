use async_trait::async_trait;
use fleet_core::{
    errors::{FleetError, Result},
    models::CommitOutcome,
    traits::AssignmentStore,
};
use sqlx::PgPool;
use tracing::debug;

/// PostgreSQL 联合提交实现
///
/// 在同一事务内先条件更新机器人、再条件更新配送单，任一更新影响0行即回滚。
/// 所有事务都按“机器人 → 配送单”的顺序加行锁，不会形成等待环。
pub struct PostgresAssignmentStore {
    pool: PgPool,
}

impl PostgresAssignmentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AssignmentStore for PostgresAssignmentStore {
    async fn commit_assignment(&self, delivery_id: &str, bot_id: &str) -> Result<CommitOutcome> {
        let mut tx = self.pool.begin().await.map_err(FleetError::Database)?;

        let bot_updated =
            sqlx::query("UPDATE bots SET status = 'busy' WHERE id = $1 AND status = 'available'")
                .bind(bot_id)
                .execute(&mut *tx)
                .await
                .map_err(FleetError::Database)?
                .rows_affected();

        if bot_updated == 0 {
            tx.rollback().await.map_err(FleetError::Database)?;
            debug!("机器人 {} 已不可用，回滚分配", bot_id);
            return Ok(CommitOutcome::BotConflict);
        }

        let delivery_updated = sqlx::query(
            "UPDATE deliveries SET state = 'assigned', assigned_bot_id = $2 WHERE id = $1 AND state = 'pending'",
        )
        .bind(delivery_id)
        .bind(bot_id)
        .execute(&mut *tx)
        .await
        .map_err(FleetError::Database)?
        .rows_affected();

        if delivery_updated == 0 {
            tx.rollback().await.map_err(FleetError::Database)?;
            debug!("配送单 {} 已不是待分配状态，回滚分配", delivery_id);
            return Ok(CommitOutcome::DeliveryConflict);
        }

        tx.commit().await.map_err(FleetError::Database)?;
        debug!("提交分配成功: {} -> {}", delivery_id, bot_id);
        Ok(CommitOutcome::Committed)
    }
}
