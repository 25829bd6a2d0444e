use async_trait::async_trait;
use fleet_core::{
    errors::{FleetError, Result},
    models::CommitOutcome,
    traits::AssignmentStore,
};
use sqlx::SqlitePool;
use tracing::debug;

/// SQLite 联合提交实现
///
/// 事务的第一条语句就是写操作，SQLite 会立即取得写锁，
/// 并发的提交在 busy_timeout 内排队执行。
pub struct SqliteAssignmentStore {
    pool: SqlitePool,
}

impl SqliteAssignmentStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AssignmentStore for SqliteAssignmentStore {
    async fn commit_assignment(&self, delivery_id: &str, bot_id: &str) -> Result<CommitOutcome> {
        let mut tx = self.pool.begin().await.map_err(FleetError::Database)?;

        let bot_updated =
            sqlx::query("UPDATE bots SET status = 'busy' WHERE id = ? AND status = 'available'")
                .bind(bot_id)
                .execute(&mut *tx)
                .await
                .map_err(FleetError::Database)?
                .rows_affected();

        if bot_updated == 0 {
            tx.rollback().await.map_err(FleetError::Database)?;
            return Ok(CommitOutcome::BotConflict);
        }

        let delivery_updated = sqlx::query(
            "UPDATE deliveries SET state = 'assigned', assigned_bot_id = ? WHERE id = ? AND state = 'pending'",
        )
        .bind(bot_id)
        .bind(delivery_id)
        .execute(&mut *tx)
        .await
        .map_err(FleetError::Database)?
        .rows_affected();

        if delivery_updated == 0 {
            tx.rollback().await.map_err(FleetError::Database)?;
            return Ok(CommitOutcome::DeliveryConflict);
        }

        tx.commit().await.map_err(FleetError::Database)?;
        debug!("提交分配成功: {} -> {}", delivery_id, bot_id);
        Ok(CommitOutcome::Committed)
    }
}
