use async_trait::async_trait;
use fleet_core::{
    errors::{FleetError, Result},
    geo::Coordinate,
    models::{Bot, BotStatus},
    traits::BotRepository,
};
use sqlx::{SqlitePool, Row};
use tracing::debug;

/// SQLite 机器人仓储实现
pub struct SqliteBotRepository {
    pool: SqlitePool,
}

impl SqliteBotRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_bot(row: &sqlx::sqlite::SqliteRow) -> Result<Bot> {
        let status: String = row.try_get("status")?;
        Ok(Bot {
            id: row.try_get("id")?,
            status: status.parse::<BotStatus>()?,
            location: Coordinate::new(row.try_get("lat")?, row.try_get("lon")?),
            zone_id: row.try_get("zone_id")?,
        })
    }
}

#[async_trait]
impl BotRepository for SqliteBotRepository {
    async fn create(&self, bot: &Bot) -> Result<Bot> {
        sqlx::query("INSERT INTO bots (id, status, lat, lon, zone_id) VALUES (?, ?, ?, ?, ?)")
            .bind(&bot.id)
            .bind(bot.status.as_str())
            .bind(bot.location.lat)
            .bind(bot.location.lon)
            .bind(&bot.zone_id)
            .execute(&self.pool)
            .await
            .map_err(FleetError::Database)?;

        debug!("注册机器人成功: {}", bot.id);
        Ok(bot.clone())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Bot>> {
        let row = sqlx::query("SELECT id, status, lat, lon, zone_id FROM bots WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(FleetError::Database)?;

        row.as_ref().map(Self::row_to_bot).transpose()
    }

    async fn list_by_zone(&self, zone_id: &str) -> Result<Vec<Bot>> {
        let rows = sqlx::query(
            "SELECT id, status, lat, lon, zone_id FROM bots WHERE zone_id = ? ORDER BY id",
        )
        .bind(zone_id)
        .fetch_all(&self.pool)
        .await
        .map_err(FleetError::Database)?;

        rows.iter().map(Self::row_to_bot).collect()
    }

    async fn get_available_bots(&self, zone_id: &str) -> Result<Vec<Bot>> {
        let rows = sqlx::query(
            "SELECT id, status, lat, lon, zone_id FROM bots WHERE zone_id = ? AND status = ? ORDER BY id",
        )
        .bind(zone_id)
        .bind(BotStatus::Available.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(FleetError::Database)?;

        rows.iter().map(Self::row_to_bot).collect()
    }

    async fn claim(&self, bot_id: &str) -> Result<bool> {
        let result =
            sqlx::query("UPDATE bots SET status = 'busy' WHERE id = ? AND status = 'available'")
                .bind(bot_id)
                .execute(&self.pool)
                .await
                .map_err(FleetError::Database)?;

        Ok(result.rows_affected() == 1)
    }

    async fn release(&self, bot_id: &str) -> Result<()> {
        let result = sqlx::query("UPDATE bots SET status = 'available' WHERE id = ?")
            .bind(bot_id)
            .execute(&self.pool)
            .await
            .map_err(FleetError::Database)?;

        if result.rows_affected() == 0 {
            return Err(FleetError::BotNotFound {
                id: bot_id.to_string(),
            });
        }

        debug!("释放机器人: {}", bot_id);
        Ok(())
    }
}
