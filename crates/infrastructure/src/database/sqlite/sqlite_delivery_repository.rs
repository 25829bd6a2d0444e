use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fleet_core::{
    errors::{FleetError, Result},
    geo::Coordinate,
    models::{Delivery, DeliveryState},
    traits::DeliveryRepository,
};
use sqlx::{SqlitePool, Row};
use tracing::debug;

const DELIVERY_COLUMNS: &str = "id, creation_timestamp, state, pickup_lat, pickup_lon, dropoff_lat, dropoff_lon, zone_id, creator_id, assigned_bot_id";

/// SQLite 配送单仓储实现
pub struct SqliteDeliveryRepository {
    pool: SqlitePool,
}

impl SqliteDeliveryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// 将数据库行转换为Delivery模型
    fn row_to_delivery(row: &sqlx::sqlite::SqliteRow) -> Result<Delivery> {
        let state: String = row.try_get("state")?;
        Ok(Delivery {
            id: row.try_get("id")?,
            creation_timestamp: row.try_get("creation_timestamp")?,
            state: state.parse::<DeliveryState>()?,
            pickup: Coordinate::new(row.try_get("pickup_lat")?, row.try_get("pickup_lon")?),
            dropoff: Coordinate::new(row.try_get("dropoff_lat")?, row.try_get("dropoff_lon")?),
            zone_id: row.try_get("zone_id")?,
            creator_id: row.try_get("creator_id")?,
            assigned_bot_id: row.try_get("assigned_bot_id")?,
        })
    }
}

#[async_trait]
impl DeliveryRepository for SqliteDeliveryRepository {
    async fn create(&self, delivery: &Delivery) -> Result<Delivery> {
        sqlx::query(
            r#"
            INSERT INTO deliveries (id, creation_timestamp, state, pickup_lat, pickup_lon, dropoff_lat, dropoff_lon, zone_id, creator_id, assigned_bot_id)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&delivery.id)
        .bind(delivery.creation_timestamp)
        .bind(delivery.state.as_str())
        .bind(delivery.pickup.lat)
        .bind(delivery.pickup.lon)
        .bind(delivery.dropoff.lat)
        .bind(delivery.dropoff.lon)
        .bind(&delivery.zone_id)
        .bind(&delivery.creator_id)
        .bind(&delivery.assigned_bot_id)
        .execute(&self.pool)
        .await
        .map_err(FleetError::Database)?;

        debug!("创建配送单成功: {}", delivery.id);
        Ok(delivery.clone())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Delivery>> {
        let row = sqlx::query(&format!(
            "SELECT {DELIVERY_COLUMNS} FROM deliveries WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(FleetError::Database)?;

        row.as_ref().map(Self::row_to_delivery).transpose()
    }

    async fn list_by_creator(&self, creator_id: &str) -> Result<Vec<Delivery>> {
        let rows = sqlx::query(&format!(
            "SELECT {DELIVERY_COLUMNS} FROM deliveries WHERE creator_id = ? ORDER BY creation_timestamp, id"
        ))
        .bind(creator_id)
        .fetch_all(&self.pool)
        .await
        .map_err(FleetError::Database)?;

        rows.iter().map(Self::row_to_delivery).collect()
    }

    async fn list_created_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Delivery>> {
        let rows = sqlx::query(&format!(
            "SELECT {DELIVERY_COLUMNS} FROM deliveries WHERE creation_timestamp >= ? AND creation_timestamp < ? ORDER BY creation_timestamp, id"
        ))
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(FleetError::Database)?;

        rows.iter().map(Self::row_to_delivery).collect()
    }

    async fn mark_assigned(&self, delivery_id: &str, bot_id: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE deliveries SET state = 'assigned', assigned_bot_id = ? WHERE id = ? AND state = 'pending'",
        )
        .bind(bot_id)
        .bind(delivery_id)
        .execute(&self.pool)
        .await
        .map_err(FleetError::Database)?;

        Ok(result.rows_affected() == 1)
    }
}
