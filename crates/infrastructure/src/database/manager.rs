use std::sync::Arc;
use std::time::Duration;

use fleet_core::{config::DatabaseConfig, FleetError, FleetResult};
use sqlx::postgres::PgPoolOptions;
use sqlx::sqlite::SqlitePoolOptions;
use tracing::info;

use super::postgres::{PostgresAssignmentStore, PostgresBotRepository, PostgresDeliveryRepository};
use super::schema::{POSTGRES_SCHEMA, SQLITE_SCHEMA};
use super::sqlite::{SqliteAssignmentStore, SqliteBotRepository, SqliteDeliveryRepository};
use crate::FleetStores;

/// Database type detection
#[derive(Debug, Clone, PartialEq)]
pub enum DatabaseType {
    PostgreSQL,
    SQLite,
}

impl DatabaseType {
    pub fn from_url(url: &str) -> Self {
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            DatabaseType::PostgreSQL
        } else {
            DatabaseType::SQLite
        }
    }
}

/// Database connection pool
pub enum DatabasePool {
    PostgreSQL(sqlx::PgPool),
    SQLite(sqlx::SqlitePool),
}

impl DatabasePool {
    /// Create pool from configuration with automatic type detection
    pub async fn connect(config: &DatabaseConfig) -> FleetResult<Self> {
        let acquire_timeout = Duration::from_secs(config.connection_timeout_seconds);
        let idle_timeout = Duration::from_secs(config.idle_timeout_seconds);

        match DatabaseType::from_url(&config.url) {
            DatabaseType::PostgreSQL => {
                let pool = PgPoolOptions::new()
                    .max_connections(config.max_connections)
                    .min_connections(config.min_connections)
                    .acquire_timeout(acquire_timeout)
                    .idle_timeout(idle_timeout)
                    .connect(&config.url)
                    .await
                    .map_err(FleetError::Database)?;
                Ok(DatabasePool::PostgreSQL(pool))
            }
            DatabaseType::SQLite => {
                // 每个 :memory: 连接都是独立的数据库，只能保留唯一一条永不过期的连接
                let options = if config.url.contains(":memory:") {
                    SqlitePoolOptions::new()
                        .max_connections(1)
                        .min_connections(1)
                        .idle_timeout(None)
                        .max_lifetime(None)
                } else {
                    SqlitePoolOptions::new()
                        .max_connections(config.max_connections)
                        .min_connections(config.min_connections)
                        .idle_timeout(idle_timeout)
                };
                let pool = options
                    .acquire_timeout(acquire_timeout)
                    .connect(&config.url)
                    .await
                    .map_err(FleetError::Database)?;
                Ok(DatabasePool::SQLite(pool))
            }
        }
    }

    pub fn database_type(&self) -> DatabaseType {
        match self {
            DatabasePool::PostgreSQL(_) => DatabaseType::PostgreSQL,
            DatabasePool::SQLite(_) => DatabaseType::SQLite,
        }
    }

    pub async fn health_check(&self) -> FleetResult<()> {
        match self {
            DatabasePool::PostgreSQL(pool) => {
                sqlx::query("SELECT 1")
                    .execute(pool)
                    .await
                    .map_err(FleetError::Database)?;
            }
            DatabasePool::SQLite(pool) => {
                sqlx::query("SELECT 1")
                    .execute(pool)
                    .await
                    .map_err(FleetError::Database)?;
            }
        }
        Ok(())
    }

    pub async fn close(&self) {
        match self {
            DatabasePool::PostgreSQL(pool) => pool.close().await,
            DatabasePool::SQLite(pool) => pool.close().await,
        }
    }
}

/// Unified database manager
pub struct DatabaseManager {
    pool: DatabasePool,
}

impl DatabaseManager {
    /// Connect and make sure the schema exists
    pub async fn new(config: &DatabaseConfig) -> FleetResult<Self> {
        let pool = DatabasePool::connect(config).await?;
        let manager = Self { pool };
        manager.migrate().await?;
        info!("数据库已就绪: {:?}", manager.database_type());
        Ok(manager)
    }

    /// Shortcut for tests and tools that only have a URL at hand
    pub async fn from_url(url: &str, max_connections: u32) -> FleetResult<Self> {
        let config = DatabaseConfig {
            url: url.to_string(),
            max_connections,
            min_connections: 1.min(max_connections),
            ..DatabaseConfig::default()
        };
        Self::new(&config).await
    }

    pub fn database_type(&self) -> DatabaseType {
        self.pool.database_type()
    }

    pub async fn health_check(&self) -> FleetResult<()> {
        self.pool.health_check().await
    }

    pub async fn close(&self) {
        self.pool.close().await
    }

    /// Create tables and indexes when missing
    pub async fn migrate(&self) -> FleetResult<()> {
        match &self.pool {
            DatabasePool::PostgreSQL(pool) => {
                for statement in POSTGRES_SCHEMA {
                    sqlx::query(statement)
                        .execute(pool)
                        .await
                        .map_err(FleetError::Database)?;
                }
            }
            DatabasePool::SQLite(pool) => {
                for statement in SQLITE_SCHEMA {
                    sqlx::query(statement)
                        .execute(pool)
                        .await
                        .map_err(FleetError::Database)?;
                }
            }
        }
        Ok(())
    }

    /// Repositories and the joint-commit store sharing this pool
    pub fn stores(&self) -> FleetStores {
        match &self.pool {
            DatabasePool::PostgreSQL(pool) => FleetStores {
                deliveries: Arc::new(PostgresDeliveryRepository::new(pool.clone())),
                bots: Arc::new(PostgresBotRepository::new(pool.clone())),
                assignments: Arc::new(PostgresAssignmentStore::new(pool.clone())),
            },
            DatabasePool::SQLite(pool) => FleetStores {
                deliveries: Arc::new(SqliteDeliveryRepository::new(pool.clone())),
                bots: Arc::new(SqliteBotRepository::new(pool.clone())),
                assignments: Arc::new(SqliteAssignmentStore::new(pool.clone())),
            },
        }
    }
}
