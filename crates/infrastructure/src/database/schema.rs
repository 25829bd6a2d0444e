//! 建表语句
//!
//! `assigned_bot_id` 上的部分唯一索引保证同一个机器人不会同时绑定两个配送单。

pub const POSTGRES_SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS deliveries (
        id TEXT PRIMARY KEY,
        creation_timestamp TIMESTAMPTZ NOT NULL,
        state TEXT NOT NULL CHECK (state IN ('pending', 'assigned')),
        pickup_lat DOUBLE PRECISION NOT NULL,
        pickup_lon DOUBLE PRECISION NOT NULL,
        dropoff_lat DOUBLE PRECISION NOT NULL,
        dropoff_lon DOUBLE PRECISION NOT NULL,
        zone_id TEXT NOT NULL,
        creator_id TEXT NOT NULL,
        assigned_bot_id TEXT,
        CHECK ((state = 'assigned') = (assigned_bot_id IS NOT NULL))
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_deliveries_creator ON deliveries (creator_id)",
    "CREATE INDEX IF NOT EXISTS idx_deliveries_created ON deliveries (creation_timestamp)",
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_deliveries_assigned_bot ON deliveries (assigned_bot_id) WHERE assigned_bot_id IS NOT NULL",
    r#"
    CREATE TABLE IF NOT EXISTS bots (
        id TEXT PRIMARY KEY,
        status TEXT NOT NULL CHECK (status IN ('available', 'busy')),
        lat DOUBLE PRECISION NOT NULL,
        lon DOUBLE PRECISION NOT NULL,
        zone_id TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_bots_zone_status ON bots (zone_id, status)",
];

pub const SQLITE_SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS deliveries (
        id TEXT PRIMARY KEY,
        creation_timestamp TEXT NOT NULL,
        state TEXT NOT NULL CHECK (state IN ('pending', 'assigned')),
        pickup_lat REAL NOT NULL,
        pickup_lon REAL NOT NULL,
        dropoff_lat REAL NOT NULL,
        dropoff_lon REAL NOT NULL,
        zone_id TEXT NOT NULL,
        creator_id TEXT NOT NULL,
        assigned_bot_id TEXT,
        CHECK ((state = 'assigned') = (assigned_bot_id IS NOT NULL))
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_deliveries_creator ON deliveries (creator_id)",
    "CREATE INDEX IF NOT EXISTS idx_deliveries_created ON deliveries (creation_timestamp)",
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_deliveries_assigned_bot ON deliveries (assigned_bot_id) WHERE assigned_bot_id IS NOT NULL",
    r#"
    CREATE TABLE IF NOT EXISTS bots (
        id TEXT PRIMARY KEY,
        status TEXT NOT NULL CHECK (status IN ('available', 'busy')),
        lat REAL NOT NULL,
        lon REAL NOT NULL,
        zone_id TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_bots_zone_status ON bots (zone_id, status)",
];
