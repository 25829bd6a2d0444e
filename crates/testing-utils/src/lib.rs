//! # Fleet Testing Utils
//!
//! Shared testing utilities for the fleet assignment engine.
//!
//! ## Features
//!
//! - **Test Data Builders**: deliveries and bots with sensible defaults
//! - **Fault Injection**: repository wrappers that fail on demand, for exercising
//!   the compensation and error paths
//! - **Invariant Checks**: whole-store consistency assertions for concurrency tests
//! - **Database Test Containers**: PostgreSQL container for integration tests
//!
//! ## Usage
//!
//! ```toml
//! [dev-dependencies]
//! fleet-testing-utils = { path = "../testing-utils" }
//! ```
//!
//! ```rust,ignore
//! use fleet_testing_utils::{BotBuilder, DeliveryBuilder};
//!
//! let bot = BotBuilder::new().with_id("B1").at(40.7138, -74.0070).build();
//! let delivery = DeliveryBuilder::new().with_id("D1").build();
//! ```

pub mod builders;
pub mod containers;
pub mod helpers;
pub mod mocks;

pub use builders::*;
pub use containers::*;
pub use helpers::*;
pub use mocks::*;
