pub mod postgres_assignment_store;
pub mod postgres_bot_repository;
pub mod postgres_delivery_repository;

pub use postgres_assignment_store::PostgresAssignmentStore;
pub use postgres_bot_repository::PostgresBotRepository;
pub use postgres_delivery_repository::PostgresDeliveryRepository;
