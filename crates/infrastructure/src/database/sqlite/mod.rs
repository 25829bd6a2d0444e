pub mod sqlite_assignment_store;
pub mod sqlite_bot_repository;
pub mod sqlite_delivery_repository;

pub use sqlite_assignment_store::SqliteAssignmentStore;
pub use sqlite_bot_repository::SqliteBotRepository;
pub use sqlite_delivery_repository::SqliteDeliveryRepository;
