// storage/mod.rs
// Record Store: SQLite persistence of shared IP addresses

pub mod migrations;
pub mod models;
pub mod pool;
mod queries;
pub mod report;
pub mod store;
#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used items
pub use migrations::run_migrations;
pub use models::{AddressRecord, StoreStats};
pub use pool::{init_db_pool_with_path, init_read_only_pool};
pub use report::ReportReader;
pub use store::RecordStore;
