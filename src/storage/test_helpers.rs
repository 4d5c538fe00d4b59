//! Shared test helpers for storage module tests.

#[cfg(test)]
use sqlx::sqlite::SqlitePoolOptions;
#[cfg(test)]
use sqlx::SqlitePool;

#[cfg(test)]
use crate::storage::{run_migrations, RecordStore};

/// Creates a test database pool with migrations applied.
/// Uses a single-connection in-memory database so every query sees the same data.
#[cfg(test)]
pub async fn create_test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create test database pool");
    run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

/// Creates a Record Store over a fresh in-memory database.
#[cfg(test)]
pub async fn create_test_store() -> RecordStore {
    RecordStore::new(create_test_pool().await)
}
