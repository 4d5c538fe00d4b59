//! Database connection pool management.
//!
//! This module initializes and configures the SQLite connection pools:
//! - WAL mode enabled so readers never block on the pipeline's writes
//! - Automatic database file creation
//! - A separate read-only pool for the reporting surface

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::Path;

use log::{error, info};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::SqlitePool;

use crate::error_handling::DatabaseError;

/// Initializes and returns a database connection pool for the given path.
///
/// Creates the database file if it doesn't exist and enables WAL mode
/// for concurrent access by the report surface.
pub async fn init_db_pool_with_path(db_path: &Path) -> Result<SqlitePool, DatabaseError> {
    match OpenOptions::new()
        .read(true)
        .write(true)
        .create_new(true)
        .open(db_path)
    {
        Ok(_) => info!("Database file {} created.", db_path.display()),
        Err(ref e) if e.kind() == ErrorKind::AlreadyExists => {
            info!("Database file {} already exists.", db_path.display())
        }
        Err(e) => {
            error!("Failed to create database file: {e}");
            return Err(DatabaseError::FileCreationError(e.to_string()));
        }
    }

    let pool = SqlitePool::connect_with(SqliteConnectOptions::new().filename(db_path))
        .await
        .map_err(|e| {
            error!("Failed to connect to database: {e}");
            DatabaseError::SqlError(e)
        })?;

    // WAL is persisted in the file, so setting it once covers every connection
    sqlx::query("PRAGMA journal_mode=WAL")
        .execute(&pool)
        .await
        .map_err(|e| {
            error!("Failed to set WAL mode: {e}");
            DatabaseError::SqlError(e)
        })?;

    Ok(pool)
}

/// Opens a read-only pool on an existing database.
///
/// Used by the reporting surface, which must never be able to write.
pub async fn init_read_only_pool(db_path: &Path) -> Result<SqlitePool, DatabaseError> {
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .read_only(true);
    SqlitePool::connect_with(options).await.map_err(|e| {
        error!("Failed to open read-only database: {e}");
        DatabaseError::SqlError(e)
    })
}
