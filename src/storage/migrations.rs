// storage/migrations.rs
// Database migration management

use sqlx::migrate::Migrator;
use sqlx::{Pool, Sqlite};

use crate::error_handling::DatabaseError;

/// Migrations from `migrations/`, embedded in the binary at compile time.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Applies the embedded migrations.
///
/// Safe to call on every start; applied migrations are skipped.
pub async fn run_migrations(pool: &Pool<Sqlite>) -> Result<(), DatabaseError> {
    MIGRATOR.run(pool).await?;
    Ok(())
}
