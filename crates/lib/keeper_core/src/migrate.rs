//! Schema migrations for the `users` and `records` tables.

use sqlx::PgPool;
use sqlx::migrate::{MigrateError, Migrator};
use tracing::info;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Apply every pending migration embedded from `keeper_core/migrations/`.
pub async fn migrate(pool: &PgPool) -> Result<(), MigrateError> {
    let known = MIGRATOR.iter().count();
    MIGRATOR.run(pool).await?;
    info!(migrations = known, "database schema up to date");
    Ok(())
}
