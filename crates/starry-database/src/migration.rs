//! Embedded schema migrations for the directory and binding tables.

use sqlx::PgPool;
use sqlx::migrate::Migrator;
use tracing::info;

use starry_core::error::{AppError, ErrorKind};

static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Applies every embedded migration the database has not seen yet.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    let total = MIGRATOR.iter().count();
    info!(total, "Applying directory schema migrations");

    MIGRATOR.run(pool).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Database,
            format!("Directory schema migration failed: {e}"),
            e,
        )
    })?;

    info!("Directory schema is up to date");
    Ok(())
}
