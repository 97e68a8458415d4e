//! Database migration command.

use lostfound_core::config::AppConfig;
use lostfound_core::error::AppError;
use lostfound_database::connection::DatabasePool;
use lostfound_database::migration;

use crate::output::{self, OutputFormat};

/// Apply every pending migration to the configured database, whatever
/// the selected store backend.
pub async fn execute(config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let pool = DatabasePool::connect(&config.database).await?;
    migration::run_migrations(pool.pool()).await?;
    output::print_success("All migrations applied.", format);
    Ok(())
}
