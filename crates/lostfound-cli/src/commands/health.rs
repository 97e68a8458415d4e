//! Store reachability check.

use serde::Serialize;
use tabled::Tabled;

use lostfound_core::error::AppError;
use lostfound_service::LostAndFound;

use crate::output::{self, OutputFormat};

#[derive(Debug, Serialize, Tabled)]
struct HealthRow {
    backend: String,
    healthy: bool,
    items: u64,
}

/// Execute `health`. Fails when the store does not answer.
pub async fn execute(app: &LostAndFound, format: OutputFormat) -> Result<(), AppError> {
    let store = app.store();
    let healthy = store.health_check().await?;
    let row = HealthRow {
        backend: store.backend().to_string(),
        healthy,
        items: app.items.count_items().await?,
    };
    output::print_one(&row, format);

    if !healthy {
        return Err(AppError::internal(format!(
            "{} store reported unhealthy",
            row.backend
        )));
    }
    Ok(())
}
