//! Notification commands.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use lostfound_core::error::AppError;
use lostfound_core::types::{Identity, NotificationId};
use lostfound_entity::notification::Notification;
use lostfound_service::LostAndFound;

use crate::output::{self, OutputFormat};

/// Arguments for `notifications`
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Recipient identity
    pub recipient: String,
    /// Only notifications not yet delivered
    #[arg(long)]
    pub unread: bool,
}

/// Arguments for `deliver`
#[derive(Debug, Args)]
pub struct DeliverArgs {
    /// Notification id
    pub id: NotificationId,
}

/// Notification display row for table output
#[derive(Debug, Serialize, Tabled)]
struct NotificationRow {
    id: i64,
    item: i64,
    finder: String,
    message: String,
    contact: String,
    delivered: bool,
    created_at: String,
}

impl From<&Notification> for NotificationRow {
    fn from(n: &Notification) -> Self {
        Self {
            id: n.id.get(),
            item: n.item_id.get(),
            finder: n.finder.to_string(),
            message: n.message.replace('\n', " | "),
            contact: n.finder_contact.clone(),
            delivered: n.delivered,
            created_at: n.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// Execute `notifications`
pub async fn list(
    app: &LostAndFound,
    args: &ListArgs,
    format: OutputFormat,
) -> Result<(), AppError> {
    let recipient = Identity::new(&args.recipient);
    let notifications = app.notifications.list_notifications(&recipient).await?;

    let rows: Vec<NotificationRow> = notifications
        .iter()
        .filter(|n| !args.unread || !n.delivered)
        .map(NotificationRow::from)
        .collect();
    output::print_list(&rows, format);
    Ok(())
}

/// Execute `deliver`
pub async fn deliver(
    app: &LostAndFound,
    args: &DeliverArgs,
    format: OutputFormat,
) -> Result<(), AppError> {
    app.notifications.mark_delivered(args.id).await?;
    output::print_success(&format!("Notification {} delivered", args.id), format);
    if format == OutputFormat::Json {
        let notification = app.notifications.get_notification(args.id).await?;
        output::print_one(&NotificationRow::from(&notification), format);
    }
    Ok(())
}
