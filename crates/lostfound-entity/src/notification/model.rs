//! Notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use lostfound_core::types::{Identity, ItemId, NotificationId};

/// A find-lead routed from a finder to an item's reporter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Notification {
    /// Unique notification identifier.
    pub id: NotificationId,
    /// The item the lead concerns (lookup only).
    pub item_id: ItemId,
    /// Who sent the lead.
    pub finder: Identity,
    /// The item's reporter, copied at creation.
    pub recipient: Identity,
    /// Lead text supplied by the finder.
    pub message: String,
    /// How to reach the finder.
    pub finder_contact: String,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
    /// Whether the presentation layer has delivered it.
    pub delivered: bool,
}

impl Notification {
    /// Build the undelivered row for a new lead.
    pub fn undelivered(id: NotificationId, new: NewNotification, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            item_id: new.item_id,
            finder: new.finder,
            recipient: new.recipient,
            message: new.message,
            finder_contact: new.finder_contact,
            created_at,
            delivered: false,
        }
    }
}

/// Data required to create a notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNotification {
    /// Item reference.
    pub item_id: ItemId,
    /// Sender.
    pub finder: Identity,
    /// Recipient.
    pub recipient: Identity,
    /// Lead text.
    pub message: String,
    /// Finder contact.
    pub finder_contact: String,
}
