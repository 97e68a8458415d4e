//! Notification routing events.

use serde::{Deserialize, Serialize};

use crate::types::{Identity, ItemId, NotificationId};

/// Facts about routed find-leads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NotificationEvent {
    /// A lead was routed to an item's reporter.
    Created {
        /// The new notification.
        notification_id: NotificationId,
        /// The reporter it was addressed to.
        recipient: Identity,
        /// The item the lead concerns.
        item_id: ItemId,
    },
}

impl NotificationEvent {
    /// Stable external name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Created { .. } => "NotificationCreated",
        }
    }
}
