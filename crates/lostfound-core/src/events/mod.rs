//! Domain events emitted by LostFound operations.
//!
//! Events are published only after the transition that produced them
//! has committed. They are consumed by external notifiers and UI
//! refreshers and never take part in the transition itself.

pub mod item;
pub mod notification;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Identity;

pub use item::ItemEvent;
pub use notification::NotificationEvent;

/// Wrapper for all domain events with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The identity whose operation caused the event.
    pub actor: Option<Identity>,
    /// The event payload.
    pub payload: EventPayload,
}

/// Union of all domain event types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event")]
pub enum EventPayload {
    /// An item lifecycle event.
    Item(ItemEvent),
    /// A notification routing event.
    Notification(NotificationEvent),
}

impl DomainEvent {
    /// Create a new domain event.
    pub fn new(actor: Option<Identity>, payload: EventPayload) -> Self {
        Self {
            id: Uuid::now_v7(),
            timestamp: Utc::now(),
            actor,
            payload,
        }
    }

    /// Stable name of the event, e.g. `"ItemReported"`.
    pub fn name(&self) -> &'static str {
        match &self.payload {
            EventPayload::Item(e) => e.name(),
            EventPayload::Notification(e) => e.name(),
        }
    }
}

impl From<ItemEvent> for EventPayload {
    fn from(event: ItemEvent) -> Self {
        Self::Item(event)
    }
}

impl From<NotificationEvent> for EventPayload {
    fn from(event: NotificationEvent) -> Self {
        Self::Notification(event)
    }
}
