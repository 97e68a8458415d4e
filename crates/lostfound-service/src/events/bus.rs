//! Broadcast channel for committed domain events.

use tokio::sync::broadcast;
use tracing::debug;

use lostfound_core::config::EventsConfig;
use lostfound_core::events::{DomainEvent, EventPayload};
use lostfound_core::types::Identity;

/// Fan-out of committed domain events to any number of observers.
///
/// Publishing never waits on a subscriber: with no subscribers the event
/// is dropped, and a subscriber that falls more than `buffer_size`
/// events behind skips the oldest ones.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    /// Create a bus with the configured buffer size.
    pub fn new(config: &EventsConfig) -> Self {
        let (sender, _) = broadcast::channel(config.buffer_size.max(1));
        Self { sender }
    }

    /// Subscribe to events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publish an event. Call only after the transition it describes has
    /// committed.
    pub fn publish(&self, actor: Option<Identity>, payload: impl Into<EventPayload>) {
        let event = DomainEvent::new(actor, payload.into());
        let name = event.name();
        match self.sender.send(event) {
            Ok(receivers) => debug!(event = name, receivers, "Event published"),
            Err(_) => debug!(event = name, "Event dropped, no subscribers"),
        }
    }
}
