//! The wired set of services over one store.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::info;

use lostfound_core::config::{AppConfig, EventsConfig};
use lostfound_core::error::AppError;
use lostfound_core::events::DomainEvent;
use lostfound_database::store::{LedgerStore, MemoryLedgerStore, open_store};

use crate::access::AccessControl;
use crate::escrow::EscrowLedger;
use crate::events::EventBus;
use crate::item::ItemService;
use crate::notification::NotificationRouter;

/// Entry point for presentation layers: every component shares one
/// store and one event bus.
#[derive(Debug, Clone)]
pub struct LostAndFound {
    /// Item Store commands and queries.
    pub items: Arc<ItemService>,
    /// Escrow ledger queries.
    pub escrow: Arc<EscrowLedger>,
    /// Notification listing and delivery.
    pub notifications: Arc<NotificationRouter>,
    /// Access checks.
    pub access: Arc<AccessControl>,
    /// Committed domain events.
    pub events: EventBus,
    store: Arc<dyn LedgerStore>,
}

impl LostAndFound {
    /// Wire the services over an existing store.
    pub fn new(store: Arc<dyn LedgerStore>, events_config: &EventsConfig) -> Self {
        let events = EventBus::new(events_config);
        let escrow = Arc::new(EscrowLedger::new(Arc::clone(&store)));
        let notifications = Arc::new(NotificationRouter::new(Arc::clone(&store)));
        let access = Arc::new(AccessControl::new(Arc::clone(&store)));
        let items = Arc::new(ItemService::new(
            Arc::clone(&store),
            Arc::clone(&escrow),
            Arc::clone(&notifications),
            events.clone(),
        ));

        Self {
            items,
            escrow,
            notifications,
            access,
            events,
            store,
        }
    }

    /// Open the configured store and wire the services over it.
    pub async fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let store = open_store(config).await?;
        info!(backend = %store.backend(), "LostFound services ready");
        Ok(Self::new(store, &config.events))
    }

    /// Services over a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryLedgerStore::new()),
            &EventsConfig::default(),
        )
    }

    /// Subscribe to events committed from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.events.subscribe()
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn LedgerStore> {
        &self.store
    }
}
