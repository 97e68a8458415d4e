//! Store abstraction over the item, escrow, payout, and notification
//! tables.
//!
//! Reads go straight to [`LedgerStore`] and only ever observe committed
//! state. Every write goes through a [`LedgerTx`] obtained from
//! [`LedgerStore::begin`]; its writes become visible together on
//! [`LedgerTx::commit`] and are discarded if the transaction is dropped.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tracing::info;

use lostfound_core::config::{AppConfig, StoreBackend};
use lostfound_core::result::AppResult;
use lostfound_core::types::{Amount, Identity, ItemId, NotificationId};
use lostfound_entity::escrow::{EscrowAccount, Payout};
use lostfound_entity::item::{Item, NewItem};
use lostfound_entity::notification::{NewNotification, Notification};

pub use memory::MemoryLedgerStore;
pub use postgres::PgLedgerStore;

/// An item together with its escrow balance, read in one consistent view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ItemSnapshot {
    /// The item row.
    #[sqlx(flatten)]
    pub item: Item,
    /// Funds currently held for the item.
    pub escrow_balance: Amount,
}

/// Read access plus a transaction factory.
#[async_trait]
pub trait LedgerStore: Send + Sync + std::fmt::Debug + 'static {
    /// Short backend name for logs.
    fn backend(&self) -> StoreBackend;

    /// Open an atomic unit of work.
    ///
    /// Callers must not issue reads through the store while holding the
    /// returned transaction; read through the transaction instead.
    async fn begin(&self) -> AppResult<Box<dyn LedgerTx>>;

    /// Find an item by id.
    async fn find_item(&self, id: ItemId) -> AppResult<Option<Item>>;

    /// Find an item and its escrow balance in a single consistent read.
    async fn find_item_snapshot(&self, id: ItemId) -> AppResult<Option<ItemSnapshot>>;

    /// All items, newest first.
    async fn list_items(&self) -> AppResult<Vec<Item>>;

    /// Items reported by `reporter`, newest first.
    async fn list_items_by_reporter(&self, reporter: &Identity) -> AppResult<Vec<Item>>;

    /// Items whose accepted finder is `finder`, newest first.
    async fn list_items_by_finder(&self, finder: &Identity) -> AppResult<Vec<Item>>;

    /// Number of items ever reported.
    async fn count_items(&self) -> AppResult<u64>;

    /// The escrow account for an item.
    async fn find_escrow(&self, item_id: ItemId) -> AppResult<Option<EscrowAccount>>;

    /// Sum of all balances still held.
    async fn total_escrowed(&self) -> AppResult<Amount>;

    /// The release record for an item.
    async fn find_payout(&self, item_id: ItemId) -> AppResult<Option<Payout>>;

    /// Find a notification by id.
    async fn find_notification(&self, id: NotificationId) -> AppResult<Option<Notification>>;

    /// Notifications addressed to `recipient`, newest first.
    async fn list_notifications_for(&self, recipient: &Identity) -> AppResult<Vec<Notification>>;

    /// Number of undelivered notifications addressed to `recipient`.
    async fn count_undelivered(&self, recipient: &Identity) -> AppResult<u64>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}

/// A unit of work against the store.
#[async_trait]
pub trait LedgerTx: Send {
    /// Read an item and hold it against concurrent transactions until
    /// this one ends.
    async fn lock_item(&mut self, id: ItemId) -> AppResult<Option<Item>>;

    /// Insert a new `Open` item under the next sequence id.
    async fn insert_item(&mut self, new: NewItem, created_at: DateTime<Utc>) -> AppResult<Item>;

    /// Persist the mutable fields (state, finder, found details) of an item.
    async fn update_item(&mut self, item: &Item) -> AppResult<()>;

    /// Open the escrow account for an item. Fails if one already exists.
    async fn open_escrow(&mut self, account: EscrowAccount) -> AppResult<()>;

    /// Zero the held balance of an item and return what was held, or
    /// `None` if nothing is held.
    async fn take_escrow(
        &mut self,
        item_id: ItemId,
        released_at: DateTime<Utc>,
    ) -> AppResult<Option<Amount>>;

    /// Sum of all balances held, including this transaction's staged
    /// writes. Serialises against other transactions that read it.
    async fn total_escrowed(&mut self) -> AppResult<Amount>;

    /// Record a completed release.
    async fn record_payout(&mut self, payout: Payout) -> AppResult<()>;

    /// Insert a notification under the next sequence id.
    async fn insert_notification(
        &mut self,
        new: NewNotification,
        created_at: DateTime<Utc>,
    ) -> AppResult<Notification>;

    /// Set the delivered flag. Returns `false` if the id is unknown.
    async fn mark_delivered(&mut self, id: NotificationId) -> AppResult<bool>;

    /// Make every write of this transaction visible atomically.
    async fn commit(self: Box<Self>) -> AppResult<()>;
}

/// Open the store selected by `config.store.backend`.
pub async fn open_store(config: &AppConfig) -> AppResult<Arc<dyn LedgerStore>> {
    let store: Arc<dyn LedgerStore> = match config.store.backend {
        StoreBackend::Memory => {
            info!("Initializing in-memory ledger store");
            Arc::new(MemoryLedgerStore::new())
        }
        StoreBackend::Postgres => {
            info!("Initializing PostgreSQL ledger store");
            let pool = crate::connection::DatabasePool::connect(&config.database).await?;
            if config.store.run_migrations {
                crate::migration::run_migrations(pool.pool()).await?;
            }
            Arc::new(PgLedgerStore::new(pool.into_pool()))
        }
    };

    Ok(store)
}
