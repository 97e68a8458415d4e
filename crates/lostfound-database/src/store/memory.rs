//! In-memory ledger store for tests and single-process deployments.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{OwnedRwLockWriteGuard, RwLock};
use tracing::debug;

use lostfound_core::config::StoreBackend;
use lostfound_core::error::AppError;
use lostfound_core::result::AppResult;
use lostfound_core::types::{Amount, Identity, ItemId, NotificationId};
use lostfound_entity::escrow::{EscrowAccount, Payout};
use lostfound_entity::item::{Item, NewItem};
use lostfound_entity::notification::{NewNotification, Notification};

use super::{ItemSnapshot, LedgerStore, LedgerTx};

/// Committed table contents.
#[derive(Debug, Default)]
struct Tables {
    items: BTreeMap<ItemId, Item>,
    escrow: HashMap<ItemId, EscrowAccount>,
    payouts: HashMap<ItemId, Payout>,
    notifications: BTreeMap<NotificationId, Notification>,
    last_item_id: i64,
    last_notification_id: i64,
}

impl Tables {
    fn newest_items<'a>(&'a self, filter: impl Fn(&Item) -> bool + 'a) -> Vec<Item> {
        self.items
            .values()
            .rev()
            .filter(|item| filter(item))
            .cloned()
            .collect()
    }

    fn escrow_balance(&self, item_id: ItemId) -> Amount {
        self.escrow
            .get(&item_id)
            .map(|account| account.balance)
            .unwrap_or(Amount::ZERO)
    }
}

fn checked_total<'a>(mut accounts: impl Iterator<Item = &'a EscrowAccount>) -> AppResult<Amount> {
    accounts.try_fold(Amount::ZERO, |total, account| {
        total
            .checked_add(account.balance)
            .ok_or_else(|| AppError::internal("Escrow total overflowed"))
    })
}

/// In-memory store guarded by a Tokio read-write lock.
///
/// A transaction owns the write guard for its lifetime and stages its
/// writes, so readers only ever see fully committed transactions.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedgerStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryLedgerStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    fn backend(&self) -> StoreBackend {
        StoreBackend::Memory
    }

    async fn begin(&self) -> AppResult<Box<dyn LedgerTx>> {
        let guard = Arc::clone(&self.tables).write_owned().await;
        Ok(Box::new(MemoryTx::new(guard)))
    }

    async fn find_item(&self, id: ItemId) -> AppResult<Option<Item>> {
        Ok(self.tables.read().await.items.get(&id).cloned())
    }

    async fn find_item_snapshot(&self, id: ItemId) -> AppResult<Option<ItemSnapshot>> {
        let tables = self.tables.read().await;
        Ok(tables.items.get(&id).map(|item| ItemSnapshot {
            item: item.clone(),
            escrow_balance: tables.escrow_balance(id),
        }))
    }

    async fn list_items(&self) -> AppResult<Vec<Item>> {
        Ok(self.tables.read().await.newest_items(|_| true))
    }

    async fn list_items_by_reporter(&self, reporter: &Identity) -> AppResult<Vec<Item>> {
        Ok(self
            .tables
            .read()
            .await
            .newest_items(|item| item.is_reporter(reporter)))
    }

    async fn list_items_by_finder(&self, finder: &Identity) -> AppResult<Vec<Item>> {
        Ok(self
            .tables
            .read()
            .await
            .newest_items(|item| item.is_finder(finder)))
    }

    async fn count_items(&self) -> AppResult<u64> {
        Ok(self.tables.read().await.items.len() as u64)
    }

    async fn find_escrow(&self, item_id: ItemId) -> AppResult<Option<EscrowAccount>> {
        Ok(self.tables.read().await.escrow.get(&item_id).cloned())
    }

    async fn total_escrowed(&self) -> AppResult<Amount> {
        let tables = self.tables.read().await;
        checked_total(tables.escrow.values())
    }

    async fn find_payout(&self, item_id: ItemId) -> AppResult<Option<Payout>> {
        Ok(self.tables.read().await.payouts.get(&item_id).cloned())
    }

    async fn find_notification(&self, id: NotificationId) -> AppResult<Option<Notification>> {
        Ok(self.tables.read().await.notifications.get(&id).cloned())
    }

    async fn list_notifications_for(&self, recipient: &Identity) -> AppResult<Vec<Notification>> {
        Ok(self
            .tables
            .read()
            .await
            .notifications
            .values()
            .rev()
            .filter(|n| &n.recipient == recipient)
            .cloned()
            .collect())
    }

    async fn count_undelivered(&self, recipient: &Identity) -> AppResult<u64> {
        Ok(self
            .tables
            .read()
            .await
            .notifications
            .values()
            .filter(|n| &n.recipient == recipient && !n.delivered)
            .count() as u64)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

/// Staged writes of an open in-memory transaction.
struct MemoryTx {
    guard: OwnedRwLockWriteGuard<Tables>,
    items: HashMap<ItemId, Item>,
    escrow: HashMap<ItemId, EscrowAccount>,
    payouts: HashMap<ItemId, Payout>,
    notifications: HashMap<NotificationId, Notification>,
    last_item_id: i64,
    last_notification_id: i64,
}

impl MemoryTx {
    fn new(guard: OwnedRwLockWriteGuard<Tables>) -> Self {
        let last_item_id = guard.last_item_id;
        let last_notification_id = guard.last_notification_id;
        Self {
            guard,
            items: HashMap::new(),
            escrow: HashMap::new(),
            payouts: HashMap::new(),
            notifications: HashMap::new(),
            last_item_id,
            last_notification_id,
        }
    }

    fn current_item(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id).or_else(|| self.guard.items.get(&id))
    }

    fn current_escrow(&self, item_id: ItemId) -> Option<&EscrowAccount> {
        self.escrow
            .get(&item_id)
            .or_else(|| self.guard.escrow.get(&item_id))
    }

    fn current_notification(&self, id: NotificationId) -> Option<&Notification> {
        self.notifications
            .get(&id)
            .or_else(|| self.guard.notifications.get(&id))
    }
}

#[async_trait]
impl LedgerTx for MemoryTx {
    async fn lock_item(&mut self, id: ItemId) -> AppResult<Option<Item>> {
        // The write guard already excludes every other transaction.
        Ok(self.current_item(id).cloned())
    }

    async fn insert_item(&mut self, new: NewItem, created_at: DateTime<Utc>) -> AppResult<Item> {
        self.last_item_id += 1;
        let item = Item::open(ItemId::new(self.last_item_id), new, created_at);
        self.items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn update_item(&mut self, item: &Item) -> AppResult<()> {
        if self.current_item(item.id).is_none() {
            return Err(AppError::not_found(format!("Item {} not found", item.id)));
        }
        self.items.insert(item.id, item.clone());
        Ok(())
    }

    async fn open_escrow(&mut self, account: EscrowAccount) -> AppResult<()> {
        if self.current_escrow(account.item_id).is_some() {
            return Err(AppError::invalid_state(format!(
                "Escrow for item {} is already open",
                account.item_id
            )));
        }
        self.escrow.insert(account.item_id, account);
        Ok(())
    }

    async fn take_escrow(
        &mut self,
        item_id: ItemId,
        released_at: DateTime<Utc>,
    ) -> AppResult<Option<Amount>> {
        let Some(account) = self.current_escrow(item_id).filter(|a| a.is_held()).cloned() else {
            return Ok(None);
        };
        let held = account.balance;
        self.escrow.insert(
            item_id,
            EscrowAccount {
                balance: Amount::ZERO,
                released_at: Some(released_at),
                ..account
            },
        );
        Ok(Some(held))
    }

    async fn total_escrowed(&mut self) -> AppResult<Amount> {
        let committed = self
            .guard
            .escrow
            .iter()
            .filter(|(item_id, _)| !self.escrow.contains_key(item_id))
            .map(|(_, account)| account);
        checked_total(committed.chain(self.escrow.values()))
    }

    async fn record_payout(&mut self, payout: Payout) -> AppResult<()> {
        if self.payouts.contains_key(&payout.item_id)
            || self.guard.payouts.contains_key(&payout.item_id)
        {
            return Err(AppError::invalid_state(format!(
                "Payout for item {} already recorded",
                payout.item_id
            )));
        }
        self.payouts.insert(payout.item_id, payout);
        Ok(())
    }

    async fn insert_notification(
        &mut self,
        new: NewNotification,
        created_at: DateTime<Utc>,
    ) -> AppResult<Notification> {
        self.last_notification_id += 1;
        let notification = Notification::undelivered(
            NotificationId::new(self.last_notification_id),
            new,
            created_at,
        );
        self.notifications
            .insert(notification.id, notification.clone());
        Ok(notification)
    }

    async fn mark_delivered(&mut self, id: NotificationId) -> AppResult<bool> {
        let Some(mut notification) = self.current_notification(id).cloned() else {
            return Ok(false);
        };
        notification.delivered = true;
        self.notifications.insert(id, notification);
        Ok(true)
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let MemoryTx {
            mut guard,
            items,
            escrow,
            payouts,
            notifications,
            last_item_id,
            last_notification_id,
        } = *self;

        debug!(
            items = items.len(),
            escrow = escrow.len(),
            payouts = payouts.len(),
            notifications = notifications.len(),
            "Committing in-memory transaction"
        );

        guard.items.extend(items);
        guard.escrow.extend(escrow);
        guard.payouts.extend(payouts);
        guard.notifications.extend(notifications);
        guard.last_item_id = last_item_id;
        guard.last_notification_id = last_notification_id;
        Ok(())
    }
}
