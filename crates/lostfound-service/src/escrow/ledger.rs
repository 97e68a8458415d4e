//! Escrow ledger: one balance per item, released exactly once.
//!
//! Writes take the caller's open transaction so that custody changes
//! commit together with the item transition that requires them.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use lostfound_core::error::AppError;
use lostfound_core::types::{Amount, Identity, ItemId};
use lostfound_database::store::{LedgerStore, LedgerTx};
use lostfound_entity::escrow::{EscrowAccount, Payout};

/// Holds and releases item rewards.
#[derive(Debug, Clone)]
pub struct EscrowLedger {
    store: Arc<dyn LedgerStore>,
}

impl EscrowLedger {
    /// Creates a new escrow ledger.
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Take custody of `amount` for `item_id`.
    ///
    /// Rejects the deposit when the ledger total would no longer fit in
    /// an [`Amount`], so [`total_held`](Self::total_held) always answers.
    pub async fn escrow(
        &self,
        tx: &mut dyn LedgerTx,
        item_id: ItemId,
        amount: Amount,
        at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        if !amount.is_positive() {
            return Err(AppError::invalid_input(format!(
                "Escrow amount must be positive, got {amount}"
            )));
        }

        let held = tx.total_escrowed().await?;
        if held.checked_add(amount).is_none() {
            return Err(AppError::invalid_input(format!(
                "Escrowing {amount} would exceed the ledger capacity ({held} already held)"
            )));
        }

        tx.open_escrow(EscrowAccount::open(item_id, amount, at))
            .await?;

        info!(item_id = %item_id, amount = %amount, "Reward escrowed");
        Ok(())
    }

    /// Release the full held balance of `item_id` to `recipient`.
    ///
    /// Fails with `InvalidState` when nothing is held, which is what makes
    /// a second release of the same item impossible.
    pub async fn release(
        &self,
        tx: &mut dyn LedgerTx,
        item_id: ItemId,
        recipient: &Identity,
        at: DateTime<Utc>,
    ) -> Result<Payout, AppError> {
        let amount = tx.take_escrow(item_id, at).await?.ok_or_else(|| {
            AppError::invalid_state(format!("No funds are escrowed for item {item_id}"))
        })?;

        let payout = Payout {
            item_id,
            recipient: recipient.clone(),
            amount,
            released_at: at,
        };
        tx.record_payout(payout.clone()).await?;

        info!(
            item_id = %item_id,
            recipient = %recipient,
            amount = %amount,
            "Reward released"
        );
        Ok(payout)
    }

    /// Funds currently held for an item.
    pub async fn balance(&self, item_id: ItemId) -> Result<Amount, AppError> {
        self.store
            .find_escrow(item_id)
            .await?
            .map(|account| account.balance)
            .ok_or_else(|| AppError::not_found(format!("No escrow account for item {item_id}")))
    }

    /// Sum of every balance still held.
    pub async fn total_held(&self) -> Result<Amount, AppError> {
        self.store.total_escrowed().await
    }

    /// The release record for an item.
    pub async fn payout(&self, item_id: ItemId) -> Result<Payout, AppError> {
        self.store
            .find_payout(item_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("No payout recorded for item {item_id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lostfound_core::error::ErrorKind;
    use lostfound_database::store::MemoryLedgerStore;
    use lostfound_entity::item::NewItem;

    async fn seeded() -> (Arc<dyn LedgerStore>, EscrowLedger, ItemId) {
        let store: Arc<dyn LedgerStore> = Arc::new(MemoryLedgerStore::new());
        let ledger = EscrowLedger::new(Arc::clone(&store));
        let now = Utc::now();
        let mut tx = store.begin().await.unwrap();
        let item = tx
            .insert_item(
                NewItem {
                    reporter: Identity::new("alice"),
                    name: "Keys".into(),
                    description: String::new(),
                    location: "Station".into(),
                    contact: "alice@x".into(),
                    reward: Amount::new(250),
                },
                now,
            )
            .await
            .unwrap();
        ledger
            .escrow(tx.as_mut(), item.id, item.reward, now)
            .await
            .unwrap();
        tx.commit().await.unwrap();
        (store, ledger, item.id)
    }

    #[tokio::test]
    async fn test_escrow_rejects_non_positive() {
        let store: Arc<dyn LedgerStore> = Arc::new(MemoryLedgerStore::new());
        let ledger = EscrowLedger::new(Arc::clone(&store));
        let mut tx = store.begin().await.unwrap();
        for units in [0, -1] {
            let err = ledger
                .escrow(tx.as_mut(), ItemId::new(1), Amount::new(units), Utc::now())
                .await
                .unwrap_err();
            assert_eq!(err.kind, ErrorKind::InvalidInput);
        }
    }

    #[tokio::test]
    async fn test_escrow_rejects_total_overflow() {
        let store: Arc<dyn LedgerStore> = Arc::new(MemoryLedgerStore::new());
        let ledger = EscrowLedger::new(Arc::clone(&store));

        let mut tx = store.begin().await.unwrap();
        ledger
            .escrow(tx.as_mut(), ItemId::new(1), Amount::new(i64::MAX), Utc::now())
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let mut tx = store.begin().await.unwrap();
        let err = ledger
            .escrow(tx.as_mut(), ItemId::new(2), Amount::new(1), Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidInput);
        drop(tx);

        assert_eq!(ledger.total_held().await.unwrap(), Amount::new(i64::MAX));
        assert_eq!(
            ledger.balance(ItemId::new(2)).await.unwrap_err().kind,
            ErrorKind::NotFound
        );
    }

    #[tokio::test]
    async fn test_release_then_second_release_fails() {
        let (store, ledger, item_id) = seeded().await;
        assert_eq!(ledger.balance(item_id).await.unwrap(), Amount::new(250));

        let bob = Identity::new("bob");
        let mut tx = store.begin().await.unwrap();
        let payout = ledger
            .release(tx.as_mut(), item_id, &bob, Utc::now())
            .await
            .unwrap();
        tx.commit().await.unwrap();
        assert_eq!(payout.amount, Amount::new(250));
        assert_eq!(ledger.balance(item_id).await.unwrap(), Amount::ZERO);
        assert_eq!(ledger.payout(item_id).await.unwrap().recipient, bob);

        let mut tx = store.begin().await.unwrap();
        let err = ledger
            .release(tx.as_mut(), item_id, &bob, Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidState);
    }

    #[tokio::test]
    async fn test_release_without_escrow_fails() {
        let store: Arc<dyn LedgerStore> = Arc::new(MemoryLedgerStore::new());
        let ledger = EscrowLedger::new(Arc::clone(&store));
        let mut tx = store.begin().await.unwrap();
        let err = ledger
            .release(tx.as_mut(), ItemId::new(3), &Identity::new("bob"), Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidState);
    }

    #[tokio::test]
    async fn test_uncommitted_release_keeps_funds() {
        let (store, ledger, item_id) = seeded().await;
        {
            let mut tx = store.begin().await.unwrap();
            ledger
                .release(tx.as_mut(), item_id, &Identity::new("bob"), Utc::now())
                .await
                .unwrap();
        }
        assert_eq!(ledger.balance(item_id).await.unwrap(), Amount::new(250));
        assert_eq!(ledger.total_held().await.unwrap(), Amount::new(250));
    }
}
