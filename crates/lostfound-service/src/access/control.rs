//! Who may perform which transition on which item.
//!
//! There are no roles. "Reporter" and "finder" are relations between an
//! identity and an item, not account types.

use std::sync::Arc;

use lostfound_core::error::AppError;
use lostfound_core::types::{Identity, ItemId};
use lostfound_database::store::LedgerStore;
use lostfound_entity::item::{Item, ItemState};

/// Access checks over items.
#[derive(Debug, Clone)]
pub struct AccessControl {
    store: Arc<dyn LedgerStore>,
}

impl AccessControl {
    /// Creates a new access control service.
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// Whether `caller` may verify a found-claim on the item.
    pub async fn can_verify(&self, item_id: ItemId, caller: &Identity) -> Result<bool, AppError> {
        let item = self.load(item_id).await?;
        Ok(Self::is_verifier(&item, caller))
    }

    /// Whether `caller` may submit a found-claim on the item.
    pub async fn can_mark_found(
        &self,
        item_id: ItemId,
        caller: &Identity,
    ) -> Result<bool, AppError> {
        let item = self.load(item_id).await?;
        Ok(Self::is_claimable_by(&item, caller))
    }

    /// Only the reporter verifies and releases.
    pub fn is_verifier(item: &Item, caller: &Identity) -> bool {
        item.is_reporter(caller)
    }

    /// Any identity may claim an open item, its own reporter included.
    pub fn is_claimable_by(item: &Item, _caller: &Identity) -> bool {
        item.state.can_transition_to(ItemState::Found)
    }

    /// Reject with `Unauthorized` unless `caller` is the item's reporter.
    pub fn ensure_verifier(item: &Item, caller: &Identity) -> Result<(), AppError> {
        if Self::is_verifier(item, caller) {
            Ok(())
        } else {
            Err(AppError::unauthorized(format!(
                "Only the reporter of item {} may verify it",
                item.id
            )))
        }
    }

    async fn load(&self, item_id: ItemId) -> Result<Item, AppError> {
        self.store
            .find_item(item_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Item {item_id} not found")))
    }
}
