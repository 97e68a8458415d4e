//! Escrow account and payout models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use lostfound_core::types::{Amount, Identity, ItemId};

/// Reward funds held against a single item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct EscrowAccount {
    /// The item the funds are held for.
    pub item_id: ItemId,
    /// Funds currently held. Zero once released.
    pub balance: Amount,
    /// When custody began.
    pub opened_at: DateTime<Utc>,
    /// When the funds left custody.
    pub released_at: Option<DateTime<Utc>>,
}

impl EscrowAccount {
    /// Open an account holding `amount`.
    pub fn open(item_id: ItemId, amount: Amount, opened_at: DateTime<Utc>) -> Self {
        Self {
            item_id,
            balance: amount,
            opened_at,
            released_at: None,
        }
    }

    /// Whether any funds are still held.
    pub fn is_held(&self) -> bool {
        self.released_at.is_none() && self.balance.is_positive()
    }
}

/// Record of a completed reward release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Payout {
    /// The item whose reward was released.
    pub item_id: ItemId,
    /// Who received the funds.
    pub recipient: Identity,
    /// How much was released.
    pub amount: Amount,
    /// When the release committed.
    pub released_at: DateTime<Utc>,
}
