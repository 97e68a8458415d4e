//! Item lifecycle events.

use serde::{Deserialize, Serialize};

use crate::types::{Amount, Identity, ItemId};

/// Facts about successful item transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ItemEvent {
    /// A new item was reported and its reward escrowed.
    Reported {
        /// The new item.
        item_id: ItemId,
        /// Who reported it.
        reporter: Identity,
        /// Reward taken into escrow.
        reward: Amount,
    },
    /// A finder's claim moved the item to `Found`.
    Found {
        /// The item.
        item_id: ItemId,
        /// Who found it.
        finder: Identity,
        /// Where the finder says it is.
        location: String,
    },
    /// The reporter verified the claim and the reward went to the finder.
    RewardReleased {
        /// The item.
        item_id: ItemId,
        /// Recipient of the reward.
        finder: Identity,
        /// Amount released.
        amount: Amount,
    },
}

impl ItemEvent {
    /// Stable external name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Reported { .. } => "ItemReported",
            Self::Found { .. } => "ItemFound",
            Self::RewardReleased { .. } => "RewardReleased",
        }
    }
}
