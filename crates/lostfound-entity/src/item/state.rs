//! Item lifecycle state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a reported item.
///
/// Transitions only move forward: `Open → Found → RewardClaimed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "item_state", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ItemState {
    /// Reported and awaiting a finder. Reward is escrowed.
    Open,
    /// A finder has claimed it. Reward is still escrowed.
    Found,
    /// The reporter verified the claim and the reward was released.
    RewardClaimed,
}

impl ItemState {
    /// Whether `next` is the single legal successor of this state.
    pub fn can_transition_to(&self, next: ItemState) -> bool {
        matches!(
            (self, next),
            (Self::Open, Self::Found) | (Self::Found, Self::RewardClaimed)
        )
    }

    /// Check if the item is in its terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::RewardClaimed)
    }

    /// Whether the reward is still held by the ledger in this state.
    pub fn holds_escrow(&self) -> bool {
        !self.is_terminal()
    }

    /// Return the state as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Found => "found",
            Self::RewardClaimed => "reward_claimed",
        }
    }
}

impl fmt::Display for ItemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
