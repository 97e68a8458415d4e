//! Item entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use lostfound_core::types::{Amount, Identity, ItemId};

use super::state::ItemState;

/// A lost item with an escrowed reward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Item {
    /// Sequence-assigned identifier.
    pub id: ItemId,
    /// Who reported the item. Immutable.
    pub reporter: Identity,
    /// Short name of the item.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Where it was lost.
    pub location: String,
    /// How to reach the reporter.
    pub contact: String,
    /// Reward fixed at creation.
    pub reward: Amount,
    /// Current lifecycle state.
    pub state: ItemState,
    /// Who moved the item to `Found`; unset while `Open`.
    pub finder: Option<Identity>,
    /// Location supplied with the found-claim.
    pub found_location: Option<String>,
    /// When the found-claim was accepted.
    pub found_at: Option<DateTime<Utc>>,
    /// When the item was reported.
    pub created_at: DateTime<Utc>,
}

impl Item {
    /// Build the `Open` row for a newly reported item.
    pub fn open(id: ItemId, new: NewItem, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            reporter: new.reporter,
            name: new.name,
            description: new.description,
            location: new.location,
            contact: new.contact,
            reward: new.reward,
            state: ItemState::Open,
            finder: None,
            found_location: None,
            found_at: None,
            created_at,
        }
    }

    /// Whether `identity` reported this item.
    pub fn is_reporter(&self, identity: &Identity) -> bool {
        &self.reporter == identity
    }

    /// Whether `identity` is the accepted finder of this item.
    pub fn is_finder(&self, identity: &Identity) -> bool {
        self.finder.as_ref() == Some(identity)
    }
}

/// Data required to report a new item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewItem {
    /// Reporter identity.
    pub reporter: Identity,
    /// Item name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Where it was lost.
    pub location: String,
    /// Reporter contact.
    pub contact: String,
    /// Reward to escrow.
    pub reward: Amount,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Item {
        Item::open(
            ItemId::new(1),
            NewItem {
                reporter: Identity::new("Alice"),
                name: "Wallet".into(),
                description: "black leather".into(),
                location: "Park".into(),
                contact: "alice@x".into(),
                reward: Amount::new(100),
            },
            Utc::now(),
        )
    }

    #[test]
    fn test_open_has_no_finder() {
        let item = sample();
        assert_eq!(item.state, ItemState::Open);
        assert!(item.finder.is_none());
        assert!(item.found_at.is_none());
    }

    #[test]
    fn test_relations_are_case_insensitive() {
        let mut item = sample();
        assert!(item.is_reporter(&Identity::new("ALICE")));
        item.finder = Some(Identity::new("bob"));
        assert!(item.is_finder(&Identity::new("Bob")));
        assert!(!item.is_finder(&Identity::new("alice")));
    }
}
