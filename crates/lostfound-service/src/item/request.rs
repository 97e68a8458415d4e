//! Command payloads accepted by the item service.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use lostfound_core::types::Amount;

/// Report a lost item and escrow its reward.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReportItemRequest {
    /// Item name.
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
    /// Free-form description.
    #[validate(length(max = 2000))]
    #[serde(default)]
    pub description: String,
    /// Where the item was lost.
    #[validate(length(max = 2000))]
    pub location: String,
    /// How to reach the reporter.
    #[validate(length(max = 2000))]
    pub contact: String,
    /// Reward, in the smallest currency unit.
    #[validate(custom(function = "validate_reward"))]
    pub reward: Amount,
}

/// Submit a found-claim on an open item.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MarkFoundRequest {
    /// What the finder has to say about the item.
    #[validate(length(max = 2000))]
    pub found_details: String,
    /// Where the item is now.
    #[validate(length(max = 2000))]
    pub location: String,
    /// How to reach the finder.
    #[validate(length(max = 2000))]
    pub contact: String,
}

fn validate_reward(reward: &Amount) -> Result<(), ValidationError> {
    if !reward.is_positive() {
        let mut err = ValidationError::new("reward_not_positive");
        err.message = Some("Reward must be greater than zero".into());
        return Err(err);
    }
    if *reward > Amount::MAX_REWARD {
        let mut err = ValidationError::new("reward_too_large");
        err.message = Some(format!("Reward must not exceed {}", Amount::MAX_REWARD).into());
        return Err(err);
    }
    Ok(())
}
