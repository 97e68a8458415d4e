//! Core type definitions used across the LostFound workspace.

pub mod amount;
pub mod id;
pub mod identity;

pub use amount::Amount;
pub use id::*;
pub use identity::Identity;
