//! Escrow ledger entities.

pub mod model;

pub use model::{EscrowAccount, Payout};
