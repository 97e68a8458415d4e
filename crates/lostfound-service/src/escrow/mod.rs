//! Custody of reward funds.

pub mod ledger;

pub use ledger::EscrowLedger;
