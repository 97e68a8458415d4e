//! Relation-based access rules for item transitions.

pub mod control;

pub use control::AccessControl;
