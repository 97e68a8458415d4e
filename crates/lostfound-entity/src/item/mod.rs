//! Reported item entities.

pub mod model;
pub mod state;

pub use model::{Item, NewItem};
pub use state::ItemState;
