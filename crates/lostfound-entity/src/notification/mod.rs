//! Find-lead notification entities.

pub mod model;

pub use model::{NewNotification, Notification};
