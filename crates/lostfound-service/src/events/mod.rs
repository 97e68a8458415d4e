//! Outbound domain-event channel.

pub mod bus;

pub use bus::EventBus;
