//! Item Store: the `Open -> Found -> RewardClaimed` state machine.

pub mod request;
pub mod service;

pub use request::{MarkFoundRequest, ReportItemRequest};
pub use service::ItemService;
