//! # lostfound-service
//!
//! The lost-item core: the item state machine, the escrow ledger that
//! holds each reward until it is released exactly once, the router that
//! delivers find-leads to reporters, and the access rules tying the two
//! identities to an item.
//!
//! Services follow constructor injection. All dependencies are provided
//! at construction time via `Arc` references, and [`LostAndFound`] wires
//! the standard set together.

pub mod access;
pub mod app;
pub mod context;
pub mod escrow;
pub mod events;
pub mod item;
pub mod notification;

pub use access::AccessControl;
pub use app::LostAndFound;
pub use context::RequestContext;
pub use escrow::EscrowLedger;
pub use events::EventBus;
pub use item::{ItemService, MarkFoundRequest, ReportItemRequest};
pub use notification::NotificationRouter;
