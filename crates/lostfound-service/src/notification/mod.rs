//! Routing of find-leads from finders to reporters.

pub mod router;

pub use router::NotificationRouter;
