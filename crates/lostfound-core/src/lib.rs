//! # lostfound-core
//!
//! Core crate for LostFound. Contains configuration schemas, typed
//! identifiers, the caller identity and monetary amount types, domain
//! events, and the unified error system.
//!
//! This crate has **no** internal dependencies on other LostFound crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
