//! # lostfound-entity
//!
//! Domain entity models for LostFound. Every struct in this crate
//! represents a table row or a value written into one. Row types
//! additionally derive `sqlx::FromRow`.

pub mod escrow;
pub mod item;
pub mod notification;
