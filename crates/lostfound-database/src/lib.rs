//! # lostfound-database
//!
//! The injectable store behind LostFound: the [`LedgerStore`] /
//! [`LedgerTx`] traits, an in-memory implementation for tests and
//! single-process use, and a PostgreSQL implementation with its
//! connection pool and migrations.

pub mod connection;
pub mod migration;
pub mod store;

pub use connection::DatabasePool;
pub use store::{ItemSnapshot, LedgerStore, LedgerTx, open_store};
