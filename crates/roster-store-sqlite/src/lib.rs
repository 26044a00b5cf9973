//! SQLite backend for the Roster service.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on dedicated
//! connection threads without blocking the async runtime.
//!
//! [`Database`] is the process-wide connection manager: it builds the pool
//! once, hands out one [`Session`] per request, and disposes of the pool at
//! shutdown. Sessions implement [`roster_core::repository::Repository`] for
//! every resource that has a [`table::Table`] mapping.

mod encode;
mod schema;
mod session;

pub mod config;
pub mod database;
pub mod error;
pub mod table;

pub use config::{DatabaseConfig, Location};
pub use database::{Database, Engine};
pub use error::{Error, Result};
pub use session::Session;
