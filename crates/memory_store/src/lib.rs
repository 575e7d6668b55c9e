//! User and memory storage for the memories server.
//!
//! This crate provides the repository traits the server talks to, an
//! in-memory implementation (tests and ephemeral deployments) and a SQLite
//! implementation backed by sqlx.

mod error;
mod memory;
mod sqlite;
mod traits;

pub use error::*;
pub use memory::*;
pub use sqlite::*;
pub use traits::*;
