//! Session gate for the memories server.
//!
//! This crate provides:
//! - Credential checks against the configured admin pair and invited users
//! - Per-client sessions and their storage
//! - Opaque session tokens

mod credentials;
mod error;
mod gate;
mod session;
mod session_store;
mod token;

pub use credentials::*;
pub use error::*;
pub use gate::*;
pub use session::*;
pub use session_store::*;
pub use token::*;

/// Default session lifetime in hours.
pub const DEFAULT_SESSION_TTL_HOURS: u64 = 24;
