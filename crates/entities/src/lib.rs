//! Core entity definitions for the memories server.
//!
//! This crate defines the persistent records shared by the store, the session
//! gate and the HTTP server: invited users and memory posts.

mod memory;
mod user;

pub use memory::*;
pub use user::*;
