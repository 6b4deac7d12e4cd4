//! ObraApp Runtime - Application session and ambient setup
//!
//! A [`Session`] owns the entity store for the lifetime of one process:
//! 1. Load the local snapshot
//! 2. Pull from the remote store, when one is configured
//! 3. Apply mutations, persisting the whole snapshot after each one
//! 4. Hand every new snapshot to the background push worker
//! 5. Drain the pending push on shutdown

pub mod config;
pub mod error;
pub mod observability;
pub mod session;

pub use config::*;
pub use error::*;
pub use observability::*;
pub use session::*;
