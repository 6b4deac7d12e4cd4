//! ObraApp Sync - Remote mirror of the entity snapshot
//!
//! This crate provides:
//! - The remote store seam (`RemoteStore`) and a PostgREST implementation
//! - An in-memory remote for offline use and tests
//! - The sync adapter: initial pull, per-collection upsert push
//! - A background push worker with at most one push in flight
//! - The four-state connection status
//!
//! Sync is best effort: failures are logged and reflected in the status,
//! never retried, and never roll back local state. Concurrent edits from
//! several clients are not reconciled; the last upsert of a collection wins.

pub mod adapter;
pub mod error;
pub mod memory;
pub mod postgrest;
pub mod remote;
pub mod status;
pub mod worker;

pub use adapter::*;
pub use error::*;
pub use memory::*;
pub use postgrest::*;
pub use remote::*;
pub use status::*;
pub use worker::*;
