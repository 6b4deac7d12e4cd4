//! ObraApp State - Entity store and financial reconciliation
//!
//! This crate implements:
//! - The in-memory entity store with create/remove per collection
//! - Weak-reference lookups with placeholder labels
//! - The reconciliation engine (certified, paid, debt, execution %)
//! - The local snapshot file

pub mod persist;
pub mod reconcile;
pub mod store;

pub use persist::*;
pub use reconcile::*;
pub use store::*;
