//! ObraApp Core - Fundamental types for public-works tracking
//!
//! This crate defines the types shared by every other crate:
//! - Identifiers (EntityId)
//! - The four entity kinds (Contractor, Project, Certificate, Payment)
//! - The full state snapshot (ConstructionState)
//! - Amount display formatting
//! - Error types

pub mod entity;
pub mod error;
pub mod id;
pub mod money;
pub mod snapshot;

pub use entity::*;
pub use error::*;
pub use id::*;
pub use money::*;
pub use snapshot::*;

/// Currency amount
///
/// Sums of fractional amounts may differ in the last bits depending on
/// summation order; whole-unit amounts below 2^53 sum exactly.
pub type Amount = f64;
