//! ObraApp Assistant - Audit questions answered by a hosted language model
//!
//! The assistant has no structured schema: each question is sent together
//! with a plain-text digest of the current projects, certificates and
//! payments, under a fixed auditing instruction.

pub mod chat;
pub mod digest;
pub mod error;
pub mod model;

pub use chat::*;
pub use digest::*;
pub use error::*;
pub use model::*;
