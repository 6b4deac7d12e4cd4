//! Full state snapshot
//!
//! The snapshot is the unit of persistence, export, import and remote pull:
//! all four collections travel together and are always replaced whole.

use serde::{Deserialize, Serialize};

use crate::{Certificate, Contractor, EntityKind, Payment, Project};

/// The four entity collections
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstructionState {
    #[serde(default)]
    pub contractors: Vec<Contractor>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub certificates: Vec<Certificate>,
    #[serde(default)]
    pub payments: Vec<Payment>,
}

impl ConstructionState {
    pub fn new() -> Self {
        ConstructionState::default()
    }

    /// Number of records in one collection
    pub fn count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Contractor => self.contractors.len(),
            EntityKind::Project => self.projects.len(),
            EntityKind::Certificate => self.certificates.len(),
            EntityKind::Payment => self.payments.len(),
        }
    }

    /// True when all four collections are empty
    pub fn is_empty(&self) -> bool {
        EntityKind::ALL.iter().all(|k| self.count(*k) == 0)
    }

    /// Total number of records across collections
    pub fn total_records(&self) -> usize {
        EntityKind::ALL.iter().map(|k| self.count(*k)).sum()
    }
}
