//! Entity definitions
//!
//! Four record kinds make up the tracked state. Cross references
//! (`contractor_id`, `project_id`) are weak: nothing guarantees the target
//! still exists, so every consumer resolves them through an `Option`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Amount, EntityId, ObraError};

/// The four collections of the state snapshot
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Contractor,
    Project,
    Certificate,
    Payment,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Contractor,
        EntityKind::Project,
        EntityKind::Certificate,
        EntityKind::Payment,
    ];

    /// Remote table name
    pub fn table_name(self) -> &'static str {
        match self {
            EntityKind::Contractor => "contractors",
            EntityKind::Project => "projects",
            EntityKind::Certificate => "certificates",
            EntityKind::Payment => "payments",
        }
    }

    /// Spreadsheet sheet name
    pub fn sheet_name(self) -> &'static str {
        match self {
            EntityKind::Contractor => "Contratistas",
            EntityKind::Project => "Obras",
            EntityKind::Certificate => "Certificados",
            EntityKind::Payment => "Pagos",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Contractor => "contractor",
            EntityKind::Project => "project",
            EntityKind::Certificate => "certificate",
            EntityKind::Payment => "payment",
        };
        f.write_str(name)
    }
}

/// Common surface of the four record kinds
pub trait Entity {
    const KIND: EntityKind;

    fn id(&self) -> &EntityId;
}

/// Contractor rating: either a numeric score or a free-text label
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Rating {
    Score(f64),
    Label(String),
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rating::Score(score) => write!(f, "{score}"),
            Rating::Label(label) => f.write_str(label),
        }
    }
}

/// Contracting company
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contractor {
    pub id: EntityId,
    pub name: String,
    pub tax_id: String,
    pub contact: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
}

impl Entity for Contractor {
    const KIND: EntityKind = EntityKind::Contractor;

    fn id(&self) -> &EntityId {
        &self.id
    }
}

/// Project lifecycle status
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    #[default]
    Active,
    Paused,
    Completed,
}

impl ProjectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::Active => "active",
            ProjectStatus::Paused => "paused",
            ProjectStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = ObraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(ProjectStatus::Active),
            "paused" => Ok(ProjectStatus::Paused),
            "completed" => Ok(ProjectStatus::Completed),
            _ => Err(ObraError::InvalidValue {
                field: "status",
                value: s.to_string(),
            }),
        }
    }
}

/// Public work ("obra") with a fixed budget
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: EntityId,
    pub name: String,
    pub file_number: String,
    pub budget: Amount,
    pub contractor_id: EntityId,
    pub start_date: String,
    #[serde(default)]
    pub status: ProjectStatus,
}

impl Entity for Project {
    const KIND: EntityKind = EntityKind::Project;

    fn id(&self) -> &EntityId {
        &self.id
    }
}

/// One certified progress event for a project
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub id: EntityId,
    pub project_id: EntityId,
    pub period: String,
    /// Percentage, 0-100 expected but not enforced
    pub physical_progress: f64,
    pub financial_amount: Amount,
    pub timestamp: String,
}

impl Entity for Certificate {
    const KIND: EntityKind = EntityKind::Certificate;

    fn id(&self) -> &EntityId {
        &self.id
    }
}

/// One disbursement against a project
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: EntityId,
    pub project_id: EntityId,
    pub amount: Amount,
    pub date: String,
    pub reference: String,
}

impl Entity for Payment {
    const KIND: EntityKind = EntityKind::Payment;

    fn id(&self) -> &EntityId {
        &self.id
    }
}

// ============================================================================
// FORM INPUTS
// ============================================================================

/// Submitted contractor form
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NewContractor {
    pub name: String,
    pub tax_id: String,
    pub contact: String,
    pub specialty: Option<String>,
    pub rating: Option<Rating>,
}

impl NewContractor {
    /// Blank specialty or rating label is stored as absent
    pub fn into_contractor(self, id: EntityId) -> Contractor {
        let rating = match self.rating {
            Some(Rating::Label(label)) if label.trim().is_empty() => None,
            rating => rating,
        };
        Contractor {
            id,
            name: self.name,
            tax_id: self.tax_id,
            contact: self.contact,
            specialty: self.specialty.filter(|s| !s.trim().is_empty()),
            rating,
        }
    }
}

/// Submitted project form; new projects always start `Active`
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NewProject {
    pub name: String,
    pub file_number: String,
    pub budget: Amount,
    pub contractor_id: EntityId,
    pub start_date: String,
}

impl NewProject {
    pub fn into_project(self, id: EntityId) -> Project {
        Project {
            id,
            name: self.name,
            file_number: self.file_number,
            budget: self.budget,
            contractor_id: self.contractor_id,
            start_date: self.start_date,
            status: ProjectStatus::Active,
        }
    }
}

/// Submitted certificate form
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NewCertificate {
    pub project_id: EntityId,
    pub period: String,
    pub physical_progress: f64,
    pub financial_amount: Amount,
}

impl NewCertificate {
    pub fn into_certificate(self, id: EntityId, timestamp: String) -> Certificate {
        Certificate {
            id,
            project_id: self.project_id,
            period: self.period,
            physical_progress: self.physical_progress,
            financial_amount: self.financial_amount,
            timestamp,
        }
    }
}

/// Submitted payment form
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NewPayment {
    pub project_id: EntityId,
    pub amount: Amount,
    pub date: String,
    pub reference: String,
}

impl NewPayment {
    pub fn into_payment(self, id: EntityId) -> Payment {
        Payment {
            id,
            project_id: self.project_id,
            amount: self.amount,
            date: self.date,
            reference: self.reference,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_uses_camel_case_fields() {
        let project = NewProject {
            name: "Escuela N° 12".into(),
            file_number: "EXP-2024-001".into(),
            budget: 100_000.0,
            contractor_id: EntityId::new("c1"),
            start_date: "2024-03-01".into(),
        }
        .into_project(EntityId::new("p1"));

        let json = serde_json::to_value(&project).unwrap();
        assert_eq!(json["fileNumber"], "EXP-2024-001");
        assert_eq!(json["contractorId"], "c1");
        assert_eq!(json["status"], "active");
    }

    #[test]
    fn test_contractor_optional_fields_omitted() {
        let contractor = NewContractor {
            name: "Vial Norte SA".into(),
            tax_id: "30-12345678-9".into(),
            contact: "obras@vialnorte.com".into(),
            ..Default::default()
        }
        .into_contractor(EntityId::new("c1"));

        let json = serde_json::to_value(&contractor).unwrap();
        assert!(json.get("specialty").is_none());
        assert!(json.get("rating").is_none());
        assert_eq!(json["taxId"], "30-12345678-9");
    }

    #[test]
    fn test_blank_optional_fields_become_absent() {
        let contractor = NewContractor {
            name: "Vial Norte SA".into(),
            specialty: Some(String::new()),
            rating: Some(Rating::Label("  ".into())),
            ..Default::default()
        }
        .into_contractor(EntityId::new("c1"));
        assert_eq!(contractor.specialty, None);
        assert_eq!(contractor.rating, None);
    }

    #[test]
    fn test_rating_accepts_number_or_label() {
        let score: Rating = serde_json::from_str("4.5").unwrap();
        let label: Rating = serde_json::from_str("\"A+\"").unwrap();
        assert_eq!(score, Rating::Score(4.5));
        assert_eq!(label, Rating::Label("A+".into()));
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("Paused".parse::<ProjectStatus>().unwrap(), ProjectStatus::Paused);
        assert!("archived".parse::<ProjectStatus>().is_err());
    }

    #[test]
    fn test_kind_names() {
        let sheets: Vec<_> = EntityKind::ALL.iter().map(|k| k.sheet_name()).collect();
        assert_eq!(sheets, ["Contratistas", "Obras", "Certificados", "Pagos"]);
        assert_eq!(EntityKind::Payment.table_name(), "payments");
    }
}
