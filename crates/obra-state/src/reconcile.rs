//! Financial reconciliation
//!
//! Every figure is re-derived from the full snapshot on each call: certified
//! total, paid total and debt per project, and the same in aggregate. Sums
//! are order independent. Percentages divide by a budget that may be zero;
//! all of them go through [`percent_of`], which yields 0 in that case.

use obra_core::{Amount, Certificate, ConstructionState, EntityId, Payment, Project};

/// Maximum characters of a project name shown in budget rows
pub const BUDGET_LABEL_MAX_CHARS: usize = 15;

/// Number of payments listed as recent activity
pub const RECENT_PAYMENTS: usize = 5;

/// `part / whole * 100`, or 0 when `whole` is zero
#[inline]
pub fn percent_of(part: Amount, whole: Amount) -> f64 {
    if whole == 0.0 {
        0.0
    } else {
        part / whole * 100.0
    }
}

/// Whether a project still has certified work to pay
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DebtStatus {
    /// Debt > 0
    Pending,
    /// Debt <= 0, including overpayment
    Settled,
}

/// Per-project figures
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectSummary<'a> {
    pub project: &'a Project,
    pub cert_total: Amount,
    pub paid_total: Amount,
    /// `cert_total - paid_total`; negative means overpaid
    pub debt: Amount,
}

impl ProjectSummary<'_> {
    pub fn status(&self) -> DebtStatus {
        if self.debt > 0.0 {
            DebtStatus::Pending
        } else {
            DebtStatus::Settled
        }
    }

    /// Certified total as a percentage of the project budget
    pub fn execution_percent(&self) -> f64 {
        percent_of(self.cert_total, self.project.budget)
    }
}

/// Figures across all projects
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AggregateSummary {
    pub total_budget: Amount,
    /// Includes certificates of projects that no longer exist
    pub total_certificated: Amount,
    /// Includes payments of projects that no longer exist
    pub total_paid: Amount,
    pub total_debt: Amount,
}

impl AggregateSummary {
    /// Certified total as a percentage of the total budget
    pub fn executed_percent(&self) -> f64 {
        percent_of(self.total_certificated, self.total_budget)
    }
}

/// One bar of the budget-vs-executed chart
#[derive(Clone, Debug, PartialEq)]
pub struct BudgetRow {
    pub label: String,
    pub budget: Amount,
    pub executed: Amount,
}

fn certified_for(project_id: &EntityId, certificates: &[Certificate]) -> Amount {
    certificates
        .iter()
        .filter(|c| &c.project_id == project_id)
        .map(|c| c.financial_amount)
        .sum()
}

fn paid_for(project_id: &EntityId, payments: &[Payment]) -> Amount {
    payments
        .iter()
        .filter(|p| &p.project_id == project_id)
        .map(|p| p.amount)
        .sum()
}

/// Certified, paid and debt for one project
pub fn project_summary<'a>(
    project: &'a Project,
    certificates: &[Certificate],
    payments: &[Payment],
) -> ProjectSummary<'a> {
    let cert_total = certified_for(&project.id, certificates);
    let paid_total = paid_for(&project.id, payments);
    ProjectSummary {
        project,
        cert_total,
        paid_total,
        debt: cert_total - paid_total,
    }
}

/// Totals over every project, certificate and payment
pub fn aggregate_summary(
    projects: &[Project],
    certificates: &[Certificate],
    payments: &[Payment],
) -> AggregateSummary {
    let total_budget = projects.iter().map(|p| p.budget).sum();
    let total_certificated: Amount = certificates.iter().map(|c| c.financial_amount).sum();
    let total_paid: Amount = payments.iter().map(|p| p.amount).sum();
    AggregateSummary {
        total_budget,
        total_certificated,
        total_paid,
        total_debt: total_certificated - total_paid,
    }
}

/// Certified total of a project over its budget, in percent (0 for a zero budget)
pub fn execution_percent(project: &Project, certificates: &[Certificate]) -> f64 {
    percent_of(certified_for(&project.id, certificates), project.budget)
}

fn budget_label(name: &str) -> String {
    if name.chars().count() > BUDGET_LABEL_MAX_CHARS {
        let head: String = name.chars().take(BUDGET_LABEL_MAX_CHARS).collect();
        format!("{head}...")
    } else {
        name.to_string()
    }
}

/// Reconciliation views over one snapshot
#[derive(Clone, Copy, Debug)]
pub struct Reconciler<'a> {
    state: &'a ConstructionState,
}

impl<'a> Reconciler<'a> {
    pub fn new(state: &'a ConstructionState) -> Self {
        Reconciler { state }
    }

    pub fn project_summary(&self, project: &'a Project) -> ProjectSummary<'a> {
        project_summary(project, &self.state.certificates, &self.state.payments)
    }

    /// One summary per project, in project order
    pub fn summaries(&self) -> Vec<ProjectSummary<'a>> {
        self.state
            .projects
            .iter()
            .map(|p| self.project_summary(p))
            .collect()
    }

    pub fn aggregate(&self) -> AggregateSummary {
        aggregate_summary(
            &self.state.projects,
            &self.state.certificates,
            &self.state.payments,
        )
    }

    pub fn execution_percent(&self, project: &Project) -> f64 {
        execution_percent(project, &self.state.certificates)
    }

    /// Sum of per-project debts. Unlike `aggregate().total_debt` this ignores
    /// certificates and payments whose project is gone.
    pub fn total_owed(&self) -> Amount {
        self.summaries().iter().map(|s| s.debt).sum()
    }

    /// Budget against certified amount for every project
    pub fn budget_rows(&self) -> Vec<BudgetRow> {
        self.state
            .projects
            .iter()
            .map(|p| BudgetRow {
                label: budget_label(&p.name),
                budget: p.budget,
                executed: certified_for(&p.id, &self.state.certificates),
            })
            .collect()
    }

    /// Most recently recorded payments, newest first
    pub fn recent_payments(&self) -> Vec<&'a Payment> {
        self.state.payments.iter().rev().take(RECENT_PAYMENTS).collect()
    }
}
