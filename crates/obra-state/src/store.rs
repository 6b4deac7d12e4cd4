//! Entity store - the four collections and their mutation entry points

use chrono::{SecondsFormat, Utc};
use tracing::{debug, warn};

use obra_core::{
    Certificate, ConstructionState, Contractor, Entity, EntityId, NewCertificate, NewContractor,
    NewPayment, NewProject, ObraError, ObraResult, Payment, Project, Rating,
};

/// Label shown for a certificate or payment whose project no longer exists
pub const DELETED_PROJECT_LABEL: &str = "Obra Borrada";

/// Label shown for a project whose contractor is missing
pub const UNASSIGNED_CONTRACTOR_LABEL: &str = "Sin contratista asignado";

/// In-memory store over one state snapshot
///
/// Records are append/remove only. Insertion order is kept for listing but
/// no computation depends on it.
#[derive(Debug, Default)]
pub struct EntityStore {
    state: ConstructionState,
}

impl EntityStore {
    pub fn new() -> Self {
        EntityStore::default()
    }

    pub fn from_snapshot(state: ConstructionState) -> Self {
        EntityStore { state }
    }

    /// Read-only view of all four collections
    pub fn snapshot(&self) -> &ConstructionState {
        &self.state
    }

    pub fn into_snapshot(self) -> ConstructionState {
        self.state
    }

    /// Replace every collection at once, returning the previous snapshot
    pub fn replace(&mut self, state: ConstructionState) -> ConstructionState {
        debug!(records = state.total_records(), "replacing store snapshot");
        std::mem::replace(&mut self.state, state)
    }

    // ------------------------------------------------------------------
    // Create
    //
    // Negative numbers are accepted; NaN and infinities are rejected since
    // the snapshot file cannot represent them.
    // ------------------------------------------------------------------

    pub fn add_contractor(&mut self, input: NewContractor) -> ObraResult<&Contractor> {
        if let Some(Rating::Score(score)) = input.rating {
            ensure_finite("rating", score)?;
        }
        let id = fresh_id(&self.state.contractors);
        self.state.contractors.push(input.into_contractor(id));
        let added = &self.state.contractors[self.state.contractors.len() - 1];
        debug!(id = %added.id, "contractor created");
        Ok(added)
    }

    pub fn add_project(&mut self, input: NewProject) -> ObraResult<&Project> {
        ensure_finite("budget", input.budget)?;
        if input.budget < 0.0 {
            warn!(budget = input.budget, "accepting negative project budget");
        }
        let id = fresh_id(&self.state.projects);
        self.state.projects.push(input.into_project(id));
        let added = &self.state.projects[self.state.projects.len() - 1];
        debug!(id = %added.id, "project created");
        Ok(added)
    }

    /// Record a certificate stamped with the current instant
    pub fn add_certificate(&mut self, input: NewCertificate) -> ObraResult<&Certificate> {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        self.add_certificate_at(input, timestamp)
    }

    pub fn add_certificate_at(
        &mut self,
        input: NewCertificate,
        timestamp: String,
    ) -> ObraResult<&Certificate> {
        ensure_finite("physicalProgress", input.physical_progress)?;
        ensure_finite("financialAmount", input.financial_amount)?;
        if input.financial_amount < 0.0 {
            warn!(amount = input.financial_amount, "accepting negative certified amount");
        }
        let id = fresh_id(&self.state.certificates);
        self.state
            .certificates
            .push(input.into_certificate(id, timestamp));
        let added = &self.state.certificates[self.state.certificates.len() - 1];
        debug!(id = %added.id, project = %added.project_id, "certificate created");
        Ok(added)
    }

    pub fn add_payment(&mut self, input: NewPayment) -> ObraResult<&Payment> {
        ensure_finite("amount", input.amount)?;
        if input.amount < 0.0 {
            warn!(amount = input.amount, "accepting negative payment amount");
        }
        let id = fresh_id(&self.state.payments);
        self.state.payments.push(input.into_payment(id));
        let added = &self.state.payments[self.state.payments.len() - 1];
        debug!(id = %added.id, project = %added.project_id, "payment created");
        Ok(added)
    }

    // ------------------------------------------------------------------
    // Remove (no cascade: dependents keep their dangling references)
    // ------------------------------------------------------------------

    pub fn remove_contractor(&mut self, id: &EntityId) -> Option<Contractor> {
        remove_by_id(&mut self.state.contractors, id)
    }

    pub fn remove_project(&mut self, id: &EntityId) -> Option<Project> {
        remove_by_id(&mut self.state.projects, id)
    }

    pub fn remove_certificate(&mut self, id: &EntityId) -> Option<Certificate> {
        remove_by_id(&mut self.state.certificates, id)
    }

    pub fn remove_payment(&mut self, id: &EntityId) -> Option<Payment> {
        remove_by_id(&mut self.state.payments, id)
    }

    // ------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------

    pub fn contractor(&self, id: &EntityId) -> Option<&Contractor> {
        self.state.contractors.iter().find(|c| &c.id == id)
    }

    pub fn project(&self, id: &EntityId) -> Option<&Project> {
        self.state.projects.iter().find(|p| &p.id == id)
    }

    /// Contractor name, or the unassigned placeholder
    pub fn contractor_name(&self, id: &EntityId) -> &str {
        self.contractor(id)
            .map(|c| c.name.as_str())
            .unwrap_or(UNASSIGNED_CONTRACTOR_LABEL)
    }

    /// Project name, or the deleted-project placeholder
    pub fn project_name(&self, id: &EntityId) -> &str {
        self.project(id)
            .map(|p| p.name.as_str())
            .unwrap_or(DELETED_PROJECT_LABEL)
    }

    /// Projects whose name contains `term` (case-insensitive) or whose file
    /// number contains it verbatim. An empty term matches everything.
    pub fn search_projects(&self, term: &str) -> Vec<&Project> {
        let needle = term.to_lowercase();
        self.state
            .projects
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle) || p.file_number.contains(term))
            .collect()
    }

    /// Number of projects referencing a contractor
    pub fn project_count_for(&self, contractor_id: &EntityId) -> usize {
        self.state
            .projects
            .iter()
            .filter(|p| &p.contractor_id == contractor_id)
            .count()
    }

    pub fn certificates_for<'a>(
        &'a self,
        project_id: &'a EntityId,
    ) -> impl Iterator<Item = &'a Certificate> + 'a {
        self.state
            .certificates
            .iter()
            .filter(move |c| &c.project_id == project_id)
    }

    pub fn payments_for<'a>(
        &'a self,
        project_id: &'a EntityId,
    ) -> impl Iterator<Item = &'a Payment> + 'a {
        self.state
            .payments
            .iter()
            .filter(move |p| &p.project_id == project_id)
    }
}

/// Generate an id not yet used in `items`
fn fresh_id<T: Entity>(items: &[T]) -> EntityId {
    loop {
        let id = EntityId::generate();
        if !items.iter().any(|item| item.id() == &id) {
            return id;
        }
        let kind = T::KIND;
        debug!(%kind, "regenerating colliding id");
    }
}

fn ensure_finite(field: &'static str, value: f64) -> ObraResult<()> {
    if value.is_finite() {
        return Ok(());
    }
    warn!(field, %value, "rejecting non-finite number");
    Err(ObraError::InvalidValue {
        field,
        value: value.to_string(),
    })
}

fn remove_by_id<T: Entity>(items: &mut Vec<T>, id: &EntityId) -> Option<T> {
    let pos = items.iter().position(|item| item.id() == id)?;
    let kind = T::KIND;
    debug!(%kind, %id, "removing record");
    Some(items.remove(pos))
}
