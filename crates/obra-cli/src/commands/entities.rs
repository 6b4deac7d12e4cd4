//! Contractor, project, certificate and payment commands

use clap::{Args, Subcommand};

use obra_core::{
    format_currency, EntityId, NewCertificate, NewContractor, NewPayment, NewProject, Rating,
};
use obra_runtime::{AppConfig, Session};

use super::{today, with_session};
use crate::error::{CliError, CliResult};
use crate::output::{print_json, truncate, Table};
use crate::prompt::confirm;

const NAME_WIDTH: usize = 30;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Record id
    pub id: String,

    /// Skip confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

fn not_found(kind: &str, id: &EntityId) -> CliError {
    CliError::NotFound(format!("no {kind} with id {id}"))
}

// ============================================================================
// CONTRACTORS
// ============================================================================

#[derive(Args, Debug)]
pub struct ContractorArgs {
    #[command(subcommand)]
    pub command: ContractorCommands,
}

#[derive(Subcommand, Debug)]
pub enum ContractorCommands {
    /// Register a contractor
    Add(AddContractorArgs),
    /// List contractors
    List(ListArgs),
    /// Delete a contractor; its projects keep the dangling reference
    Remove(RemoveArgs),
}

#[derive(Args, Debug)]
pub struct AddContractorArgs {
    /// Company name
    #[arg(long)]
    pub name: String,

    /// Tax id (CUIT)
    #[arg(long)]
    pub tax_id: String,

    /// Contact person, phone or e-mail
    #[arg(long, default_value = "")]
    pub contact: String,

    #[arg(long, value_parser = parse_specialty)]
    pub specialty: Option<String>,

    /// Numeric score or free-text label
    #[arg(long, value_parser = parse_rating)]
    pub rating: Option<Rating>,
}

/// Amounts and percentages must be finite numbers
fn parse_finite(raw: &str) -> Result<f64, String> {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        Ok(_) => Err(format!("{raw} is not a finite number")),
        Err(e) => Err(e.to_string()),
    }
}

fn parse_specialty(raw: &str) -> Result<String, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("specialty cannot be empty".to_string());
    }
    Ok(raw.to_string())
}

fn parse_rating(raw: &str) -> Result<Rating, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("rating cannot be empty".to_string());
    }
    Ok(match raw.parse::<f64>() {
        Ok(score) if score.is_finite() => Rating::Score(score),
        _ => Rating::Label(raw.to_string()),
    })
}

pub async fn contractor(args: ContractorArgs, config: &AppConfig) -> CliResult<()> {
    match args.command {
        ContractorCommands::Add(add) => {
            with_session(config, |session| {
                let contractor = session.add_contractor(NewContractor {
                    name: add.name,
                    tax_id: add.tax_id,
                    contact: add.contact,
                    specialty: add.specialty,
                    rating: add.rating,
                })?;
                println!("Contractor added: {} ({})", contractor.name, contractor.id);
                Ok(())
            })
            .await
        }
        ContractorCommands::List(list) => {
            with_session(config, |session| list_contractors(session, list.json)).await
        }
        ContractorCommands::Remove(remove) => {
            with_session(config, |session| {
                let id = EntityId::new(remove.id);
                let contractor = session
                    .store()
                    .contractor(&id)
                    .ok_or_else(|| not_found("contractor", &id))?;
                let prompt = format!("Delete contractor '{}'?", contractor.name);
                if !confirm(&prompt, remove.yes)? {
                    println!("Cancelled.");
                    return Ok(());
                }
                if let Some(removed) = session.remove_contractor(&id)? {
                    println!("Contractor deleted: {}", removed.name);
                }
                Ok(())
            })
            .await
        }
    }
}

fn list_contractors(session: &Session, json: bool) -> CliResult<()> {
    let store = session.store();
    let contractors = &store.snapshot().contractors;
    if json {
        return print_json(contractors);
    }
    if contractors.is_empty() {
        println!("No contractors.");
        return Ok(());
    }

    let mut table = Table::new(["ID", "NAME", "TAX ID", "CONTACT", "SPECIALTY", "RATING", "PROJECTS"]);
    for c in contractors {
        table.row(vec![
            c.id.to_string(),
            truncate(&c.name, NAME_WIDTH),
            c.tax_id.clone(),
            c.contact.clone(),
            c.specialty.clone().unwrap_or_default(),
            c.rating.as_ref().map(ToString::to_string).unwrap_or_default(),
            store.project_count_for(&c.id).to_string(),
        ]);
    }
    table.print();
    Ok(())
}

// ============================================================================
// PROJECTS
// ============================================================================

#[derive(Args, Debug)]
pub struct ProjectArgs {
    #[command(subcommand)]
    pub command: ProjectCommands,
}

#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// Register a project
    Add(AddProjectArgs),
    /// List projects
    List(ProjectListArgs),
    /// Delete a project; its certificates and payments are kept
    Remove(RemoveArgs),
}

#[derive(Args, Debug)]
pub struct AddProjectArgs {
    #[arg(long)]
    pub name: String,

    /// Case file number (expediente)
    #[arg(long)]
    pub file_number: String,

    #[arg(long, allow_negative_numbers = true, value_parser = parse_finite)]
    pub budget: f64,

    /// Id of the assigned contractor
    #[arg(long)]
    pub contractor: String,

    /// YYYY-MM-DD, defaults to today
    #[arg(long)]
    pub start_date: Option<String>,
}

#[derive(Args, Debug)]
pub struct ProjectListArgs {
    /// Filter by name (case-insensitive) or file number
    #[arg(long)]
    pub search: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn project(args: ProjectArgs, config: &AppConfig) -> CliResult<()> {
    match args.command {
        ProjectCommands::Add(add) => {
            with_session(config, |session| {
                let contractor_id = EntityId::new(add.contractor);
                let project = session.add_project(NewProject {
                    name: add.name,
                    file_number: add.file_number,
                    budget: add.budget,
                    contractor_id,
                    start_date: add.start_date.unwrap_or_else(today),
                })?;
                println!(
                    "Project added: {} ({}), contractor: {}",
                    project.name,
                    project.id,
                    session.store().contractor_name(&project.contractor_id)
                );
                Ok(())
            })
            .await
        }
        ProjectCommands::List(list) => {
            with_session(config, |session| list_projects(session, &list)).await
        }
        ProjectCommands::Remove(remove) => {
            with_session(config, |session| {
                let id = EntityId::new(remove.id);
                let project = session
                    .store()
                    .project(&id)
                    .ok_or_else(|| not_found("project", &id))?;
                let prompt = format!("Delete project '{}' ({})?", project.name, project.file_number);
                if !confirm(&prompt, remove.yes)? {
                    println!("Cancelled.");
                    return Ok(());
                }
                if let Some(removed) = session.remove_project(&id)? {
                    println!("Project deleted: {}", removed.name);
                }
                Ok(())
            })
            .await
        }
    }
}

fn list_projects(session: &Session, args: &ProjectListArgs) -> CliResult<()> {
    let store = session.store();
    let projects = match &args.search {
        Some(term) => store.search_projects(term),
        None => store.snapshot().projects.iter().collect(),
    };
    if args.json {
        return print_json(&projects);
    }
    if projects.is_empty() {
        println!("No projects.");
        return Ok(());
    }

    let reconciler = session.reconciler();
    let mut table = Table::new(["ID", "FILE", "NAME", "CONTRACTOR", "BUDGET", "STATUS", "EXECUTED"]);
    for p in projects {
        table.row(vec![
            p.id.to_string(),
            p.file_number.clone(),
            truncate(&p.name, NAME_WIDTH),
            truncate(store.contractor_name(&p.contractor_id), NAME_WIDTH),
            format_currency(p.budget),
            p.status.to_string(),
            format!("{:.1}%", reconciler.execution_percent(p)),
        ]);
    }
    table.print();
    Ok(())
}

// ============================================================================
// CERTIFICATES
// ============================================================================

#[derive(Args, Debug)]
pub struct CertificateArgs {
    #[command(subcommand)]
    pub command: CertificateCommands,
}

#[derive(Subcommand, Debug)]
pub enum CertificateCommands {
    /// Record a progress certificate
    Add(AddCertificateArgs),
    /// List certificates
    List(LedgerListArgs),
    /// Delete a certificate
    Remove(RemoveArgs),
}

#[derive(Args, Debug)]
pub struct AddCertificateArgs {
    /// Id of the certified project
    #[arg(long)]
    pub project: String,

    /// Certified period, e.g. 2024-03
    #[arg(long)]
    pub period: String,

    /// Physical progress in percent
    #[arg(long, allow_negative_numbers = true, value_parser = parse_finite)]
    pub physical_progress: f64,

    /// Certified amount
    #[arg(long, allow_negative_numbers = true, value_parser = parse_finite)]
    pub amount: f64,
}

#[derive(Args, Debug)]
pub struct LedgerListArgs {
    /// Only records of this project id
    #[arg(long)]
    pub project: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn certificate(args: CertificateArgs, config: &AppConfig) -> CliResult<()> {
    match args.command {
        CertificateCommands::Add(add) => {
            with_session(config, |session| {
                let certificate = session.add_certificate(NewCertificate {
                    project_id: EntityId::new(add.project),
                    period: add.period,
                    physical_progress: add.physical_progress,
                    financial_amount: add.amount,
                })?;
                println!(
                    "Certificate added: {} for {}, {}",
                    certificate.id,
                    session.store().project_name(&certificate.project_id),
                    format_currency(certificate.financial_amount)
                );
                Ok(())
            })
            .await
        }
        CertificateCommands::List(list) => {
            with_session(config, |session| {
                let store = session.store();
                let filter = list.project.map(EntityId::new);
                let certificates: Vec<_> = match &filter {
                    Some(project_id) => store.certificates_for(project_id).collect(),
                    None => store.snapshot().certificates.iter().collect(),
                };
                if list.json {
                    return print_json(&certificates);
                }
                if certificates.is_empty() {
                    println!("No certificates.");
                    return Ok(());
                }

                let mut table = Table::new(["ID", "PROJECT", "PERIOD", "PHYSICAL", "AMOUNT"]);
                for c in certificates {
                    table.row(vec![
                        c.id.to_string(),
                        truncate(store.project_name(&c.project_id), NAME_WIDTH),
                        c.period.clone(),
                        format!("{}%", c.physical_progress),
                        format_currency(c.financial_amount),
                    ]);
                }
                table.print();
                Ok(())
            })
            .await
        }
        CertificateCommands::Remove(remove) => {
            with_session(config, |session| {
                let id = EntityId::new(remove.id);
                let certificate = session
                    .snapshot()
                    .certificates
                    .iter()
                    .find(|c| c.id == id)
                    .ok_or_else(|| not_found("certificate", &id))?;
                let prompt = format!(
                    "Delete certificate {} ({}, {})?",
                    certificate.id,
                    certificate.period,
                    format_currency(certificate.financial_amount)
                );
                if !confirm(&prompt, remove.yes)? {
                    println!("Cancelled.");
                    return Ok(());
                }
                if let Some(removed) = session.remove_certificate(&id)? {
                    println!("Certificate deleted: {}", removed.id);
                }
                Ok(())
            })
            .await
        }
    }
}

// ============================================================================
// PAYMENTS
// ============================================================================

#[derive(Args, Debug)]
pub struct PaymentArgs {
    #[command(subcommand)]
    pub command: PaymentCommands,
}

#[derive(Subcommand, Debug)]
pub enum PaymentCommands {
    /// Record a payment
    Add(AddPaymentArgs),
    /// List payments
    List(LedgerListArgs),
    /// Delete a payment
    Remove(RemoveArgs),
}

#[derive(Args, Debug)]
pub struct AddPaymentArgs {
    /// Id of the paid project
    #[arg(long)]
    pub project: String,

    #[arg(long, allow_negative_numbers = true, value_parser = parse_finite)]
    pub amount: f64,

    /// YYYY-MM-DD, defaults to today
    #[arg(long)]
    pub date: Option<String>,

    /// Payment order or transfer reference
    #[arg(long, default_value = "")]
    pub reference: String,
}

pub async fn payment(args: PaymentArgs, config: &AppConfig) -> CliResult<()> {
    match args.command {
        PaymentCommands::Add(add) => {
            with_session(config, |session| {
                let payment = session.add_payment(NewPayment {
                    project_id: EntityId::new(add.project),
                    amount: add.amount,
                    date: add.date.unwrap_or_else(today),
                    reference: add.reference,
                })?;
                println!(
                    "Payment added: {} to {}, {}",
                    payment.id,
                    session.store().project_name(&payment.project_id),
                    format_currency(payment.amount)
                );
                Ok(())
            })
            .await
        }
        PaymentCommands::List(list) => {
            with_session(config, |session| {
                let store = session.store();
                let filter = list.project.map(EntityId::new);
                let payments: Vec<_> = match &filter {
                    Some(project_id) => store.payments_for(project_id).collect(),
                    None => store.snapshot().payments.iter().collect(),
                };
                if list.json {
                    return print_json(&payments);
                }
                if payments.is_empty() {
                    println!("No payments.");
                    return Ok(());
                }

                let mut table = Table::new(["ID", "PROJECT", "DATE", "AMOUNT", "REFERENCE"]);
                for p in payments {
                    table.row(vec![
                        p.id.to_string(),
                        truncate(store.project_name(&p.project_id), NAME_WIDTH),
                        p.date.clone(),
                        format_currency(p.amount),
                        p.reference.clone(),
                    ]);
                }
                table.print();
                Ok(())
            })
            .await
        }
        PaymentCommands::Remove(remove) => {
            with_session(config, |session| {
                let id = EntityId::new(remove.id);
                let payment = session
                    .snapshot()
                    .payments
                    .iter()
                    .find(|p| p.id == id)
                    .ok_or_else(|| not_found("payment", &id))?;
                let prompt = format!(
                    "Delete payment {} ({}, {})?",
                    payment.id,
                    payment.date,
                    format_currency(payment.amount)
                );
                if !confirm(&prompt, remove.yes)? {
                    println!("Cancelled.");
                    return Ok(());
                }
                if let Some(removed) = session.remove_payment(&id)? {
                    println!("Payment deleted: {}", removed.id);
                }
                Ok(())
            })
            .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rating() {
        assert_eq!(parse_rating("4.5"), Ok(Rating::Score(4.5)));
        assert_eq!(parse_rating(" Excelente "), Ok(Rating::Label("Excelente".to_string())));
        assert!(parse_rating("").is_err());
    }

    #[test]
    fn test_parse_finite_rejects_nan_and_infinity() {
        assert_eq!(parse_finite("-1500.5"), Ok(-1500.5));
        assert!(parse_finite("NaN").is_err());
        assert!(parse_finite("inf").is_err());
        assert!(parse_finite("-infinity").is_err());
        assert!(parse_finite("abc").is_err());
    }

    #[test]
    fn test_parse_specialty_rejects_blank() {
        assert_eq!(parse_specialty(" Vial "), Ok("Vial".to_string()));
        assert!(parse_specialty("   ").is_err());
    }
}
