//! obra - Terminal front end for ObraApp
//!
//! Records contractors, projects, progress certificates and payments,
//! and reports what each project is owed. Data lives in a local snapshot
//! and is mirrored to a PostgREST backend when one is configured.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use obra_runtime::{init_logging, AppConfig};

mod commands;
mod error;
mod output;
mod prompt;

use error::CliResult;

/// obra - Public-works project ledger
#[derive(Parser, Debug)]
#[command(name = "obra")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Directory holding the local snapshot and settings
    #[arg(long, global = true, env = "OBRA_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage contractors
    Contractor(commands::entities::ContractorArgs),

    /// Manage projects
    Project(commands::entities::ProjectArgs),

    /// Manage progress certificates
    Certificate(commands::entities::CertificateArgs),

    /// Manage payments
    Payment(commands::entities::PaymentArgs),

    /// Show aggregate figures, budget execution and recent payments
    Dashboard(commands::report::DashboardArgs),

    /// Show certified, paid and owed amounts per project
    Debts(commands::report::DebtsArgs),

    /// Export all data to a spreadsheet workbook
    Export(commands::exchange::ExportArgs),

    /// Replace all data with the contents of a workbook
    Import(commands::exchange::ImportArgs),

    /// Browse one sheet of a workbook
    View(commands::exchange::ViewArgs),

    /// Configure the remote store
    Remote(commands::remote::RemoteArgs),

    /// Pull from and push to the remote store now
    Sync,

    /// Ask the audit assistant about the current data
    Ask(commands::ask::AskArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        e.print();
        std::process::exit(e.exit_code());
    }
}

fn load_config(data_dir: Option<PathBuf>) -> CliResult<AppConfig> {
    let data_dir = data_dir.map(|dir| dir.to_string_lossy().into_owned());
    let config = AppConfig::from_lookup(|key| match key {
        "OBRA_DATA_DIR" => data_dir.clone(),
        _ => std::env::var(key).ok(),
    })?;
    Ok(config)
}

async fn run(cli: Cli) -> CliResult<()> {
    let config = load_config(cli.data_dir)?;
    init_logging(&config.logging)?;

    match cli.command {
        Commands::Contractor(args) => commands::entities::contractor(args, &config).await,
        Commands::Project(args) => commands::entities::project(args, &config).await,
        Commands::Certificate(args) => commands::entities::certificate(args, &config).await,
        Commands::Payment(args) => commands::entities::payment(args, &config).await,
        Commands::Dashboard(args) => commands::report::dashboard(args, &config).await,
        Commands::Debts(args) => commands::report::debts(args, &config).await,
        Commands::Export(args) => commands::exchange::export(args, &config).await,
        Commands::Import(args) => commands::exchange::import(args, &config).await,
        Commands::View(args) => commands::exchange::view(args),
        Commands::Remote(args) => commands::remote::execute(args, &config).await,
        Commands::Sync => commands::remote::sync(&config).await,
        Commands::Ask(args) => commands::ask::execute(args, &config).await,
    }
}
