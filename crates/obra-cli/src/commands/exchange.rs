//! Workbook export, import and browsing

use std::path::PathBuf;

use clap::Args;

use obra_exchange::{backup_file_name, display_cell, read_sheets, SheetView, SortDirection};
use obra_runtime::AppConfig;

use super::with_session;
use crate::error::{CliError, CliResult};
use crate::output::Table;
use crate::prompt::confirm;

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Output file, defaults to ObraApp_Backup_<date>.xlsx
    pub path: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Workbook to import
    pub path: PathBuf,

    /// Skip confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(Args, Debug)]
pub struct ViewArgs {
    /// Workbook to read
    pub path: PathBuf,

    /// Sheet name, defaults to the first sheet
    #[arg(long)]
    pub sheet: Option<String>,

    /// Only rows containing this text in any cell
    #[arg(long)]
    pub search: Option<String>,

    /// Column header to sort by
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort descending
    #[arg(long, requires = "sort")]
    pub desc: bool,
}

pub async fn export(args: ExportArgs, config: &AppConfig) -> CliResult<()> {
    let path = args.path.unwrap_or_else(|| {
        PathBuf::from(backup_file_name(chrono::Local::now().date_naive()))
    });
    with_session(config, |session| {
        session.export(&path)?;
        println!(
            "Exported {} records to {}",
            session.snapshot().total_records(),
            path.display()
        );
        Ok(())
    })
    .await
}

pub async fn import(args: ImportArgs, config: &AppConfig) -> CliResult<()> {
    with_session(config, |session| {
        let incoming = session.read_import(&args.path)?;
        println!(
            "{}: {} contractors, {} projects, {} certificates, {} payments",
            args.path.display(),
            incoming.contractors.len(),
            incoming.projects.len(),
            incoming.certificates.len(),
            incoming.payments.len()
        );

        let prompt = format!(
            "Replace the current {} records with the imported data?",
            session.snapshot().total_records()
        );
        if !confirm(&prompt, args.yes)? {
            println!("Cancelled.");
            return Ok(());
        }
        session.replace_snapshot(incoming)?;
        println!("Import complete.");
        Ok(())
    })
    .await
}

pub fn view(args: ViewArgs) -> CliResult<()> {
    let bytes = std::fs::read(&args.path)?;
    let sheets = read_sheets(&bytes)?;
    let sheet = match &args.sheet {
        Some(name) => sheets
            .iter()
            .find(|s| &s.name == name)
            .ok_or_else(|| CliError::NotFound(format!("sheet {name}")))?,
        None => sheets
            .first()
            .ok_or_else(|| CliError::Validation("workbook has no sheets".to_string()))?,
    };

    let mut view = SheetView::new(sheet);
    if let Some(term) = &args.search {
        view.set_search(term.as_str());
    }
    if let Some(column) = &args.sort {
        if sheet.column(column).is_none() {
            return Err(CliError::Validation(format!("no column named {column}")));
        }
        view.request_sort(column);
        if args.desc {
            view.request_sort(column);
        }
    }

    let rows = view.rows();
    let order = match view.sort() {
        Some((column, SortDirection::Ascending)) => format!(", by {column}"),
        Some((column, SortDirection::Descending)) => format!(", by {column} desc"),
        None => String::new(),
    };
    println!("{} ({} of {} rows{order})", sheet.name, rows.len(), sheet.rows.len());
    let mut table = Table::new(view.headers().iter().cloned());
    for cells in rows {
        table.row(cells.iter().map(display_cell).collect());
    }
    table.print();
    Ok(())
}
