//! Subcommand implementations

pub mod ask;
pub mod entities;
pub mod exchange;
pub mod remote;
pub mod report;

use obra_runtime::{AppConfig, Session};

use crate::error::CliResult;

/// Open a session, run `f` against it, then drain pending pushes
pub(crate) async fn with_session<T, F>(config: &AppConfig, f: F) -> CliResult<T>
where
    F: FnOnce(&mut Session) -> CliResult<T>,
{
    let mut session = Session::open(config).await?;
    let result = f(&mut session);
    session.shutdown().await;
    result
}

pub(crate) fn today() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}
