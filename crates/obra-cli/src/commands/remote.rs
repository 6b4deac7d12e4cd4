//! Remote store settings and manual sync

use clap::{Args, Subcommand};

use obra_runtime::{AppConfig, RemoteSettings, Session};

use crate::error::{CliError, CliResult};

#[derive(Args, Debug)]
pub struct RemoteArgs {
    #[command(subcommand)]
    pub command: RemoteCommands,
}

#[derive(Subcommand, Debug)]
pub enum RemoteCommands {
    /// Store the project URL and API key
    Set(SetArgs),
    /// Forget the stored credentials and work locally
    Clear,
    /// Show the configured remote and its connection state
    Status,
}

#[derive(Args, Debug)]
pub struct SetArgs {
    /// Project URL, e.g. https://xyz.supabase.co
    #[arg(long)]
    pub url: String,

    /// Anonymous (public) API key
    #[arg(long)]
    pub key: String,
}

pub async fn execute(args: RemoteArgs, config: &AppConfig) -> CliResult<()> {
    match args.command {
        RemoteCommands::Set(set) => {
            let settings = RemoteSettings::new(set.url.trim(), set.key.trim());
            if !settings.is_configured() {
                return Err(CliError::Validation("both --url and --key are required".to_string()));
            }
            settings
                .connect()
                .map_err(|e| CliError::Validation(e.to_string()))?;
            settings.save(&config.data_dir)?;
            println!("Remote store set to {}", settings.sb_url);
            Ok(())
        }
        RemoteCommands::Clear => {
            RemoteSettings::default().save(&config.data_dir)?;
            println!("Remote store cleared. Working locally.");
            Ok(())
        }
        RemoteCommands::Status => {
            if !config.remote.is_configured() {
                println!("Remote store: not configured");
                println!("Status:       {}", obra_sync::SyncStatus::Local.label());
                return Ok(());
            }
            let session = Session::open(config).await?;
            println!("Remote store: {}", config.remote.sb_url);
            println!("Status:       {}", session.sync_status().label());
            session.shutdown().await;
            Ok(())
        }
    }
}

/// Pull, then push the resulting snapshot and wait for the push to finish
pub async fn sync(config: &AppConfig) -> CliResult<()> {
    if !config.remote.is_configured() {
        return Err(CliError::Validation(
            "no remote store configured; run `obra remote set` first".to_string(),
        ));
    }

    let session = Session::open(config).await?;
    session.push_now();
    let stats = session.shutdown().await;

    let pushed = stats.sync.map(|s| s.pushed).unwrap_or_default();
    println!("Status: {} (pushes: {pushed})", stats.status.label());
    Ok(())
}
