//! `hub`: run and administer a Project-HUB server.

#![forbid(unsafe_code)]

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;

use hub_api::{AppState, HubConfig};
use hub_auth_local::PasswordHasher;
use hub_cli::admin::Accounts;
use hub_cli::cli::{AdminAction, Cli, Command};
use hub_cli::config_handlers::handle_config_command;
use hub_cli::logging;
use hub_storage::RedbStore;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Command::Serve { ephemeral } => serve(cli.config.as_deref(), ephemeral).await,
        Command::Config { action } => {
            handle_config_command(cli.config.as_deref(), action)?;
            Ok(())
        }
        Command::Admin { action } => admin(cli.config.as_deref(), action).await,
    }
}

async fn serve(config_path: Option<&Path>, ephemeral: bool) -> Result<()> {
    let mut config = HubConfig::load(config_path).context("loading configuration")?;
    if ephemeral {
        config.storage.ephemeral = true;
    }
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        ephemeral = config.storage.ephemeral,
        "starting Project-HUB"
    );

    let state = AppState::from_config(&config).context("building application state")?;
    hub_api::serve(&config, state).await?;
    Ok(())
}

async fn admin(config_path: Option<&Path>, action: AdminAction) -> Result<()> {
    let config = HubConfig::load(config_path).context("loading configuration")?;
    if config.storage.ephemeral {
        bail!("storage.ephemeral is set; accounts created now would vanish on exit");
    }
    let store = RedbStore::open(&config.storage.path)
        .with_context(|| format!("opening {}", config.storage.path.display()))?;
    let accounts = Accounts::new(Arc::new(store), PasswordHasher::default());

    let profile = match action {
        AdminAction::Create {
            name,
            email,
            password,
        } => accounts.create_admin(&name, &email, &password).await?,
        AdminAction::Promote { email } => accounts.promote(&email).await?,
    };
    println!("{} <{}> is now an admin (id {})", profile.name, profile.email, profile.id);
    Ok(())
}
