//! Command dispatch: bridges CLI args -> watchlist operations -> output.

pub mod catalog;
pub mod config_cmd;
pub mod groups;
pub mod roster;
pub mod run;

use std::sync::Arc;
use std::time::Duration;

use holewatch_api::{KillboardClient, ScoutClient, TransportConfig};
use holewatch_config::Config;
use holewatch_core::{
    Collaborators, ConnectionFeed, DisabledFeed, JournalMirror, JsonCatalog, KillboardStatus,
    MirrorStore, ScoutFeed, Watchlist,
};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a watchlist-bound command to its handler.
pub async fn dispatch(cmd: Command, config: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    if let Command::Run(args) = cmd {
        return run::handle(args, config, global).await;
    }

    let watchlist = open_watchlist(config)?;
    let result = match cmd {
        Command::Roster(args) => roster::handle(&watchlist, args, global).await,
        Command::Groups(args) => groups::handle(&watchlist, args, global),
        Command::Search { description } => catalog::search(&watchlist, &description, global),
        Command::Static { code } => catalog::static_info(&watchlist, &code, global),
        // Run and Config are handled before the watchlist is opened
        Command::Run(_) | Command::Config(_) => Err(CliError::Internal(
            "command dispatched to the wrong handler".into(),
        )),
    };
    // Let queued mirror writes land before exiting.
    watchlist.shutdown().await;
    result
}

/// Apply command-line overrides on top of the loaded configuration.
pub fn load_config(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut config = holewatch_config::load_config(global.config.as_deref())?;
    if let Some(ref database) = global.database {
        config.storage.database.clone_from(database);
    }
    if let Some(ref catalog) = global.catalog {
        config.catalog.path.clone_from(catalog);
    }
    Ok(config)
}

fn parse_url(field: &str, raw: &str) -> Result<url::Url, CliError> {
    raw.parse().map_err(|e: url::ParseError| CliError::Validation {
        field: field.into(),
        reason: format!("invalid URL '{raw}': {e}"),
    })
}

/// Build every collaborator from config and open the watchlist.
pub fn open_watchlist(config: &Config) -> Result<Watchlist, CliError> {
    let catalog = Arc::new(JsonCatalog::load(&config.catalog.path)?);

    let transport = TransportConfig {
        timeout: Duration::from_secs(config.killboard.timeout_secs),
        user_agent: config.killboard.user_agent.clone(),
    };
    let killboard = KillboardClient::new(
        parse_url("killboard.base_url", &config.killboard.base_url)?,
        &transport,
    )?;

    let feed: Arc<dyn ConnectionFeed> = if config.scout.enabled {
        let scout = ScoutClient::new(parse_url("scout.base_url", &config.scout.base_url)?, &transport)?;
        Arc::new(ScoutFeed::new(scout, config.scout.hub.clone()))
    } else {
        Arc::new(DisabledFeed)
    };

    let mirror: Option<Arc<dyn MirrorStore>> = config
        .mirror
        .enabled
        .then(|| Arc::new(JournalMirror::new(config.mirror.journal.clone())) as Arc<dyn MirrorStore>);

    let collaborators = Collaborators {
        catalog,
        status: Arc::new(KillboardStatus::new(killboard)),
        feed,
        mirror,
    };
    Ok(Watchlist::open(config.monitor_config()?, collaborators)?)
}

/// Refuse destructive operations unless `--yes` was given.
pub fn require_yes(action: &str, global: &GlobalOpts) -> Result<(), CliError> {
    if global.yes {
        Ok(())
    } else {
        Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        })
    }
}
