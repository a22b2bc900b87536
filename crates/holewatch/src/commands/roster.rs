//! Roster command handlers.

use std::sync::Arc;

use holewatch_core::{MonitoredEntity, Watchlist};
use tabled::Tabled;

use crate::cli::{GlobalOpts, RosterArgs, RosterCommand};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct SystemRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Class")]
    class: String,
    #[tabled(rename = "Watched")]
    watched: String,
    #[tabled(rename = "Last Kill")]
    last_kill: String,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "Comments")]
    comments: String,
}

impl From<&Arc<MonitoredEntity>> for SystemRow {
    fn from(e: &Arc<MonitoredEntity>) -> Self {
        Self {
            name: e.name.to_string(),
            class: e.class.clone(),
            watched: if e.watched { "yes" } else { "no" }.into(),
            last_kill: e.watermark.event_time.clone(),
            created: e.created.format("%Y-%m-%d").to_string(),
            comments: e.comments.clone(),
        }
    }
}

fn print_entity(entity: &MonitoredEntity, global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_single(
        &global.output,
        entity,
        ToString::to_string,
        |e| e.name.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    watchlist: &Watchlist,
    args: RosterArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let roster = watchlist.roster();
    match args.command {
        RosterCommand::Add {
            name,
            unwatched,
            comments,
        } => {
            let entity = roster.add(&name, !unwatched, &comments).await?;
            output::notice(&format!("{} - added to the list", entity.name), global.quiet);
            print_entity(&entity, global)
        }

        RosterCommand::Remove { name } => {
            roster.remove(&name)?;
            output::notice(
                &format!("{} - removed from the list", name.trim().to_uppercase()),
                global.quiet,
            );
            Ok(())
        }

        RosterCommand::Edit {
            name,
            watched,
            comments,
        } => {
            let entity = roster.edit(&name, watched, &comments)?;
            print_entity(&entity, global)
        }

        RosterCommand::List => {
            let snap = roster.list();
            let out = output::render_list(
                &global.output,
                &snap,
                |e| SystemRow::from(e),
                |e| e.name.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        RosterCommand::Show { name } => {
            let entity = roster.get(&name).ok_or_else(|| CliError::NotFound {
                entity_type: "Wormhole".into(),
                identifier: name.trim().to_uppercase(),
                list_command: "roster list".into(),
            })?;
            print_entity(&entity, global)
        }

        RosterCommand::Info { name } => {
            output::print_output(&roster.info(&name), global.quiet);
            Ok(())
        }

        RosterCommand::Clear => {
            super::require_yes("roster clear", global)?;
            roster.clear()?;
            output::notice("Watchlist cleared", global.quiet);
            Ok(())
        }
    }
}
