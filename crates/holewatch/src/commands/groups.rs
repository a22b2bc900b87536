//! Generic group command handlers.

use std::sync::Arc;

use holewatch_core::{EntityGroup, Watchlist};
use tabled::Tabled;

use crate::cli::{GlobalOpts, GroupsArgs, GroupsCommand};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct GroupRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Systems")]
    systems: usize,
}

impl From<&Arc<EntityGroup>> for GroupRow {
    fn from(g: &Arc<EntityGroup>) -> Self {
        Self {
            id: g.id,
            created: g.created.format("%Y-%m-%d").to_string(),
            description: g.description.clone(),
            systems: g.members.len(),
        }
    }
}

fn print_group(group: &EntityGroup, info: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_single(
        &global.output,
        group,
        |g| format!("{g}\n{info}"),
        |g| g.id.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(watchlist: &Watchlist, args: GroupsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let groups = watchlist.groups();
    match args.command {
        GroupsCommand::Add { description } => {
            let (group, info) = groups.add(&description.join(" "))?;
            print_group(&group, &info, global)
        }

        GroupsCommand::Remove { id } => {
            groups.remove(id)?;
            output::notice(&format!("Generic #{id} removed"), global.quiet);
            Ok(())
        }

        GroupsCommand::Edit { id, description } => {
            let (group, info) = groups.edit(id, &description.join(" "))?;
            print_group(&group, &info, global)
        }

        GroupsCommand::List => {
            let snap = groups.list();
            let out = output::render_list(
                &global.output,
                &snap,
                |g| GroupRow::from(g),
                |g| g.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        GroupsCommand::Members { id } => {
            let members: Vec<String> = groups
                .members_of(id)
                .ok_or_else(|| CliError::NotFound {
                    entity_type: "Generic".into(),
                    identifier: format!("#{id}"),
                    list_command: "groups list".into(),
                })?
                .into_iter()
                .collect();
            let out = output::render_single(
                &global.output,
                &members,
                |m| m.join(" "),
                |m| m.join("\n"),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        GroupsCommand::Containing { name } => {
            let ids = groups.containing(&name);
            let out = output::render_single(
                &global.output,
                &ids,
                |ids| {
                    ids.iter()
                        .filter_map(|id| groups.get(*id))
                        .map(|g| g.to_string())
                        .collect::<Vec<_>>()
                        .join("\n")
                },
                |ids| {
                    ids.iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join("\n")
                },
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        GroupsCommand::Clear => {
            super::require_yes("groups clear", global)?;
            groups.clear()?;
            output::notice("Generics cleared", global.quiet);
            Ok(())
        }
    }
}
