//! Catalog lookups that do not change any state.

use holewatch_core::Watchlist;
use serde::Serialize;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct SearchResult {
    info: String,
    systems: Vec<String>,
}

pub fn search(watchlist: &Watchlist, description: &[String], global: &GlobalOpts) -> Result<(), CliError> {
    let derivation = watchlist.roster().search(&description.join(" "));
    let result = SearchResult {
        info: derivation.info,
        systems: derivation.codes.into_iter().collect(),
    };
    let out = output::render_single(
        &global.output,
        &result,
        |r| format!("{}\n{}", r.info, r.systems.join(" ")),
        |r| r.systems.join("\n"),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub fn static_info(watchlist: &Watchlist, code: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let info = watchlist
        .roster()
        .static_info(code)
        .ok_or_else(|| CliError::Catalog {
            message: format!("unknown static '{}'", code.trim().to_uppercase()),
        })?;
    let out = output::render_single(
        &global.output,
        &info,
        |s| {
            let mut line = format!("*{}* -> {}", s.code, s.leads_to);
            if let Some(hours) = s.lifetime_hours {
                line.push_str(&format!(", lifetime {hours}h"));
            }
            if let Some(mass) = s.max_mass_kg {
                line.push_str(&format!(", max mass {mass} kg"));
            }
            if let Some(mass) = s.jump_mass_kg {
                line.push_str(&format!(", jump mass {mass} kg"));
            }
            line
        },
        |s| s.code.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
