//! `history` subcommand: browse and prune stored matches.

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use ref_core::models::CompletedMatchSummary;
use ref_core::{FileHistoryStore, HistoryStore};
use uuid::Uuid;

#[derive(Subcommand, Debug)]
pub enum HistoryCommand {
    /// List stored matches, newest first
    List {
        /// Show at most this many
        #[arg(long, default_value = "20")]
        limit: usize,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print one match with its full event log as JSON
    Show { id: Uuid },

    /// Delete one match
    Delete { id: Uuid },

    /// Delete every stored match
    Wipe {
        /// Required confirmation
        #[arg(long)]
        yes: bool,
    },
}

pub fn handle_history_command(store: &mut FileHistoryStore, command: HistoryCommand) -> Result<()> {
    match command {
        HistoryCommand::List { limit, json } => {
            let mut matches = store
                .load_all()
                .with_context(|| format!("reading {}", store.path().display()))?;
            matches.truncate(limit);
            let summaries: Vec<CompletedMatchSummary> =
                matches.iter().map(|m| m.summary()).collect();

            if json {
                println!("{}", serde_json::to_string_pretty(&summaries)?);
            } else if summaries.is_empty() {
                println!("No stored matches in {}", store.path().display());
            } else {
                for summary in &summaries {
                    println!("{}", summary_row(summary));
                }
            }
        }
        HistoryCommand::Show { id } => {
            let matches = store.load_all()?;
            let Some(found) = matches.into_iter().find(|m| m.id == id) else {
                bail!("no stored match with id {}", id);
            };
            println!("{}", serde_json::to_string_pretty(&found)?);
        }
        HistoryCommand::Delete { id } => {
            if !store.delete(id)? {
                bail!("no stored match with id {}", id);
            }
            println!("Deleted {}", id);
        }
        HistoryCommand::Wipe { yes } => {
            if !yes {
                bail!("refusing to wipe history without --yes");
            }
            store.wipe_all()?;
            tracing::info!(path = %store.path().display(), "history wiped");
            println!("History wiped");
        }
    }
    Ok(())
}

fn summary_row(summary: &CompletedMatchSummary) -> String {
    format!(
        "{}  {}  {} {}-{} {}  ({} events)",
        summary.id,
        summary.completed_at.format("%Y-%m-%d %H:%M"),
        summary.home_team,
        summary.home_score,
        summary.away_score,
        summary.away_team,
        summary.event_count,
    )
}
