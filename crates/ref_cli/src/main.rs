//! Whistle referee console
//!
//! `run` drives a match controller at 1 Hz from the terminal;
//! `history` browses the stored completed matches.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ref_core::{FileHistoryStore, LogFeedback, Match, MatchController};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

mod config;
mod console;
mod history;

use config::ConfigArgs;
use console::{apply, parse_command, render_effect, status_text, Command, HELP};
use history::{handle_history_command, HistoryCommand};

#[derive(Parser)]
#[command(name = "whistle")]
#[command(about = "Match clock and record keeping for referees", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding the completed-match history file
    #[arg(long, global = true, default_value = ".whistle")]
    history_dir: PathBuf,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Officiate a match from the console
    Run {
        #[command(flatten)]
        config: ConfigArgs,

        /// Home team name
        #[arg(long, default_value = "Home")]
        home: String,

        /// Away team name
        #[arg(long, default_value = "Away")]
        away: String,

        /// Do not print the clock every second
        #[arg(long)]
        quiet_clock: bool,
    },

    /// Stored match history
    #[command(subcommand)]
    History(HistoryCommand),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    std::fs::create_dir_all(&cli.history_dir)
        .with_context(|| format!("creating history directory {}", cli.history_dir.display()))?;
    let mut store = FileHistoryStore::new(&cli.history_dir);

    match cli.command {
        Commands::Run {
            config,
            home,
            away,
            quiet_clock,
        } => {
            let configuration = config.resolve()?;
            let match_info = Match::new(configuration).with_teams(home, away);
            let controller = MatchController::new(match_info)
                .with_feedback(Box::new(LogFeedback))
                .with_history(Box::new(store));
            run_console(controller, !quiet_clock).await
        }
        Commands::History(command) => handle_history_command(&mut store, command),
    }
}

/// Tick once a second and apply typed commands until `quit` or end of input.
async fn run_console(mut controller: MatchController, show_clock: bool) -> Result<()> {
    println!("{}", status_text(&controller));
    println!("Type 'help' for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if controller.has_active_timers() {
                    controller.tick();
                }
            }
            line = lines.next_line() => {
                let Some(line) = line.context("reading console input")? else {
                    tracing::info!("console input closed");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_command(&line) {
                    Ok(Command::Quit) => break,
                    Ok(Command::Help) => println!("{}", HELP),
                    Ok(Command::Status) => println!("{}", status_text(&controller)),
                    Ok(Command::Events) => {
                        for record in controller.events() {
                            println!("{} {} {}", record.match_time, record.period_label(), record.description());
                        }
                    }
                    Ok(command) => {
                        if !apply(&mut controller, command) {
                            println!("not available in phase: {}", controller.phase().label());
                        }
                    }
                    Err(err) => println!("{}", err),
                }
            }
        }

        let period = controller.current_period();
        for effect in controller.drain_effects() {
            if let Some(text) = render_effect(&effect, period, show_clock) {
                println!("{}", text);
            }
        }
    }

    if !controller.phase().is_terminal() && controller.match_info().started_at.is_some() {
        println!("Match left unfinished in phase: {}", controller.phase().label());
    }
    Ok(())
}
