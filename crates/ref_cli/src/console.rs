//! Line commands typed at the referee console.

use anyhow::{anyhow, bail, Result};
use ref_core::lifecycle::Effect;
use ref_core::models::{
    CardDetails, CardRecipient, CardType, GoalDetails, GoalType, PenaltyResult,
    SubstitutionDetails,
};
use ref_core::{ClockSnapshot, MatchController, TeamSide};

pub const HELP: &str = "\
commands:
  start                       kick off
  pause | resume              stop / restart the period clock
  stoppage on|off             count stoppage while play runs
  end                         end the running period
  ht-end                      close the half-time break
  next                        start the next period or extra-time half
  goal <home|away> [#] [own|pen|fk]
  yellow|red <home|away> [#] [reason...]
  sub <home|away> <out#> <in#>
  undo                        take back the latest goal, card, sub or kick
  pens <home|away>            start the shootout with that side kicking first
  kick <home|away> <scored|missed> [#]
  swap                        swap shootout kicking order
  pens-end                    close a decided shootout
  finalize | abandon | reset
  status | events | help | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Start,
    Pause,
    Resume,
    Stoppage(bool),
    EndPeriod,
    EndHalfTime,
    NextPeriod,
    Goal(TeamSide, GoalDetails),
    Card(TeamSide, CardDetails),
    Substitution(TeamSide, SubstitutionDetails),
    Undo,
    StartPenalties(TeamSide),
    Kick(TeamSide, PenaltyResult, Option<u16>),
    Swap,
    EndPenalties,
    Finalize,
    Abandon,
    Reset,
    Status,
    Events,
    Help,
    Quit,
}

fn parse_side(word: Option<&str>) -> Result<TeamSide> {
    match word.map(str::to_ascii_lowercase).as_deref() {
        Some("home") | Some("h") => Ok(TeamSide::Home),
        Some("away") | Some("a") => Ok(TeamSide::Away),
        Some(other) => bail!("unknown side '{}', expected home or away", other),
        None => bail!("missing side, expected home or away"),
    }
}

fn parse_number(word: &str) -> Result<u16> {
    word.trim_start_matches('#')
        .parse()
        .map_err(|_| anyhow!("'{}' is not a shirt number", word))
}

pub fn parse_command(line: &str) -> Result<Command> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        bail!("empty command");
    };

    let command = match head.to_ascii_lowercase().as_str() {
        "start" => Command::Start,
        "pause" => Command::Pause,
        "resume" => Command::Resume,
        "stoppage" => match words.next() {
            Some("on") => Command::Stoppage(true),
            Some("off") => Command::Stoppage(false),
            _ => bail!("usage: stoppage on|off"),
        },
        "end" => Command::EndPeriod,
        "ht-end" => Command::EndHalfTime,
        "next" => Command::NextPeriod,
        "goal" => {
            let side = parse_side(words.next())?;
            let mut details = GoalDetails::default();
            for word in words {
                match word {
                    "own" => details.goal_type = GoalType::OwnGoal,
                    "pen" => details.goal_type = GoalType::Penalty,
                    "fk" => details.goal_type = GoalType::FreeKick,
                    number => details.player_number = Some(parse_number(number)?),
                }
            }
            Command::Goal(side, details)
        }
        card @ ("yellow" | "red") => {
            let card_type = if card == "yellow" { CardType::Yellow } else { CardType::Red };
            let side = parse_side(words.next())?;
            let rest: Vec<&str> = words.collect();
            let (number, reason) = match rest.split_first() {
                Some((first, tail)) if parse_number(first).is_ok() => {
                    (Some(parse_number(first)?), tail.join(" "))
                }
                _ => (None, rest.join(" ")),
            };
            Command::Card(
                side,
                CardDetails {
                    card_type,
                    recipient: CardRecipient::Player { number, name: None },
                    reason,
                },
            )
        }
        "sub" => {
            let side = parse_side(words.next())?;
            let (Some(out), Some(inn)) = (words.next(), words.next()) else {
                bail!("usage: sub <home|away> <out#> <in#>");
            };
            Command::Substitution(
                side,
                SubstitutionDetails {
                    player_out: Some(parse_number(out)?),
                    player_in: Some(parse_number(inn)?),
                    ..Default::default()
                },
            )
        }
        "undo" => Command::Undo,
        "pens" => Command::StartPenalties(parse_side(words.next())?),
        "kick" => {
            let side = parse_side(words.next())?;
            let result = match words.next() {
                Some("scored") | Some("s") => PenaltyResult::Scored,
                Some("missed") | Some("m") => PenaltyResult::Missed,
                _ => bail!("usage: kick <home|away> <scored|missed> [#]"),
            };
            let number = words.next().map(parse_number).transpose()?;
            Command::Kick(side, result, number)
        }
        "swap" => Command::Swap,
        "pens-end" => Command::EndPenalties,
        "finalize" => Command::Finalize,
        "abandon" => Command::Abandon,
        "reset" => Command::Reset,
        "status" => Command::Status,
        "events" => Command::Events,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => bail!("unknown command '{}' (try help)", other),
    };
    Ok(command)
}

/// Apply a command. Returns whether the controller accepted it.
pub fn apply(controller: &mut MatchController, command: Command) -> bool {
    match command {
        Command::Start => controller.start_match(),
        Command::Pause => controller.pause(),
        Command::Resume => controller.resume(),
        Command::Stoppage(true) => controller.begin_stoppage(),
        Command::Stoppage(false) => controller.end_stoppage(),
        Command::EndPeriod => controller.end_current_period(),
        Command::EndHalfTime => controller.end_half_time(),
        Command::NextPeriod => {
            // From the break, close it first so one command moves on
            controller.end_half_time();
            controller.start_next_period()
        }
        Command::Goal(side, details) => controller.record_goal(side, details),
        Command::Card(side, details) => controller.record_card(side, details),
        Command::Substitution(side, details) => controller.record_substitution(side, details),
        Command::Undo => controller.undo_last_user_event(),
        Command::StartPenalties(side) => controller.start_penalties(side),
        Command::Kick(side, result, number) => {
            controller.record_penalty_attempt(side, result, number)
        }
        Command::Swap => controller.swap_penalty_order(),
        Command::EndPenalties => controller.end_penalties(),
        Command::Finalize => controller.finalize_match(),
        Command::Abandon => controller.abandon_match(),
        Command::Reset => {
            controller.reset_match();
            true
        }
        Command::Status | Command::Events | Command::Help | Command::Quit => true,
    }
}

pub fn clock_line(snapshot: &ClockSnapshot, period: u8) -> String {
    let mut line = format!(
        "P{} {} | period {} | left {}",
        period,
        snapshot.match_time_label(),
        snapshot.period_time_label(),
        snapshot.remaining_label(),
    );
    if !snapshot.stoppage_time.is_zero() || snapshot.is_in_stoppage {
        line.push_str(&format!(" | +{}", snapshot.stoppage_label()));
        if snapshot.is_in_stoppage {
            line.push_str(" (stoppage)");
        }
    }
    line
}

pub fn status_text(controller: &MatchController) -> String {
    let info = controller.match_info();
    let mut text = format!(
        "{} {}-{} | {}",
        info.display_title(),
        info.tally.home_score,
        info.tally.away_score,
        controller.phase().label(),
    );
    if controller.phase().is_running_period() {
        text.push_str(&format!(
            "\n{}",
            clock_line(&controller.snapshot(), controller.current_period())
        ));
    }
    let pens = controller.penalty_state();
    if pens.is_active || pens.is_decided {
        text.push_str(&format!(
            "\npenalties {}-{} (next: {})",
            pens.scored(TeamSide::Home),
            pens.scored(TeamSide::Away),
            pens.next_team().label(),
        ));
        if let Some(winner) = pens.winner {
            text.push_str(&format!(" winner: {}", info.team_name(winner)));
        }
    }
    text
}

/// One printable line per effect; clock refreshes only when `show_clock`.
pub fn render_effect(effect: &Effect, period: u8, show_clock: bool) -> Option<String> {
    match effect {
        Effect::SnapshotUpdated(snapshot) if show_clock => Some(clock_line(snapshot, period)),
        Effect::SnapshotUpdated(_) => None,
        Effect::PhaseChanged { to, .. } => Some(format!("== {} ==", to.label())),
        Effect::EventRecorded(record) => {
            let team = record
                .team
                .map(|side| format!(" [{}]", side.label()))
                .unwrap_or_default();
            Some(format!("{} {}{}", record.match_time, record.description(), team))
        }
        Effect::HalfTimeElapsed(_) => None,
        Effect::Feedback(_) => None,
        Effect::PersistenceWarning(message) => Some(format!("warning: match not saved: {}", message)),
    }
}
