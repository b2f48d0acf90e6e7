//! Text rendering of session snapshots.
//!
//! Everything here is pure: functions take snapshots and return strings so
//! the app loop only decides when to print.

use std::fmt::Write;

use crossterm::style::{Color, Stylize, style};

use game_core::{
    BonusKind, Feedback, GameStatus, HealthZone, LoadingView, SessionSnapshot, Tile, TileState,
};

const HEALTH_BAR_WIDTH: u32 = 20;

/// Seconds-left marks announced while a round is running.
const COUNTDOWN_MARKS: [u32; 5] = [10, 5, 3, 2, 1];

pub fn render_snapshot(snapshot: &SessionSnapshot, username: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}   {}   best {}",
        style("SYMPTOM SPRINTER").bold(),
        username,
        snapshot.high_score
    );
    out.push('\n');

    match snapshot.status {
        GameStatus::Menu => {
            out.push_str("Tap the true findings of each diagnosis before time runs out.\n\n");
            out.push_str("Type `start` to play, `help` for all commands.\n");
        }
        GameStatus::LoadingRound => render_loading(&mut out, snapshot.loading.as_ref()),
        GameStatus::Playing => {
            render_board(&mut out, snapshot);
            if snapshot.game_over_pending {
                let _ = writeln!(out, "\n{}", style("Out of health...").with(Color::Red));
            } else {
                out.push_str("\nPick a tile by number.\n");
            }
        }
        GameStatus::RoundOver => {
            render_board(&mut out, snapshot);
            out.push_str("\nRound over. `reveal` to see the answers, `next` for a new case.\n");
        }
        GameStatus::Reveal => {
            render_board(&mut out, snapshot);
            out.push_str("\nAnswers revealed. `next` for a new case, `menu` to stop.\n");
        }
        GameStatus::GameOver => render_game_over(&mut out, snapshot),
    }

    out
}

fn render_loading(out: &mut String, loading: Option<&LoadingView>) {
    match loading {
        None | Some(LoadingView::Fetching) => out.push_str("Preparing a new case...\n"),
        Some(LoadingView::Retrying {
            attempt,
            total,
            last_error,
        }) => {
            let _ = writeln!(
                out,
                "Connection trouble, retrying (attempt {attempt} of {total})\n  {}",
                style(last_error).with(Color::DarkGrey)
            );
        }
        Some(LoadingView::Failed { message }) => {
            let _ = writeln!(
                out,
                "{}\n  {}\n\nType `menu` to go back.",
                style("Could not load a case.").with(Color::Red),
                message
            );
        }
    }
}

fn render_board(out: &mut String, snapshot: &SessionSnapshot) {
    let diagnosis = snapshot.diagnosis.as_deref().unwrap_or("?");
    let _ = write!(out, "Diagnosis: {}", style(diagnosis).bold());
    if let (Some(category), Some(difficulty)) = (&snapshot.category, snapshot.difficulty) {
        let _ = write!(out, "   [{category} / {difficulty}]");
    }
    out.push('\n');

    let _ = writeln!(
        out,
        "Score {}   Combo {}   Time {:.1}s",
        snapshot.run_score, snapshot.combo, snapshot.time_remaining_secs
    );
    let _ = writeln!(
        out,
        "Health {}\n",
        health_bar(snapshot.health, snapshot.health_zone)
    );

    for (row, tiles) in snapshot.tiles.chunks(3).enumerate() {
        let line = tiles
            .iter()
            .enumerate()
            .map(|(col, tile)| tile_cell(row * 3 + col + 1, tile))
            .collect::<Vec<_>>()
            .join("  ");
        let _ = writeln!(out, "{line}");
    }
}

fn tile_cell(position: usize, tile: &Tile) -> String {
    let label = format!("{position:>2}. {:<22}", truncate(&tile.text, 22));
    match tile.state {
        TileState::Idle => label,
        TileState::Correct => style(label).with(Color::Green).to_string(),
        TileState::Incorrect => style(label).with(Color::Red).crossed_out().to_string(),
        TileState::Missed => style(label).with(Color::Yellow).to_string(),
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut short: String = text.chars().take(max.saturating_sub(1)).collect();
        short.push('~');
        short
    }
}

/// Health as a bar on a 0-100 scale, colored by zone.
pub fn health_bar(health: u32, zone: HealthZone) -> String {
    let filled = (health.min(100) * HEALTH_BAR_WIDTH).div_ceil(100);
    let bar = format!(
        "{}{} {health:>3}",
        "#".repeat(filled as usize),
        ".".repeat((HEALTH_BAR_WIDTH - filled) as usize)
    );
    let color = match zone {
        HealthZone::Safe => Color::Green,
        HealthZone::Warning => Color::Yellow,
        HealthZone::Critical => Color::Red,
    };
    let styled = style(bar).with(color);
    if zone.is_low() {
        styled.slow_blink().to_string()
    } else {
        styled.to_string()
    }
}

fn render_game_over(out: &mut String, snapshot: &SessionSnapshot) {
    let _ = writeln!(out, "{}", style("GAME OVER").with(Color::Red).bold());
    match &snapshot.summary {
        Some(summary) => {
            let _ = writeln!(out, "Final score: {}", summary.run_score);
            if summary.is_new_high_score {
                let _ = writeln!(
                    out,
                    "{} (previous best {})",
                    style("New high score!").with(Color::Green).bold(),
                    summary.previous_high_score
                );
            } else {
                let _ = writeln!(out, "Best: {}", summary.high_score);
            }
        }
        None => {
            let _ = writeln!(out, "Final score: {}", snapshot.run_score);
        }
    }
    out.push_str("\n`again` to play another run, `menu` to stop.\n");
}

/// One-line floating feedback, e.g. `+25 combo` or `-15 health`.
pub fn render_feedback(feedback: &Feedback) -> String {
    match *feedback {
        Feedback::Score { amount, kind } => {
            let label = match kind {
                None => "points",
                Some(BonusKind::Combo) => "combo",
                Some(BonusKind::ComboHealth) => "health",
                Some(BonusKind::PerfectRound) => "perfect round",
            };
            let color = if amount >= 0 { Color::Green } else { Color::Red };
            style(format!("{amount:+} {label}")).with(color).to_string()
        }
        Feedback::Health { amount } => {
            let color = if amount >= 0 { Color::Cyan } else { Color::Magenta };
            style(format!("{amount:+} health")).with(color).to_string()
        }
    }
}

/// Whether `next` differs from `previous` in more than the countdown.
pub fn needs_redraw(previous: Option<&SessionSnapshot>, next: &SessionSnapshot) -> bool {
    let Some(previous) = previous else {
        return true;
    };
    let mut previous = previous.clone();
    previous.time_remaining_secs = next.time_remaining_secs;
    previous != *next
}

/// The countdown mark crossed between two readings, if any.
pub fn countdown_mark(previous_secs: f32, next_secs: f32) -> Option<u32> {
    COUNTDOWN_MARKS
        .into_iter()
        .find(|&mark| previous_secs > mark as f32 && next_secs <= mark as f32)
}
