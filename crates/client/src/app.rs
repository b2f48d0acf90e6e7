//! Interactive terminal loop.
//!
//! Reads commands line by line, forwards them to the session, and redraws
//! the screen from the snapshots the session publishes.

use std::io::{Write, stdout};

use anyhow::Result;
use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::terminal::{Clear, ClearType};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info};

use game_core::{GameStatus, SessionSnapshot};
use runtime::{Event, RuntimeError, SessionHandle, Topic};

use crate::input::{HELP, InputCommand, parse_line};
use crate::render::{countdown_mark, needs_redraw, render_feedback, render_snapshot};

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

pub struct App {
    handle: SessionHandle,
    username: String,
    latest: Option<SessionSnapshot>,
}

impl App {
    pub async fn new(handle: SessionHandle) -> Result<Self> {
        let username = handle.username().await?;
        Ok(Self {
            handle,
            username,
            latest: None,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut session_rx = self.handle.subscribe(Topic::Session);
        let mut feedback_rx = self.handle.subscribe(Topic::Feedback);
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        let snapshot = self.handle.snapshot().await?;
        self.on_snapshot(snapshot)?;

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        info!("stdin closed");
                        break;
                    };
                    if self.handle_line(&line).await? == Flow::Quit {
                        break;
                    }
                }
                event = session_rx.recv() => match event {
                    Ok(Event::Session(snapshot)) => self.on_snapshot(*snapshot)?,
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => debug!("Skipped {} snapshots", skipped),
                    Err(RecvError::Closed) => break,
                },
                event = feedback_rx.recv() => match event {
                    Ok(Event::Feedback(feedback)) => println!("  {}", render_feedback(&feedback)),
                    Ok(_) | Err(RecvError::Lagged(_)) => {}
                    Err(RecvError::Closed) => break,
                },
            }
        }

        Ok(())
    }

    async fn handle_line(&mut self, line: &str) -> Result<Flow> {
        let result = match parse_line(line) {
            InputCommand::Start => self.handle.start_game().await,
            InputCommand::Pick(position) => match self.tile_at(position) {
                Some(id) => self.handle.pick_tile(id).await,
                None => {
                    println!("There is no tile {position} right now.");
                    Ok(())
                }
            },
            InputCommand::Next => self.handle.next_round().await,
            InputCommand::Reveal => self.handle.reveal().await,
            InputCommand::Menu => self.handle.return_to_menu().await,
            InputCommand::Again => self.handle.try_again().await,
            InputCommand::Rename(name) => match self.handle.rename(name).await {
                Ok(name) => {
                    println!("You are now {name}.");
                    self.username = name;
                    Ok(())
                }
                Err(e) => Err(e),
            },
            InputCommand::ClearHistory => {
                let result = self.handle.clear_history().await;
                if result.is_ok() {
                    println!("Recent diagnoses forgotten.");
                }
                result
            }
            InputCommand::Help => {
                println!("{HELP}");
                Ok(())
            }
            InputCommand::Quit => return Ok(Flow::Quit),
            InputCommand::Empty => Ok(()),
            InputCommand::Unknown(text) => {
                println!("Unknown command {text:?}; type `help`.");
                Ok(())
            }
        };

        report(result)?;
        Ok(Flow::Continue)
    }

    fn tile_at(&self, position: usize) -> Option<game_core::TileId> {
        let snapshot = self.latest.as_ref()?;
        if snapshot.status != GameStatus::Playing {
            return None;
        }
        snapshot
            .tiles
            .get(position.checked_sub(1)?)
            .map(|tile| tile.id.clone())
    }

    fn on_snapshot(&mut self, snapshot: SessionSnapshot) -> Result<()> {
        if needs_redraw(self.latest.as_ref(), &snapshot) {
            let mut out = stdout();
            execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;
            write!(out, "{}", render_snapshot(&snapshot, &self.username))?;
            out.flush()?;
        } else if let Some(previous) = &self.latest
            && snapshot.status == GameStatus::Playing
            && let Some(mark) =
                countdown_mark(previous.time_remaining_secs, snapshot.time_remaining_secs)
        {
            println!("  {mark}s left");
        }

        self.latest = Some(snapshot);
        Ok(())
    }
}

/// Print rejected commands; only a dead runtime is fatal.
fn report(result: runtime::Result<()>) -> Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(e) if e.is_ignorable() => {
            debug!("Ignored input: {}", e);
            Ok(())
        }
        Err(e @ (RuntimeError::Session(_) | RuntimeError::InvalidUsername(_))) => {
            println!("  {e}");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
