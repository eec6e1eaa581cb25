// Line-oriented console: renders the dashboard and turns typed commands into
// dashboard events.

use crate::interface_adapters::state::AppState;
use crate::interface_adapters::view::{format_coord, render};
use crate::use_cases::DashboardEvent;

use chrono::Utc;
use std::fmt;
use std::time::Duration;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};
use tokio::time::MissedTickBehavior;
use tracing::debug;

const HELP: &str = "\
Commands:
  select <player>   show a player's coordinates
  save <name>       bookmark the displayed coordinates
  delete <index>    remove a saved location
  list              redraw the dashboard
  connect           connect to the position feed
  disconnect        disconnect from the position feed
  help              show this help
  quit              exit
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Select(String),
    Save(String),
    Delete(usize),
    List,
    Connect,
    Disconnect,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    MissingArgument(&'static str),
    InvalidIndex(String),
    Unknown(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::MissingArgument(command) => write!(f, "`{command}` needs an argument"),
            ParseError::InvalidIndex(value) => write!(f, "`{value}` is not a location index"),
            ParseError::Unknown(command) => {
                write!(f, "unknown command `{command}` (type `help`)")
            }
        }
    }
}

impl std::error::Error for ParseError {}

pub fn parse_command(line: &str) -> Result<ConsoleCommand, ParseError> {
    let line = line.trim();
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    match command.to_ascii_lowercase().as_str() {
        "select" => {
            if rest.is_empty() {
                return Err(ParseError::MissingArgument("select"));
            }
            Ok(ConsoleCommand::Select(rest.to_string()))
        }
        // Blank names are rejected by the location store itself.
        "save" => Ok(ConsoleCommand::Save(rest.to_string())),
        "delete" => {
            if rest.is_empty() {
                return Err(ParseError::MissingArgument("delete"));
            }
            rest.parse()
                .map(ConsoleCommand::Delete)
                .map_err(|_| ParseError::InvalidIndex(rest.to_string()))
        }
        "list" | "ls" => Ok(ConsoleCommand::List),
        "connect" => Ok(ConsoleCommand::Connect),
        "disconnect" => Ok(ConsoleCommand::Disconnect),
        "help" | "?" => Ok(ConsoleCommand::Help),
        "quit" | "exit" => Ok(ConsoleCommand::Quit),
        other => Err(ParseError::Unknown(other.to_string())),
    }
}

fn is_confirmation(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Runs the console until `quit` or end of input.
pub async fn run_console<R, W>(
    state: &AppState,
    input: R,
    mut output: W,
    render_interval: Duration,
) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut snapshot_rx = state.snapshot_rx.clone();
    let mut ticker = tokio::time::interval(render_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    output.write_all(HELP.as_bytes()).await?;
    output.flush().await?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("console input closed");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }

                let reply = match parse_command(&line) {
                    Ok(ConsoleCommand::Quit) => break,
                    Ok(command) => execute(state, command, &mut lines, &mut output).await?,
                    Err(err) => err.to_string(),
                };
                if !reply.is_empty() {
                    output.write_all(reply.as_bytes()).await?;
                    output.write_all(b"\n").await?;
                }
                output.flush().await?;
            }

            _ = ticker.tick() => {
                if snapshot_rx.has_changed().unwrap_or(false) {
                    let text = render(&snapshot_rx.borrow_and_update(), Utc::now());
                    output.write_all(text.as_bytes()).await?;
                    output.flush().await?;
                }
            }
        }
    }

    Ok(())
}

async fn execute<R, W>(
    state: &AppState,
    command: ConsoleCommand,
    lines: &mut Lines<R>,
    output: &mut W,
) -> io::Result<String>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let unavailable = || "dashboard unavailable".to_string();

    let reply = match command {
        ConsoleCommand::Select(name) => {
            let selected = state
                .request(|reply| DashboardEvent::Select {
                    name: name.clone(),
                    reply: Some(reply),
                })
                .await;
            match selected {
                Some(true) => format!("Selected {name}"),
                Some(false) => format!("Player {name} is not online"),
                None => unavailable(),
            }
        }
        ConsoleCommand::Save(name) => {
            let saved = state
                .request(|reply| DashboardEvent::SaveLocation { name, reply })
                .await;
            match saved {
                Some(Ok(location)) => format!(
                    "Saved {} (X: {}, Y: {}, Z: {})",
                    location.name,
                    format_coord(location.x),
                    format_coord(location.y),
                    format_coord(location.z)
                ),
                Some(Err(err)) => err.to_string(),
                None => unavailable(),
            }
        }
        ConsoleCommand::Delete(index) => {
            output
                .write_all(b"Are you sure you want to delete this location? [y/N] ")
                .await?;
            output.flush().await?;
            let answer = lines.next_line().await?.unwrap_or_default();
            if !is_confirmation(&answer) {
                return Ok("Delete cancelled".to_string());
            }

            let removed = state
                .request(|reply| DashboardEvent::DeleteLocation {
                    index,
                    confirmed: true,
                    reply,
                })
                .await;
            match removed {
                Some(Ok(location)) => format!("Deleted {}", location.name),
                Some(Err(err)) => err.to_string(),
                None => unavailable(),
            }
        }
        ConsoleCommand::List => {
            let snapshot = state.snapshot_rx.borrow().clone();
            render(&snapshot, Utc::now())
        }
        ConsoleCommand::Connect => {
            if state.feed.connect().await {
                "Connecting...".to_string()
            } else {
                unavailable()
            }
        }
        ConsoleCommand::Disconnect => {
            if state.feed.disconnect().await {
                "Disconnected".to_string()
            } else {
                unavailable()
            }
        }
        ConsoleCommand::Help => HELP.to_string(),
        ConsoleCommand::Quit => String::new(),
    };
    Ok(reply)
}
