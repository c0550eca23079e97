//! The command language and the wire types shared by every command source.
//!
//! One line of text is one command:
//!
//! ```text
//! command := "exec " SHELL-STRING
//!          | "restart"
//!          | "f"
//!          | "s" | "d"
//!          | ["w" "c"] [NUMBER] ["m" | "s"] [NUMBER] DIRS
//! DIRS    := ("h" | "j" | "k" | "l")*
//! ```
//!
//! A bare `NUMBER` shows that workspace.  A `NUMBER` that ends the input
//! after the action selector moves the focused client to that workspace,
//! whatever the selector was.  A leading `NUMBER` followed by directions is
//! a repeat count that is parsed but not applied.

use crate::grid::LayoutMode;
use crate::layout::WindowId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the four grid directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Down,
    Up,
    Right,
}

impl Direction {
    /// Map a vi-style key (`h`, `j`, `k`, `l`) to a direction.
    pub fn from_key(key: char) -> Option<Self> {
        match key {
            'h' => Some(Direction::Left),
            'j' => Some(Direction::Down),
            'k' => Some(Direction::Up),
            'l' => Some(Direction::Right),
            _ => None,
        }
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Left => write!(f, "left"),
            Direction::Down => write!(f, "down"),
            Direction::Up => write!(f, "up"),
            Direction::Right => write!(f, "right"),
        }
    }
}

/// What a focus command operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    /// Cycle through the clients of the focused container before leaving it.
    #[default]
    Window,
    /// Always move between grid cells (`wc` prefix).
    Container,
}

/// The operation a direction key triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Action {
    #[default]
    Focus,
    Move,
    Snap,
}

/// A decoded command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Launch an external program with the given command line.
    Exec(String),
    /// Re-execute the running binary in place.
    Restart,
    /// Toggle fullscreen of the focused client in the active cell.
    ToggleFullscreen,
    /// Switch the active container's layout mode.
    SetMode(LayoutMode),
    /// Show the workspace with this (1-based) number.
    Show(usize),
    /// Move the focused client to the workspace with this number.
    MoveToWorkspace(usize),
    /// Apply `action` once per direction, in order.
    ///
    /// `count` is the leading number, kept for diagnostics only: it is
    /// never used to repeat anything.  `stray` is the first character that
    /// is not a direction key; everything before it still runs.
    Directional {
        action: Action,
        scope: Scope,
        count: Option<usize>,
        directions: Vec<Direction>,
        stray: Option<char>,
    },
}

/// A malformed command line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    /// Only `wc` is implemented after the `w` prefix.
    #[error("scope {0:?} is not implemented")]
    UnsupportedScope(Option<char>),
    #[error("command {0:?} has no target")]
    MissingTarget(String),
    #[error("number out of range in {0:?}")]
    InvalidNumber(String),
}

/// Split a leading run of ASCII digits off `input`.
fn take_number(input: &str) -> Result<(Option<usize>, &str), CommandError> {
    let end = input
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(input.len());
    if end == 0 {
        return Ok((None, input));
    }
    let n = input[..end]
        .parse()
        .map_err(|_| CommandError::InvalidNumber(input.to_string()))?;
    Ok((Some(n), &input[end..]))
}

impl Command {
    /// Decode one command line.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        if line.is_empty() {
            return Err(CommandError::Empty);
        }
        if let Some(program) = line.strip_prefix("exec ") {
            return Ok(Command::Exec(program.to_string()));
        }
        if line.starts_with("restart") {
            return Ok(Command::Restart);
        }
        if line.starts_with('f') {
            return Ok(Command::ToggleFullscreen);
        }
        match line {
            "s" => return Ok(Command::SetMode(LayoutMode::Stack)),
            "d" => return Ok(Command::SetMode(LayoutMode::Default)),
            _ => {}
        }

        let mut rest = line;
        let mut scope = Scope::Window;
        if let Some(after) = rest.strip_prefix('w') {
            match after.strip_prefix('c') {
                Some(after) => {
                    scope = Scope::Container;
                    rest = after;
                }
                None => return Err(CommandError::UnsupportedScope(after.chars().next())),
            }
        }

        let (count, after_count) = take_number(rest)?;
        rest = after_count;
        if rest.is_empty() {
            return match count {
                Some(n) => Ok(Command::Show(n)),
                None => Err(CommandError::MissingTarget(line.to_string())),
            };
        }

        let mut action = Action::Focus;
        let mut selected = false;
        if let Some(sel) = rest.chars().next() {
            if sel == 'm' || sel == 's' {
                action = if sel == 'm' { Action::Move } else { Action::Snap };
                selected = true;
                rest = &rest[1..];
            }
        }

        let (workspace, after_workspace) = take_number(rest)?;
        rest = after_workspace;
        if rest.is_empty() {
            return match workspace.or(if selected { count } else { None }) {
                Some(n) => Ok(Command::MoveToWorkspace(n)),
                None => Err(CommandError::MissingTarget(line.to_string())),
            };
        }
        if selected && workspace.is_none() {
            if let Some(n) = count {
                return Ok(Command::MoveToWorkspace(n));
            }
        }

        let mut directions = Vec::new();
        let mut stray = None;
        for key in rest.chars() {
            match Direction::from_key(key) {
                Some(dir) => directions.push(dir),
                None => {
                    stray = Some(key);
                    break;
                }
            }
        }
        Ok(Command::Directional {
            action,
            scope,
            count,
            directions,
            stray,
        })
    }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Command::parse(s)
    }
}

/// Everything a [`CommandSource`](crate::traits::CommandSource) can
/// deliver to the engine.
///
/// On the wire (see [`ipc::listener`](crate::ipc::listener)) this is
/// JSON: `{"Command":"2ml"}`, `{"Manage":{"window":1,"dock":false}}`,
/// `{"Unmanage":1}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Request {
    /// A command line in the language described at the top of this module.
    Command(String),
    /// A new window appeared and should be placed in the active cell.
    Manage {
        window: WindowId,
        #[serde(default)]
        dock: bool,
    },
    /// A managed window went away.
    Unmanage(WindowId),
}
