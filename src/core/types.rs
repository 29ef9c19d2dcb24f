//! Identifier and coordinate types shared across the board

use crate::{Result, ScrambleError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Player identifier
///
/// Only non-empty strings of ASCII letters, digits and underscores are accepted,
/// so a validated id can always be printed or logged verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(s: impl Into<String>) -> Result<Self> {
        let s = s.into();
        if Self::is_valid(&s) {
            Ok(PlayerId(s))
        } else {
            Err(ScrambleError::InvalidIdentifier(s))
        }
    }

    /// Check the `[A-Za-z0-9_]+` identifier syntax without allocating
    pub fn is_valid(s: &str) -> bool {
        !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for PlayerId {
    type Error = ScrambleError;

    fn try_from(s: String) -> Result<Self> {
        PlayerId::new(s)
    }
}

impl From<PlayerId> for String {
    fn from(id: PlayerId) -> Self {
        id.0
    }
}

impl PartialEq<str> for PlayerId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// A grid coordinate (row, column), both zero-based
///
/// Players remember their cards by coordinate, never by reference into the
/// grid, so a held position can outlive the card that used to be there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Position { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

impl From<(usize, usize)> for Position {
    fn from((row, col): (usize, usize)) -> Self {
        Position { row, col }
    }
}
