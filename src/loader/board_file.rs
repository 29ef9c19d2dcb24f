//! Board file loader
//!
//! ```text
//! 3x3
//! 🦄
//! 🦄
//! 🌈
//! ...
//! ```
//!
//! The first line is `ROWSxCOLS`, followed by exactly `ROWS*COLS` lines with
//! one card value each, in row-major order.

use crate::board::Board;
use crate::core::Card;
use crate::{Result, ScrambleError};
use std::fs;
use std::path::Path;

/// A parsed board file, not yet turned into a live board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardDefinition {
    pub rows: usize,
    pub cols: usize,
    /// Row-major card values
    pub cards: Vec<String>,
}

impl BoardDefinition {
    /// Build a fresh board with every card face down
    pub fn into_board(self) -> Result<Board> {
        Board::new(self.rows, self.cols, self.cards)
    }
}

/// Loader for board files
pub struct BoardLoader;

impl BoardLoader {
    /// Load a board definition from a file
    pub fn load_from_file(path: &Path) -> Result<BoardDefinition> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse a board definition from its text content
    pub fn parse(content: &str) -> Result<BoardDefinition> {
        let mut lines = content
            .lines()
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .enumerate()
            .map(|(i, line)| (i + 1, line));

        let (_, header) = lines
            .next()
            .ok_or_else(|| ScrambleError::ParseError("empty board file".to_string()))?;
        let (rows, cols) = parse_dimensions(header)?;
        let expected = rows.checked_mul(cols).ok_or_else(|| {
            ScrambleError::ParseError(format!("line 1: {rows}x{cols} board is too large"))
        })?;

        // The header is untrusted; only the cards actually present are stored.
        let mut cards = Vec::new();
        let mut trailing_blank = false;
        for (line_no, line) in lines {
            if line.is_empty() {
                trailing_blank = true;
                continue;
            }
            if trailing_blank {
                return Err(ScrambleError::ParseError(format!(
                    "line {line_no}: card after blank line"
                )));
            }
            if !Card::is_valid_value(line) {
                return Err(ScrambleError::ParseError(format!(
                    "line {line_no}: invalid card {line:?}"
                )));
            }
            cards.push(line.to_string());
        }

        if cards.len() != expected {
            return Err(ScrambleError::ParseError(format!(
                "expected {expected} cards for a {rows}x{cols} board, found {}",
                cards.len()
            )));
        }

        Ok(BoardDefinition { rows, cols, cards })
    }
}

/// Parse the `ROWSxCOLS` header line
fn parse_dimensions(header: &str) -> Result<(usize, usize)> {
    let bad = || ScrambleError::ParseError(format!("line 1: expected ROWSxCOLS, got {header:?}"));

    let (rows, cols) = header.split_once('x').ok_or_else(bad)?;
    let rows: usize = rows.parse().map_err(|_| bad())?;
    let cols: usize = cols.parse().map_err(|_| bad())?;
    if rows == 0 || cols == 0 {
        return Err(bad());
    }
    Ok((rows, cols))
}
