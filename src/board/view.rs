//! Per-player text view of the board
//!
//! Format: a `ROWSxCOLS` header line, then one line per cell in row-major
//! order, each `none`, `down`, `up VALUE` or `my VALUE`. Every line ends
//! with a newline.

use super::{Board, BoardState};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One cell as seen by a particular player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "lowercase")]
pub enum CellView {
    /// The pair was removed
    None,
    Down,
    /// Face up, not controlled by the viewer
    Up(String),
    /// Face up and controlled by the viewer
    My(String),
}

impl fmt::Display for CellView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellView::None => write!(f, "none"),
            CellView::Down => write!(f, "down"),
            CellView::Up(value) => write!(f, "up {value}"),
            CellView::My(value) => write!(f, "my {value}"),
        }
    }
}

/// A player's snapshot of the whole board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardView {
    pub rows: usize,
    pub cols: usize,
    /// Row-major
    pub cells: Vec<CellView>,
}

impl fmt::Display for BoardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}x{}", self.rows, self.cols)?;
        for cell in &self.cells {
            writeln!(f, "{cell}")?;
        }
        Ok(())
    }
}

impl BoardState {
    fn view_for(&self, player: &str) -> BoardView {
        let grid = &self.grid;
        let cells = grid
            .positions()
            .map(|pos| match grid.get(pos) {
                None => CellView::None,
                Some(card) if !card.is_face_up() => CellView::Down,
                Some(card) => match card.controller() {
                    Some(holder) if holder == player => CellView::My(card.value().to_string()),
                    _ => CellView::Up(card.value().to_string()),
                },
            })
            .collect();

        BoardView {
            rows: grid.rows(),
            cols: grid.cols(),
            cells,
        }
    }
}

impl Board {
    /// `player`'s view of the board
    ///
    /// Never waits and never fails; an id that is not a registered (or even a
    /// valid) player simply owns no cards.
    pub fn view(&self, player: &str) -> BoardView {
        self.lock().view_for(player)
    }

    /// `player`'s view of the board as text
    pub fn look(&self, player: &str) -> String {
        self.view(player).to_string()
    }
}
