//! Grid store: the card matrix and the player registry
//!
//! The grid does no locking of its own. It is only ever touched through the
//! board's state lock, by code that does not await while holding it.

use crate::core::{Card, Player, PlayerId, Position};
use crate::{Result, ScrambleError};
use rustc_hash::FxHashMap;

#[derive(Debug, Clone)]
pub struct Grid {
    rows: usize,
    cols: usize,
    /// Row-major cells; `None` is a slot whose pair was removed
    cells: Vec<Option<Card>>,
    players: FxHashMap<PlayerId, Player>,
}

impl Grid {
    /// Build a grid of face-down cards from a row-major list of values
    pub fn new<I, S>(rows: usize, cols: usize, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if rows == 0 || cols == 0 {
            return Err(ScrambleError::InvalidBoard(format!(
                "board must have at least one row and one column, got {rows}x{cols}"
            )));
        }

        let size = rows.checked_mul(cols).ok_or_else(|| {
            ScrambleError::InvalidBoard(format!("{rows}x{cols} board is too large"))
        })?;

        let cells = values
            .into_iter()
            .map(|value| Card::new(value).map(Some))
            .collect::<Result<Vec<_>>>()?;

        if cells.len() != size {
            return Err(ScrambleError::InvalidBoard(format!(
                "{rows}x{cols} board needs {size} cards, got {}",
                cells.len()
            )));
        }

        Ok(Grid {
            rows,
            cols,
            cells,
            players: FxHashMap::default(),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_in_bounds(&self, pos: Position) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    fn index(&self, pos: Position) -> usize {
        pos.row * self.cols + pos.col
    }

    /// Card at `pos`, or `None` for an empty or out-of-bounds slot
    pub fn get(&self, pos: Position) -> Option<&Card> {
        if !self.is_in_bounds(pos) {
            return None;
        }
        self.cells[self.index(pos)].as_ref()
    }

    /// Card at `pos`, distinguishing the two ways of not having one
    pub fn card_at(&self, pos: Position) -> Result<&Card> {
        if !self.is_in_bounds(pos) {
            return Err(ScrambleError::InvalidPosition(pos));
        }
        self.get(pos).ok_or(ScrambleError::NoCardAtPosition(pos))
    }

    /// Replace the card at `pos` (or empty the slot)
    ///
    /// # Panics
    /// If `pos` is out of bounds, or if a card is put into an emptied slot.
    pub fn set(&mut self, pos: Position, card: Option<Card>) {
        assert!(self.is_in_bounds(pos), "set out of bounds at {pos}");
        let index = self.index(pos);
        assert!(
            self.cells[index].is_some() || card.is_none(),
            "emptied slot {pos} cannot be refilled"
        );
        self.cells[index] = card;
    }

    /// Get a player, registering it with empty hands on first sight
    pub fn ensure_player(&mut self, id: &PlayerId) -> &mut Player {
        self.players
            .entry(id.clone())
            .or_insert_with(|| Player::new(id.clone()))
    }

    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.get(id)
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    /// All positions in row-major order
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let cols = self.cols;
        (0..self.rows * self.cols).map(move |i| Position::new(i / cols, i % cols))
    }

    /// Occupied cells in row-major order
    pub fn occupied(&self) -> impl Iterator<Item = (Position, &Card)> + '_ {
        self.positions()
            .zip(self.cells.iter())
            .filter_map(|(pos, cell)| cell.as_ref().map(|card| (pos, card)))
    }

    /// Occupied positions grouped by value, groups ordered by first appearance
    pub fn value_groups(&self) -> Vec<(String, Vec<Position>)> {
        let mut index: FxHashMap<&str, usize> = FxHashMap::default();
        let mut groups: Vec<(String, Vec<Position>)> = Vec::new();

        for (pos, card) in self.occupied() {
            match index.get(card.value()) {
                Some(&i) => groups[i].1.push(pos),
                None => {
                    index.insert(card.value(), groups.len());
                    groups.push((card.value().to_string(), vec![pos]));
                }
            }
        }
        groups
    }

    /// Rewrite `old` to `new` at each of `positions` still holding `old`
    ///
    /// Face state and controller are kept. Returns the number of cards rewritten.
    pub fn rewrite_value(&mut self, positions: &[Position], old: &str, new: &str) -> usize {
        let mut rewritten = 0;
        for &pos in positions {
            let replacement = match self.get(pos) {
                Some(card) if card.value() == old => card.with_value(new.to_string()),
                _ => continue,
            };
            self.set(pos, Some(replacement));
            rewritten += 1;
        }
        rewritten
    }

    /// Assert the representation invariants
    ///
    /// Every controlled card is face up and held by its controller; every held
    /// position names an occupied cell controlled by the holder.
    ///
    /// # Panics
    /// On any violation. A violation is a bug in the board, never a caller error.
    pub fn check_rep(&self) {
        assert!(self.rows > 0 && self.cols > 0);
        assert_eq!(self.cells.len(), self.rows * self.cols);

        for (pos, card) in self.occupied() {
            assert!(
                Card::is_valid_value(card.value()),
                "bad value {:?} at {pos}",
                card.value()
            );
            if let Some(holder) = card.controller() {
                assert!(card.is_face_up(), "controlled card at {pos} is face down");
                let holds = self.players.get(holder).is_some_and(|p| p.holds(pos));
                assert!(holds, "{holder} controls {pos} without holding it");
            }
        }

        for player in self.players.values() {
            assert!(
                player.second_card.is_none() || player.first_card.is_some(),
                "{} holds a second card without a first",
                player.id
            );
            assert!(
                player.first_card.is_none() || player.first_card != player.second_card,
                "{} holds the same card twice",
                player.id
            );
            for pos in player.first_card.iter().chain(player.second_card.iter()) {
                let controlled = self.get(*pos).is_some_and(|c| c.is_controlled_by(&player.id));
                assert!(controlled, "{} holds {pos} without controlling it", player.id);
            }
        }
    }
}
