//! Player representation

use crate::core::{PlayerId, Position};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Where a player stands in its current turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    /// Holding nothing; the next flip starts a new turn
    NoCards,
    /// Holding a first card; the next flip is the second card
    HoldingFirst(Position),
    /// Holding a matched pair, removed when the next turn starts
    HoldingBoth(Position, Position),
}

/// Represents a player at the board
///
/// Players are created the first time their id is seen and live as long as
/// the board does.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,

    /// First card of the current turn (controlled by this player)
    pub first_card: Option<Position>,

    /// Second card of the current turn, only set on a match
    pub second_card: Option<Position>,

    /// Cards this player turned up and let go of during its last turn.
    /// The next turn's cleanup turns them back down if nobody took them.
    pub relinquished: SmallVec<[Position; 2]>,
}

impl Player {
    pub fn new(id: PlayerId) -> Self {
        Player {
            id,
            first_card: None,
            second_card: None,
            relinquished: SmallVec::new(),
        }
    }

    pub fn turn_state(&self) -> TurnState {
        match (self.first_card, self.second_card) {
            (Some(first), Some(second)) => TurnState::HoldingBoth(first, second),
            (Some(first), None) => TurnState::HoldingFirst(first),
            _ => TurnState::NoCards,
        }
    }

    /// Does this player hold `pos` as its first or second card?
    pub fn holds(&self, pos: Position) -> bool {
        self.first_card == Some(pos) || self.second_card == Some(pos)
    }

    /// Forget both held cards (the caller has already fixed up the grid)
    pub fn clear_hand(&mut self) {
        self.first_card = None;
        self.second_card = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_creation() {
        let id = PlayerId::new("alice").unwrap();
        let player = Player::new(id.clone());

        assert_eq!(player.id, id);
        assert_eq!(player.turn_state(), TurnState::NoCards);
        assert!(player.relinquished.is_empty());
    }

    #[test]
    fn test_turn_state() {
        let mut player = Player::new(PlayerId::new("bob").unwrap());
        let a = Position::new(0, 0);
        let b = Position::new(0, 1);

        player.first_card = Some(a);
        assert_eq!(player.turn_state(), TurnState::HoldingFirst(a));
        assert!(player.holds(a));
        assert!(!player.holds(b));

        player.second_card = Some(b);
        assert_eq!(player.turn_state(), TurnState::HoldingBoth(a, b));
        assert!(player.holds(b));

        player.clear_hand();
        assert_eq!(player.turn_state(), TurnState::NoCards);
    }
}
