//! Random simulated player
//!
//! Flips a random first card, then a random second card, over and over.
//! Serves as a load generator for the board and as a baseline opponent.

use crate::board::{Board, CellView};
use crate::core::Position;
use crate::{Result, ScrambleError};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What one simulated player got up to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub turns: usize,
    pub flips: usize,
    pub matches: usize,
    pub mismatches: usize,
    /// Flips that found an empty slot (including after a wait)
    pub no_card: usize,
    /// Second flips that hit a card someone else held
    pub contended: usize,
}

impl PlayerStats {
    pub fn merge(&mut self, other: &PlayerStats) {
        self.turns += other.turns;
        self.flips += other.flips;
        self.matches += other.matches;
        self.mismatches += other.mismatches;
        self.no_card += other.no_card;
        self.contended += other.contended;
    }
}

/// A player that picks positions at random
pub struct RandomPlayer {
    id: String,
    rng: ChaCha8Rng,
    max_delay_ms: u64,
}

impl RandomPlayer {
    /// Create a random player seeded from the OS
    pub fn new(id: impl Into<String>, max_delay_ms: u64) -> Self {
        RandomPlayer {
            id: id.into(),
            rng: ChaCha8Rng::from_entropy(),
            max_delay_ms,
        }
    }

    /// Create a random player with a seeded RNG (for reproducible runs)
    pub fn with_seed(id: impl Into<String>, seed: u64, max_delay_ms: u64) -> Self {
        RandomPlayer {
            id: id.into(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            max_delay_ms,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Play up to `turns` turns, stopping early once the board is empty
    ///
    /// Always ends its last turn before returning, so no other player is left
    /// waiting on a card this one holds.
    pub async fn play(mut self, board: &Board, turns: usize) -> Result<PlayerStats> {
        let mut stats = PlayerStats::default();

        for _ in 0..turns {
            if board_is_cleared(board, &self.id) {
                break;
            }
            stats.turns += 1;

            let first = self.random_position(board);
            self.pause().await;
            stats.flips += 1;
            if let Err(e) = board.flip(&self.id, first.row, first.col).await {
                self.record_failure(&mut stats, e)?;
                continue;
            }

            let second = self.random_position(board);
            self.pause().await;
            stats.flips += 1;
            match board.flip(&self.id, second.row, second.col).await {
                Ok(()) => {
                    if holds(board, &self.id, second) {
                        stats.matches += 1;
                    } else {
                        stats.mismatches += 1;
                    }
                }
                Err(e) => self.record_failure(&mut stats, e)?,
            }
        }

        board.end_turn(&self.id).await?;
        Ok(stats)
    }

    fn random_position(&mut self, board: &Board) -> Position {
        let (rows, cols) = board.dimensions();
        Position::new(self.rng.gen_range(0..rows), self.rng.gen_range(0..cols))
    }

    async fn pause(&mut self) {
        if self.max_delay_ms == 0 {
            tokio::task::yield_now().await;
        } else {
            let ms = self.rng.gen_range(0..=self.max_delay_ms);
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }

    /// Count expected flip failures; anything else is a real error
    fn record_failure(&self, stats: &mut PlayerStats, error: ScrambleError) -> Result<()> {
        match error {
            ScrambleError::NoCardAtPosition(_) => stats.no_card += 1,
            ScrambleError::CardControlledByOther(_) => stats.contended += 1,
            other => return Err(other),
        }
        Ok(())
    }
}

fn holds(board: &Board, player: &str, pos: Position) -> bool {
    let view = board.view(player);
    matches!(view.cells.get(pos.row * view.cols + pos.col), Some(CellView::My(_)))
}

fn board_is_cleared(board: &Board, player: &str) -> bool {
    board
        .view(player)
        .cells
        .iter()
        .all(|cell| *cell == CellView::None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_player_creation() {
        let player = RandomPlayer::new("bot1", 0);
        assert_eq!(player.id(), "bot1");
    }

    #[test]
    fn test_seeded_positions_repeat() {
        let board = Board::new(3, 3, ["a"; 9]).unwrap();

        let mut a = RandomPlayer::with_seed("a", 42, 0);
        let mut b = RandomPlayer::with_seed("b", 42, 0);
        let from_a: Vec<_> = (0..10).map(|_| a.random_position(&board)).collect();
        let from_b: Vec<_> = (0..10).map(|_| b.random_position(&board)).collect();
        assert_eq!(from_a, from_b);
        assert!(from_a.iter().all(|p| p.row < 3 && p.col < 3));
    }

    #[tokio::test]
    async fn test_solo_player_clears_small_board() {
        let board = Board::new(1, 2, ["x", "x"]).unwrap();
        let stats = RandomPlayer::with_seed("solo", 7, 0)
            .play(&board, 200)
            .await
            .unwrap();

        assert_eq!(stats.matches, 1);
        assert_eq!(board.look("solo"), "1x2\nnone\nnone\n");
        board.check_rep();
    }
}
