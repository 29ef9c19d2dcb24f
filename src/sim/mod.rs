//! Simulated players sharing one board
//!
//! Every player runs as its own tokio task against an `Arc<Board>`, so flips
//! from different players interleave the same way real clients would.

pub mod random_player;

pub use random_player::{PlayerStats, RandomPlayer};

use crate::board::Board;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Simulation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of concurrent players
    pub players: usize,
    /// Turns each player attempts
    pub turns: usize,
    /// Master seed; player `i` uses `seed + i`. `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Upper bound of the random pause before each flip
    pub max_delay_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            players: 4,
            turns: 100,
            seed: None,
            max_delay_ms: 2,
        }
    }
}

/// Results of a simulation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationStats {
    /// (player id, stats) in player order
    pub players: Vec<(String, PlayerStats)>,
    pub totals: PlayerStats,
    pub duration: Duration,
}

/// Id of the `index`-th simulated player
pub fn player_name(index: usize) -> String {
    format!("bot{index}")
}

/// Run `config.players` random players concurrently on `board`
pub async fn run_simulation(board: Arc<Board>, config: &SimulationConfig) -> Result<SimulationStats> {
    let start = Instant::now();

    let handles: Vec<_> = (0..config.players)
        .map(|i| {
            let id = player_name(i);
            let player = match config.seed {
                Some(seed) => RandomPlayer::with_seed(id, seed.wrapping_add(i as u64), config.max_delay_ms),
                None => RandomPlayer::new(id, config.max_delay_ms),
            };
            let board = Arc::clone(&board);
            let turns = config.turns;
            tokio::spawn(async move {
                let id = player.id().to_string();
                player.play(&board, turns).await.map(|stats| (id, stats))
            })
        })
        .collect();

    let mut players = Vec::with_capacity(handles.len());
    let mut totals = PlayerStats::default();
    for handle in handles {
        let (id, stats) = handle.await??;
        totals.merge(&stats);
        players.push((id, stats));
    }

    Ok(SimulationStats {
        players,
        totals,
        duration: start.elapsed(),
    })
}
