//! The shared Memory Scramble board
//!
//! A `Board` is meant to be shared (`Arc<Board>`) between any number of player
//! tasks. All state sits behind one lock that is only ever held by
//! synchronous code: every `.await` in this module happens with the lock
//! released, and every read-modify-write either finishes before the next
//! await or re-reads the board after it.
//!
//! The suspension points are:
//! - waiting for a contested first card ([`wait_queue`]),
//! - waiting for any change ([`notifier`]),
//! - a caller-supplied rewrite inside [`Board::transform`],
//! - a player's own earlier flip that is still in progress.

/// Log a board event when the verbose-logging feature is on
///
/// The message is only formatted if the logger would use it.
macro_rules! board_log {
    ($state:expr, $level:ident, $category:expr, $($arg:tt)*) => {
        #[cfg(feature = "verbose-logging")]
        {
            if $state.logger.enabled($crate::logger::VerbosityLevel::$level) {
                $state.logger.log(
                    $crate::logger::VerbosityLevel::$level,
                    $category,
                    &format!($($arg)*),
                );
            }
        }
        #[cfg(not(feature = "verbose-logging"))]
        {
            let _ = &$state;
        }
    };
}

pub mod grid;
pub mod notifier;
mod transform;
mod turn;
pub mod view;
pub mod wait_queue;

pub use grid::Grid;
pub use notifier::{ChangeListener, ChangeNotifier};
pub use view::{BoardView, CellView};
pub use wait_queue::WaitQueues;

use crate::core::{Card, PlayerId, Position};
use crate::logger::{BoardLogger, LogEntry};
use crate::Result;
use rustc_hash::FxHashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Everything the board owns, guarded by one lock
#[derive(Debug)]
pub(crate) struct BoardState {
    pub(crate) grid: Grid,
    pub(crate) wait_queues: WaitQueues,
    pub(crate) notifier: ChangeNotifier,
    pub(crate) logger: BoardLogger,
    /// Serializes flips issued concurrently by the same player
    turn_locks: FxHashMap<PlayerId, Arc<tokio::sync::Mutex<()>>>,
}

impl BoardState {
    /// Replace the card at `pos` and announce the change
    pub(crate) fn replace(&mut self, pos: Position, card: Option<Card>) {
        self.grid.set(pos, card);
        self.notifier.fire_all();
    }

    /// Assert all representation invariants
    pub(crate) fn check_rep(&self) {
        self.grid.check_rep();
        for pos in self.wait_queues.positions() {
            assert!(
                self.grid.is_in_bounds(*pos),
                "wait queue for out-of-bounds position {pos}"
            );
        }
    }
}

/// A Memory Scramble board shared by concurrent players
#[derive(Debug)]
pub struct Board {
    rows: usize,
    cols: usize,
    state: Mutex<BoardState>,
}

impl Board {
    /// Create a board of face-down cards from a row-major list of values
    pub fn new<I, S>(rows: usize, cols: usize, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let grid = Grid::new(rows, cols, values)?;
        let state = BoardState {
            grid,
            wait_queues: WaitQueues::new(),
            notifier: ChangeNotifier::new(),
            logger: BoardLogger::new(),
            turn_locks: FxHashMap::default(),
        };
        state.check_rep();

        Ok(Board {
            rows,
            cols,
            state: Mutex::new(state),
        })
    }

    /// Use `logger` for board events
    pub fn with_logger(self, logger: BoardLogger) -> Self {
        self.lock().logger = logger;
        self
    }

    /// (rows, cols)
    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    // A poisoned lock means an invariant assertion already panicked while the
    // state was held; later callers still get to see that state.
    pub(crate) fn lock(&self) -> MutexGuard<'_, BoardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn turn_lock(&self, player: &PlayerId) -> Arc<tokio::sync::Mutex<()>> {
        let mut state = self.lock();
        Arc::clone(state.turn_locks.entry(player.clone()).or_default())
    }

    /// Register for the next change without waiting yet
    ///
    /// The listener only sees changes made after this call, so register before
    /// doing whatever is expected to cause the change.
    pub fn subscribe(&self) -> ChangeListener {
        self.lock().notifier.register()
    }

    /// Wait until the board next changes
    ///
    /// A change is any card turning over, changing controller, being removed
    /// or getting a new value.
    pub async fn await_change(&self) {
        self.subscribe().await
    }

    /// Wait for the next change, then return `player`'s view of the board
    pub async fn watch(&self, player: &str) -> String {
        self.await_change().await;
        self.look(player)
    }

    /// Snapshot of every card still on the board, in row-major order
    ///
    /// Shows values of face-down cards too, so it is for tests and tooling,
    /// not for players.
    pub fn cards(&self) -> Vec<(Position, Card)> {
        self.lock()
            .grid
            .occupied()
            .map(|(pos, card)| (pos, card.clone()))
            .collect()
    }

    /// How many flips are currently waiting to take the card at `pos`
    pub fn waiters(&self, pos: Position) -> usize {
        self.lock().wait_queues.len(pos)
    }

    /// Log entries captured so far (requires a capturing logger)
    pub fn logs(&self) -> Vec<LogEntry> {
        self.lock().logger.logs().to_vec()
    }

    /// Run the representation-invariant check now
    ///
    /// # Panics
    /// If the board is in an inconsistent state.
    pub fn check_rep(&self) {
        self.lock().check_rep();
    }
}
