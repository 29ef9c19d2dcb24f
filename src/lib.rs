//! Memory Scramble - a concurrent multiplayer memory game board
//!
//! Many players flip cards on one shared board at the same time. The board
//! serializes their moves without any caller-visible locking: contested
//! cards are handed out in arrival order, a second flip never waits (so
//! players cannot deadlock on each other), and observers can wait for the
//! next change.

pub mod board;
pub mod core;
pub mod error;
pub mod loader;
pub mod logger;
pub mod sim;

pub use board::Board;
pub use error::{Result, ScrambleError};
