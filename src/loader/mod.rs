//! Board file loaders
//!
//! Parser for the text board format, with sync and async entry points

pub mod board_async;
pub mod board_file;

pub use board_async::load_board_async;
pub use board_file::{BoardDefinition, BoardLoader};
