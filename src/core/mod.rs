//! Core board types

pub mod card;
pub mod player;
pub mod types;

pub use card::{Card, Face};
pub use player::{Player, TurnState};
pub use types::{PlayerId, Position};
