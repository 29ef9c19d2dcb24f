//! Error types for Memory Scramble

use crate::core::Position;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrambleError {
    #[error("Invalid player identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("Invalid position: {0}")]
    InvalidPosition(Position),

    #[error("No card at position {0}")]
    NoCardAtPosition(Position),

    #[error("Card at {0} is controlled by another player")]
    CardControlledByOther(Position),

    #[error("Invalid card value: {0:?}")]
    InvalidCardValue(String),

    #[error("Invalid board: {0}")]
    InvalidBoard(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Rewrite failed: {0}")]
    RewriteFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Task join error: {0}")]
    JoinError(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, ScrambleError>;
