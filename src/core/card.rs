//! Card values
//!
//! A card is never edited in place. Every change (turning it over, taking or
//! releasing control, rewriting its value) builds a new `Card`, and the grid
//! stores the replacement in a single assignment.

use crate::core::PlayerId;
use crate::{Result, ScrambleError};
use serde::{Deserialize, Serialize};

/// Which side of the card is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Face {
    #[default]
    Down,
    Up,
}

/// A card on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Token printed on the card (non-empty, no whitespace)
    value: String,

    /// Face state
    face: Face,

    /// Player currently holding this card, only ever set while face up
    controller: Option<PlayerId>,
}

impl Card {
    /// Create a face-down, uncontrolled card
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if !Self::is_valid_value(&value) {
            return Err(ScrambleError::InvalidCardValue(value));
        }
        Ok(Card {
            value,
            face: Face::Down,
            controller: None,
        })
    }

    pub fn is_valid_value(value: &str) -> bool {
        !value.is_empty() && !value.chars().any(char::is_whitespace)
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn face(&self) -> Face {
        self.face
    }

    pub fn is_face_up(&self) -> bool {
        self.face == Face::Up
    }

    pub fn controller(&self) -> Option<&PlayerId> {
        self.controller.as_ref()
    }

    pub fn is_controlled(&self) -> bool {
        self.controller.is_some()
    }

    pub fn is_controlled_by(&self, player: &PlayerId) -> bool {
        self.controller.as_ref() == Some(player)
    }

    /// Same card, face up
    pub fn turned_up(&self) -> Card {
        Card {
            face: Face::Up,
            ..self.clone()
        }
    }

    /// Same card, face down; a face-down card has no controller
    pub fn turned_down(&self) -> Card {
        Card {
            value: self.value.clone(),
            face: Face::Down,
            controller: None,
        }
    }

    /// Same card, face up and controlled by `player`
    pub fn controlled_by(&self, player: PlayerId) -> Card {
        Card {
            value: self.value.clone(),
            face: Face::Up,
            controller: Some(player),
        }
    }

    /// Same card with its controller cleared
    pub fn released(&self) -> Card {
        Card {
            controller: None,
            ..self.clone()
        }
    }

    /// Same face state and controller, new value
    ///
    /// `value` must already be validated by the caller.
    pub fn with_value(&self, value: String) -> Card {
        Card {
            value,
            face: self.face,
            controller: self.controller.clone(),
        }
    }
}
