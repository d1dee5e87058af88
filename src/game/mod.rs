//! Session state and scoring rules of the quiz, trivia and memory games.
//!
//! Sessions borrow their questions or symbols from the fixture store and are
//! driven by the caller; nothing here sleeps or spawns. Randomness is always
//! supplied by the caller so games can be replayed from a seed.

use std::{fmt::Display, time::Duration};

use serde_derive::Serialize;
use thiserror::Error;

use crate::CONFIG;

pub mod memory;
pub mod quiz;
pub mod trivia;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    NotStarted,
    InProgress,
    Completed,
}

impl GameState {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameState::NotStarted => "not started",
            GameState::InProgress => "in progress",
            GameState::Completed => "completed",
        }
    }
}

impl Display for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("requested {requested} questions but only {available} are available")]
    InsufficientQuestions { requested: usize, available: usize },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("game is {0}, not in progress")]
    NotInProgress(GameState),
}

/// Number of questions a quiz session asks unless told otherwise.
pub fn default_quiz_length() -> usize {
    usize::try_from(CONFIG.games.quiz_question_count).unwrap_or(5)
}

/// How long a mismatched memory pair stays face up.
pub fn memory_flip_back_delay() -> Duration {
    Duration::from_millis(u64::try_from(CONFIG.games.memory_flip_back_ms).unwrap_or(1000))
}

/// How long the answer of a trivia question is shown before moving on.
pub fn trivia_reveal_delay() -> Duration {
    Duration::from_millis(u64::try_from(CONFIG.games.trivia_reveal_ms).unwrap_or(3000))
}
