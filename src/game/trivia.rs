use serde_derive::Serialize;
use tracing::debug;

use super::{GameError, GameState};
use crate::data::TriviaQuestion;

/// Points for one trivia answer: the question's points plus a time bonus of
/// `floor(points * remaining / time_limit)` when correct, nothing otherwise.
///
/// Computed in `u64`, so any `u32` inputs yield a result.
pub fn trivia_award(points: u32, time_limit: u32, remaining: u32, correct: bool) -> u64 {
    if !correct {
        return 0;
    }
    let points = u64::from(points);
    if time_limit == 0 {
        return points;
    }

    let remaining = u64::from(remaining.min(time_limit));
    points + points * remaining / u64::from(time_limit)
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriviaOutcome<'a> {
    pub question_id: u32,
    pub correct: bool,
    pub timed_out: bool,
    pub points_awarded: u64,
    pub expected_answer: &'a str,
}

/// A timed trivia session. The caller drives the clock with [`Trivia::tick`].
#[derive(Debug)]
pub struct Trivia<'a> {
    questions: &'a [TriviaQuestion],
    current: usize,
    remaining: u32,
    score: u64,
    state: GameState,
}

impl<'a> Trivia<'a> {
    pub fn new(questions: &'a [TriviaQuestion]) -> Self {
        Self {
            questions,
            current: 0,
            remaining: 0,
            score: 0,
            state: GameState::NotStarted,
        }
    }

    pub fn start(&mut self) -> Result<(), GameError> {
        let first = self
            .questions
            .first()
            .ok_or(GameError::InsufficientQuestions {
                requested: 1,
                available: 0,
            })?;

        self.current = 0;
        self.remaining = first.time_limit_seconds;
        self.score = 0;
        self.state = GameState::InProgress;
        debug!(questions = self.questions.len(), "trivia started");
        Ok(())
    }

    /// One second passes. When the clock of the current question runs out it
    /// counts as a wrong answer and the session moves on.
    pub fn tick(&mut self) -> Result<Option<TriviaOutcome<'a>>, GameError> {
        let question = self.current_question().ok_or(GameError::NotInProgress(self.state))?;

        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining > 0 {
            return Ok(None);
        }

        debug!(question = question.id, "trivia question timed out");
        self.advance();
        Ok(Some(TriviaOutcome {
            question_id: question.id,
            correct: false,
            timed_out: true,
            points_awarded: 0,
            expected_answer: &question.expected_answer,
        }))
    }

    /// Compares the trimmed answer case-insensitively and moves on.
    pub fn submit_answer(&mut self, answer: &str) -> Result<TriviaOutcome<'a>, GameError> {
        let question = self.current_question().ok_or(GameError::NotInProgress(self.state))?;

        let expected = question.expected_answer.trim().to_lowercase();
        let correct = answer.trim().to_lowercase() == expected;
        let points_awarded = trivia_award(
            question.points,
            question.time_limit_seconds,
            self.remaining,
            correct,
        );
        self.score += points_awarded;
        self.advance();

        Ok(TriviaOutcome {
            question_id: question.id,
            correct,
            timed_out: false,
            points_awarded,
            expected_answer: &question.expected_answer,
        })
    }

    fn advance(&mut self) {
        self.current += 1;
        match self.questions.get(self.current) {
            Some(next) => self.remaining = next.time_limit_seconds,
            None => {
                self.remaining = 0;
                self.state = GameState::Completed;
                debug!(score = self.score, "trivia completed");
            }
        }
    }

    pub fn current_question(&self) -> Option<&'a TriviaQuestion> {
        match self.state {
            GameState::InProgress => self.questions.get(self.current),
            _ => None,
        }
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    /// Score of answering every question correctly and instantly.
    pub fn max_possible_score(&self) -> u64 {
        self.questions.iter().map(|q| u64::from(q.points) * 2).sum()
    }
}
