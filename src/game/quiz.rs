use std::fmt::Display;

use rand::{Rng, seq::index};
use serde_derive::Serialize;
use tracing::debug;

use super::{GameError, GameState};
use crate::data::{Difficulty, QuizBank, QuizCategory, QuizQuestion};

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    FamilyExpert,
    GreatKnowledge,
    GoodJob,
    KeepLearning,
}

impl Grade {
    pub fn for_percentage(percentage: u32) -> Self {
        match percentage {
            90.. => Grade::FamilyExpert,
            70.. => Grade::GreatKnowledge,
            50.. => Grade::GoodJob,
            _ => Grade::KeepLearning,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Grade::FamilyExpert => "Family Expert",
            Grade::GreatKnowledge => "Great Knowledge",
            Grade::GoodJob => "Good Job",
            Grade::KeepLearning => "Keep Learning",
        }
    }
}

impl Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub question_id: u32,
    pub correct: bool,
    pub correct_index: usize,
    pub points_awarded: u32,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizResult {
    pub final_score: u64,
    pub max_possible_score: u64,
    pub percentage: u32,
    pub grade: Grade,
}

/// A quiz session over a borrowed question pool.
#[derive(Debug)]
pub struct Quiz<'a> {
    pool: &'a [QuizQuestion],
    questions: Vec<&'a QuizQuestion>,
    current: usize,
    score: u64,
    state: GameState,
}

impl<'a> Quiz<'a> {
    pub fn new(pool: &'a [QuizQuestion]) -> Self {
        Self {
            pool,
            questions: Vec::new(),
            current: 0,
            score: 0,
            state: GameState::NotStarted,
        }
    }

    /// Draws `question_count` distinct questions uniformly at random and
    /// starts over. May be called again to replay.
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        question_count: usize,
        rng: &mut R,
    ) -> Result<(), GameError> {
        if question_count == 0 {
            return Err(GameError::InvalidArgument(
                "a quiz needs at least one question".to_string(),
            ));
        }
        if question_count > self.pool.len() {
            return Err(GameError::InsufficientQuestions {
                requested: question_count,
                available: self.pool.len(),
            });
        }

        self.questions = index::sample(rng, self.pool.len(), question_count)
            .into_iter()
            .map(|i| &self.pool[i])
            .collect();
        self.current = 0;
        self.score = 0;
        self.state = GameState::InProgress;

        debug!(
            questions = ?self.questions.iter().map(|q| q.id).collect::<Vec<_>>(),
            "quiz started"
        );
        Ok(())
    }

    pub fn submit_answer(&mut self, selected_index: usize) -> Result<AnswerOutcome, GameError> {
        let question = self.current_question().ok_or(GameError::NotInProgress(self.state))?;
        if selected_index >= question.options.len() {
            return Err(GameError::InvalidArgument(format!(
                "option {selected_index} does not exist; question {} has {} options",
                question.id,
                question.options.len()
            )));
        }

        let correct = selected_index == question.correct_index;
        let points_awarded = if correct { question.points } else { 0 };
        self.score += u64::from(points_awarded);
        self.current += 1;
        if self.current == self.questions.len() {
            self.state = GameState::Completed;
            debug!(score = self.score, "quiz completed");
        }

        Ok(AnswerOutcome {
            question_id: question.id,
            correct,
            correct_index: question.correct_index,
            points_awarded,
        })
    }

    pub fn current_question(&self) -> Option<&'a QuizQuestion> {
        match self.state {
            GameState::InProgress => self.questions.get(self.current).copied(),
            _ => None,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    /// Questions answered so far and the length of the session.
    pub fn progress(&self) -> (usize, usize) {
        (self.current, self.questions.len())
    }

    pub fn questions(&self) -> &[&'a QuizQuestion] {
        &self.questions
    }

    pub fn max_possible_score(&self) -> u64 {
        self.questions.iter().map(|q| u64::from(q.points)).sum()
    }

    /// Final tally, once every question has been answered.
    pub fn result(&self) -> Option<QuizResult> {
        if self.state != GameState::Completed {
            return None;
        }

        let max_possible_score = self.max_possible_score();
        let percentage = (100.0 * self.score as f64 / max_possible_score as f64).round() as u32;

        Some(QuizResult {
            final_score: self.score,
            max_possible_score,
            percentage,
            grade: Grade::for_percentage(percentage),
        })
    }
}

impl QuizBank {
    pub fn questions_in_category(&self, category: QuizCategory) -> Vec<&QuizQuestion> {
        self.questions
            .iter()
            .filter(|q| q.category == category)
            .collect()
    }

    pub fn questions_with_difficulty(&self, difficulty: Difficulty) -> Vec<&QuizQuestion> {
        self.questions
            .iter()
            .filter(|q| q.difficulty == difficulty)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::Fixtures;

    #[test]
    fn test_sampling_yields_distinct_questions() {
        let fixtures = Fixtures::embedded().unwrap();
        let pool = fixtures.quiz_questions();
        let pool_ids: BTreeSet<u32> = pool.iter().map(|q| q.id).collect();

        for seed in 0..50 {
            let mut quiz = Quiz::new(pool);
            quiz.start(5, &mut StdRng::seed_from_u64(seed)).unwrap();

            let ids: BTreeSet<u32> = quiz.questions().iter().map(|q| q.id).collect();
            assert_eq!(ids.len(), 5, "seed {seed}");
            assert!(ids.is_subset(&pool_ids));
            assert_eq!(
                quiz.max_possible_score(),
                quiz.questions().iter().map(|q| u64::from(q.points)).sum::<u64>()
            );
        }
    }

    #[test]
    fn test_start_rejects_bad_counts() {
        let fixtures = Fixtures::embedded().unwrap();
        let mut quiz = Quiz::new(fixtures.quiz_questions());
        let mut rng = StdRng::seed_from_u64(1);

        assert!(matches!(
            quiz.start(0, &mut rng),
            Err(GameError::InvalidArgument(_))
        ));
        assert_eq!(
            quiz.start(11, &mut rng),
            Err(GameError::InsufficientQuestions {
                requested: 11,
                available: 10
            })
        );
        assert_eq!(quiz.state(), GameState::NotStarted);
    }

    #[test]
    fn test_perfect_quiz() {
        let fixtures = Fixtures::embedded().unwrap();
        let mut quiz = Quiz::new(fixtures.quiz_questions());
        quiz.start(5, &mut StdRng::seed_from_u64(42)).unwrap();

        while let Some(question) = quiz.current_question() {
            let outcome = quiz.submit_answer(question.correct_index).unwrap();
            assert!(outcome.correct);
            assert_eq!(outcome.points_awarded, question.points);
        }

        let result = quiz.result().unwrap();
        assert_eq!(quiz.state(), GameState::Completed);
        assert_eq!(result.final_score, result.max_possible_score);
        assert_eq!(result.percentage, 100);
        assert_eq!(result.grade, Grade::FamilyExpert);
    }

    #[test]
    fn test_all_wrong_quiz() {
        let fixtures = Fixtures::embedded().unwrap();
        let mut quiz = Quiz::new(fixtures.quiz_questions());
        quiz.start(3, &mut StdRng::seed_from_u64(7)).unwrap();

        while let Some(question) = quiz.current_question() {
            let wrong = (question.correct_index + 1) % question.options.len();
            assert!(!quiz.submit_answer(wrong).unwrap().correct);
        }

        let result = quiz.result().unwrap();
        assert_eq!(result.final_score, 0);
        assert_eq!(result.percentage, 0);
        assert_eq!(result.grade, Grade::KeepLearning);
    }

    #[test]
    fn test_answer_errors() {
        let fixtures = Fixtures::embedded().unwrap();
        let mut quiz = Quiz::new(fixtures.quiz_questions());

        assert_eq!(
            quiz.submit_answer(0),
            Err(GameError::NotInProgress(GameState::NotStarted))
        );
        assert!(quiz.result().is_none());

        quiz.start(1, &mut StdRng::seed_from_u64(3)).unwrap();
        assert!(matches!(
            quiz.submit_answer(4),
            Err(GameError::InvalidArgument(_))
        ));
        assert_eq!(quiz.progress(), (0, 1));

        quiz.submit_answer(0).unwrap();
        assert_eq!(
            quiz.submit_answer(0),
            Err(GameError::NotInProgress(GameState::Completed))
        );
    }

    #[test]
    fn test_scores_do_not_overflow() {
        let question = |id| QuizQuestion {
            id,
            category: QuizCategory::Memories,
            prompt: format!("question {id}"),
            options: vec!["yes".to_string(), "no".to_string()],
            correct_index: 0,
            explanation: String::new(),
            difficulty: Difficulty::Hard,
            points: u32::MAX,
        };
        let pool = vec![question(1), question(2), question(3)];
        let mut quiz = Quiz::new(&pool);
        quiz.start(3, &mut StdRng::seed_from_u64(11)).unwrap();

        while quiz.current_question().is_some() {
            quiz.submit_answer(0).unwrap();
        }

        let result = quiz.result().unwrap();
        assert_eq!(result.max_possible_score, 3 * u64::from(u32::MAX));
        assert_eq!(result.final_score, result.max_possible_score);
        assert_eq!(result.percentage, 100);
    }

    #[test]
    fn test_grade_bands() {
        assert_eq!(Grade::for_percentage(100), Grade::FamilyExpert);
        assert_eq!(Grade::for_percentage(90), Grade::FamilyExpert);
        assert_eq!(Grade::for_percentage(89), Grade::GreatKnowledge);
        assert_eq!(Grade::for_percentage(70), Grade::GreatKnowledge);
        assert_eq!(Grade::for_percentage(69), Grade::GoodJob);
        assert_eq!(Grade::for_percentage(50), Grade::GoodJob);
        assert_eq!(Grade::for_percentage(49), Grade::KeepLearning);
    }

    #[test]
    fn test_pool_helpers() {
        let fixtures = Fixtures::embedded().unwrap();
        let bank = fixtures.quiz();

        let history: Vec<u32> = bank
            .questions_in_category(QuizCategory::FamilyHistory)
            .iter()
            .map(|q| q.id)
            .collect();
        assert_eq!(history, vec![1, 5, 9]);

        let hard: Vec<u32> = bank
            .questions_with_difficulty(Difficulty::Hard)
            .iter()
            .map(|q| q.id)
            .collect();
        assert_eq!(hard, vec![4, 8, 10]);
    }
}
