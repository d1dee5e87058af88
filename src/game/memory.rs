use rand::{Rng, seq::SliceRandom};
use serde_derive::Serialize;
use tracing::debug;

use super::{GameError, GameState};
use crate::data::MemorySymbol;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Face {
    Hidden,
    Revealed,
    Matched,
}

#[derive(Serialize, Debug, Clone, Copy)]
pub struct Card<'a> {
    pub symbol: &'a MemorySymbol,
    pub face: Face,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FlipOutcome {
    /// First card of a move.
    Revealed,
    Matched,
    /// Both cards stay face up until [`MemoryGame::hide_mismatched`].
    Mismatched,
}

/// A memory-match board of two cards per symbol.
#[derive(Debug)]
pub struct MemoryGame<'a> {
    cards: Vec<Card<'a>>,
    first: Option<usize>,
    pending: Option<(usize, usize)>,
    moves: u32,
    matched_pairs: usize,
    state: GameState,
}

impl<'a> MemoryGame<'a> {
    /// Deals a shuffled board holding every symbol twice.
    pub fn new<R: Rng + ?Sized>(
        symbols: &'a [MemorySymbol],
        rng: &mut R,
    ) -> Result<Self, GameError> {
        if symbols.is_empty() {
            return Err(GameError::InvalidArgument(
                "a memory game needs at least one symbol".to_string(),
            ));
        }

        let mut cards: Vec<Card<'a>> = symbols
            .iter()
            .flat_map(|symbol| {
                [Card {
                    symbol,
                    face: Face::Hidden,
                }; 2]
            })
            .collect();
        cards.shuffle(rng);

        debug!(pairs = symbols.len(), "memory game dealt");
        Ok(Self {
            cards,
            first: None,
            pending: None,
            moves: 0,
            matched_pairs: 0,
            state: GameState::InProgress,
        })
    }

    pub fn flip(&mut self, index: usize) -> Result<FlipOutcome, GameError> {
        if self.state != GameState::InProgress {
            return Err(GameError::NotInProgress(self.state));
        }
        if self.pending.is_some() {
            return Err(GameError::InvalidArgument(
                "hide the mismatched pair before flipping again".to_string(),
            ));
        }
        let card = self.cards.get(index).ok_or_else(|| {
            GameError::InvalidArgument(format!(
                "card {index} does not exist; the board has {} cards",
                self.cards.len()
            ))
        })?;
        match card.face {
            Face::Matched => {
                return Err(GameError::InvalidArgument(format!(
                    "card {index} is already matched"
                )));
            }
            Face::Revealed => {
                return Err(GameError::InvalidArgument(format!(
                    "card {index} is already face up"
                )));
            }
            Face::Hidden => {}
        }

        self.cards[index].face = Face::Revealed;
        let Some(first) = self.first.take() else {
            self.first = Some(index);
            return Ok(FlipOutcome::Revealed);
        };

        self.moves += 1;
        if self.cards[first].symbol.id != self.cards[index].symbol.id {
            self.pending = Some((first, index));
            return Ok(FlipOutcome::Mismatched);
        }

        self.cards[first].face = Face::Matched;
        self.cards[index].face = Face::Matched;
        self.matched_pairs += 1;
        if self.matched_pairs == self.pair_count() {
            self.state = GameState::Completed;
            debug!(moves = self.moves, "memory game completed");
        }
        Ok(FlipOutcome::Matched)
    }

    /// Turns a mismatched pair face down again. Returns whether there was one.
    pub fn hide_mismatched(&mut self) -> bool {
        match self.pending.take() {
            Some((a, b)) => {
                self.cards[a].face = Face::Hidden;
                self.cards[b].face = Face::Hidden;
                true
            }
            None => false,
        }
    }

    pub fn cards(&self) -> &[Card<'a>] {
        &self.cards
    }

    pub fn pair_count(&self) -> usize {
        self.cards.len() / 2
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn matched_pairs(&self) -> usize {
        self.matched_pairs
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    /// Pairs per move as a percentage; 100 for a game without a miss.
    pub fn efficiency(&self) -> Option<u32> {
        if self.moves == 0 {
            return None;
        }
        Some((self.pair_count() as f64 / f64::from(self.moves) * 100.0).round() as u32)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::Fixtures;

    fn deal(fixtures: &Fixtures, seed: u64) -> MemoryGame<'_> {
        MemoryGame::new(fixtures.memory_symbols(), &mut StdRng::seed_from_u64(seed)).unwrap()
    }

    fn pairs(game: &MemoryGame) -> Vec<(usize, usize)> {
        let mut positions: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
        for (index, card) in game.cards().iter().enumerate() {
            positions.entry(card.symbol.id).or_default().push(index);
        }
        positions.into_values().map(|p| (p[0], p[1])).collect()
    }

    fn mismatched_pair(game: &MemoryGame) -> (usize, usize) {
        let cards = game.cards();
        let other = (1..cards.len())
            .find(|&i| cards[i].symbol.id != cards[0].symbol.id)
            .unwrap();
        (0, other)
    }

    #[test]
    fn test_deck_holds_every_symbol_twice() {
        let fixtures = Fixtures::embedded().unwrap();
        let game = deal(&fixtures, 9);

        assert_eq!(game.cards().len(), 16);
        assert_eq!(game.pair_count(), 8);
        assert!(pairs(&game).iter().all(|(a, b)| a != b));
        assert!(game.cards().iter().all(|c| c.face == Face::Hidden));
    }

    #[test]
    fn test_shuffle_is_seeded() {
        let fixtures = Fixtures::embedded().unwrap();
        let symbols = fixtures.memory_symbols();
        let order = |seed| {
            MemoryGame::new(symbols, &mut StdRng::seed_from_u64(seed))
                .unwrap()
                .cards()
                .iter()
                .map(|c| c.symbol.id)
                .collect::<Vec<_>>()
        };

        assert_eq!(order(5), order(5));
    }

    #[test]
    fn test_perfect_game() {
        let fixtures = Fixtures::embedded().unwrap();
        let mut game = deal(&fixtures, 1);

        for (a, b) in pairs(&game) {
            assert_eq!(game.flip(a).unwrap(), FlipOutcome::Revealed);
            assert_eq!(game.flip(b).unwrap(), FlipOutcome::Matched);
        }

        assert_eq!(game.state(), GameState::Completed);
        assert_eq!(game.matched_pairs(), 8);
        assert_eq!(game.moves(), 8);
        assert_eq!(game.efficiency(), Some(100));
        assert!(game.cards().iter().all(|c| c.face == Face::Matched));
        assert_eq!(
            game.flip(0),
            Err(GameError::NotInProgress(GameState::Completed))
        );
    }

    #[test]
    fn test_mismatch_must_be_hidden_first() {
        let fixtures = Fixtures::embedded().unwrap();
        let mut game = deal(&fixtures, 2);
        let (a, b) = mismatched_pair(&game);

        game.flip(a).unwrap();
        assert_eq!(game.flip(b).unwrap(), FlipOutcome::Mismatched);
        assert_eq!(game.moves(), 1);

        let third = (0..16).find(|&i| i != a && i != b).unwrap();
        assert!(matches!(game.flip(third), Err(GameError::InvalidArgument(_))));

        assert!(game.hide_mismatched());
        assert!(!game.hide_mismatched());
        assert_eq!(game.cards()[a].face, Face::Hidden);
        assert_eq!(game.cards()[b].face, Face::Hidden);
        assert_eq!(game.moves(), 1);
    }

    #[test]
    fn test_invalid_flips() {
        let fixtures = Fixtures::embedded().unwrap();
        let mut game = deal(&fixtures, 3);
        let (a, b) = pairs(&game)[0];

        game.flip(a).unwrap();
        assert!(matches!(game.flip(a), Err(GameError::InvalidArgument(_))));
        game.flip(b).unwrap();
        assert!(matches!(game.flip(b), Err(GameError::InvalidArgument(_))));
        assert!(matches!(game.flip(16), Err(GameError::InvalidArgument(_))));
        assert_eq!(game.moves(), 1);
    }

    #[test]
    fn test_efficiency_with_misses() {
        let fixtures = Fixtures::embedded().unwrap();
        let mut game = deal(&fixtures, 4);
        assert_eq!(game.efficiency(), None);

        for _ in 0..2 {
            let (a, b) = mismatched_pair(&game);
            game.flip(a).unwrap();
            game.flip(b).unwrap();
            game.hide_mismatched();
        }
        for (a, b) in pairs(&game) {
            game.flip(a).unwrap();
            game.flip(b).unwrap();
        }

        assert_eq!(game.moves(), 10);
        assert_eq!(game.efficiency(), Some(80));
        assert_eq!(game.state(), GameState::Completed);
    }

    #[test]
    fn test_empty_deck_is_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(MemoryGame::new(&[], &mut rng).is_err());
    }
}
