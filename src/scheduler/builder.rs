//! Match setup.

use super::turn::TurnScheduler;
use crate::board::Board;
use crate::core::{EngineResult, GameRng, MatchConfig, MatchState, RandomSource};
use crate::effects::QuestionBank;

/// Builder for a `TurnScheduler`.
///
/// Everything defaults to the standard game: the 28-tile board, the
/// built-in question bank, the default configuration and a fresh state
/// from that configuration.
pub struct MatchBuilder {
    config: MatchConfig,
    board: Option<Board>,
    questions: Option<QuestionBank>,
    state: Option<MatchState>,
    rng: Option<Box<dyn RandomSource>>,
    seed: u64,
}

impl Default for MatchBuilder {
    fn default() -> Self {
        Self {
            config: MatchConfig::default(),
            board: None,
            questions: None,
            state: None,
            rng: None,
            seed: 0,
        }
    }
}

impl MatchBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: MatchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn board(mut self, board: Board) -> Self {
        self.board = Some(board);
        self
    }

    pub fn questions(mut self, questions: QuestionBank) -> Self {
        self.questions = Some(questions);
        self
    }

    /// Start from a prepared state instead of a fresh one.
    pub fn state(mut self, state: MatchState) -> Self {
        self.state = Some(state);
        self
    }

    /// Use this randomness source. Overrides `seed`.
    pub fn rng(mut self, rng: impl RandomSource + 'static) -> Self {
        self.rng = Some(Box::new(rng));
        self
    }

    /// Seed for the default `GameRng`.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Validate and build.
    pub fn build(self) -> EngineResult<TurnScheduler> {
        let state = self
            .state
            .unwrap_or_else(|| MatchState::new(self.config.starting_hp, self.config.match_seconds));
        let seed = self.seed;
        let rng = self
            .rng
            .unwrap_or_else(|| Box::new(GameRng::new(seed)));

        TurnScheduler::new(
            self.config,
            self.board.unwrap_or_default(),
            self.questions.unwrap_or_default(),
            state,
            rng,
        )
    }
}
