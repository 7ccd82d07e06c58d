//! Effect resolution: (mover, tile) to state deltas.
//!
//! The resolver never mutates state. It reads the current state, draws
//! from the injected randomness source where a tile is random, and
//! returns either a finished `EffectOutcome` or a request for a player
//! decision. The scheduler applies outcomes.

use tracing::trace;

use super::outcome::{transfer_amount, EffectOutcome};
use super::quiz::{Question, QuestionBank};
use crate::board::{BoardError, Tile, TileKind};
use crate::core::{
    ChanceCard, EffectTuning, EngineError, EngineResult, MatchState, RandomSource, Rejection, Side,
};

/// Result of resolving a landing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Outcome ready to apply.
    Applied(EffectOutcome),
    /// Player must decide whether to claim an unowned habit.
    OfferClaim { tile: usize, cost: i32 },
    /// Player must answer a question.
    AskQuiz(Question),
}

/// Maps a landing to its outcome using the configured tuning.
#[derive(Clone, Copy, Debug)]
pub struct EffectResolver<'a> {
    tuning: &'a EffectTuning,
    questions: &'a QuestionBank,
}

impl<'a> EffectResolver<'a> {
    /// Create a resolver.
    #[must_use]
    pub fn new(tuning: &'a EffectTuning, questions: &'a QuestionBank) -> Self {
        Self { tuning, questions }
    }

    /// Resolve `mover` landing on `tile`.
    pub fn resolve(
        &self,
        mover: Side,
        tile: &Tile,
        state: &MatchState,
        rng: &mut dyn RandomSource,
    ) -> Resolution {
        trace!(%mover, tile = tile.index, kind = %tile.kind, "resolving tile");
        match tile.kind {
            TileKind::Start => Resolution::Applied(EffectOutcome::none(
                mover,
                format!("{} is back at the start", mover),
            )),
            TileKind::Habit | TileKind::Gym => self.resolve_habit(mover, tile, state),
            TileKind::Quiz => {
                if mover.is_player() {
                    match self.questions.draw(rng) {
                        Some(question) => Resolution::AskQuiz(question.clone()),
                        None => Resolution::Applied(EffectOutcome::none(
                            mover,
                            format!("{} found no question to answer", mover),
                        )),
                    }
                } else {
                    Resolution::Applied(self.opponent_quiz(rng))
                }
            }
            TileKind::Danger => Resolution::Applied(
                EffectOutcome::none(
                    mover,
                    format!(
                        "{} hit {} and lost {} HP",
                        mover, tile.label, self.tuning.danger_penalty
                    ),
                )
                .with_hp(mover, -self.tuning.danger_penalty),
            ),
            TileKind::Chance => Resolution::Applied(self.chance(mover, state, rng)),
            TileKind::Hospital => Resolution::Applied(
                EffectOutcome::none(
                    mover,
                    format!(
                        "{} recovers at {} (+{} HP, rests {} turn)",
                        mover,
                        tile.label,
                        self.tuning.hospital_heal,
                        self.tuning.hospital_rest_turns
                    ),
                )
                .with_hp(mover, self.tuning.hospital_heal)
                .with_rest(self.tuning.hospital_rest_turns),
            ),
        }
    }

    fn resolve_habit(&self, mover: Side, tile: &Tile, state: &MatchState) -> Resolution {
        match tile.owner {
            None if mover.is_player() => Resolution::OfferClaim {
                tile: tile.index,
                cost: tile.cost,
            },
            None => {
                let hp = state.hp(mover);
                if hp > tile.cost + self.tuning.opponent_claim_margin {
                    Resolution::Applied(
                        EffectOutcome::none(
                            mover,
                            format!("{} takes up the habit {}", mover, tile.label),
                        )
                        .with_hp(mover, -tile.cost)
                        .with_claim(tile.index, mover),
                    )
                } else {
                    Resolution::Applied(EffectOutcome::none(
                        mover,
                        format!("{} passes on {}", mover, tile.label),
                    ))
                }
            }
            Some(owner) if owner == mover => {
                let heal = scaled(tile.cost, self.tuning.own_habit_heal_ratio);
                Resolution::Applied(
                    EffectOutcome::none(
                        mover,
                        format!("{} keeps up {} (+{} HP)", mover, tile.label, heal),
                    )
                    .with_hp(mover, heal),
                )
            }
            Some(owner) => {
                let toll = scaled(tile.cost, self.tuning.toll_ratio);
                let amount = transfer_amount(state.hp(mover), toll);
                Resolution::Applied(
                    EffectOutcome::none(
                        mover,
                        format!(
                            "{} learns {} from {} ({} HP)",
                            mover, tile.label, owner, amount
                        ),
                    )
                    .with_hp(mover, -amount)
                    .with_hp(owner, amount),
                )
            }
        }
    }

    fn opponent_quiz(&self, rng: &mut dyn RandomSource) -> EffectOutcome {
        let mover = Side::Opponent;
        if rng.chance(self.tuning.opponent_quiz_accuracy) {
            EffectOutcome::none(mover, format!("{} answers the quiz correctly", mover))
                .with_hp(mover, self.tuning.opponent_quiz_reward)
        } else {
            EffectOutcome::none(mover, format!("{} answers the quiz wrong", mover))
                .with_hp(mover, -self.tuning.opponent_quiz_penalty)
        }
    }

    fn chance(&self, mover: Side, state: &MatchState, rng: &mut dyn RandomSource) -> EffectOutcome {
        let table = &self.tuning.chance_table;
        let Some(card) = table.get(rng.pick(table.len())) else {
            return EffectOutcome::none(mover, format!("{} draws nothing", mover));
        };
        match card {
            ChanceCard::Hp { label, delta } => {
                EffectOutcome::none(mover, format!("Chance for {}: {}", mover, label))
                    .with_hp(mover, *delta)
            }
            ChanceCard::Steal { label, amount } => {
                let victim = mover.other();
                let amount = transfer_amount(state.hp(victim), *amount);
                EffectOutcome::none(
                    mover,
                    format!("Chance for {}: {} ({} HP)", mover, label, amount),
                )
                .with_hp(mover, amount)
                .with_hp(victim, -amount)
            }
        }
    }

    /// Outcome of `mover` accepting a claim offer on `tile`.
    ///
    /// Fails with `InsufficientResource` when the mover cannot pay.
    pub fn claim(&self, mover: Side, tile: &Tile, state: &MatchState) -> EngineResult<EffectOutcome> {
        if !tile.is_claimable() {
            return Err(BoardError::NotClaimable {
                index: tile.index,
                kind: tile.kind,
            }
            .into());
        }
        let available = state.hp(mover);
        if available < tile.cost {
            return Err(EngineError::InsufficientResource {
                needed: tile.cost,
                available,
            });
        }
        Ok(EffectOutcome::none(
            mover,
            format!("{} starts the habit {} (-{} HP)", mover, tile.label, tile.cost),
        )
        .with_hp(mover, -tile.cost)
        .with_claim(tile.index, mover))
    }

    /// Outcome of the player answering `question` with option `index`.
    pub fn answer_quiz(&self, question: &Question, index: usize) -> EngineResult<EffectOutcome> {
        if index >= question.option_count() {
            return Err(Rejection::OptionOutOfRange {
                index,
                options: question.option_count(),
            }
            .into());
        }
        let mover = Side::Player;
        Ok(if question.is_correct(index) {
            EffectOutcome::none(
                mover,
                format!("Correct! +{} HP", self.tuning.player_quiz_reward),
            )
            .with_hp(mover, self.tuning.player_quiz_reward)
        } else {
            EffectOutcome::none(
                mover,
                format!("Wrong answer, -{} HP", self.tuning.player_quiz_penalty),
            )
            .with_hp(mover, -self.tuning.player_quiz_penalty)
        })
    }

    /// Bonus for wrapping past the start tile.
    #[must_use]
    pub fn lap_bonus(&self, mover: Side) -> EffectOutcome {
        EffectOutcome::none(
            mover,
            format!("{} completed a lap (+{} HP)", mover, self.tuning.lap_bonus),
        )
        .with_hp(mover, self.tuning.lap_bonus)
    }
}

/// `floor(cost * ratio)`.
fn scaled(cost: i32, ratio: f64) -> i32 {
    (f64::from(cost) * ratio).floor() as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::core::ScriptedRng;

    fn setup() -> (EffectTuning, QuestionBank, Board, MatchState) {
        (
            EffectTuning::default(),
            QuestionBank::standard(),
            Board::standard(),
            MatchState::new(500, 300),
        )
    }

    fn applied(resolution: Resolution) -> EffectOutcome {
        match resolution {
            Resolution::Applied(outcome) => outcome,
            other => panic!("expected Applied, got {:?}", other),
        }
    }

    #[test]
    fn test_start_is_noop() {
        let (tuning, bank, board, state) = setup();
        let resolver = EffectResolver::new(&tuning, &bank);
        let mut rng = ScriptedRng::new(1);

        let outcome = applied(resolver.resolve(Side::Player, board.tile_at(0).unwrap(), &state, &mut rng));
        assert!(outcome.is_noop());
    }

    #[test]
    fn test_unowned_habit_offers_claim_to_player() {
        let (tuning, bank, board, state) = setup();
        let resolver = EffectResolver::new(&tuning, &bank);
        let mut rng = ScriptedRng::new(1);

        let resolution = resolver.resolve(Side::Player, board.tile_at(3).unwrap(), &state, &mut rng);
        assert_eq!(resolution, Resolution::OfferClaim { tile: 3, cost: 40 });
    }

    #[test]
    fn test_opponent_claims_with_margin() {
        let (tuning, bank, board, state) = setup();
        let resolver = EffectResolver::new(&tuning, &bank);
        let mut rng = ScriptedRng::new(1);
        let tile = board.tile_at(3).unwrap();

        let outcome = applied(resolver.resolve(Side::Opponent, tile, &state, &mut rng));
        assert_eq!(outcome.hp_deltas[Side::Opponent], -40);
        assert_eq!(outcome.claim.map(|c| (c.tile, c.owner)), Some((3, Side::Opponent)));

        // hp == cost + margin is not enough; the margin is strict.
        let poor = state.with_hp(Side::Opponent, 140, 500);
        let outcome = applied(resolver.resolve(Side::Opponent, tile, &poor, &mut rng));
        assert!(outcome.is_noop());
    }

    #[test]
    fn test_custom_claim_margin() {
        let (mut tuning, bank, board, state) = setup();
        tuning.opponent_claim_margin = 0;
        let resolver = EffectResolver::new(&tuning, &bank);
        let mut rng = ScriptedRng::new(1);

        let state = state.with_hp(Side::Opponent, 41, 500);
        let outcome = applied(resolver.resolve(Side::Opponent, board.tile_at(3).unwrap(), &state, &mut rng));
        assert!(outcome.claim.is_some());
    }

    #[test]
    fn test_own_habit_heals_half_cost() {
        let (tuning, bank, mut board, state) = setup();
        board.set_owner(5, Some(Side::Player)).unwrap();
        let resolver = EffectResolver::new(&tuning, &bank);
        let mut rng = ScriptedRng::new(1);

        let outcome = applied(resolver.resolve(Side::Player, board.tile_at(5).unwrap(), &state, &mut rng));
        assert_eq!(outcome.hp_deltas[Side::Player], 25);
        assert_eq!(outcome.hp_deltas[Side::Opponent], 0);
    }

    #[test]
    fn test_toll_is_zero_sum_and_capped_by_payer() {
        let (tuning, bank, mut board, state) = setup();
        board.set_owner(14, Some(Side::Opponent)).unwrap();
        let resolver = EffectResolver::new(&tuning, &bank);
        let mut rng = ScriptedRng::new(1);
        let tile = board.tile_at(14).unwrap();

        let outcome = applied(resolver.resolve(Side::Player, tile, &state, &mut rng));
        assert_eq!(outcome.hp_deltas[Side::Player], -40);
        assert_eq!(outcome.hp_deltas[Side::Opponent], 40);

        let broke = state.with_hp(Side::Player, 10, 500);
        let outcome = applied(resolver.resolve(Side::Player, tile, &broke, &mut rng));
        assert_eq!(outcome.hp_deltas[Side::Player], -10);
        assert_eq!(outcome.hp_deltas[Side::Opponent], 10);
    }

    #[test]
    fn test_quiz() {
        let (tuning, bank, board, state) = setup();
        let resolver = EffectResolver::new(&tuning, &bank);
        let tile = board.tile_at(2).unwrap();

        let mut rng = ScriptedRng::new(1).with_picks([0]);
        let resolution = resolver.resolve(Side::Player, tile, &state, &mut rng);
        assert!(matches!(resolution, Resolution::AskQuiz(ref q) if q.options.len() >= 2));

        let mut rng = ScriptedRng::new(1).with_coins([true, false]);
        let right = applied(resolver.resolve(Side::Opponent, tile, &state, &mut rng));
        let wrong = applied(resolver.resolve(Side::Opponent, tile, &state, &mut rng));
        assert_eq!(right.hp_deltas[Side::Opponent], 50);
        assert_eq!(wrong.hp_deltas[Side::Opponent], -30);
    }

    #[test]
    fn test_answer_quiz() {
        let (tuning, bank, _, _) = setup();
        let resolver = EffectResolver::new(&tuning, &bank);
        let question = Question::new("Pick b", ["a", "b"], 1).unwrap();

        let right = resolver.answer_quiz(&question, 1).unwrap();
        assert_eq!(right.hp_deltas[Side::Player], 60);
        let wrong = resolver.answer_quiz(&question, 0).unwrap();
        assert_eq!(wrong.hp_deltas[Side::Player], -40);

        assert_eq!(
            resolver.answer_quiz(&question, 2),
            Err(EngineError::InvalidCommand(Rejection::OptionOutOfRange {
                index: 2,
                options: 2
            }))
        );
    }

    #[test]
    fn test_danger_and_hospital() {
        let (tuning, bank, board, state) = setup();
        let resolver = EffectResolver::new(&tuning, &bank);
        let mut rng = ScriptedRng::new(1);

        let danger = applied(resolver.resolve(Side::Opponent, board.tile_at(6).unwrap(), &state, &mut rng));
        assert_eq!(danger.hp_deltas[Side::Opponent], -80);
        assert_eq!(danger.hp_deltas[Side::Player], 0);

        let hospital = applied(resolver.resolve(Side::Player, board.tile_at(10).unwrap(), &state, &mut rng));
        assert_eq!(hospital.hp_deltas[Side::Player], 50);
        assert_eq!(hospital.rest_turns, 1);
    }

    #[test]
    fn test_chance_table() {
        let (tuning, bank, board, state) = setup();
        let resolver = EffectResolver::new(&tuning, &bank);
        let tile = board.tile_at(4).unwrap();
        let mut rng = ScriptedRng::new(1).with_picks([0, 1, 2, 3]);

        let deltas: Vec<_> = (0..4)
            .map(|_| {
                let o = applied(resolver.resolve(Side::Player, tile, &state, &mut rng));
                (o.hp_deltas[Side::Player], o.hp_deltas[Side::Opponent])
            })
            .collect();
        assert_eq!(deltas, vec![(100, 0), (-60, 0), (120, 0), (50, -50)]);

        // Steal takes no more than the victim has.
        let state = state.with_hp(Side::Player, 20, 500);
        let mut rng = ScriptedRng::new(1).with_picks([3]);
        let steal = applied(resolver.resolve(Side::Opponent, tile, &state, &mut rng));
        assert_eq!(steal.hp_deltas[Side::Opponent], 20);
        assert_eq!(steal.hp_deltas[Side::Player], -20);
    }

    #[test]
    fn test_claim_requires_hp() {
        let (tuning, bank, board, state) = setup();
        let resolver = EffectResolver::new(&tuning, &bank);
        let tile = board.tile_at(27).unwrap();

        let ok = resolver.claim(Side::Player, tile, &state).unwrap();
        assert_eq!(ok.hp_deltas[Side::Player], -170);

        let poor = state.clone().with_hp(Side::Player, 100, 500);
        assert_eq!(
            resolver.claim(Side::Player, tile, &poor),
            Err(EngineError::InsufficientResource {
                needed: 170,
                available: 100
            })
        );

        assert!(matches!(
            resolver.claim(Side::Player, board.tile_at(4).unwrap(), &state),
            Err(EngineError::Board(BoardError::NotClaimable { index: 4, .. }))
        ));
    }

    #[test]
    fn test_lap_bonus() {
        let (tuning, bank, _, _) = setup();
        let resolver = EffectResolver::new(&tuning, &bank);
        assert_eq!(resolver.lap_bonus(Side::Opponent).hp_deltas[Side::Opponent], 100);
    }
}
