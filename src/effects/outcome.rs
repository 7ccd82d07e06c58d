//! Effect outcomes.
//!
//! An `EffectOutcome` is the complete set of state deltas produced by one
//! resolution. It is computed against a read-only state and applied in a
//! single step, so a failed application leaves nothing half-done.

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::core::{EngineResult, MatchState, Side, SideMap};

/// Ownership change carried by an outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    /// Tile being claimed.
    pub tile: usize,
    /// New owner.
    pub owner: Side,
}

/// State deltas for one resolved effect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectOutcome {
    /// The agent whose move produced this outcome.
    pub mover: Side,
    /// Requested HP change per agent (clamped on application).
    pub hp_deltas: SideMap<i32>,
    /// Optional ownership change.
    pub claim: Option<Claim>,
    /// Turns the mover must rest.
    pub rest_turns: u32,
    /// Human-readable description for logs and commentary.
    pub description: String,
}

impl EffectOutcome {
    /// An outcome with no deltas.
    pub fn none(mover: Side, description: impl Into<String>) -> Self {
        Self {
            mover,
            hp_deltas: SideMap::with_value(0),
            claim: None,
            rest_turns: 0,
            description: description.into(),
        }
    }

    /// Add an HP delta for `side`.
    #[must_use]
    pub fn with_hp(mut self, side: Side, delta: i32) -> Self {
        self.hp_deltas[side] += delta;
        self
    }

    /// Set an ownership change.
    #[must_use]
    pub fn with_claim(mut self, tile: usize, owner: Side) -> Self {
        self.claim = Some(Claim { tile, owner });
        self
    }

    /// Grant rest turns to the mover.
    #[must_use]
    pub fn with_rest(mut self, turns: u32) -> Self {
        self.rest_turns += turns;
        self
    }

    /// Whether applying this outcome changes nothing.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.hp_deltas.iter().all(|(_, d)| *d == 0) && self.claim.is_none() && self.rest_turns == 0
    }

    /// Apply to state and board. Returns the HP change actually applied
    /// per agent after clamping.
    ///
    /// The ownership change is performed first; if it fails nothing else
    /// is touched.
    pub fn apply(
        &self,
        state: &mut MatchState,
        board: &mut Board,
        max_hp: i32,
    ) -> EngineResult<SideMap<i32>> {
        if let Some(claim) = self.claim {
            board.set_owner(claim.tile, Some(claim.owner))?;
        }

        let mut applied = SideMap::with_value(0);
        for (side, delta) in self.hp_deltas.iter() {
            applied[side] = state.agents[side].adjust_hp(*delta, max_hp);
        }
        state.agents[self.mover].skip_turns += self.rest_turns;
        Ok(applied)
    }
}

/// Amount actually moved when `amount` HP is taken from an agent holding
/// `payer_hp`: never more than the payer has.
#[must_use]
pub fn transfer_amount(payer_hp: i32, amount: i32) -> i32 {
    amount.clamp(0, payer_hp.max(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BoardError;
    use crate::core::EngineError;

    #[test]
    fn test_builder() {
        let outcome = EffectOutcome::none(Side::Player, "rest")
            .with_hp(Side::Player, 50)
            .with_rest(1);

        assert_eq!(outcome.hp_deltas[Side::Player], 50);
        assert_eq!(outcome.hp_deltas[Side::Opponent], 0);
        assert_eq!(outcome.rest_turns, 1);
        assert!(!outcome.is_noop());
        assert!(EffectOutcome::none(Side::Opponent, "start").is_noop());
    }

    #[test]
    fn test_apply_clamps_each_side() {
        let mut state = MatchState::new(500, 300)
            .with_hp(Side::Player, 10, 500)
            .with_hp(Side::Opponent, 480, 500);
        let mut board = Board::standard();

        let outcome = EffectOutcome::none(Side::Player, "toll")
            .with_hp(Side::Player, -40)
            .with_hp(Side::Opponent, 40);
        let applied = outcome.apply(&mut state, &mut board, 500).unwrap();

        assert_eq!(applied[Side::Player], -10);
        assert_eq!(applied[Side::Opponent], 20);
        assert_eq!(state.hp(Side::Player), 0);
        assert_eq!(state.hp(Side::Opponent), 500);
    }

    #[test]
    fn test_failed_claim_changes_nothing() {
        let mut state = MatchState::new(500, 300);
        let mut board = Board::standard();
        let before = state.clone();

        let outcome = EffectOutcome::none(Side::Player, "bad claim")
            .with_hp(Side::Player, -40)
            .with_claim(2, Side::Player);
        let err = outcome.apply(&mut state, &mut board, 500).unwrap_err();

        assert!(matches!(
            err,
            EngineError::Board(BoardError::NotClaimable { index: 2, .. })
        ));
        assert_eq!(state, before);
    }

    #[test]
    fn test_transfer_amount() {
        assert_eq!(transfer_amount(10, 40), 10);
        assert_eq!(transfer_amount(100, 40), 40);
        assert_eq!(transfer_amount(0, 40), 0);
        assert_eq!(transfer_amount(100, -5), 0);
    }
}
