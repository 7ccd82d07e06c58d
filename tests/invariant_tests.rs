//! Property tests over whole matches.
//!
//! Random seeds and random player choices drive matches to the end while
//! checking the state invariants after every input:
//! - HP stays within `[0, max_hp]` for both agents
//! - positions stay on the board
//! - a finished match is absorbing and its result matches final HP

use health_board::core::{
    FinishReason, MatchConfig, MatchResult, Pacing, Phase, RandomSource, ScriptedRng, Side,
};
use health_board::scheduler::{MatchBuilder, PendingDecision, TurnScheduler};
use proptest::prelude::*;

const MAX_INPUTS: usize = 2_000;

fn check_invariants(s: &TurnScheduler) -> Result<(), TestCaseError> {
    let max_hp = s.config().max_hp;
    for side in Side::ALL {
        let agent = s.state().agent(side);
        prop_assert!((0..=max_hp).contains(&agent.hp), "{} hp {}", side, agent.hp);
        prop_assert!(agent.position < s.board().len());
    }
    prop_assert_eq!(s.state().finished, s.state().phase == Phase::Finished);
    if s.state().phase == Phase::AwaitingAnswer {
        prop_assert!(s.pending_decision().is_some());
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Test that random matches keep every invariant and always finish.
    #[test]
    fn test_random_matches_hold_invariants(seed in any::<u64>(), choices in any::<u64>()) {
        let config = MatchConfig::new()
            .with_pacing(Pacing::instant())
            .with_match_seconds(120);
        let mut s = MatchBuilder::new().config(config).seed(seed).build().unwrap();
        let mut chooser = ScriptedRng::new(choices);

        for _ in 0..MAX_INPUTS {
            if s.is_finished() {
                break;
            }
            if s.state().is_at(Side::Player, Phase::AwaitingRoll) {
                s.roll_dice().unwrap();
            }
            match s.pending_decision().cloned() {
                Some(PendingDecision::Claim { .. }) => {
                    s.respond_to_claim(chooser.chance(0.5)).unwrap();
                }
                Some(PendingDecision::Quiz(question)) => {
                    s.answer_quiz(chooser.pick(question.option_count())).unwrap();
                }
                None => {}
            }
            check_invariants(&s)?;

            s.settle().unwrap();
            check_invariants(&s)?;

            s.tick_clock();
            check_invariants(&s)?;
        }

        prop_assert!(s.is_finished());
        let state = s.state();
        let reason = state.finish_reason.unwrap();
        prop_assert_ne!(reason, FinishReason::Quit);
        prop_assert_eq!(
            state.result,
            Some(MatchResult::from_hp(state.hp(Side::Player), state.hp(Side::Opponent)))
        );
        prop_assert_eq!(s.armed_timers().count(), 0);

        // Absorbing: nothing moves after the finish.
        let before = state.clone();
        s.tick_clock();
        prop_assert!(s.roll_dice().is_err());
        prop_assert!(s.drain_events().iter().filter(|e| e.is_terminal()).count() <= 1);
        prop_assert_eq!(s.state(), &before);
    }
}
