//! The turn scheduler: the single writer of match state.
//!
//! `TurnScheduler` is a synchronous state machine. Commands from the
//! player and timer callbacks from the driver are its only inputs; events
//! are its only output. It never sleeps and never spawns, so the same
//! machine runs under the tokio driver and under plain unit tests.
//!
//! ## Turn flow
//!
//! ```text
//! AwaitingRoll -> Moving -> ResolvingEffect -> TurnTransition -> AwaitingRoll
//!                                 |                  ^
//!                                 v                  |
//!                           AwaitingAnswer ----------+
//! ```
//!
//! HP changes happen only on landing. A move that is abandoned before it
//! lands (stall recovery, finish) leaves both agents untouched.

use std::time::Duration;

use tracing::{debug, info, trace, warn};

use super::pipeline::{OpponentTurn, PendingDecision, PendingMove, StepAction};
use super::timers::{Timer, TimerSet, TimerSlot};
use crate::board::Board;
use crate::core::{
    Command, EngineError, EngineResult, FinishReason, MatchConfig, MatchResult, MatchState, Phase,
    RandomSource, Rejection, Side, SideMap,
};
use crate::effects::{EffectOutcome, EffectResolver, Question, QuestionBank, Resolution};
use crate::events::{DeclineReason, EventLog, MatchEvent};

/// Upper bound on step timers fired by `settle`.
const SETTLE_LIMIT: usize = 10_000;

/// How a claim offer ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClaimResult {
    /// The habit now belongs to the player.
    Claimed,
    /// No ownership change.
    Declined(DeclineReason),
}

/// Read-only copy of everything a UI needs to draw the match.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MatchSnapshot {
    /// Match state.
    pub state: MatchState,
    /// Board with current ownership.
    pub board: Board,
    /// Log lines, newest first.
    pub log: Vec<String>,
    /// Decision the player owes, if any.
    pub pending: Option<PendingDecision>,
}

/// Summary of a finished match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MatchReport {
    /// Winner or draw.
    pub result: MatchResult,
    /// Why the match ended.
    pub reason: FinishReason,
    /// HP of each agent at the end.
    pub final_hp: SideMap<i32>,
    /// Turn number the match ended on.
    pub turns: u32,
    /// Clock seconds left.
    pub remaining_seconds: u32,
}

/// Drives one match.
pub struct TurnScheduler {
    config: MatchConfig,
    board: Board,
    questions: QuestionBank,
    state: MatchState,
    rng: Box<dyn RandomSource>,
    timers: TimerSet,
    next_step: Option<StepAction>,
    pending_move: Option<PendingMove>,
    pending_decision: Option<PendingDecision>,
    opponent_turn: Option<OpponentTurn>,
    outbox: Vec<MatchEvent>,
    log: EventLog,
}

impl std::fmt::Debug for TurnScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnScheduler")
            .field("state", &self.state)
            .field("next_step", &self.next_step)
            .field("pending_move", &self.pending_move)
            .field("pending_decision", &self.pending_decision)
            .field("opponent_turn", &self.opponent_turn)
            .finish_non_exhaustive()
    }
}

impl TurnScheduler {
    /// Create a scheduler over an existing state.
    ///
    /// The configuration and question bank are validated and every agent
    /// position must lie on the board. If the state hands the turn to the opponent, its
    /// pipeline starts immediately.
    pub fn new(
        config: MatchConfig,
        board: Board,
        questions: QuestionBank,
        state: MatchState,
        rng: Box<dyn RandomSource>,
    ) -> EngineResult<Self> {
        config.validate()?;
        questions.validate()?;
        for (_, agent) in state.agents.iter() {
            board.tile_at(agent.position)?;
        }

        let log = EventLog::new(config.event_log_capacity);
        let mut scheduler = Self {
            config,
            board,
            questions,
            state,
            rng,
            timers: TimerSet::new(),
            next_step: None,
            pending_move: None,
            pending_decision: None,
            opponent_turn: None,
            outbox: Vec::new(),
            log,
        };
        if scheduler.state.is_at(Side::Opponent, Phase::AwaitingRoll) {
            scheduler.start_opponent_turn();
        }
        Ok(scheduler)
    }

    // ---- Queries ----

    /// Current match state.
    #[must_use]
    pub fn state(&self) -> &MatchState {
        &self.state
    }

    /// Board with current ownership.
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Display log.
    #[must_use]
    pub fn log(&self) -> &EventLog {
        &self.log
    }

    /// Decision the player owes, if any.
    #[must_use]
    pub fn pending_decision(&self) -> Option<&PendingDecision> {
        self.pending_decision.as_ref()
    }

    /// Question waiting for an answer, if any.
    #[must_use]
    pub fn pending_question(&self) -> Option<&Question> {
        match &self.pending_decision {
            Some(PendingDecision::Quiz(question)) => Some(question),
            _ => None,
        }
    }

    /// Whether an opponent turn is in flight.
    #[must_use]
    pub fn opponent_turn_in_flight(&self) -> bool {
        self.opponent_turn.is_some()
    }

    /// Whether the match has ended.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state.finished
    }

    /// Timer armed in `slot`, if any.
    #[must_use]
    pub fn timer(&self, slot: TimerSlot) -> Option<Timer> {
        self.timers.get(slot)
    }

    /// All armed timers.
    pub fn armed_timers(&self) -> impl Iterator<Item = Timer> + '_ {
        self.timers.armed()
    }

    /// Take the events produced since the last call.
    pub fn drain_events(&mut self) -> Vec<MatchEvent> {
        std::mem::take(&mut self.outbox)
    }

    /// Copy of the drawable state.
    #[must_use]
    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            state: self.state.clone(),
            board: self.board.clone(),
            log: self.log.lines().map(str::to_owned).collect(),
            pending: self.pending_decision.clone(),
        }
    }

    /// Report for a finished match.
    #[must_use]
    pub fn report(&self) -> Option<MatchReport> {
        Some(MatchReport {
            result: self.state.result?,
            reason: self.state.finish_reason?,
            final_hp: SideMap::new(|side| self.state.hp(side)),
            turns: self.state.turn_number,
            remaining_seconds: self.state.remaining_seconds,
        })
    }

    // ---- Player commands ----

    /// Dispatch a player command.
    pub fn apply(&mut self, command: Command) -> EngineResult<()> {
        match command {
            Command::RollDice => self.roll_dice().map(|_| ()),
            Command::AnswerQuiz(index) => self.answer_quiz(index).map(|_| ()),
            Command::RespondToClaim(accept) => self.respond_to_claim(accept).map(|_| ()),
            Command::Quit => self.quit(),
        }
    }

    /// Roll for the player. Returns the die value.
    pub fn roll_dice(&mut self) -> EngineResult<u8> {
        self.ensure_phase(Phase::AwaitingRoll)?;
        let resting = self.state.agent(Side::Player).skip_turns;
        if resting > 0 {
            return Err(self.reject(Rejection::Resting { turns: resting }));
        }

        let value = self.rng.roll_die();
        self.state.record(Side::Player, Command::RollDice);
        self.begin_move(Side::Player, value);
        Ok(value)
    }

    /// Answer the pending quiz. Returns whether the answer was correct.
    pub fn answer_quiz(&mut self, index: usize) -> EngineResult<bool> {
        self.ensure_phase(Phase::AwaitingAnswer)?;
        let Some(PendingDecision::Quiz(question)) = &self.pending_decision else {
            return Err(self.reject(Rejection::NoPendingQuiz));
        };

        let resolver = EffectResolver::new(&self.config.effects, &self.questions);
        let correct = question.is_correct(index);
        let outcome = match resolver.answer_quiz(question, index) {
            Ok(outcome) => outcome,
            Err(EngineError::InvalidCommand(rejection)) => return Err(self.reject(rejection)),
            Err(err) => return Err(err),
        };

        self.pending_decision = None;
        self.timers.disarm(TimerSlot::Decision);
        self.state.record(Side::Player, Command::AnswerQuiz(index));
        self.apply_outcome(&outcome)?;
        self.after_effect();
        Ok(correct)
    }

    /// Accept or refuse the pending claim offer.
    ///
    /// Accepting without enough HP is not an error: the offer is declined
    /// and the turn proceeds.
    pub fn respond_to_claim(&mut self, accept: bool) -> EngineResult<ClaimResult> {
        self.ensure_phase(Phase::AwaitingAnswer)?;
        let Some(PendingDecision::Claim { tile, .. }) = self.pending_decision else {
            return Err(self.reject(Rejection::NoPendingClaim));
        };

        let claim = if accept {
            let resolver = EffectResolver::new(&self.config.effects, &self.questions);
            match resolver.claim(Side::Player, self.board.tile_at(tile)?, &self.state) {
                Ok(outcome) => Ok(outcome),
                Err(EngineError::InsufficientResource { needed, available }) => {
                    Err(DeclineReason::InsufficientHp { needed, available })
                }
                Err(err) => return Err(err),
            }
        } else {
            Err(DeclineReason::Refused)
        };

        // The offer stays pending until the outcome has been applied.
        let result = match claim {
            Ok(outcome) => {
                self.apply_outcome(&outcome)?;
                ClaimResult::Claimed
            }
            Err(reason) => {
                if let DeclineReason::InsufficientHp { needed, available } = reason {
                    debug!(tile, needed, available, "claim declined for lack of HP");
                }
                self.decline_claim(tile, reason)
            }
        };

        self.pending_decision = None;
        self.timers.disarm(TimerSlot::Decision);
        self.state
            .record(Side::Player, Command::RespondToClaim(accept));
        self.after_effect();
        Ok(result)
    }

    /// Abandon the match. The opponent wins.
    pub fn quit(&mut self) -> EngineResult<()> {
        if self.state.finished {
            return Err(self.reject(Rejection::MatchFinished));
        }
        self.state.record(Side::Player, Command::Quit);
        self.finish(FinishReason::Quit);
        Ok(())
    }

    // ---- Clock ----

    /// Advance the match clock by one second.
    pub fn tick_clock(&mut self) {
        if self.state.finished {
            return;
        }
        self.state.remaining_seconds = self.state.remaining_seconds.saturating_sub(1);
        self.emit(MatchEvent::ClockTick {
            remaining_seconds: self.state.remaining_seconds,
        });
        self.check_termination();
    }

    // ---- Opponent pipeline ----

    /// Start the opponent's turn.
    ///
    /// Returns `false` without touching anything when a pipeline is
    /// already in flight or it is not the opponent's turn to roll.
    pub fn start_opponent_turn(&mut self) -> bool {
        if let Some(current) = self.opponent_turn {
            debug!(turn = current.turn, "opponent turn already in flight");
            return false;
        }
        if !self.state.is_at(Side::Opponent, Phase::AwaitingRoll) {
            trace!(phase = ?self.state.phase, active = %self.state.active, "no opponent turn to start");
            return false;
        }

        let turn = self.state.turn_number;
        let safety_ticket = self
            .timers
            .arm(TimerSlot::Safety, self.config.pacing.safety_timeout());
        self.opponent_turn = Some(OpponentTurn {
            turn,
            safety_ticket,
        });
        self.arm_step(StepAction::OpponentThink, self.config.pacing.opponent_think());
        debug!(turn, "opponent turn started");
        self.emit(MatchEvent::OpponentThinking { turn });
        true
    }

    // ---- Timers ----

    /// Timer callback. Stale tickets are ignored and return `Ok(false)`.
    pub fn on_timer(&mut self, slot: TimerSlot, ticket: u64) -> EngineResult<bool> {
        if !self.timers.is_current(slot, ticket) {
            trace!(?slot, ticket, "ignoring stale timer");
            return Ok(false);
        }
        self.timers.disarm(slot);
        match slot {
            TimerSlot::Step => self.run_step()?,
            TimerSlot::Safety => self.recover_stall(),
            TimerSlot::Decision => self.expire_decision(),
        }
        Ok(true)
    }

    /// Fire whatever is armed in `slot` now, ignoring its delay.
    pub fn fire(&mut self, slot: TimerSlot) -> EngineResult<bool> {
        match self.timers.get(slot) {
            Some(timer) => self.on_timer(slot, timer.ticket),
            None => Ok(false),
        }
    }

    /// Fire step timers until none is armed. Returns how many fired.
    ///
    /// Stops at the player's roll, a pending decision or the finish.
    pub fn settle(&mut self) -> EngineResult<usize> {
        let mut fired = 0;
        while fired < SETTLE_LIMIT && self.fire(TimerSlot::Step)? {
            fired += 1;
        }
        Ok(fired)
    }

    // ---- Internals ----

    fn emit(&mut self, event: MatchEvent) {
        self.log.record(&event);
        self.outbox.push(event);
    }

    fn reject(&self, rejection: Rejection) -> EngineError {
        debug!(%rejection, "command rejected");
        rejection.into()
    }

    /// Validate a player command against the finished flag, the active
    /// side and the expected phase.
    fn ensure_phase(&self, expected: Phase) -> EngineResult<()> {
        if self.state.finished {
            return Err(self.reject(Rejection::MatchFinished));
        }
        if self.state.active != Side::Player {
            return Err(self.reject(Rejection::NotYourTurn {
                active: self.state.active,
            }));
        }
        if self.state.phase != expected {
            return Err(self.reject(Rejection::WrongPhase {
                expected,
                actual: self.state.phase,
            }));
        }
        Ok(())
    }

    fn arm_step(&mut self, action: StepAction, after: Duration) {
        self.next_step = Some(action);
        self.timers.arm(TimerSlot::Step, after);
    }

    fn run_step(&mut self) -> EngineResult<()> {
        let Some(action) = self.next_step.take() else {
            return Ok(());
        };
        trace!(?action, "step");
        match action {
            StepAction::OpponentThink => {
                self.arm_step(StepAction::RollTick { tick: 1 }, self.config.pacing.roll_tick());
                Ok(())
            }
            StepAction::RollTick { tick } => {
                let of = self.config.pacing.roll_ticks;
                if tick <= of {
                    self.emit(MatchEvent::DiceTumble {
                        side: Side::Opponent,
                        tick,
                        of,
                    });
                }
                if tick < of {
                    self.arm_step(
                        StepAction::RollTick { tick: tick + 1 },
                        self.config.pacing.roll_tick(),
                    );
                } else {
                    let value = self.rng.roll_die();
                    self.state.record(Side::Opponent, Command::RollDice);
                    self.begin_move(Side::Opponent, value);
                }
                Ok(())
            }
            StepAction::Land => self.land(),
            StepAction::EndTurn => {
                self.end_turn();
                Ok(())
            }
        }
    }

    fn begin_move(&mut self, side: Side, roll: u8) {
        let from = self.state.agent(side).position;
        let step = self.board.advance(from, usize::from(roll));
        self.state.phase = Phase::Moving;
        self.state.last_roll = Some(roll);
        self.pending_move = Some(PendingMove { side, roll, step });
        debug!(%side, roll, from, to = step.to, "dice rolled");
        self.emit(MatchEvent::DiceRolled {
            side,
            value: roll,
            from,
            to: step.to,
        });
        self.arm_step(StepAction::Land, self.config.pacing.move_delay());
    }

    fn land(&mut self) -> EngineResult<()> {
        let Some(PendingMove { side, step, .. }) = self.pending_move.take() else {
            return Ok(());
        };
        let tile = self.board.tile_at(step.to)?.clone();

        self.state.agents[side].position = step.to;
        self.emit(MatchEvent::TileLanded {
            side,
            tile: tile.index,
            kind: tile.kind,
            label: tile.label.clone(),
        });

        if step.wrapped {
            let bonus = EffectResolver::new(&self.config.effects, &self.questions).lap_bonus(side);
            let applied = bonus.apply(&mut self.state, &mut self.board, self.config.max_hp)?;
            self.emit(MatchEvent::FullLapBonus {
                side,
                applied: applied[side],
            });
        }

        self.state.phase = Phase::ResolvingEffect;
        let resolver = EffectResolver::new(&self.config.effects, &self.questions);
        match resolver.resolve(side, &tile, &self.state, self.rng.as_mut()) {
            Resolution::Applied(outcome) => {
                self.apply_outcome(&outcome)?;
                self.after_effect();
            }
            Resolution::OfferClaim { tile, cost } => {
                self.emit(MatchEvent::ClaimOffered { tile, cost });
                self.await_decision(PendingDecision::Claim { tile, cost });
            }
            Resolution::AskQuiz(question) => {
                self.emit(MatchEvent::QuizAsked {
                    question: question.clone(),
                });
                self.await_decision(PendingDecision::Quiz(question));
            }
        }
        Ok(())
    }

    fn await_decision(&mut self, decision: PendingDecision) {
        self.state.phase = Phase::AwaitingAnswer;
        self.pending_decision = Some(decision);
        if let Some(after) = self.config.pacing.decision_timeout() {
            self.timers.arm(TimerSlot::Decision, after);
        }
    }

    fn apply_outcome(&mut self, outcome: &EffectOutcome) -> EngineResult<()> {
        let applied = outcome.apply(&mut self.state, &mut self.board, self.config.max_hp)?;
        debug!(
            mover = %outcome.mover,
            player = applied[Side::Player],
            opponent = applied[Side::Opponent],
            "effect applied"
        );
        self.emit(MatchEvent::EffectApplied {
            side: outcome.mover,
            applied,
            claim: outcome.claim,
            rest_turns: outcome.rest_turns,
            description: outcome.description.clone(),
        });
        Ok(())
    }

    fn decline_claim(&mut self, tile: usize, reason: DeclineReason) -> ClaimResult {
        self.emit(MatchEvent::ClaimDeclined { tile, reason });
        ClaimResult::Declined(reason)
    }

    /// Check for a finish, otherwise schedule the hand-over.
    fn after_effect(&mut self) {
        if self.check_termination() {
            return;
        }
        self.state.phase = Phase::TurnTransition;
        self.arm_step(StepAction::EndTurn, self.config.pacing.end_turn());
    }

    fn expire_decision(&mut self) {
        let Some(decision) = self.pending_decision.take() else {
            return;
        };
        info!("player decision expired");
        match decision {
            PendingDecision::Claim { tile, .. } => {
                self.decline_claim(tile, DeclineReason::Expired);
            }
            PendingDecision::Quiz(_) => self.emit(MatchEvent::QuizExpired),
        }
        self.after_effect();
    }

    fn end_turn(&mut self) {
        if self.state.active == Side::Opponent {
            if let Some(turn) = self.opponent_turn.take() {
                self.timers.disarm(TimerSlot::Safety);
                trace!(turn = turn.turn, "opponent turn complete");
            }
        }
        self.pass_turn();
    }

    /// Abandon a stalled opponent turn and hand over exactly once.
    fn recover_stall(&mut self) {
        let Some(turn) = self.opponent_turn.take() else {
            return;
        };
        let err = EngineError::StallTimeout {
            turn: turn.turn,
            after: self.config.pacing.safety_timeout(),
        };
        warn!(error = %err, "forcing turn hand-over");

        self.timers.disarm(TimerSlot::Step);
        self.next_step = None;
        self.pending_move = None;
        self.emit(MatchEvent::StallRecovered { turn: turn.turn });
        self.pass_turn();
    }

    /// Hand the turn to the next agent, consuming rest turns on the way.
    fn pass_turn(&mut self) {
        let mut next = self.state.active.other();
        while self.state.agents[next].skip_turns > 0 {
            self.state.agents[next].skip_turns -= 1;
            let remaining = self.state.agents[next].skip_turns;
            info!(side = %next, remaining, "resting, turn skipped");
            self.emit(MatchEvent::Resting {
                side: next,
                remaining,
            });
            next = next.other();
        }

        self.state.begin_turn(next);
        info!(active = %next, turn = self.state.turn_number, "turn changed");
        self.emit(MatchEvent::TurnChanged {
            active: next,
            turn: self.state.turn_number,
        });
        if next == Side::Opponent {
            self.start_opponent_turn();
        }
    }

    /// Finish the match if an agent is out of HP or the clock ran out.
    fn check_termination(&mut self) -> bool {
        if self.state.finished {
            return true;
        }
        if let Some(side) = self.state.depleted_side() {
            self.finish(FinishReason::HpDepleted(side));
            return true;
        }
        if self.state.remaining_seconds == 0 {
            self.finish(FinishReason::TimeUp);
            return true;
        }
        false
    }

    fn finish(&mut self, reason: FinishReason) {
        let result = match reason {
            FinishReason::Quit => MatchResult::Winner(Side::Opponent),
            FinishReason::HpDepleted(_) | FinishReason::TimeUp => MatchResult::from_hp(
                self.state.hp(Side::Player),
                self.state.hp(Side::Opponent),
            ),
        };

        self.state.finish(reason, result);
        self.timers.clear();
        self.next_step = None;
        self.pending_move = None;
        self.pending_decision = None;
        self.opponent_turn = None;

        info!(?result, %reason, "match finished");
        self.emit(MatchEvent::MatchFinished { result, reason });

        let experience = self.config.effects.winner_experience;
        if reason != FinishReason::Quit && result.is_winner(Side::Player) && experience > 0 {
            self.emit(MatchEvent::ExperienceAward { amount: experience });
        }
    }
}
