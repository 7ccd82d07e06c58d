//! Match configuration.
//!
//! A match is configured at startup by providing:
//! - `EffectTuning`: HP amounts and probabilities used by tile effects
//! - `Pacing`: delays of the timer-driven steps (opponent thinking, dice
//!   animation, landing, turn hand-over) and the safety bounds
//! - `MatchConfig`: combines both with HP limits and the match clock
//!
//! Every field has a default matching the standard game, so a config file
//! only needs to name what it changes.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A probability was outside `[0, 1]`.
    #[error("{field} must be within [0, 1], got {value}")]
    Probability { field: &'static str, value: f64 },

    /// Maximum HP must be positive.
    #[error("max_hp must be positive")]
    ZeroMaxHp,

    /// Starting HP exceeds the maximum.
    #[error("starting_hp {starting} exceeds max_hp {max}")]
    StartingAboveMax { starting: i32, max: i32 },

    /// The stall-safety timeout must be non-zero.
    #[error("safety_timeout_ms must be non-zero")]
    ZeroSafetyTimeout,

    /// Chance tiles need at least one outcome.
    #[error("chance table is empty")]
    EmptyChanceTable,

    /// A negative HP amount where only magnitudes make sense.
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: i32 },

    /// The config document could not be parsed.
    #[error("config parse error: {0}")]
    Parse(String),
}

/// One entry of the Chance tile outcome table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChanceCard {
    /// Add `delta` HP to the mover (may be negative).
    Hp { label: String, delta: i32 },
    /// Move `amount` HP from the other agent to the mover.
    Steal { label: String, amount: i32 },
}

impl ChanceCard {
    /// Create an HP change card.
    pub fn hp(label: impl Into<String>, delta: i32) -> Self {
        Self::Hp {
            label: label.into(),
            delta,
        }
    }

    /// Create a steal card.
    pub fn steal(label: impl Into<String>, amount: i32) -> Self {
        Self::Steal {
            label: label.into(),
            amount,
        }
    }

    /// Human-readable label.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Hp { label, .. } | Self::Steal { label, .. } => label,
        }
    }
}

/// HP amounts and probabilities used by the effect resolver.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectTuning {
    /// HP awarded for passing the start tile.
    pub lap_bonus: i32,
    /// Fraction of a tile's cost healed when landing on your own habit.
    pub own_habit_heal_ratio: f64,
    /// Fraction of a tile's cost paid to the owner of someone else's habit.
    pub toll_ratio: f64,
    /// HP lost on a Danger tile.
    pub danger_penalty: i32,
    /// HP healed on a Hospital tile.
    pub hospital_heal: i32,
    /// Turns skipped after a Hospital visit.
    pub hospital_rest_turns: u32,
    /// HP gained by the player for a correct quiz answer.
    pub player_quiz_reward: i32,
    /// HP lost by the player for a wrong quiz answer.
    pub player_quiz_penalty: i32,
    /// HP gained by the opponent for a correct quiz answer.
    pub opponent_quiz_reward: i32,
    /// HP lost by the opponent for a wrong quiz answer.
    pub opponent_quiz_penalty: i32,
    /// Probability the opponent answers a quiz correctly.
    pub opponent_quiz_accuracy: f64,
    /// The opponent claims a habit only when `hp > cost + margin`.
    pub opponent_claim_margin: i32,
    /// Outcomes drawn uniformly on a Chance tile.
    pub chance_table: Vec<ChanceCard>,
    /// Experience requested from the avatar ledger when the player wins.
    pub winner_experience: u32,
}

impl Default for EffectTuning {
    fn default() -> Self {
        Self {
            lap_bonus: 100,
            own_habit_heal_ratio: 0.5,
            toll_ratio: 0.4,
            danger_penalty: 80,
            hospital_heal: 50,
            hospital_rest_turns: 1,
            player_quiz_reward: 60,
            player_quiz_penalty: 40,
            opponent_quiz_reward: 50,
            opponent_quiz_penalty: 30,
            opponent_quiz_accuracy: 0.7,
            opponent_claim_margin: 100,
            chance_table: vec![
                ChanceCard::hp("Lucky! Found a vitamin boost", 100),
                ChanceCard::hp("Unlucky! Forgot to wash hands", -60),
                ChanceCard::hp("Lucky! Discovered a smoothie recipe", 120),
                ChanceCard::steal("Stole some HP!", 50),
            ],
            winner_experience: 100,
        }
    }
}

/// Delays of the timer-driven steps, in milliseconds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pacing {
    /// Opponent "thinking" pause before it rolls.
    pub opponent_think_ms: u64,
    /// Interval between dice animation ticks.
    pub roll_tick_ms: u64,
    /// Number of animation ticks before the final opponent roll.
    pub roll_ticks: u32,
    /// Pause between a roll and landing on the destination tile.
    pub move_ms: u64,
    /// Pause between an effect and handing the turn over.
    pub end_turn_ms: u64,
    /// Bound on a whole opponent turn before it is forcibly passed.
    pub safety_timeout_ms: u64,
    /// Bound on a pending player decision. `None` waits forever.
    pub decision_timeout_ms: Option<u64>,
    /// Bound on a single commentary request.
    pub commentary_timeout_ms: u64,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            opponent_think_ms: 1500,
            roll_tick_ms: 60,
            roll_ticks: 12,
            move_ms: 600,
            end_turn_ms: 1000,
            safety_timeout_ms: 10_000,
            decision_timeout_ms: Some(60_000),
            commentary_timeout_ms: 5_000,
        }
    }
}

impl Pacing {
    /// Pacing with every animation delay set to zero.
    ///
    /// Safety and decision bounds keep their defaults.
    #[must_use]
    pub fn instant() -> Self {
        Self {
            opponent_think_ms: 0,
            roll_tick_ms: 0,
            roll_ticks: 0,
            move_ms: 0,
            end_turn_ms: 0,
            ..Self::default()
        }
    }

    /// Opponent think delay.
    #[must_use]
    pub fn opponent_think(&self) -> Duration {
        Duration::from_millis(self.opponent_think_ms)
    }

    /// Dice animation tick interval.
    #[must_use]
    pub fn roll_tick(&self) -> Duration {
        Duration::from_millis(self.roll_tick_ms)
    }

    /// Move-to-land delay.
    #[must_use]
    pub fn move_delay(&self) -> Duration {
        Duration::from_millis(self.move_ms)
    }

    /// End-of-turn delay.
    #[must_use]
    pub fn end_turn(&self) -> Duration {
        Duration::from_millis(self.end_turn_ms)
    }

    /// Opponent turn safety bound.
    #[must_use]
    pub fn safety_timeout(&self) -> Duration {
        Duration::from_millis(self.safety_timeout_ms)
    }

    /// Pending decision bound, if any.
    #[must_use]
    pub fn decision_timeout(&self) -> Option<Duration> {
        self.decision_timeout_ms.map(Duration::from_millis)
    }

    /// Commentary request bound.
    #[must_use]
    pub fn commentary_timeout(&self) -> Duration {
        Duration::from_millis(self.commentary_timeout_ms)
    }
}

/// Complete match configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// HP both agents start with.
    pub starting_hp: i32,
    /// Upper HP clamp.
    pub max_hp: i32,
    /// Length of the match clock.
    pub match_seconds: u32,
    /// Number of log lines kept for display.
    pub event_log_capacity: usize,
    /// Effect amounts.
    pub effects: EffectTuning,
    /// Step delays and safety bounds.
    pub pacing: Pacing,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            starting_hp: 500,
            max_hp: 500,
            match_seconds: 300,
            event_log_capacity: 10,
            effects: EffectTuning::default(),
            pacing: Pacing::default(),
        }
    }
}

impl MatchConfig {
    /// Create the standard configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Set the starting HP.
    #[must_use]
    pub fn with_starting_hp(mut self, hp: i32) -> Self {
        self.starting_hp = hp;
        self
    }

    /// Set the match clock length.
    #[must_use]
    pub fn with_match_seconds(mut self, seconds: u32) -> Self {
        self.match_seconds = seconds;
        self
    }

    /// Replace the effect tuning.
    #[must_use]
    pub fn with_effects(mut self, effects: EffectTuning) -> Self {
        self.effects = effects;
        self
    }

    /// Replace the pacing.
    #[must_use]
    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Check every value is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_hp <= 0 {
            return Err(ConfigError::ZeroMaxHp);
        }
        if self.starting_hp > self.max_hp {
            return Err(ConfigError::StartingAboveMax {
                starting: self.starting_hp,
                max: self.max_hp,
            });
        }
        if self.pacing.safety_timeout_ms == 0 {
            return Err(ConfigError::ZeroSafetyTimeout);
        }

        let e = &self.effects;
        for (field, value) in [
            ("opponent_quiz_accuracy", e.opponent_quiz_accuracy),
            ("own_habit_heal_ratio", e.own_habit_heal_ratio),
            ("toll_ratio", e.toll_ratio),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Probability { field, value });
            }
        }
        for (field, value) in [
            ("starting_hp", self.starting_hp),
            ("lap_bonus", e.lap_bonus),
            ("danger_penalty", e.danger_penalty),
            ("hospital_heal", e.hospital_heal),
            ("player_quiz_reward", e.player_quiz_reward),
            ("player_quiz_penalty", e.player_quiz_penalty),
            ("opponent_quiz_reward", e.opponent_quiz_reward),
            ("opponent_quiz_penalty", e.opponent_quiz_penalty),
        ] {
            if value < 0 {
                return Err(ConfigError::Negative { field, value });
            }
        }
        if e.chance_table.is_empty() {
            return Err(ConfigError::EmptyChanceTable);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_standard_game() {
        let config = MatchConfig::default();
        assert_eq!(config.starting_hp, 500);
        assert_eq!(config.max_hp, 500);
        assert_eq!(config.match_seconds, 300);
        assert_eq!(config.effects.opponent_claim_margin, 100);
        assert_eq!(config.effects.chance_table.len(), 4);
        assert_eq!(config.pacing.safety_timeout(), Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = MatchConfig::new()
            .with_starting_hp(300)
            .with_match_seconds(60)
            .with_pacing(Pacing::instant());

        assert_eq!(config.starting_hp, 300);
        assert_eq!(config.match_seconds, 60);
        assert_eq!(config.pacing.opponent_think(), Duration::ZERO);
        assert_eq!(config.pacing.safety_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_from_json_partial() {
        let json = r#"{
            "match_seconds": 120,
            "effects": { "opponent_quiz_accuracy": 0.9 },
            "pacing": { "decision_timeout_ms": null }
        }"#;
        let config = MatchConfig::from_json(json).unwrap();

        assert_eq!(config.match_seconds, 120);
        assert_eq!(config.starting_hp, 500);
        assert!((config.effects.opponent_quiz_accuracy - 0.9).abs() < f64::EPSILON);
        assert_eq!(config.effects.danger_penalty, 80);
        assert_eq!(config.pacing.decision_timeout(), None);
    }

    #[test]
    fn test_from_json_chance_table() {
        let json = r#"{ "effects": { "chance_table": [
            { "kind": "hp", "label": "Bonus", "delta": 10 },
            { "kind": "steal", "label": "Grab", "amount": 5 }
        ] } }"#;
        let config = MatchConfig::from_json(json).unwrap();
        assert_eq!(
            config.effects.chance_table,
            vec![ChanceCard::hp("Bonus", 10), ChanceCard::steal("Grab", 5)]
        );
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            MatchConfig::from_json("not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = MatchConfig::default();
        config.effects.opponent_quiz_accuracy = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Probability { field: "opponent_quiz_accuracy", .. })
        ));

        let config = MatchConfig::default().with_starting_hp(600);
        assert_eq!(
            config.validate(),
            Err(ConfigError::StartingAboveMax { starting: 600, max: 500 })
        );

        let mut config = MatchConfig::default();
        config.pacing.safety_timeout_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroSafetyTimeout));

        let mut config = MatchConfig::default();
        config.effects.chance_table.clear();
        assert_eq!(config.validate(), Err(ConfigError::EmptyChanceTable));

        let mut config = MatchConfig::default();
        config.effects.danger_penalty = -1;
        assert!(matches!(config.validate(), Err(ConfigError::Negative { .. })));
    }

    #[test]
    fn test_chance_card_label() {
        assert_eq!(ChanceCard::steal("Grab", 5).label(), "Grab");
    }
}
