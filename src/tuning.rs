//! Data-driven game balance
//!
//! Defaults reproduce the shipped game. A `Tuning` is validated once, when a
//! session is created; it never changes mid-game.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::TuningError;
use crate::sim::state::HeartKind;

/// What breaks a running combo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ComboReset {
    /// Only a restart clears the combo
    #[default]
    Never,
    /// A heart falling past the bottom edge clears the combo
    OnMiss,
}

/// Inclusive-exclusive range used for randomized spawn values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f32,
    pub max: f32,
}

impl Range {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }
}

/// Probability of each special heart. Whatever is left over is a normal heart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeartOdds {
    pub diamond: f32,
    pub rainbow: f32,
    pub golden: f32,
}

impl Default for HeartOdds {
    fn default() -> Self {
        Self {
            diamond: 0.05,
            rainbow: 0.10,
            golden: 0.15,
        }
    }
}

/// Points awarded per heart kind, before multipliers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartPoints {
    pub normal: u32,
    pub golden: u32,
    pub rainbow: u32,
    pub diamond: u32,
}

impl Default for HeartPoints {
    fn default() -> Self {
        Self {
            normal: 10,
            golden: 50,
            rainbow: 100,
            diamond: 200,
        }
    }
}

impl HeartPoints {
    pub fn for_kind(&self, kind: HeartKind) -> u32 {
        match kind {
            HeartKind::Normal => self.normal,
            HeartKind::Golden => self.golden,
            HeartKind::Rainbow => self.rainbow,
            HeartKind::Diamond => self.diamond,
        }
    }
}

/// Complete game balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Field ===
    pub field_width: f32,
    pub field_height: f32,

    // === Player ===
    /// Downward acceleration per reference frame
    pub gravity: f32,
    /// Top horizontal speed used by the autopilot
    pub player_speed: f32,
    /// Pointer-follow gain: vx = distance to pointer * gain
    pub follow_gain: f32,
    pub starting_lives: u8,

    // === Spawning (ms of scaled game time) ===
    pub heart_spawn_ms: f32,
    pub obstacle_spawn_ms: f32,
    pub power_up_spawn_ms: f32,
    pub heart_speed: Range,
    pub obstacle_speed: Range,
    pub power_up_speed: Range,
    /// Hearts spin at up to half this many radians per frame, either way
    pub heart_spin: f32,
    pub heart_odds: HeartOdds,
    pub heart_points: HeartPoints,

    // === Power-ups ===
    pub power_up_duration_ms: f32,
    pub slow_time_factor: f32,
    pub magnet_range: f32,
    pub magnet_force: f32,
    pub double_points_multiplier: f32,

    // === Combo ===
    pub combo_threshold: u32,
    pub combo_multiplier: f32,
    pub combo_reset: ComboReset,

    // === Cosmetics ===
    pub max_particles: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            field_width: FIELD_WIDTH,
            field_height: FIELD_HEIGHT,

            gravity: 0.5,
            player_speed: 5.0,
            follow_gain: 0.1,
            starting_lives: 3,

            heart_spawn_ms: 1000.0,
            obstacle_spawn_ms: 2000.0,
            power_up_spawn_ms: 5000.0,
            heart_speed: Range::new(2.0, 4.0),
            obstacle_speed: Range::new(3.0, 5.0),
            power_up_speed: Range::new(2.0, 3.0),
            heart_spin: 0.1,
            heart_odds: HeartOdds::default(),
            heart_points: HeartPoints::default(),

            power_up_duration_ms: 5000.0,
            slow_time_factor: 0.5,
            magnet_range: 100.0,
            magnet_force: 0.5,
            double_points_multiplier: 2.0,

            combo_threshold: 5,
            combo_multiplier: 1.5,
            combo_reset: ComboReset::Never,

            max_particles: 400,
        }
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), TuningError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(TuningError::NotPositive { name, value })
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<(), TuningError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(TuningError::Negative { name, value })
    }
}

fn multiplier(name: &'static str, value: f32) -> Result<(), TuningError> {
    if value.is_finite() && value >= 1.0 {
        Ok(())
    } else {
        Err(TuningError::Multiplier { name, value })
    }
}

fn range(name: &'static str, r: Range) -> Result<(), TuningError> {
    non_negative(name, r.min)?;
    non_negative(name, r.max)?;
    if r.min > r.max {
        return Err(TuningError::InvertedRange {
            name,
            min: r.min,
            max: r.max,
        });
    }
    Ok(())
}

impl Tuning {
    /// Parse a tuning override. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning =
            serde_json::from_str(json).map_err(|e| TuningError::Json(e.to_string()))?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject balance values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        positive("field width", self.field_width)?;
        positive("field height", self.field_height)?;
        // The player is the largest entity; everything else fits if it does
        positive("field width minus player size", self.field_width - PLAYER_SIZE)?;
        positive("field height minus player size", self.field_height - PLAYER_SIZE)?;

        non_negative("gravity", self.gravity)?;
        non_negative("player speed", self.player_speed)?;
        non_negative("follow gain", self.follow_gain)?;
        if self.starting_lives == 0 {
            return Err(TuningError::StartingLives);
        }

        positive("heart spawn rate", self.heart_spawn_ms)?;
        positive("obstacle spawn rate", self.obstacle_spawn_ms)?;
        positive("power-up spawn rate", self.power_up_spawn_ms)?;
        range("heart speed", self.heart_speed)?;
        range("obstacle speed", self.obstacle_speed)?;
        range("power-up speed", self.power_up_speed)?;
        non_negative("heart spin", self.heart_spin)?;

        let odds = self.heart_odds;
        non_negative("diamond odds", odds.diamond)?;
        non_negative("rainbow odds", odds.rainbow)?;
        non_negative("golden odds", odds.golden)?;
        let total = odds.diamond + odds.rainbow + odds.golden;
        if total > 1.0 {
            return Err(TuningError::Odds(total));
        }

        positive("power-up duration", self.power_up_duration_ms)?;
        if !(self.slow_time_factor > 0.0 && self.slow_time_factor <= 1.0) {
            return Err(TuningError::SlowFactor(self.slow_time_factor));
        }
        non_negative("magnet range", self.magnet_range)?;
        non_negative("magnet force", self.magnet_force)?;
        multiplier("double points", self.double_points_multiplier)?;

        if self.combo_threshold == 0 {
            return Err(TuningError::ComboThreshold);
        }
        multiplier("combo", self.combo_multiplier)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(Tuning::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_negative_spawn_rate() {
        let tuning = Tuning {
            heart_spawn_ms: -1000.0,
            ..Default::default()
        };
        assert!(matches!(
            tuning.validate(),
            Err(TuningError::NotPositive { name: "heart spawn rate", .. })
        ));
    }

    #[test]
    fn test_rejects_nan_and_zero() {
        let tuning = Tuning {
            power_up_spawn_ms: f32::NAN,
            ..Default::default()
        };
        assert!(tuning.validate().is_err());

        let tuning = Tuning {
            field_height: 0.0,
            ..Default::default()
        };
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn test_rejects_field_narrower_than_player() {
        let tuning = Tuning {
            field_width: 45.0,
            ..Default::default()
        };
        assert_eq!(
            tuning.validate(),
            Err(TuningError::NotPositive {
                name: "field width minus player size",
                value: -5.0,
            })
        );

        let tuning = Tuning {
            field_width: 51.0,
            ..Default::default()
        };
        assert!(tuning.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_slow_factor() {
        for factor in [0.0, -0.5, 1.5] {
            let tuning = Tuning {
                slow_time_factor: factor,
                ..Default::default()
            };
            assert_eq!(tuning.validate(), Err(TuningError::SlowFactor(factor)));
        }
    }

    #[test]
    fn test_rejects_inverted_speed_range() {
        let tuning = Tuning {
            heart_speed: Range::new(4.0, 2.0),
            ..Default::default()
        };
        assert!(matches!(
            tuning.validate(),
            Err(TuningError::InvertedRange { .. })
        ));
    }

    #[test]
    fn test_rejects_overfull_odds() {
        let tuning = Tuning {
            heart_odds: HeartOdds {
                diamond: 0.5,
                rainbow: 0.4,
                golden: 0.3,
            },
            ..Default::default()
        };
        assert!(matches!(tuning.validate(), Err(TuningError::Odds(_))));
    }

    #[test]
    fn test_rejects_zero_lives_and_threshold() {
        let tuning = Tuning {
            starting_lives: 0,
            ..Default::default()
        };
        assert_eq!(tuning.validate(), Err(TuningError::StartingLives));

        let tuning = Tuning {
            combo_threshold: 0,
            ..Default::default()
        };
        assert_eq!(tuning.validate(), Err(TuningError::ComboThreshold));
    }

    #[test]
    fn test_from_json_partial_override() {
        let tuning = Tuning::from_json(r#"{ "starting_lives": 5, "magnet_range": 150.0 }"#)
            .expect("valid override");
        assert_eq!(tuning.starting_lives, 5);
        assert_eq!(tuning.magnet_range, 150.0);
        assert_eq!(tuning.heart_spawn_ms, 1000.0);
    }

    #[test]
    fn test_from_json_rejects_invalid() {
        assert!(matches!(
            Tuning::from_json("{ not json"),
            Err(TuningError::Json(_))
        ));
        assert!(matches!(
            Tuning::from_json(r#"{ "obstacle_spawn_ms": -5.0 }"#),
            Err(TuningError::NotPositive { .. })
        ));
    }
}
