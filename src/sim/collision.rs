//! Collision detection and scoring
//!
//! Everything the player touches is resolved here, once per tick: hearts
//! first, then obstacles, then power-ups. A resolved entity is removed from
//! its list immediately, so it can produce at most one outcome.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::spawn::burst;
use super::state::{
    Combo, Effect, EffectKind, GameEvent, GamePhase, GameState, Heart, IMPACT_COLOR, Obstacle,
    PowerUp, PowerUpKind, PowerUpTimers,
};
use crate::consts::EXPLOSION_RADIUS;
use crate::tuning::Tuning;

/// Axis-aligned bounding box (top-left corner + size)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    /// Zero or negative area
    pub fn is_degenerate(&self) -> bool {
        !(self.size.x > 0.0 && self.size.y > 0.0)
    }

    /// Strict overlap test; touching edges do not count
    pub fn overlaps(&self, other: &Aabb) -> bool {
        if self.is_degenerate() || other.is_degenerate() {
            return false;
        }
        self.pos.x < other.pos.x + other.size.x
            && self.pos.x + self.size.x > other.pos.x
            && self.pos.y < other.pos.y + other.size.y
            && self.pos.y + self.size.y > other.pos.y
    }
}

/// Points for catching a heart worth `base`. Multipliers compose and the
/// product is rounded once.
pub fn heart_points(base: u32, tuning: &Tuning, timers: &PowerUpTimers, combo: Combo) -> u64 {
    let mut points = base as f32;
    if timers.is_active(PowerUpKind::DoublePoints) {
        points *= tuning.double_points_multiplier;
    }
    if combo.active {
        points *= tuning.combo_multiplier;
    }
    points.round() as u64
}

/// Start (or refresh) a power-up
pub fn activate_power_up(state: &mut GameState, kind: PowerUpKind) {
    state
        .timers
        .activate(kind, state.tuning.power_up_duration_ms);
    state.events.push(GameEvent::PowerUpActivated(kind));
    log::debug!("Power-up {} active", kind.as_str());
}

/// Resolve every player overlap for this tick
pub fn resolve_collisions(state: &mut GameState) {
    if state.phase != GamePhase::Running {
        return;
    }
    let player = state.player.bounds();
    if player.is_degenerate() {
        return;
    }

    let hearts = std::mem::take(&mut state.hearts);
    let mut kept = Vec::with_capacity(hearts.len());
    for heart in hearts {
        if player.overlaps(&heart.bounds()) {
            collect_heart(state, &heart);
        } else {
            kept.push(heart);
        }
    }
    state.hearts = kept;

    // Once lives hit zero the rest of the tick is ignored
    let obstacles = std::mem::take(&mut state.obstacles);
    let mut kept = Vec::with_capacity(obstacles.len());
    for obstacle in obstacles {
        if state.phase == GamePhase::Running && player.overlaps(&obstacle.bounds()) {
            hit_obstacle(state, &obstacle);
        } else {
            kept.push(obstacle);
        }
    }
    state.obstacles = kept;

    let power_ups = std::mem::take(&mut state.power_ups);
    let mut kept = Vec::with_capacity(power_ups.len());
    for power_up in power_ups {
        if state.phase == GamePhase::Running && player.overlaps(&power_up.bounds()) {
            collect_power_up(state, &power_up);
        } else {
            kept.push(power_up);
        }
    }
    state.power_ups = kept;
}

fn collect_heart(state: &mut GameState, heart: &Heart) {
    let points = heart_points(heart.points, &state.tuning, &state.timers, state.combo);
    state.score += points;
    state.events.push(GameEvent::HeartCollected {
        id: heart.id,
        kind: heart.kind,
        points,
    });

    state.combo.count += 1;
    if state.combo.count >= state.tuning.combo_threshold && !state.combo.active {
        state.combo.active = true;
        let multiplier = state.tuning.combo_multiplier;
        state.effects.push(Effect {
            kind: EffectKind::Combo { multiplier },
            pos: state.field() / 2.0,
            progress: 0.0,
        });
        state.events.push(GameEvent::ComboActivated { multiplier });
        log::debug!("Combo active after {} hearts", state.combo.count);
    }

    let center = heart.center();
    burst(state, center, heart.color);
    if heart.kind.is_special() {
        state.effects.push(Effect {
            kind: EffectKind::Explosion {
                radius: EXPLOSION_RADIUS,
            },
            pos: center,
            progress: 0.0,
        });
    }
}

fn hit_obstacle(state: &mut GameState, obstacle: &Obstacle) {
    state.lives = state.lives.saturating_sub(1);
    burst(state, obstacle.center(), IMPACT_COLOR);
    state.events.push(GameEvent::ObstacleHit {
        id: obstacle.id,
        lives_left: state.lives,
    });

    if state.lives == 0 {
        state.phase = GamePhase::GameOver;
        state.events.push(GameEvent::GameOver { score: state.score });
        log::info!("Game over with score {}", state.score);
    }
}

fn collect_power_up(state: &mut GameState, power_up: &PowerUp) {
    state.events.push(GameEvent::PowerUpCollected {
        id: power_up.id,
        kind: power_up.kind,
    });
    activate_power_up(state, power_up.kind);
    burst(state, power_up.center(), power_up.color);
}
