//! Simulation tick
//!
//! Runs one step of the session: commands, then spawn, physics and
//! collisions, in that order.

use super::collision::{activate_power_up, resolve_collisions};
use super::physics;
use super::spawn::spawn_due;
use super::state::{GamePhase, GameState, PowerUpKind};

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Horizontal player velocity (from pointer/touch). `None` keeps the current one.
    pub player_vx: Option<f32>,
    /// Pause toggle
    pub pause: bool,
    /// Reset the session and start playing
    pub restart: bool,
    /// Activate a power-up directly (power-up buttons)
    pub activate: Option<PowerUpKind>,
    /// Demo mode - the player steers itself
    pub autopilot: bool,
}

/// Advance the session by `dt` wall-clock milliseconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.events.clear();

    if input.restart {
        state.restart();
        return;
    }

    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Running => {
                state.phase = GamePhase::Paused;
                log::info!("Paused");
                return;
            }
            GamePhase::Paused => {
                state.phase = GamePhase::Running;
                log::info!("Resumed");
            }
            _ => {}
        }
    }

    if state.phase != GamePhase::Running {
        return;
    }

    let player_vx = if input.autopilot {
        Some(autopilot_velocity(state))
    } else {
        input.player_vx
    };
    if let Some(vx) = player_vx {
        state.player.vel.x = vx;
    }
    if let Some(kind) = input.activate {
        activate_power_up(state, kind);
    }

    let scaled_dt = dt * state.time_scale();
    let prev_time = state.game_time;
    state.game_time += scaled_dt;

    spawn_due(state, prev_time);
    physics::update(state, dt, scaled_dt);
    resolve_collisions(state);
}

/// Look this far above the player for obstacles to dodge
const DODGE_LOOKAHEAD: f32 = 200.0;

/// Steer toward the lowest heart, or away from an obstacle about to land
pub fn autopilot_velocity(state: &GameState) -> f32 {
    let player = &state.player;
    let center = player.center().x;
    let bottom = player.pos.y + player.size.y;
    let half = player.size.x / 2.0;

    let threat = state
        .obstacles
        .iter()
        .filter(|o| {
            let gap = player.pos.y - (o.pos.y + o.size.y);
            let overlaps_column = o.pos.x < player.pos.x + player.size.x + half
                && o.pos.x + o.size.x > player.pos.x - half;
            gap < DODGE_LOOKAHEAD && o.pos.y < bottom && overlaps_column
        })
        .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y));

    let target = if let Some(obstacle) = threat {
        // Step out from under it, away from its center unless that side is walled off
        let obstacle_center = obstacle.center().x;
        let escape = obstacle.size.x / 2.0 + player.size.x;
        let left = obstacle_center - escape;
        let right = obstacle_center + escape;
        let room_left = left - half >= 0.0;
        let room_right = right + half <= state.tuning.field_width;
        let go_left = if obstacle_center >= center {
            room_left || !room_right
        } else {
            !room_right
        };
        if go_left { left } else { right }
    } else {
        state
            .hearts
            .iter()
            .filter(|h| h.pos.y < bottom)
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
            .map(|h| h.center().x)
            .unwrap_or(state.tuning.field_width / 2.0)
    };

    let speed = state.tuning.player_speed;
    ((target - center) * state.tuning.follow_gain).clamp(-speed, speed)
}
