//! Per-tick motion
//!
//! Velocities are per reference frame (`FRAME_MS`). A tick of `scaled_dt` ms
//! advances motion by `scaled_dt / FRAME_MS` frames. Power-up timers are the
//! one exception: they count down on unscaled time.

use super::state::{GameEvent, GameState, PowerUpKind};
use crate::consts::*;
use crate::tuning::ComboReset;

/// Advance the world. `dt` is wall-clock ms, `scaled_dt` is after slow-time.
pub fn update(state: &mut GameState, dt: f32, scaled_dt: f32) {
    let step = scaled_dt / FRAME_MS;

    update_player(state, step);
    update_hearts(state, step);
    update_obstacles(state, step);
    update_power_ups(state, step);
    update_particles(state, scaled_dt, step);
    update_effects(state, scaled_dt);
    update_timers(state, dt);
}

/// Gravity, then velocity, then clamp to the field
pub fn update_player(state: &mut GameState, step: f32) {
    let field = state.field();
    let player = &mut state.player;

    player.vel.y += state.tuning.gravity * step;
    player.pos += player.vel * step;

    let max = field - player.size;
    if player.pos.x < 0.0 {
        player.pos.x = 0.0;
        player.vel.x = 0.0;
    } else if player.pos.x > max.x {
        player.pos.x = max.x;
        player.vel.x = 0.0;
    }
    if player.pos.y < 0.0 {
        player.pos.y = 0.0;
        player.vel.y = 0.0;
    } else if player.pos.y > max.y {
        player.pos.y = max.y;
        player.vel.y = 0.0;
    }
}

fn update_hearts(state: &mut GameState, step: f32) {
    for heart in state.hearts.iter_mut() {
        heart.pos.y += heart.vel_y * step;
        heart.rotation += heart.rotation_speed * step;
    }

    if state.timers.is_active(PowerUpKind::Magnet) {
        apply_magnet(state, step);
    }

    let bottom = state.tuning.field_height;
    let mut missed = Vec::new();
    state.hearts.retain(|heart| {
        let keep = heart.pos.y <= bottom;
        if !keep {
            missed.push(heart.id);
        }
        keep
    });

    if !missed.is_empty() && state.tuning.combo_reset == ComboReset::OnMiss {
        state.combo = Default::default();
    }
    state
        .events
        .extend(missed.into_iter().map(|id| GameEvent::HeartMissed { id }));
}

/// Pull hearts within range toward the player's center
pub fn apply_magnet(state: &mut GameState, step: f32) {
    let target = state.player.center();
    let range = state.tuning.magnet_range;
    let force = state.tuning.magnet_force * step;

    for heart in state.hearts.iter_mut() {
        let delta = target - heart.center();
        let distance = delta.length();
        // Zero distance has no direction to pull in
        if distance <= f32::EPSILON || distance >= range {
            continue;
        }
        let dir = delta / distance;
        heart.pos.x += dir.x * force;
        heart.vel_y += dir.y * force;
    }
}

fn update_obstacles(state: &mut GameState, step: f32) {
    let bottom = state.tuning.field_height;
    for obstacle in state.obstacles.iter_mut() {
        obstacle.pos.y += obstacle.vel_y * step;
    }
    state.obstacles.retain(|o| o.pos.y <= bottom);
}

fn update_power_ups(state: &mut GameState, step: f32) {
    let bottom = state.tuning.field_height;
    for power_up in state.power_ups.iter_mut() {
        power_up.pos.y += power_up.vel_y * step;
    }
    state.power_ups.retain(|p| p.pos.y <= bottom);
}

fn update_particles(state: &mut GameState, scaled_dt: f32, step: f32) {
    for particle in state.particles.iter_mut() {
        particle.pos += particle.vel * step;
        particle.life -= scaled_dt;
    }
    state.particles.retain(|p| p.life > 0.0);
}

fn update_effects(state: &mut GameState, scaled_dt: f32) {
    for effect in state.effects.iter_mut() {
        effect.progress += scaled_dt * 0.5;
    }
    state.effects.retain(|e| e.progress < EFFECT_DONE);
}

fn update_timers(state: &mut GameState, dt: f32) {
    for kind in state.timers.tick(dt) {
        log::debug!("Power-up {} expired", kind.as_str());
        state.events.push(GameEvent::PowerUpExpired(kind));
    }
}
