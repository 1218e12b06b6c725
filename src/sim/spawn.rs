//! Entity spawning
//!
//! Three independent schedules (hearts, obstacles, power-ups) run off the
//! scaled game clock. Each one fires when the clock crosses a multiple of
//! its period, so several can fire in the same tick.

use glam::Vec2;
use rand::Rng;

use super::state::{
    GameState, Heart, HeartKind, Obstacle, ObstacleKind, Particle, PowerUp, PowerUpKind,
};
use crate::consts::*;
use crate::tuning::{HeartOdds, Range};

/// True when the clock moved past a multiple of `period` between `prev` and `now`
fn schedule_due(prev: f32, now: f32, period: f32) -> bool {
    (now / period).floor() > (prev / period).floor()
}

/// Run all spawn schedules for a clock step from `prev_time` to `state.game_time`
pub fn spawn_due(state: &mut GameState, prev_time: f32) {
    let now = state.game_time;
    if schedule_due(prev_time, now, state.tuning.heart_spawn_ms) {
        spawn_heart(state);
    }
    if schedule_due(prev_time, now, state.tuning.obstacle_spawn_ms) {
        spawn_obstacle(state);
    }
    if schedule_due(prev_time, now, state.tuning.power_up_spawn_ms) {
        spawn_power_up(state);
    }
}

/// Weighted rarity draw. `roll` is uniform in [0, 1).
pub fn heart_kind_for_roll(roll: f32, odds: &HeartOdds) -> HeartKind {
    let diamond = odds.diamond;
    let rainbow = diamond + odds.rainbow;
    let golden = rainbow + odds.golden;
    if roll < diamond {
        HeartKind::Diamond
    } else if roll < rainbow {
        HeartKind::Rainbow
    } else if roll < golden {
        HeartKind::Golden
    } else {
        HeartKind::Normal
    }
}

fn sample(rng: &mut impl Rng, range: Range) -> f32 {
    if range.max > range.min {
        rng.random_range(range.min..range.max)
    } else {
        range.min
    }
}

/// Random x so an entity of `width` fits inside the field
fn spawn_x(rng: &mut impl Rng, field_width: f32, width: f32) -> f32 {
    rng.random::<f32>() * (field_width - width).max(0.0)
}

pub fn spawn_heart(state: &mut GameState) {
    let id = state.next_entity_id();
    let field_width = state.tuning.field_width;
    let spin = state.tuning.heart_spin;
    let rng = &mut state.rng;

    let kind = heart_kind_for_roll(rng.random::<f32>(), &state.tuning.heart_odds);
    let heart = Heart {
        id,
        pos: Vec2::new(spawn_x(rng, field_width, HEART_SIZE), -HEART_SIZE),
        size: Vec2::splat(HEART_SIZE),
        vel_y: sample(rng, state.tuning.heart_speed),
        rotation: 0.0,
        rotation_speed: (rng.random::<f32>() - 0.5) * spin,
        kind,
        points: state.tuning.heart_points.for_kind(kind),
        color: kind.color(),
    };
    log::debug!("Spawned {} heart {}", kind.as_str(), id);
    state.hearts.push(heart);
}

pub fn spawn_obstacle(state: &mut GameState) {
    let id = state.next_entity_id();
    let field_width = state.tuning.field_width;
    let rng = &mut state.rng;

    let obstacle = Obstacle {
        id,
        pos: Vec2::new(spawn_x(rng, field_width, OBSTACLE_SIZE), -OBSTACLE_SIZE),
        size: Vec2::splat(OBSTACLE_SIZE),
        vel_y: sample(rng, state.tuning.obstacle_speed),
        kind: if rng.random_bool(0.5) {
            ObstacleKind::Spike
        } else {
            ObstacleKind::Rock
        },
    };
    state.obstacles.push(obstacle);
}

pub fn spawn_power_up(state: &mut GameState) {
    let id = state.next_entity_id();
    let field_width = state.tuning.field_width;
    let rng = &mut state.rng;

    let kind = PowerUpKind::ALL[rng.random_range(0..PowerUpKind::ALL.len())];
    let power_up = PowerUp {
        id,
        pos: Vec2::new(spawn_x(rng, field_width, POWER_UP_SIZE), -POWER_UP_SIZE),
        size: Vec2::splat(POWER_UP_SIZE),
        vel_y: sample(rng, state.tuning.power_up_speed),
        kind,
        color: kind.color(),
    };
    log::debug!("Spawned {} power-up {}", kind.as_str(), id);
    state.power_ups.push(power_up);
}

/// Emit a cosmetic particle burst, dropping the oldest particles over the cap
pub fn burst(state: &mut GameState, center: Vec2, color: u32) {
    let cap = state.tuning.max_particles;
    if cap == 0 {
        return;
    }
    for _ in 0..BURST_PARTICLES {
        let rng = &mut state.rng;
        let particle = Particle {
            pos: center,
            vel: Vec2::new(
                (rng.random::<f32>() - 0.5) * 10.0,
                (rng.random::<f32>() - 0.5) * 10.0,
            ),
            size: rng.random::<f32>() * 5.0 + 2.0,
            color,
            life: rng.random::<f32>() * 500.0 + 500.0,
        };
        state.particles.push(particle);
    }
    if state.particles.len() > cap {
        let excess = state.particles.len() - cap;
        state.particles.drain(..excess);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;

    fn running(seed: u64) -> GameState {
        let mut state = GameState::new(Tuning::default(), seed).unwrap();
        state.restart();
        state
    }

    #[test]
    fn test_heart_kind_thresholds() {
        let odds = HeartOdds::default();
        assert_eq!(heart_kind_for_roll(0.0, &odds), HeartKind::Diamond);
        assert_eq!(heart_kind_for_roll(0.049, &odds), HeartKind::Diamond);
        assert_eq!(heart_kind_for_roll(0.05, &odds), HeartKind::Rainbow);
        assert_eq!(heart_kind_for_roll(0.149, &odds), HeartKind::Rainbow);
        assert_eq!(heart_kind_for_roll(0.15, &odds), HeartKind::Golden);
        assert_eq!(heart_kind_for_roll(0.299, &odds), HeartKind::Golden);
        assert_eq!(heart_kind_for_roll(0.30, &odds), HeartKind::Normal);
        assert_eq!(heart_kind_for_roll(0.999, &odds), HeartKind::Normal);
    }

    #[test]
    fn test_schedules_fire_independently() {
        let mut state = running(3);

        state.game_time = 999.0;
        spawn_due(&mut state, 990.0);
        assert!(state.hearts.is_empty());

        state.game_time = 1005.0;
        spawn_due(&mut state, 999.0);
        assert_eq!(state.hearts.len(), 1);
        assert!(state.obstacles.is_empty());

        // Crossing 10 s fires all three at once
        state.game_time = 10_001.0;
        spawn_due(&mut state, 9_990.0);
        assert_eq!(state.hearts.len(), 2);
        assert_eq!(state.obstacles.len(), 1);
        assert_eq!(state.power_ups.len(), 1);
    }

    #[test]
    fn test_spawned_entities_respect_ranges() {
        let mut state = running(11);
        for _ in 0..200 {
            spawn_heart(&mut state);
            spawn_obstacle(&mut state);
            spawn_power_up(&mut state);
        }
        let width = state.tuning.field_width;
        for heart in &state.hearts {
            assert!(heart.pos.x >= 0.0 && heart.pos.x + heart.size.x <= width);
            assert_eq!(heart.pos.y, -HEART_SIZE);
            assert!((2.0..4.0).contains(&heart.vel_y));
            assert!(heart.rotation_speed.abs() <= 0.05);
            assert_eq!(heart.points, state.tuning.heart_points.for_kind(heart.kind));
        }
        for obstacle in &state.obstacles {
            assert!(obstacle.pos.x + obstacle.size.x <= width);
            assert!((3.0..5.0).contains(&obstacle.vel_y));
        }
        for power_up in &state.power_ups {
            assert!((2.0..3.0).contains(&power_up.vel_y));
            assert_eq!(power_up.color, power_up.kind.color());
        }
        // 200 draws of a uniform three-way choice cover every kind
        for kind in PowerUpKind::ALL {
            assert!(state.power_ups.iter().any(|p| p.kind == kind));
        }
        assert!(state.obstacles.iter().any(|o| o.kind == ObstacleKind::Spike));
        assert!(state.obstacles.iter().any(|o| o.kind == ObstacleKind::Rock));
    }

    #[test]
    fn test_ids_are_unique() {
        let mut state = running(5);
        spawn_heart(&mut state);
        spawn_obstacle(&mut state);
        spawn_power_up(&mut state);
        let mut ids = vec![state.hearts[0].id, state.obstacles[0].id, state.power_ups[0].id];
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_burst_respects_particle_cap() {
        let mut state = running(9);
        state.tuning.max_particles = 30;
        burst(&mut state, Vec2::ZERO, 0xffffff);
        burst(&mut state, Vec2::ONE, 0x000000);
        assert_eq!(state.particles.len(), 30);
        // Oldest dropped first
        assert!(state.particles.iter().filter(|p| p.color == 0x000000).count() == 20);
        for particle in &state.particles {
            assert!(particle.life >= 500.0 && particle.life < 1000.0);
            assert!(particle.size >= 2.0 && particle.size < 7.0);
        }
    }
}
