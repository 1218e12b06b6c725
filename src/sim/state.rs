//! Game state and core simulation types
//!
//! One `GameState` is one session: the entity store plus score, lives,
//! timers and the session phase. It is owned by the driver and passed by
//! reference into every simulation step.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::consts::*;
use crate::error::TuningError;
use crate::tuning::Tuning;

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Created, waiting for the first start/restart
    NotStarted,
    /// Active gameplay
    Running,
    /// Frozen; resumes exactly where it stopped
    Paused,
    /// Lives ran out. Only a restart leaves this phase.
    GameOver,
}

/// The player's catcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub size: Vec2,
    pub vel: Vec2,
}

impl Player {
    /// Player at the start position for a field
    pub fn spawn(field: Vec2) -> Self {
        Self {
            pos: Vec2::new(field.x / 2.0, field.y - PLAYER_START_OFFSET),
            size: Vec2::splat(PLAYER_SIZE),
            vel: Vec2::ZERO,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }
}

/// Heart rarity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeartKind {
    Normal,
    Golden,
    Rainbow,
    Diamond,
}

impl HeartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeartKind::Normal => "normal",
            HeartKind::Golden => "golden",
            HeartKind::Rainbow => "rainbow",
            HeartKind::Diamond => "diamond",
        }
    }

    /// RGB color
    pub fn color(&self) -> u32 {
        match self {
            HeartKind::Normal => 0xff6b6b,
            HeartKind::Golden => 0xffd166,
            HeartKind::Rainbow => 0xf72585,
            HeartKind::Diamond => 0x4cc9f0,
        }
    }

    pub fn is_special(&self) -> bool {
        *self != HeartKind::Normal
    }
}

/// A falling collectible
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heart {
    pub id: u32,
    pub pos: Vec2,
    pub size: Vec2,
    /// Vertical speed per reference frame
    pub vel_y: f32,
    pub rotation: f32,
    pub rotation_speed: f32,
    pub kind: HeartKind,
    pub points: u32,
    pub color: u32,
}

impl Heart {
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }
}

/// Obstacle shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    Spike,
    Rock,
}

/// A falling hazard. Touching one costs a life.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub pos: Vec2,
    pub size: Vec2,
    pub vel_y: f32,
    pub kind: ObstacleKind,
}

impl Obstacle {
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Halves the speed of the world
    SlowTime,
    /// Pulls nearby hearts toward the player
    Magnet,
    /// Doubles heart points
    DoublePoints,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 3] = [
        PowerUpKind::SlowTime,
        PowerUpKind::Magnet,
        PowerUpKind::DoublePoints,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PowerUpKind::SlowTime => "slowTime",
            PowerUpKind::Magnet => "magnet",
            PowerUpKind::DoublePoints => "doublePoints",
        }
    }

    pub fn color(&self) -> u32 {
        match self {
            PowerUpKind::SlowTime => 0x4cc9f0,
            PowerUpKind::Magnet => 0xf72585,
            PowerUpKind::DoublePoints => 0xffd166,
        }
    }
}

/// A falling power-up pickup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub pos: Vec2,
    pub size: Vec2,
    pub vel_y: f32,
    pub kind: PowerUpKind,
    pub color: u32,
}

impl PowerUp {
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }
}

/// A particle for visual effects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub color: u32,
    /// Remaining life in ms
    pub life: f32,
}

/// Particle color for obstacle impacts
pub const IMPACT_COLOR: u32 = 0xef476f;

/// Cosmetic one-shot effect types
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EffectKind {
    /// Ring burst where a special heart was caught
    Explosion { radius: f32 },
    /// "COMBO xN" banner
    Combo { multiplier: f32 },
}

/// A timed cosmetic effect. Finished at `progress >= EFFECT_DONE`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub kind: EffectKind,
    pub pos: Vec2,
    pub progress: f32,
}

/// Remaining active time per power-up (ms, never negative)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerUpTimers {
    pub slow_time: f32,
    pub magnet: f32,
    pub double_points: f32,
}

impl PowerUpTimers {
    pub fn get(&self, kind: PowerUpKind) -> f32 {
        match kind {
            PowerUpKind::SlowTime => self.slow_time,
            PowerUpKind::Magnet => self.magnet,
            PowerUpKind::DoublePoints => self.double_points,
        }
    }

    fn get_mut(&mut self, kind: PowerUpKind) -> &mut f32 {
        match kind {
            PowerUpKind::SlowTime => &mut self.slow_time,
            PowerUpKind::Magnet => &mut self.magnet,
            PowerUpKind::DoublePoints => &mut self.double_points,
        }
    }

    pub fn is_active(&self, kind: PowerUpKind) -> bool {
        self.get(kind) > 0.0
    }

    /// Start (or restart) a power-up for `duration` ms
    pub fn activate(&mut self, kind: PowerUpKind, duration: f32) {
        *self.get_mut(kind) = duration;
    }

    /// Count every active timer down by `dt` ms. Returns the power-ups that
    /// expired during this call.
    pub fn tick(&mut self, dt: f32) -> Vec<PowerUpKind> {
        let mut expired = Vec::new();
        for kind in PowerUpKind::ALL {
            let timer = self.get_mut(kind);
            if *timer > 0.0 {
                *timer -= dt;
                if *timer <= 0.0 {
                    *timer = 0.0;
                    expired.push(kind);
                }
            }
        }
        expired
    }
}

/// Consecutive-catch tracking
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combo {
    pub count: u32,
    pub active: bool,
}

/// Something that happened during a tick. Drained by the driver each frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    HeartCollected {
        id: u32,
        kind: HeartKind,
        points: u64,
    },
    /// A heart fell past the bottom edge
    HeartMissed { id: u32 },
    ObstacleHit { id: u32, lives_left: u8 },
    PowerUpCollected { id: u32, kind: PowerUpKind },
    PowerUpActivated(PowerUpKind),
    PowerUpExpired(PowerUpKind),
    ComboActivated { multiplier: f32 },
    GameOver { score: u64 },
}

impl GameEvent {
    /// Player-facing notification text, if this event deserves one
    pub fn message(&self) -> Option<String> {
        match self {
            GameEvent::HeartCollected { kind, points, .. } if kind.is_special() => {
                Some(format!("+{} points from a {} heart!", points, kind.as_str()))
            }
            GameEvent::PowerUpActivated(kind) => {
                Some(format!("Power-up {} activated!", kind.as_str()))
            }
            GameEvent::PowerUpExpired(kind) => {
                Some(format!("Power-up {} deactivated", kind.as_str()))
            }
            GameEvent::ComboActivated { multiplier } => {
                Some(format!("COMBO ACTIVATED! {}x points", multiplier))
            }
            GameEvent::GameOver { score } => Some(format!("Game over! Final score: {}", score)),
            _ => None,
        }
    }
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed the RNG was created from
    pub seed: u64,
    /// Validated balance values
    pub tuning: Tuning,
    /// Spawn and particle randomness
    pub rng: Pcg32,
    pub phase: GamePhase,
    pub score: u64,
    /// Best score seen by this session's host (survives restarts)
    pub high_score: u64,
    pub lives: u8,
    /// Scaled game time in ms; drives the spawn schedules
    pub game_time: f32,
    pub player: Player,
    pub hearts: Vec<Heart>,
    pub obstacles: Vec<Obstacle>,
    pub power_ups: Vec<PowerUp>,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    /// Visual one-shot effects (not gameplay-affecting)
    pub effects: Vec<Effect>,
    pub timers: PowerUpTimers,
    pub combo: Combo,
    /// Events recorded by the most recent tick
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create a session. Fails if the tuning is invalid.
    pub fn new(tuning: Tuning, seed: u64) -> Result<Self, TuningError> {
        tuning.validate()?;
        let field = Vec2::new(tuning.field_width, tuning.field_height);
        Ok(Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::NotStarted,
            score: 0,
            high_score: 0,
            lives: tuning.starting_lives,
            game_time: 0.0,
            player: Player::spawn(field),
            hearts: Vec::new(),
            obstacles: Vec::new(),
            power_ups: Vec::new(),
            particles: Vec::new(),
            effects: Vec::new(),
            timers: PowerUpTimers::default(),
            combo: Combo::default(),
            events: Vec::new(),
            next_id: 1,
            tuning,
        })
    }

    /// Field size
    pub fn field(&self) -> Vec2 {
        Vec2::new(self.tuning.field_width, self.tuning.field_height)
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Clear every collection and counter and put the player back at the start
    pub fn reset(&mut self) {
        self.score = 0;
        self.lives = self.tuning.starting_lives;
        self.game_time = 0.0;
        self.player = Player::spawn(self.field());
        self.hearts.clear();
        self.obstacles.clear();
        self.power_ups.clear();
        self.particles.clear();
        self.effects.clear();
        self.timers = PowerUpTimers::default();
        self.combo = Combo::default();
        self.events.clear();
    }

    /// Reset and enter `Running`. Valid from any phase.
    pub fn restart(&mut self) {
        self.reset();
        self.phase = GamePhase::Running;
        log::info!("Session started (seed {})", self.seed);
    }

    /// Time scale applied to simulation motion this tick
    pub fn time_scale(&self) -> f32 {
        if self.timers.is_active(PowerUpKind::SlowTime) {
            self.tuning.slow_time_factor
        } else {
            1.0
        }
    }

    /// Read-only view for render sinks
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            field: self.field(),
            phase: self.phase,
            score: self.score,
            high_score: self.high_score,
            lives: self.lives,
            player: &self.player,
            hearts: &self.hearts,
            obstacles: &self.obstacles,
            power_ups: &self.power_ups,
            particles: &self.particles,
            effects: &self.effects,
            timers: &self.timers,
            combo: self.combo,
        }
    }
}

/// Borrowed, read-only view of a session handed to render sinks
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Snapshot<'a> {
    pub field: Vec2,
    pub phase: GamePhase,
    pub score: u64,
    pub high_score: u64,
    pub lives: u8,
    pub player: &'a Player,
    pub hearts: &'a [Heart],
    pub obstacles: &'a [Obstacle],
    pub power_ups: &'a [PowerUp],
    pub particles: &'a [Particle],
    pub effects: &'a [Effect],
    pub timers: &'a PowerUpTimers,
    pub combo: Combo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_not_started() {
        let state = GameState::new(Tuning::default(), 1).unwrap();
        assert_eq!(state.phase, GamePhase::NotStarted);
        assert_eq!(state.lives, 3);
        assert_eq!(state.score, 0);
        assert_eq!(state.player.pos, Vec2::new(200.0, 500.0));
    }

    #[test]
    fn test_new_rejects_invalid_tuning() {
        let tuning = Tuning {
            obstacle_spawn_ms: -1.0,
            ..Default::default()
        };
        assert!(GameState::new(tuning, 1).is_err());
    }

    #[test]
    fn test_restart_clears_everything() {
        let mut state = GameState::new(Tuning::default(), 7).unwrap();
        state.restart();
        state.score = 420;
        state.lives = 1;
        state.game_time = 12_345.0;
        state.combo = Combo {
            count: 9,
            active: true,
        };
        state.timers.activate(PowerUpKind::Magnet, 3000.0);
        state.player.pos = Vec2::new(3.0, 4.0);
        state.particles.push(Particle {
            pos: Vec2::ZERO,
            vel: Vec2::ONE,
            size: 3.0,
            color: IMPACT_COLOR,
            life: 400.0,
        });
        state.phase = GamePhase::GameOver;

        state.restart();

        assert_eq!(state.phase, GamePhase::Running);
        assert_eq!(state.score, 0);
        assert_eq!(state.lives, 3);
        assert_eq!(state.game_time, 0.0);
        assert_eq!(state.combo, Combo::default());
        assert_eq!(state.timers, PowerUpTimers::default());
        assert!(state.particles.is_empty());
        assert_eq!(state.player, Player::spawn(state.field()));
    }

    #[test]
    fn test_timers_expire_and_clamp() {
        let mut timers = PowerUpTimers::default();
        timers.activate(PowerUpKind::DoublePoints, 100.0);
        timers.activate(PowerUpKind::Magnet, 1000.0);

        assert!(timers.tick(60.0).is_empty());
        let expired = timers.tick(60.0);
        assert_eq!(expired, vec![PowerUpKind::DoublePoints]);
        assert_eq!(timers.double_points, 0.0);
        assert!(timers.is_active(PowerUpKind::Magnet));

        // Inactive timers never go negative
        assert!(timers.tick(5000.0).contains(&PowerUpKind::Magnet));
        assert!(timers.tick(5000.0).is_empty());
        assert_eq!(timers, PowerUpTimers::default());
    }

    #[test]
    fn test_event_messages() {
        let event = GameEvent::HeartCollected {
            id: 1,
            kind: HeartKind::Diamond,
            points: 200,
        };
        assert_eq!(
            event.message().as_deref(),
            Some("+200 points from a diamond heart!")
        );

        let plain = GameEvent::HeartCollected {
            id: 2,
            kind: HeartKind::Normal,
            points: 10,
        };
        assert_eq!(plain.message(), None);

        let combo = GameEvent::ComboActivated { multiplier: 1.5 };
        assert_eq!(
            combo.message().as_deref(),
            Some("COMBO ACTIVATED! 1.5x points")
        );
    }
}
