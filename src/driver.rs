//! Per-frame game loop
//!
//! The host calls `GameLoop::frame` from its frame callback and keeps
//! rescheduling while it returns `LoopControl::Continue`.

use crate::consts::{FRAME_MS, MAX_FRAME_MS};
use crate::error::TuningError;
use crate::highscores::{load_high_score, save_if_higher};
use crate::persistence::KeyValueStore;
use crate::platform::{NotificationSink, RenderSink};
use crate::sim::{GameEvent, GamePhase, GameState, TickInput, tick};
use crate::tuning::Tuning;

/// Whether the host should schedule another frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Stop,
}

/// Owns the session and its frame cadence
pub struct GameLoop {
    state: GameState,
    /// Pending input; one-shot commands are cleared after each frame
    input: TickInput,
    last_time: Option<f64>,
    stopped: bool,
}

impl GameLoop {
    pub fn new(tuning: Tuning, seed: u64) -> Result<Self, TuningError> {
        Ok(Self {
            state: GameState::new(tuning, seed)?,
            input: TickInput::default(),
            last_time: None,
            stopped: false,
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn input_mut(&mut self) -> &mut TickInput {
        &mut self.input
    }

    /// Pull the saved best score into the session. Failures are reported, not fatal.
    pub fn load_high_score(
        &mut self,
        store: &dyn KeyValueStore,
        notifier: &mut dyn NotificationSink,
    ) {
        match load_high_score(store) {
            Ok(best) => {
                self.state.high_score = best;
                log::info!("Loaded high score {}", best);
            }
            Err(e) => {
                log::warn!("High score unavailable: {}", e);
                notifier.notify(&format!("Could not load high score: {}", e));
            }
        }
    }

    /// Start a fresh session (also used after game over)
    pub fn restart(&mut self) {
        self.state.restart();
        self.input = TickInput::default();
        self.last_time = None;
        self.stopped = false;
    }

    /// Stop for good (e.g. navigating away)
    pub fn stop(&mut self) {
        self.stopped = true;
        log::info!("Game loop stopped");
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Run one frame at timestamp `now` (ms)
    pub fn frame(
        &mut self,
        now: f64,
        renderer: &mut dyn RenderSink,
        notifier: &mut dyn NotificationSink,
        store: &mut dyn KeyValueStore,
    ) -> LoopControl {
        if self.stopped {
            return LoopControl::Stop;
        }

        // Calculate delta time
        let dt = match self.last_time {
            Some(last) => ((now - last) as f32).clamp(0.0, MAX_FRAME_MS),
            None => FRAME_MS,
        };
        self.last_time = Some(now);

        let was_paused = self.state.phase == GamePhase::Paused;
        let input = self.input.clone();
        tick(&mut self.state, &input, dt);

        // Clear one-shot inputs after processing
        self.input.pause = false;
        self.input.restart = false;
        self.input.activate = None;

        self.dispatch_events(notifier, store);

        // Draw once on entering pause; the sink then holds the frozen frame
        if self.state.phase != GamePhase::Paused || !was_paused {
            if let Err(e) = renderer.render(&self.state.snapshot()) {
                log::warn!("Render error: {}", e);
                notifier.notify(&format!("Render error: {}", e));
            }
        }

        if self.state.phase == GamePhase::GameOver {
            LoopControl::Stop
        } else {
            LoopControl::Continue
        }
    }

    fn dispatch_events(
        &mut self,
        notifier: &mut dyn NotificationSink,
        store: &mut dyn KeyValueStore,
    ) {
        for message in self.state.events.iter().filter_map(GameEvent::message) {
            notifier.notify(&message);
        }

        let final_score = self.state.events.iter().find_map(|e| match e {
            GameEvent::GameOver { score } => Some(*score),
            _ => None,
        });
        if let Some(score) = final_score {
            self.record_score(score, notifier, store);
        }
    }

    fn record_score(
        &mut self,
        score: u64,
        notifier: &mut dyn NotificationSink,
        store: &mut dyn KeyValueStore,
    ) {
        match save_if_higher(store, score) {
            Ok(true) => notifier.notify(&format!("New high score: {}!", score)),
            Ok(false) => {}
            Err(e) => {
                log::warn!("Failed to save high score: {}", e);
                notifier.notify(&format!("Could not save high score: {}", e));
            }
        }
        self.state.high_score = self.state.high_score.max(score);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{RenderError, StoreError};
    use crate::highscores::HIGH_SCORE_KEY;
    use crate::persistence::MemoryStore;
    use crate::platform::NotificationLog;
    use crate::renderer::TextRenderer;
    use crate::sim::{Obstacle, ObstacleKind, Snapshot};
    use glam::Vec2;

    #[derive(Default)]
    struct CountingRenderer {
        frames: usize,
        last_score: u64,
        fail: bool,
    }

    impl RenderSink for CountingRenderer {
        fn render(&mut self, snapshot: &Snapshot<'_>) -> Result<(), RenderError> {
            self.frames += 1;
            self.last_score = snapshot.score;
            if self.fail {
                Err(RenderError::SurfaceLost)
            } else {
                Ok(())
            }
        }
    }

    /// Storage that rejects everything, like LocalStorage in private mode
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Unavailable)
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable)
        }
    }

    fn started() -> GameLoop {
        let mut game = GameLoop::new(Tuning::default(), 77).unwrap();
        game.restart();
        game
    }

    fn drop_obstacle_on_player(game: &mut GameLoop) {
        let id = game.state.next_entity_id();
        let pos = game.state.player.pos;
        game.state.obstacles.push(Obstacle {
            id,
            pos,
            size: Vec2::splat(40.0),
            vel_y: 0.0,
            kind: ObstacleKind::Rock,
        });
    }

    #[test]
    fn test_new_rejects_invalid_tuning() {
        let tuning = Tuning {
            power_up_spawn_ms: -5000.0,
            ..Default::default()
        };
        assert!(GameLoop::new(tuning, 1).is_err());
    }

    #[test]
    fn test_dt_from_timestamps_is_clamped() {
        let mut game = started();
        let (mut r, mut n, mut s) = (
            CountingRenderer::default(),
            NotificationLog::default(),
            MemoryStore::new(),
        );
        game.frame(1000.0, &mut r, &mut n, &mut s);
        assert!((game.state().game_time - FRAME_MS).abs() < 1e-4);

        game.frame(1010.0, &mut r, &mut n, &mut s);
        assert!((game.state().game_time - (FRAME_MS + 10.0)).abs() < 1e-3);

        // A long stall only counts as one max-length frame
        game.frame(60_000.0, &mut r, &mut n, &mut s);
        assert!((game.state().game_time - (FRAME_MS + 10.0 + MAX_FRAME_MS)).abs() < 1e-3);
        assert_eq!(r.frames, 3);
    }

    #[test]
    fn test_pause_skips_render_and_time() {
        let mut game = started();
        let (mut r, mut n, mut s) = (
            CountingRenderer::default(),
            NotificationLog::default(),
            MemoryStore::new(),
        );
        game.frame(0.0, &mut r, &mut n, &mut s);
        game.input_mut().pause = true;
        assert_eq!(game.frame(16.0, &mut r, &mut n, &mut s), LoopControl::Continue);
        let frozen = game.state().game_time;
        assert_eq!(r.frames, 2);

        // Paused for ten seconds
        for i in 1..=600 {
            let control = game.frame(16.0 + i as f64 * 16.0, &mut r, &mut n, &mut s);
            assert_eq!(control, LoopControl::Continue);
        }
        assert_eq!(game.state().game_time, frozen);
        assert_eq!(r.frames, 2);

        // Resuming advances by one frame, not by the paused interval
        game.input_mut().pause = true;
        game.frame(16.0 + 601.0 * 16.0, &mut r, &mut n, &mut s);
        assert_eq!(game.state().phase, GamePhase::Running);
        assert!((game.state().game_time - (frozen + 16.0)).abs() < 1e-3);
        assert_eq!(r.frames, 3);
    }

    #[test]
    fn test_pause_screen_drawn_once() {
        let mut game = started();
        let (mut r, mut n, mut s) = (
            TextRenderer::new(20, 10),
            NotificationLog::default(),
            MemoryStore::new(),
        );
        game.frame(0.0, &mut r, &mut n, &mut s);
        game.input_mut().pause = true;
        for i in 1..100 {
            game.frame(i as f64 * 16.0, &mut r, &mut n, &mut s);
        }

        assert_eq!(game.state().phase, GamePhase::Paused);
        assert_eq!(r.frames_drawn(), 2);
        let hud = r.last_frame().lines().next().unwrap();
        assert!(hud.ends_with("[paused]"));
    }

    #[test]
    fn test_game_over_stops_and_saves_high_score() {
        let mut game = started();
        let (mut r, mut n, mut s) = (
            CountingRenderer::default(),
            NotificationLog::default(),
            MemoryStore::new(),
        );
        game.state.lives = 1;
        game.state.score = 340;
        drop_obstacle_on_player(&mut game);

        let control = game.frame(0.0, &mut r, &mut n, &mut s);

        assert_eq!(control, LoopControl::Stop);
        assert_eq!(game.state().phase, GamePhase::GameOver);
        assert_eq!(s.get(HIGH_SCORE_KEY), Ok(Some("340".to_string())));
        assert_eq!(game.state().high_score, 340);
        assert!(n.messages.iter().any(|m| m == "New high score: 340!"));
        // The game-over frame is still drawn
        assert_eq!(r.last_score, 340);

        game.restart();
        assert_eq!(game.frame(100.0, &mut r, &mut n, &mut s), LoopControl::Continue);
        assert_eq!(game.state().score, 0);
        assert_eq!(game.state().high_score, 340);
    }

    #[test]
    fn test_lower_score_does_not_overwrite() {
        let mut game = started();
        let (mut r, mut n, mut s) = (
            CountingRenderer::default(),
            NotificationLog::default(),
            MemoryStore::new(),
        );
        s.set(HIGH_SCORE_KEY, "1000").unwrap();
        game.load_high_score(&s, &mut n);
        assert_eq!(game.state().high_score, 1000);

        game.state.lives = 1;
        game.state.score = 20;
        drop_obstacle_on_player(&mut game);
        game.frame(0.0, &mut r, &mut n, &mut s);

        assert_eq!(s.get(HIGH_SCORE_KEY), Ok(Some("1000".to_string())));
        assert!(!n.messages.iter().any(|m| m.starts_with("New high score")));
    }

    #[test]
    fn test_sink_failures_do_not_stop_the_game() {
        let mut game = started();
        let mut r = CountingRenderer {
            fail: true,
            ..Default::default()
        };
        let mut n = NotificationLog::default();
        let mut s = BrokenStore;

        game.load_high_score(&s, &mut n);
        assert!(n.messages[0].starts_with("Could not load high score"));

        for i in 0..120 {
            assert_eq!(
                game.frame(i as f64 * 16.0, &mut r, &mut n, &mut s),
                LoopControl::Continue
            );
        }
        assert!(game.state().game_time > 1000.0);
        assert_eq!(r.frames, 120);
        assert!(n.messages.iter().any(|m| m == "Render error: render surface lost"));

        game.state.lives = 1;
        drop_obstacle_on_player(&mut game);
        assert_eq!(game.frame(2000.0, &mut r, &mut n, &mut s), LoopControl::Stop);
        assert!(
            n.messages
                .iter()
                .any(|m| m == "Could not save high score: storage is unavailable")
        );
    }

    #[test]
    fn test_one_shot_commands_cleared() {
        let mut game = started();
        let (mut r, mut n, mut s) = (
            CountingRenderer::default(),
            NotificationLog::default(),
            MemoryStore::new(),
        );
        game.input_mut().activate = Some(crate::sim::PowerUpKind::Magnet);
        game.input_mut().player_vx = Some(2.0);
        game.frame(0.0, &mut r, &mut n, &mut s);
        assert!(n.messages.iter().any(|m| m == "Power-up magnet activated!"));
        assert!(game.input_mut().activate.is_none());
        assert_eq!(game.input_mut().player_vx, Some(2.0));
    }

    #[test]
    fn test_stop_is_final() {
        let mut game = started();
        let (mut r, mut n, mut s) = (
            CountingRenderer::default(),
            NotificationLog::default(),
            MemoryStore::new(),
        );
        game.stop();
        assert!(game.is_stopped());
        assert_eq!(game.frame(0.0, &mut r, &mut n, &mut s), LoopControl::Stop);
        assert_eq!(r.frames, 0);
    }
}
