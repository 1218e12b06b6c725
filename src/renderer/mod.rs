//! Render sinks
//!
//! - `TextRenderer`: character grid, used by the native demo and tests
//! - `canvas::CanvasRenderer`: Canvas 2D on web

#[cfg(target_arch = "wasm32")]
pub mod canvas;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasRenderer;

use glam::Vec2;

use crate::error::RenderError;
use crate::platform::RenderSink;
use crate::sim::{GamePhase, HeartKind, ObstacleKind, PowerUpKind, Snapshot};

/// Format a 0xRRGGBB color as a CSS hex string
pub fn css_color(rgb: u32) -> String {
    format!("#{:06x}", rgb & 0xff_ffff)
}

/// A drawing surface with a save/restore stack for transforms and styles
pub trait StateStack {
    fn save(&self);
    fn restore(&self);
}

/// Run `draw` between `save` and `restore`. The state is restored even
/// when `draw` fails.
pub fn with_saved_state<S, T>(
    stack: &S,
    draw: impl FnOnce() -> Result<T, RenderError>,
) -> Result<T, RenderError>
where
    S: StateStack + ?Sized,
{
    stack.save();
    let result = draw();
    stack.restore();
    result
}

fn heart_glyph(kind: HeartKind) -> char {
    match kind {
        HeartKind::Normal => 'v',
        HeartKind::Golden => 'g',
        HeartKind::Rainbow => 'r',
        HeartKind::Diamond => 'd',
    }
}

fn power_up_glyph(kind: PowerUpKind) -> char {
    match kind {
        PowerUpKind::SlowTime => 'S',
        PowerUpKind::Magnet => 'M',
        PowerUpKind::DoublePoints => 'D',
    }
}

/// Draws each frame into a fixed-size character grid
pub struct TextRenderer {
    cols: usize,
    rows: usize,
    frame: String,
    frames: u64,
}

impl TextRenderer {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols: cols.max(1),
            rows: rows.max(1),
            frame: String::new(),
            frames: 0,
        }
    }

    /// The most recent frame, HUD line first
    pub fn last_frame(&self) -> &str {
        &self.frame
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames
    }

    fn cell(&self, field: Vec2, pos: Vec2) -> Option<(usize, usize)> {
        if pos.x < 0.0 || pos.y < 0.0 || pos.x >= field.x || pos.y >= field.y {
            return None;
        }
        let col = (pos.x / field.x * self.cols as f32) as usize;
        let row = (pos.y / field.y * self.rows as f32) as usize;
        Some((col.min(self.cols - 1), row.min(self.rows - 1)))
    }

    /// Fill every cell covered by a box
    fn fill(&self, grid: &mut [Vec<char>], field: Vec2, pos: Vec2, size: Vec2, glyph: char) {
        let end = pos + size;
        if end.x <= 0.0 || end.y <= 0.0 || pos.x >= field.x || pos.y >= field.y {
            return;
        }
        let min = pos.max(Vec2::ZERO);
        let max = end.min(field);
        let col_of = |x: f32| ((x / field.x * self.cols as f32) as usize).min(self.cols - 1);
        let row_of = |y: f32| ((y / field.y * self.rows as f32) as usize).min(self.rows - 1);
        let (c0, c1) = (col_of(min.x), col_of(max.x));
        let (r0, r1) = (row_of(min.y), row_of(max.y));
        for row in grid.iter_mut().take(r1 + 1).skip(r0) {
            for c in row.iter_mut().take(c1 + 1).skip(c0) {
                *c = glyph;
            }
        }
    }

    fn hud(snapshot: &Snapshot<'_>) -> String {
        let mut hud = format!(
            "Score: {}  Best: {}  Lives: {}",
            snapshot.score, snapshot.high_score, snapshot.lives
        );
        for kind in PowerUpKind::ALL {
            let remaining = snapshot.timers.get(kind);
            if remaining > 0.0 {
                hud.push_str(&format!("  {} {:.1}s", kind.as_str(), remaining / 1000.0));
            }
        }
        if snapshot.combo.active {
            hud.push_str("  COMBO");
        }
        match snapshot.phase {
            GamePhase::NotStarted => hud.push_str("  [press start]"),
            GamePhase::Paused => hud.push_str("  [paused]"),
            GamePhase::GameOver => hud.push_str("  [game over]"),
            GamePhase::Running => {}
        }
        hud
    }
}

impl RenderSink for TextRenderer {
    fn render(&mut self, snapshot: &Snapshot<'_>) -> Result<(), RenderError> {
        let field = snapshot.field;
        if field.x <= 0.0 || field.y <= 0.0 {
            return Err(RenderError::Other(format!("empty field {:?}", field)));
        }

        let mut grid = vec![vec![' '; self.cols]; self.rows];

        // Back to front: particles, pickups, hazards, hearts, player
        for p in snapshot.particles {
            if let Some((c, r)) = self.cell(field, p.pos) {
                grid[r][c] = '.';
            }
        }
        for p in snapshot.power_ups {
            self.fill(&mut grid, field, p.pos, p.size, power_up_glyph(p.kind));
        }
        for o in snapshot.obstacles {
            let glyph = match o.kind {
                ObstacleKind::Spike => '^',
                ObstacleKind::Rock => '#',
            };
            self.fill(&mut grid, field, o.pos, o.size, glyph);
        }
        for h in snapshot.hearts {
            self.fill(&mut grid, field, h.pos, h.size, heart_glyph(h.kind));
        }
        let player = snapshot.player;
        self.fill(&mut grid, field, player.pos, player.size, '=');

        let mut out = Self::hud(snapshot);
        out.push('\n');
        for row in &grid {
            out.push('|');
            out.extend(row.iter());
            out.push_str("|\n");
        }

        self.frame = out;
        self.frames += 1;
        log::trace!("Frame {} drawn", self.frames);
        Ok(())
    }
}
