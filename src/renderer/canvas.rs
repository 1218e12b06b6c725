//! Canvas 2D renderer

use std::f64::consts::TAU;

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::{StateStack, css_color, with_saved_state};
use crate::consts::EFFECT_DONE;
use crate::error::RenderError;
use crate::platform::RenderSink;
use crate::sim::{EffectKind, GamePhase, Heart, ObstacleKind, PowerUpKind, Snapshot};

impl StateStack for CanvasRenderingContext2d {
    fn save(&self) {
        CanvasRenderingContext2d::save(self);
    }

    fn restore(&self) {
        CanvasRenderingContext2d::restore(self);
    }
}

const BACKGROUND: &str = "#1a1a2e";
const PLAYER_COLOR: &str = "#ff6b6b";
const OBSTACLE_COLOR: &str = "#6c757d";

fn js_err(e: wasm_bindgen::JsValue) -> RenderError {
    RenderError::Other(format!("{:?}", e))
}

/// Draws snapshots onto an HTML canvas, scaled to fit the play field
pub struct CanvasRenderer {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasRenderer {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, RenderError> {
        let ctx = canvas
            .get_context("2d")
            .map_err(js_err)?
            .ok_or(RenderError::SurfaceLost)?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| RenderError::Other("not a 2d context".to_string()))?;
        Ok(Self { canvas, ctx })
    }

    /// Draw a heart rotated about its center
    fn draw_heart(&self, h: &Heart) -> Result<(), RenderError> {
        with_saved_state(&self.ctx, || self.heart_path(h))
    }

    fn heart_path(&self, h: &Heart) -> Result<(), RenderError> {
        let ctx = &self.ctx;
        let w = h.size.x as f64;
        let c = h.center();
        ctx.translate(c.x as f64, c.y as f64).map_err(js_err)?;
        ctx.rotate(h.rotation as f64).map_err(js_err)?;
        ctx.begin_path();
        ctx.move_to(0.0, w * 0.3);
        ctx.bezier_curve_to(-w * 0.5, -w * 0.05, -w * 0.25, -w * 0.5, 0.0, -w * 0.2);
        ctx.bezier_curve_to(w * 0.25, -w * 0.5, w * 0.5, -w * 0.05, 0.0, w * 0.3);
        ctx.close_path();
        ctx.set_fill_style_str(&css_color(h.color));
        ctx.fill();
        Ok(())
    }

    fn draw_hud(&self, snapshot: &Snapshot<'_>, width: f64, height: f64) -> Result<(), RenderError> {
        let ctx = &self.ctx;
        ctx.set_fill_style_str("#ffffff");
        ctx.set_font("16px sans-serif");
        ctx.fill_text(&format!("Score: {}", snapshot.score), 10.0, 22.0)
            .map_err(js_err)?;
        ctx.fill_text(&format!("Best: {}", snapshot.high_score), 10.0, 42.0)
            .map_err(js_err)?;
        ctx.fill_text(&"♥".repeat(snapshot.lives as usize), width - 70.0, 22.0)
            .map_err(js_err)?;

        let mut y = 62.0;
        for kind in PowerUpKind::ALL {
            let remaining = snapshot.timers.get(kind);
            if remaining > 0.0 {
                ctx.set_fill_style_str(&css_color(kind.color()));
                ctx.fill_text(&format!("{} {:.1}s", kind.as_str(), remaining / 1000.0), 10.0, y)
                    .map_err(js_err)?;
                y += 20.0;
            }
        }

        let banner = match snapshot.phase {
            GamePhase::NotStarted => Some("Tap to start"),
            GamePhase::Paused => Some("Paused"),
            GamePhase::GameOver => Some("Game Over"),
            GamePhase::Running => None,
        };
        if let Some(text) = banner {
            ctx.set_fill_style_str("rgba(0, 0, 0, 0.5)");
            ctx.fill_rect(0.0, 0.0, width, height);
            ctx.set_fill_style_str("#ffffff");
            ctx.set_font("32px sans-serif");
            ctx.set_text_align("center");
            ctx.fill_text(text, width / 2.0, height / 2.0).map_err(js_err)?;
            ctx.set_text_align("start");
        }
        Ok(())
    }
}

impl RenderSink for CanvasRenderer {
    fn render(&mut self, snapshot: &Snapshot<'_>) -> Result<(), RenderError> {
        if self.canvas.width() == 0 || self.canvas.height() == 0 {
            return Err(RenderError::SurfaceLost);
        }
        let ctx = &self.ctx;
        let field = snapshot.field;
        let width = field.x as f64;
        let height = field.y as f64;
        let scale_x = self.canvas.width() as f64 / width;
        let scale_y = self.canvas.height() as f64 / height;
        ctx.set_transform(scale_x, 0.0, 0.0, scale_y, 0.0, 0.0)
            .map_err(js_err)?;

        ctx.set_fill_style_str(BACKGROUND);
        ctx.fill_rect(0.0, 0.0, width, height);

        for p in snapshot.particles {
            ctx.set_global_alpha((p.life / 1000.0).clamp(0.0, 1.0) as f64);
            ctx.set_fill_style_str(&css_color(p.color));
            ctx.begin_path();
            ctx.arc(p.pos.x as f64, p.pos.y as f64, p.size as f64 / 2.0, 0.0, TAU)
                .map_err(js_err)?;
            ctx.fill();
        }
        ctx.set_global_alpha(1.0);

        for e in snapshot.effects {
            let t = (e.progress / EFFECT_DONE).clamp(0.0, 1.0) as f64;
            ctx.set_global_alpha(1.0 - t);
            match e.kind {
                EffectKind::Explosion { radius } => {
                    ctx.set_stroke_style_str("#ffffff");
                    ctx.set_line_width(3.0);
                    ctx.begin_path();
                    ctx.arc(e.pos.x as f64, e.pos.y as f64, radius as f64 * t, 0.0, TAU)
                        .map_err(js_err)?;
                    ctx.stroke();
                }
                EffectKind::Combo { multiplier } => {
                    ctx.set_fill_style_str("#ffd166");
                    ctx.set_font("bold 24px sans-serif");
                    ctx.fill_text(
                        &format!("COMBO x{}", multiplier),
                        e.pos.x as f64,
                        e.pos.y as f64 - 40.0 * t,
                    )
                    .map_err(js_err)?;
                }
            }
        }
        ctx.set_global_alpha(1.0);

        for p in snapshot.power_ups {
            let c = p.center();
            ctx.set_fill_style_str(&css_color(p.color));
            ctx.begin_path();
            ctx.arc(c.x as f64, c.y as f64, p.size.x as f64 / 2.0, 0.0, TAU)
                .map_err(js_err)?;
            ctx.fill();
        }

        ctx.set_fill_style_str(OBSTACLE_COLOR);
        for o in snapshot.obstacles {
            let (x, y, w, h) = (o.pos.x as f64, o.pos.y as f64, o.size.x as f64, o.size.y as f64);
            match o.kind {
                ObstacleKind::Rock => ctx.fill_rect(x, y, w, h),
                ObstacleKind::Spike => {
                    // Point down toward the player
                    ctx.begin_path();
                    ctx.move_to(x, y);
                    ctx.line_to(x + w, y);
                    ctx.line_to(x + w / 2.0, y + h);
                    ctx.close_path();
                    ctx.fill();
                }
            }
        }

        for h in snapshot.hearts {
            self.draw_heart(h)?;
        }

        let player = snapshot.player;
        ctx.set_fill_style_str(PLAYER_COLOR);
        ctx.fill_rect(
            player.pos.x as f64,
            player.pos.y as f64,
            player.size.x as f64,
            player.size.y as f64,
        );

        self.draw_hud(snapshot, width, height)
    }
}
