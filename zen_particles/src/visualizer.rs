//! Software-rendered visualizer using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       ZEN PARTICLES                          │
//! │                   [Hands Active (62%)]                       │
//! │                                                              │
//! │                    · particle cloud ·                        │
//! │                                                              │
//! │  1 Heart  2 Flower  3 Saturn  4 Buddha  5 Fireworks  6 Sphere│
//! │  key legend                                   colour #4facfe │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use std::sync::mpsc::Sender;
use std::time::Instant;

use minifb::{Key, KeyRepeat, MouseMode, Window, WindowOptions};
use particle_morph::{Rgb, ShapeKind};

use crate::app::AppError;
use crate::canvas::{scene_rotation, Canvas, RenderStyle};
use crate::palette::blend;
use crate::sim::SimInput;

// ════════════════════════════════════════════════════════════════════════════
// Layout constants
// ════════════════════════════════════════════════════════════════════════════

pub const WIN_W: usize = 1280;
pub const WIN_H: usize = 720;

const TEXT_SCALE:     usize = 2;
const TITLE_SCALE:    usize = 4;
const PANEL_H:        usize = 64;
const PANEL_BG:       u32   = 0xFF0C0C14;
const TITLE_COLOR:    u32   = 0xFFFFFFFF;
const ACTIVE_COLOR:   u32   = 0xFF7CF2A0;  // green pill text
const WAITING_COLOR:  u32   = 0xFFF2A0A0;  // red pill text
const SELECTED_COLOR: u32   = 0xFFFFFFFF;
const IDLE_COLOR:     u32   = 0xFF808090;
const LEGEND_COLOR:   u32   = 0xFF606070;

/// Arrow-key step for the simulated spread.
const NUDGE: f32 = 0.05;

// ════════════════════════════════════════════════════════════════════════════
// Control — what the window asks the app to do
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    SetShape(ShapeKind),
    NextColor,
    Quit,
}

/// Everything drawn in one frame.
pub struct Frame<'a> {
    pub positions: &'a [f32],
    pub color:     Rgb,
    pub shape:     ShapeKind,
    pub status:    &'a str,
    pub detected:  bool,
}

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window:  Window,
    canvas:  Canvas,
    style:   RenderStyle,
    sim_tx:  Sender<SimInput>,
    started: Instant,
    last_mouse_x: Option<f32>,
}

impl Visualizer {
    pub fn new(
        sim_tx: Sender<SimInput>,
        width:  usize,
        height: usize,
        style:  RenderStyle,
    ) -> Result<Self, AppError> {
        let mut window = Window::new(
            "Zen Particles — gesture-driven particle cloud",
            width, height,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            canvas: Canvas::new(width, height),
            style,
            sim_tx,
            started: Instant::now(),
            last_mouse_x: None,
        })
    }

    /// Returns false when the window should close.
    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Poll keyboard and mouse.  Control keys come back to the caller;
    /// hand-simulation input goes to the simulated detector.
    pub fn poll_input(&mut self) -> Vec<Control> {
        let mut controls = Vec::new();
        if !self.window.is_open() {
            controls.push(Control::Quit);
            return controls;
        }

        let one_shot = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);

        if one_shot(Key::Q) || one_shot(Key::Escape) {
            controls.push(Control::Quit);
        }

        let shape_keys = [Key::Key1, Key::Key2, Key::Key3, Key::Key4, Key::Key5, Key::Key6];
        for (key, kind) in shape_keys.iter().zip(ShapeKind::ALL) {
            if one_shot(*key) {
                controls.push(Control::SetShape(kind));
            }
        }

        if one_shot(Key::C) {
            controls.push(Control::NextColor);
        }

        // ── Simulated hands ───────────────────────────────────────────────
        if one_shot(Key::H) {
            let _ = self.sim_tx.send(SimInput::CycleHands);
        }
        if self.window.is_key_pressed(Key::Up, KeyRepeat::Yes) {
            let _ = self.sim_tx.send(SimInput::Nudge(NUDGE));
        }
        if self.window.is_key_pressed(Key::Down, KeyRepeat::Yes) {
            let _ = self.sim_tx.send(SimInput::Nudge(-NUDGE));
        }
        if let Some((mx, _)) = self.window.get_mouse_pos(MouseMode::Discard) {
            let spread = (mx / self.canvas.width() as f32).clamp(0.0, 1.0);
            let moved = self.last_mouse_x.map_or(true, |last| (last - spread).abs() > 1e-3);
            if moved {
                self.last_mouse_x = Some(spread);
                let _ = self.sim_tx.send(SimInput::Spread(spread));
            }
        }

        controls
    }

    /// Render one frame.
    pub fn render(&mut self, frame: &Frame<'_>) -> Result<(), AppError> {
        self.canvas.clear();

        let rotation = scene_rotation(self.started.elapsed().as_secs_f64() * 1000.0);
        self.canvas.draw_particles(frame.positions, frame.color, &self.style, rotation);

        self.draw_header(frame);
        self.draw_controls(frame);

        let (w, h) = (self.canvas.width(), self.canvas.height());
        self.window.update_with_buffer(self.canvas.pixels(), w, h)?;
        Ok(())
    }

    // ── Title + status pill ───────────────────────────────────────────────

    fn draw_header(&mut self, frame: &Frame<'_>) {
        let w = self.canvas.width();
        let title = "ZEN PARTICLES";
        let tx = w.saturating_sub(Canvas::text_width(title, TITLE_SCALE)) / 2;
        self.canvas.draw_text(title, tx, 24, TITLE_SCALE, TITLE_COLOR);

        let pill_color = if frame.detected { ACTIVE_COLOR } else { WAITING_COLOR };
        let sw = Canvas::text_width(frame.status, TEXT_SCALE);
        let sx = w.saturating_sub(sw) / 2;
        self.canvas.fill_rect(sx.saturating_sub(10), 56, sw + 20, 22, blend(PANEL_BG, pill_color, 0.15));
        self.canvas.draw_text(frame.status, sx, 62, TEXT_SCALE, pill_color);
    }

    // ── Shape selector + legend ───────────────────────────────────────────

    fn draw_controls(&mut self, frame: &Frame<'_>) {
        let (w, h) = (self.canvas.width(), self.canvas.height());
        let top = h.saturating_sub(PANEL_H);
        self.canvas.fill_rect(0, top, w, PANEL_H, PANEL_BG);

        let mut x = 16;
        for (i, kind) in ShapeKind::ALL.iter().enumerate() {
            let label = format!("{} {}", i + 1, kind.name());
            let color = if *kind == frame.shape { SELECTED_COLOR } else { IDLE_COLOR };
            if *kind == frame.shape {
                let lw = Canvas::text_width(&label, TEXT_SCALE);
                self.canvas.fill_rect(x - 4, top + 10, lw + 8, 2, frame.color.to_argb());
            }
            self.canvas.draw_text(&label, x, top + 16, TEXT_SCALE, color);
            x += Canvas::text_width(&label, TEXT_SCALE) + 24;
        }

        let swatch = format!("colour {}", frame.color);
        let sw = Canvas::text_width(&swatch, TEXT_SCALE);
        let sx = w.saturating_sub(sw + 40);
        self.canvas.fill_rect(sx, top + 14, 14, 14, frame.color.to_argb());
        self.canvas.draw_text(&swatch, sx + 20, top + 16, TEXT_SCALE, IDLE_COLOR);

        self.canvas.draw_text(
            "1-6=shape  C=colour  H=hands  mouse/up/down=spread  Q=quit",
            16, top + 42, TEXT_SCALE, LEGEND_COLOR,
        );
    }
}
