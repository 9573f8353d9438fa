//! Software rasteriser for the particle cloud.
//!
//! Points are rotated with the scene, projected through a pinhole camera on
//! the +z axis and splatted as soft round sprites with additive blending,
//! so dense regions glow.  Depth fades toward black with squared-exponential
//! fog.  The canvas knows nothing about windows; the visualizer copies
//! [`Canvas::pixels`] to the screen.

use particle_morph::Rgb;

use crate::palette::add_argb;

pub const BG_COLOR: u32 = 0xFF000000;

const NEAR_PLANE: f32 = 0.1;

// ════════════════════════════════════════════════════════════════════════════
// RenderStyle
// ════════════════════════════════════════════════════════════════════════════

/// How the cloud is drawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderStyle {
    /// Sprite diameter in world units.
    pub point_size:      f32,
    pub opacity:         f32,
    /// Camera sits at `(0, 0, camera_distance)` looking at the origin.
    pub camera_distance: f32,
    /// Vertical field of view in degrees.
    pub fov_deg:         f32,
    pub fog_density:     f32,
}

impl Default for RenderStyle {
    fn default() -> Self {
        RenderStyle {
            point_size:      0.8,
            opacity:         0.8,
            camera_distance: 35.0,
            fov_deg:         75.0,
            fog_density:     0.02,
        }
    }
}

/// Scene rotation (radians) after `elapsed_ms` of wall time.
pub fn scene_rotation(elapsed_ms: f64) -> (f32, f32) {
    let t = (elapsed_ms * 0.0005) as f32;
    (t * 0.05, t * 0.2) // (about x, about y)
}

// ════════════════════════════════════════════════════════════════════════════
// Canvas
// ════════════════════════════════════════════════════════════════════════════

pub struct Canvas {
    width:  usize,
    height: usize,
    buf:    Vec<u32>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Canvas { width, height, buf: vec![BG_COLOR; width * height] }
    }

    pub fn width(&self)  -> usize { self.width }
    pub fn height(&self) -> usize { self.height }
    pub fn pixels(&self) -> &[u32] { &self.buf }

    pub fn clear(&mut self) { self.buf.fill(BG_COLOR); }

    pub fn pixel(&self, x: usize, y: usize) -> u32 {
        self.buf[y * self.width + x]
    }

    // ── Particles ─────────────────────────────────────────────────────────

    /// Splat every point of a flat `[x, y, z, …]` buffer.
    pub fn draw_particles(
        &mut self,
        positions: &[f32],
        color:     Rgb,
        style:     &RenderStyle,
        rotation:  (f32, f32),
    ) {
        let (sin_x, cos_x) = rotation.0.sin_cos();
        let (sin_y, cos_y) = rotation.1.sin_cos();
        let half_w = self.width as f32 / 2.0;
        let half_h = self.height as f32 / 2.0;
        let focal  = half_h / (style.fov_deg.to_radians() / 2.0).tan();

        for p in positions.chunks_exact(3) {
            // Rotate about y, then about x.
            let x1 =  p[0] * cos_y + p[2] * sin_y;
            let z1 = -p[0] * sin_y + p[2] * cos_y;
            let y2 =  p[1] * cos_x - z1 * sin_x;
            let z2 =  p[1] * sin_x + z1 * cos_x;

            let depth = style.camera_distance - z2;
            if depth <= NEAR_PLANE { continue; }

            let sx = half_w + x1 * focal / depth;
            let sy = half_h - y2 * focal / depth;
            let radius = (style.point_size * half_h / depth / 2.0).max(1.0);
            let fog = (-(style.fog_density * depth).powi(2)).exp();

            self.splat(sx, sy, radius, color, style.opacity * fog);
        }
    }

    /// Soft round sprite centred at `(cx, cy)`.
    fn splat(&mut self, cx: f32, cy: f32, radius: f32, color: Rgb, intensity: f32) {
        let x0 = (cx - radius).floor().max(0.0) as isize;
        let y0 = (cy - radius).floor().max(0.0) as isize;
        let x1 = ((cx + radius).ceil() as isize).min(self.width as isize - 1);
        let y1 = ((cy + radius).ceil() as isize).min(self.height as isize - 1);
        if x0 > x1 || y0 > y1 { return; }

        let r2 = radius * radius;
        for y in y0..=y1 {
            let dy = y as f32 + 0.5 - cy;
            for x in x0..=x1 {
                let dx = x as f32 + 0.5 - cx;
                let d2 = dx * dx + dy * dy;
                if d2 >= r2 { continue; }
                let falloff = 1.0 - d2 / r2;
                let idx = y as usize * self.width + x as usize;
                self.buf[idx] = add_argb(self.buf[idx], color, intensity * falloff);
            }
        }
    }

    // ── Primitives ────────────────────────────────────────────────────────

    pub fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(self.height) {
            for col in x..(x + w).min(self.width) {
                self.buf[row * self.width + col] = color;
            }
        }
    }

    fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < self.width && y < self.height {
            self.buf[y * self.width + x] = color;
        }
    }

    /// Pixel width of `text` drawn at `scale`.
    pub fn text_width(text: &str, scale: usize) -> usize {
        text.chars().count() * 4 * scale
    }

    /// Minimal bitmap font — 3×5 glyphs, each pixel drawn as a
    /// `scale`×`scale` block.
    pub fn draw_text(&mut self, text: &str, x: usize, y: usize, scale: usize, color: u32) {
        let scale = scale.max(1);
        let mut cx = x;
        for ch in text.chars() {
            for (row, &bits) in char_glyph(ch).iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) == 0 { continue; }
                    for sy in 0..scale {
                        for sx in 0..scale {
                            self.set_pixel(cx + col * scale + sx, y + row * scale + sy, color);
                        }
                    }
                }
            }
            cx += 4 * scale;
            if cx + 4 * scale > self.width { break; }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '(' => [0b010, 0b100, 0b100, 0b100, 0b010],
        ')' => [0b010, 0b001, 0b001, 0b001, 0b010],
        '%' => [0b101, 0b001, 0b010, 0b100, 0b101],
        '#' => [0b101, 0b111, 0b101, 0b111, 0b101],
        '[' => [0b110, 0b100, 0b100, 0b100, 0b110],
        ']' => [0b011, 0b001, 0b001, 0b001, 0b011],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
