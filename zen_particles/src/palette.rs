//! Colours: the presets offered by the colour control, and ARGB helpers
//! for the framebuffer.

use particle_morph::Rgb;

/// Colour presets cycled by the colour key, as `#rrggbb` strings (the same
/// form an external colour picker hands to `AppState::set_color`).
pub const PRESETS: [&str; 8] = [
    "#4facfe", // sky
    "#00f2fe", // cyan
    "#ff6b9d", // rose
    "#ffd166", // amber
    "#9b5de5", // violet
    "#06d6a0", // jade
    "#ff7b00", // ember
    "#ffffff", // white
];

/// The preset after `current`, wrapping around.  A colour that is not a
/// preset starts the cycle from the top.
pub fn next_preset(current: Rgb) -> &'static str {
    let idx = PRESETS.iter()
        .position(|hex| Rgb::from_hex(hex).map_or(false, |c| c == current));
    match idx {
        Some(i) => PRESETS[(i + 1) % PRESETS.len()],
        None    => PRESETS[0],
    }
}

/// Add `color · intensity` to a packed ARGB pixel, saturating per channel.
#[inline]
pub fn add_argb(dst: u32, color: Rgb, intensity: f32) -> u32 {
    let k = intensity.clamp(0.0, 1.0);
    let add = |shift: u32, c: u8| {
        let cur = (dst >> shift) & 0xFF;
        let inc = (c as f32 * k) as u32;
        (cur + inc).min(0xFF) << shift
    };
    0xFF00_0000 | add(16, color.r) | add(8, color.g) | add(0, color.b)
}

/// Alpha-blend two ARGB colours. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
pub fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |ca: u32, cb: u32| (ca as f32 * (1.0 - t) + cb as f32 * t) as u32;
    let ar = (a >> 16) & 0xFF; let br = (b >> 16) & 0xFF;
    let ag = (a >>  8) & 0xFF; let bg = (b >>  8) & 0xFF;
    let ab =  a        & 0xFF; let bb =  b        & 0xFF;
    0xFF000000 | (lerp(ar, br) << 16) | (lerp(ag, bg) << 8) | lerp(ab, bb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use particle_morph::DEFAULT_COLOR;

    #[test]
    fn presets_all_parse() {
        for hex in PRESETS {
            assert!(Rgb::from_hex(hex).is_ok(), "{} does not parse", hex);
        }
    }

    #[test]
    fn default_colour_is_first_preset() {
        assert_eq!(Rgb::from_hex(PRESETS[0]), Ok(DEFAULT_COLOR));
        assert_eq!(next_preset(DEFAULT_COLOR), PRESETS[1]);
    }

    #[test]
    fn cycle_wraps_and_restarts() {
        let last = Rgb::from_hex(PRESETS[PRESETS.len() - 1]).unwrap();
        assert_eq!(next_preset(last), PRESETS[0]);
        assert_eq!(next_preset(Rgb::new(1, 2, 3)), PRESETS[0]);
    }

    #[test]
    fn additive_saturates() {
        let white = Rgb::new(255, 255, 255);
        let mut px = 0xFF000000;
        for _ in 0..10 { px = add_argb(px, white, 0.5); }
        assert_eq!(px, 0xFFFFFFFF);
        assert_eq!(add_argb(0xFF000000, Rgb::new(200, 100, 0), 0.5), 0xFF643200);
    }

    #[test]
    fn blend_endpoints() {
        assert_eq!(blend(0xFF000000, 0xFFFFFFFF, 0.0), 0xFF000000);
        assert_eq!(blend(0xFF000000, 0xFFFFFFFF, 1.0), 0xFFFFFFFF);
    }
}
