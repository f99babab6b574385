//! Per-pixel noise texturing.
//!
//! Perturbs R, G, B independently by an additive offset drawn from a
//! symmetric range, clamped to [0, 255]. Alpha is untouched. Pixels outside
//! the canvas are skipped without drawing from the random stream, so the
//! stream position depends only on the in-bounds pixels visited.

use crate::canvas::Canvas;
use crate::color::Rgba;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Amplitude used for whole-background texturing.
pub const BACKGROUND_NOISE_AMPLITUDE: i32 = 128;
/// Amplitude used to blend feature clusters into the background.
pub const FEATURE_NOISE_AMPLITUDE: i32 = 64;

/// Jitter every pixel of the rectangle `[x1, x2) x [y1, y2)` expanded by
/// `padding` on all sides. Traversal is column-major (x outer, y inner).
pub fn apply_noise(
    canvas: &mut Canvas,
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
    padding: i32,
    amplitude: i32,
    rng: &mut ChaCha8Rng,
) {
    for x in (x1 - padding)..(x2 + padding) {
        for y in (y1 - padding)..(y2 + padding) {
            let Some(pixel) = canvas.pixel(x, y) else {
                continue;
            };
            let r = jitter_channel(pixel.r, amplitude, rng);
            let g = jitter_channel(pixel.g, amplitude, rng);
            let b = jitter_channel(pixel.b, amplitude, rng);
            canvas.set_pixel(x, y, Rgba::new(r, g, b, pixel.a));
        }
    }
}

fn jitter_channel(value: u8, amplitude: i32, rng: &mut ChaCha8Rng) -> u8 {
    (value as i32 + rng.gen_range(-amplitude..=amplitude)).clamp(0, 255) as u8
}
