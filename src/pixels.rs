//! Float pixel-buffer boundary conversions.
//!
//! The external collaborator exchanges HxWx4 buffers with float channel
//! values in [0, 1]; internally everything is 8-bit RGBA. Round-tripping an
//! 8-bit value through the float side is exact within 1/255.

use crate::canvas::Canvas;
use crate::color::Rgba;
use crate::error::ConfigError;

/// Flatten the canvas into a row-major HxWx4 float buffer.
pub fn canvas_to_float(canvas: &Canvas) -> Vec<f32> {
    canvas.data().iter().map(|&b| b as f32 / 255.0).collect()
}

/// Rebuild a canvas from a row-major HxWx4 float buffer.
pub fn float_to_canvas(data: &[f32], width: u32, height: u32) -> Result<Canvas, ConfigError> {
    let expected = width as usize * height as usize * 4;
    if data.len() != expected {
        return Err(ConfigError::BufferShape {
            expected,
            actual: data.len(),
        });
    }
    let mut canvas = Canvas::new(width, height, Rgba::BLACK);
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            let i = (y as usize * width as usize + x as usize) * 4;
            let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
            canvas.set_pixel(
                x,
                y,
                Rgba::new(
                    channel(data[i]),
                    channel(data[i + 1]),
                    channel(data[i + 2]),
                    channel(data[i + 3]),
                ),
            );
        }
    }
    Ok(canvas)
}
