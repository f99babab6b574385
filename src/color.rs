//! RGBA color handling: hex/named parsing and HSV conversion.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::opaque(0, 0, 0);
    pub const WHITE: Rgba = Rgba::opaque(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }
}

/// CSS color names resolvable by [`parse_color`]. Covers the palette the
/// generator itself draws with plus common user choices.
const NAMED_COLORS: &[(&str, Rgba)] = &[
    ("black", Rgba::opaque(0, 0, 0)),
    ("white", Rgba::opaque(255, 255, 255)),
    ("gray", Rgba::opaque(128, 128, 128)),
    ("darkgray", Rgba::opaque(169, 169, 169)),
    ("dimgray", Rgba::opaque(105, 105, 105)),
    ("lightgray", Rgba::opaque(211, 211, 211)),
    ("silver", Rgba::opaque(192, 192, 192)),
    ("red", Rgba::opaque(255, 0, 0)),
    ("darkred", Rgba::opaque(139, 0, 0)),
    ("green", Rgba::opaque(0, 128, 0)),
    ("darkgreen", Rgba::opaque(0, 100, 0)),
    ("lightgreen", Rgba::opaque(144, 238, 144)),
    ("forestgreen", Rgba::opaque(34, 139, 34)),
    ("olive", Rgba::opaque(128, 128, 0)),
    ("blue", Rgba::opaque(0, 0, 255)),
    ("darkblue", Rgba::opaque(0, 0, 139)),
    ("navy", Rgba::opaque(0, 0, 128)),
    ("royalblue", Rgba::opaque(65, 105, 225)),
    ("steelblue", Rgba::opaque(70, 130, 180)),
    ("cyan", Rgba::opaque(0, 255, 255)),
    ("teal", Rgba::opaque(0, 128, 128)),
    ("yellow", Rgba::opaque(255, 255, 0)),
    ("gold", Rgba::opaque(255, 215, 0)),
    ("orange", Rgba::opaque(255, 165, 0)),
    ("darkorange", Rgba::opaque(255, 140, 0)),
    ("brown", Rgba::opaque(165, 42, 42)),
    ("saddlebrown", Rgba::opaque(139, 69, 19)),
    ("sienna", Rgba::opaque(160, 82, 45)),
    ("peru", Rgba::opaque(205, 133, 63)),
    ("tan", Rgba::opaque(210, 180, 140)),
    ("khaki", Rgba::opaque(240, 230, 140)),
    ("beige", Rgba::opaque(245, 245, 220)),
    ("violet", Rgba::opaque(238, 130, 238)),
    ("purple", Rgba::opaque(128, 0, 128)),
    ("magenta", Rgba::opaque(255, 0, 255)),
    ("pink", Rgba::opaque(255, 192, 203)),
    ("hotpink", Rgba::opaque(255, 105, 180)),
    ("salmon", Rgba::opaque(250, 128, 114)),
    ("snow", Rgba::opaque(255, 250, 250)),
    ("ivory", Rgba::opaque(255, 255, 240)),
];

/// Resolve `#RRGGBB`, `#RRGGBBAA`, or a named color.
pub fn parse_color(s: &str) -> Result<Rgba, ConfigError> {
    let trimmed = s.trim();
    if let Some(hex) = trimmed.strip_prefix('#') {
        return parse_hex(hex).ok_or_else(|| ConfigError::UnknownColor(s.to_string()));
    }
    let lower = trimmed.to_ascii_lowercase();
    NAMED_COLORS
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, c)| *c)
        .ok_or_else(|| ConfigError::UnknownColor(s.to_string()))
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    match hex.len() {
        6 => Some(Rgba::opaque(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Rgba::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => None,
    }
}

/// Parse an `R,G,B,A` quadruple of 0-255 components.
pub fn parse_rgba_tuple(s: &str) -> Result<Rgba, ConfigError> {
    let parts: Vec<u8> = s
        .split(',')
        .map(|p| p.trim().parse::<u8>())
        .collect::<Result<_, _>>()
        .map_err(|_| ConfigError::UnknownColor(s.to_string()))?;
    match parts[..] {
        [r, g, b, a] => Ok(Rgba::new(r, g, b, a)),
        _ => Err(ConfigError::UnknownColor(s.to_string())),
    }
}

/// Convert RGB to HSV. Returns (hue 0-360, saturation 0-1, value 0-1).
pub fn rgb_to_hsv(c: Rgba) -> (f32, f32, f32) {
    let r = c.r as f32 / 255.0;
    let g = c.g as f32 / 255.0;
    let b = c.b as f32 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let h = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (((g - b) / delta).rem_euclid(6.0))
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };
    let s = if max == 0.0 { 0.0 } else { delta / max };

    (h, s, max)
}

/// Convert HSV back to RGB bytes.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (u8, u8, u8) {
    let h = h % 360.0;
    let s = s.clamp(0.0, 1.0);
    let v = v.clamp(0.0, 1.0);

    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match (h / 60.0) as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    (
        ((r + m) * 255.0) as u8,
        ((g + m) * 255.0) as u8,
        ((b + m) * 255.0) as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_color("#00FF00"), Ok(Rgba::opaque(0, 255, 0)));
        assert_eq!(parse_color("#11223344"), Ok(Rgba::new(0x11, 0x22, 0x33, 0x44)));
    }

    #[test]
    fn test_parse_named_color() {
        assert_eq!(parse_color("saddlebrown"), Ok(Rgba::opaque(139, 69, 19)));
        assert_eq!(parse_color("LightGreen"), Ok(Rgba::opaque(144, 238, 144)));
    }

    #[test]
    fn test_parse_color_rejects_unknown() {
        assert!(matches!(
            parse_color("not-a-color"),
            Err(ConfigError::UnknownColor(_))
        ));
        assert!(matches!(
            parse_color("#12345"),
            Err(ConfigError::UnknownColor(_))
        ));
    }

    #[test]
    fn test_parse_rgba_tuple() {
        assert_eq!(
            parse_rgba_tuple("255, 255, 255, 128"),
            Ok(Rgba::new(255, 255, 255, 128))
        );
        assert!(parse_rgba_tuple("1,2,3").is_err());
        assert!(parse_rgba_tuple("1,2,3,400").is_err());
    }

    #[test]
    fn test_hsv_round_trip_primaries() {
        for c in [
            Rgba::opaque(255, 0, 0),
            Rgba::opaque(0, 255, 0),
            Rgba::opaque(0, 0, 255),
            Rgba::opaque(139, 69, 19),
        ] {
            let (h, s, v) = rgb_to_hsv(c);
            let (r, g, b) = hsv_to_rgb(h, s, v);
            assert!((r as i32 - c.r as i32).abs() <= 2);
            assert!((g as i32 - c.g as i32).abs() <= 2);
            assert!((b as i32 - c.b as i32).abs() <= 2);
        }
    }

    #[test]
    fn test_value_attenuation_darkens() {
        let (h, s, v) = rgb_to_hsv(Rgba::opaque(0, 0, 255));
        let (_, _, b_wide) = hsv_to_rgb(h, s, v / 20f32.powf(0.3));
        let (_, _, b_narrow) = hsv_to_rgb(h, s, v / 1f32.powf(0.3));
        assert!(b_wide < b_narrow);
    }
}
