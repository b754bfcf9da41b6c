//! RGBA particle color and the named palette used by the spawn tools.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// RGBA color with floating-point components in the 0.0-1.0 range.
///
/// ```
/// use particle_playground::engine::Color;
/// let teal = Color::from_rgb8(0, 128, 128);
/// assert_eq!(teal.to_hex(), "#008080");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Builds an opaque color from 0-255 channel values.
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: 1.0,
        }
    }

    /// Parses `#rrggbb` or `rrggbb`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
        Some(Self::from_rgb8(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Formats the RGB channels as `#rrggbb`, ignoring alpha.
    pub fn to_hex(&self) -> String {
        let to_u8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "#{:02x}{:02x}{:02x}",
            to_u8(self.r),
            to_u8(self.g),
            to_u8(self.b)
        )
    }
}

pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);
pub const RED: Color = Color::new(1.0, 0.3, 0.3, 1.0);
pub const ORANGE: Color = Color::new(1.0, 0.6, 0.2, 1.0);
pub const YELLOW: Color = Color::new(1.0, 0.9, 0.3, 1.0);
pub const GREEN: Color = Color::new(0.4, 0.9, 0.4, 1.0);
pub const CYAN: Color = Color::new(0.3, 0.9, 1.0, 1.0);
pub const BLUE: Color = Color::new(0.3, 0.5, 1.0, 1.0);
pub const PURPLE: Color = Color::new(0.7, 0.4, 1.0, 1.0);
pub const PINK: Color = Color::new(1.0, 0.4, 0.8, 1.0);

/// Maps a palette name to its color (case-insensitive).
pub fn name_to_color(name: &str) -> Option<Color> {
    match name.to_lowercase().as_str() {
        "white" => Some(WHITE),
        "red" => Some(RED),
        "orange" => Some(ORANGE),
        "yellow" => Some(YELLOW),
        "green" => Some(GREEN),
        "cyan" => Some(CYAN),
        "blue" => Some(BLUE),
        "purple" => Some(PURPLE),
        "pink" => Some(PINK),
        _ => None,
    }
}
