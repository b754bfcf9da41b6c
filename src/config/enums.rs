//! Configuration enum types.

use crate::engine::{Color, color};
use log::warn;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// How the spawn tool turns a pointer gesture into particles.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum SpawnMode {
    /// Click spawns one particle; drag sizes it, Ctrl/Cmd-drag aims its velocity
    #[default]
    Single,
    /// Holding the pointer streams particles at `stream_rate`
    Stream,
    /// Dragging lays down a jointed chain
    Draw,
    /// Clicking stamps a jointed polygon
    Shape,
}

impl SpawnMode {
    pub fn next(self) -> Self {
        match self {
            Self::Single => Self::Stream,
            Self::Stream => Self::Draw,
            Self::Draw => Self::Shape,
            Self::Shape => Self::Single,
        }
    }
}

/// Whether spawned particles share one color or cycle through the palette.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ColorMode {
    #[default]
    Fixed,
    Palette,
}

/// Color specification - a palette name, a hex string, or RGB values.
///
/// # Examples
/// ```toml
/// color = "cyan"
/// color = "#ff8800"
/// color = [255, 128, 0]
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
#[serde(untagged)]
pub enum ColorSpec {
    /// Palette name (white, red, orange, yellow, green, cyan, blue, purple, pink) or `#rrggbb`
    Name(String),
    /// RGB color as [red, green, blue] where each component is 0-255
    Rgb([u8; 3]),
}

impl ColorSpec {
    /// Resolves the color; unknown names fall back to white with a warning.
    pub fn to_color(&self) -> Color {
        match self {
            ColorSpec::Name(name) => color::name_to_color(name)
                .or_else(|| Color::from_hex(name))
                .unwrap_or_else(|| {
                    warn!("Unknown color '{}', using white", name);
                    color::WHITE
                }),
            ColorSpec::Rgb([r, g, b]) => Color::from_rgb8(*r, *g, *b),
        }
    }
}
