//! Configuration type definitions.

use super::enums::{ColorMode, ColorSpec, SpawnMode};
use crate::engine::Color;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Spawn tool defaults.
///
/// The interaction layer reads these on every event, so edits made while a
/// gesture is running (slider changes) apply immediately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SpawnConfig {
    /// Radius of a clicked (not dragged) particle, in world units
    #[serde(default = "default_size")]
    pub default_size: f32,

    /// Mass of a clicked (not dragged) particle
    #[serde(default = "default_mass")]
    pub default_mass: f32,

    /// Smallest radius a drag can produce
    #[serde(default = "default_min_size")]
    pub min_size: f32,

    /// Largest radius a drag can produce at zoom 1.0 (scaled by 1/zoom)
    #[serde(default = "default_max_size")]
    pub max_size: f32,

    #[serde(default = "default_color")]
    pub color: ColorSpec,

    #[serde(default)]
    pub color_mode: ColorMode,

    /// Colors cycled through when `color_mode = "palette"`
    #[serde(default = "default_palette")]
    pub palette: Vec<ColorSpec>,

    #[serde(default)]
    pub mode: SpawnMode,

    /// Particles per second while streaming (valid range: 1 - 120)
    #[serde(default = "default_stream_rate")]
    pub stream_rate: f32,

    /// Distance between particles laid down by the draw tool, in world units
    #[serde(default = "default_draw_step")]
    pub draw_step: f32,

    /// Vertex count of stamped shapes (valid range: 3 - 12)
    #[serde(default = "default_shape_sides")]
    pub shape_sides: u32,

    /// Circumradius of stamped shapes, in world units
    #[serde(default = "default_shape_length")]
    pub shape_length: f32,

    /// Spawn particles already pinned
    #[serde(default)]
    pub pinned: bool,

    /// Velocity per world unit of Ctrl-drag distance
    #[serde(default = "default_velocity_scale")]
    pub velocity_scale: f32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            default_size: default_size(),
            default_mass: default_mass(),
            min_size: default_min_size(),
            max_size: default_max_size(),
            color: default_color(),
            color_mode: ColorMode::default(),
            palette: default_palette(),
            mode: SpawnMode::default(),
            stream_rate: default_stream_rate(),
            draw_step: default_draw_step(),
            shape_sides: default_shape_sides(),
            shape_length: default_shape_length(),
            pinned: false,
            velocity_scale: default_velocity_scale(),
        }
    }
}

impl SpawnConfig {
    /// Color for the `index`-th spawned particle.
    pub fn color_at(&self, index: usize) -> Color {
        match self.color_mode {
            ColorMode::Palette if !self.palette.is_empty() => {
                self.palette[index % self.palette.len()].to_color()
            }
            _ => self.color.to_color(),
        }
    }
}

/// Pointer tolerances, expressed in screen pixels and converted with the zoom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct InteractionConfig {
    /// Pointer travel before a press counts as a drag
    #[serde(default = "default_drag_threshold")]
    pub drag_threshold_px: f32,

    /// Reach of the removal brush
    #[serde(default = "default_removal_radius")]
    pub removal_radius_px: f32,

    /// Extra reach beyond a particle's rim when picking it
    #[serde(default = "default_pick_tolerance")]
    pub pick_tolerance_px: f32,

    /// Multiplier applied to the measured grab velocity on release
    #[serde(default = "default_throw_scale")]
    pub throw_scale: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            drag_threshold_px: default_drag_threshold(),
            removal_radius_px: default_removal_radius(),
            pick_tolerance_px: default_pick_tolerance(),
            throw_scale: default_throw_scale(),
        }
    }
}

/// Undo history settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HistoryConfig {
    /// Actions kept before the oldest is dropped (valid range: 1 - 1000)
    #[serde(default = "default_history_capacity")]
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_history_capacity(),
        }
    }
}

/// Session storage settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct SessionConfig {
    /// Directory for saved sessions; defaults to `<data dir>/particle-playground/sessions`
    #[serde(default)]
    pub storage_dir: Option<PathBuf>,
}

fn default_size() -> f32 {
    10.0
}

fn default_mass() -> f32 {
    1.0
}

fn default_min_size() -> f32 {
    3.0
}

fn default_max_size() -> f32 {
    50.0
}

fn default_color() -> ColorSpec {
    ColorSpec::Name("cyan".to_string())
}

fn default_palette() -> Vec<ColorSpec> {
    ["cyan", "pink", "yellow", "green", "purple", "orange"]
        .iter()
        .map(|name| ColorSpec::Name(name.to_string()))
        .collect()
}

fn default_stream_rate() -> f32 {
    10.0
}

fn default_draw_step() -> f32 {
    20.0
}

fn default_shape_sides() -> u32 {
    4
}

fn default_shape_length() -> f32 {
    50.0
}

fn default_velocity_scale() -> f32 {
    1.0
}

fn default_drag_threshold() -> f32 {
    5.0
}

fn default_removal_radius() -> f32 {
    20.0
}

fn default_pick_tolerance() -> f32 {
    8.0
}

fn default_throw_scale() -> f32 {
    1.0
}

fn default_history_capacity() -> usize {
    crate::history::DEFAULT_HISTORY_CAPACITY
}
