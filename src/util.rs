//! Geometry and timing helpers shared by the spawn tools.

use glam::Vec2;
use std::f32::consts::{PI, TAU};
use std::time::Duration;

/// Divisor turning a particle's area into its mass.
///
/// Preview and commit both go through [`area_mass`], so a previewed particle
/// always commits with the mass it displayed.
pub const MASS_SCALE: f32 = 100.0;

/// Area-proportional mass for a particle of the given radius.
pub fn area_mass(radius: f32) -> f32 {
    PI * radius * radius / MASS_SCALE
}

/// Period between streamed particles for a rate in particles per second.
pub fn stream_interval(rate: f32) -> Duration {
    let rate = if rate.is_finite() && rate > 0.0 { rate } else { 1.0 };
    Duration::from_micros((1_000_000.0 / rate).round().max(1.0) as u64)
}

/// Vertices of a regular polygon around `center`, first vertex straight up.
pub fn polygon_vertices(center: Vec2, sides: u32, radius: f32) -> Vec<Vec2> {
    (0..sides)
        .map(|i| {
            let angle = TAU * i as f32 / sides as f32 - PI / 2.0;
            center + Vec2::new(angle.cos(), angle.sin()) * radius
        })
        .collect()
}
