//! Nearest-particle lookup for the picking tools.

use crate::engine::{Particle, ParticleId};
use glam::Vec2;

/// Converts a screen-pixel tolerance into world units at the given zoom.
pub fn screen_to_world_distance(pixels: f32, zoom: f32) -> f32 {
    pixels / zoom.max(f32::EPSILON)
}

/// Finds the live particle closest to `position` whose rim lies within
/// `tolerance` world units. Ties keep the earlier particle.
pub fn nearest_particle(particles: &[Particle], position: Vec2, tolerance: f32) -> Option<ParticleId> {
    let mut best: Option<(ParticleId, f32)> = None;
    for particle in particles.iter().filter(|p| p.is_live()) {
        let distance = particle.position.distance(position);
        if distance > particle.size + tolerance {
            continue;
        }
        if best.is_none_or(|(_, best_distance)| distance < best_distance) {
            best = Some((particle.id, distance));
        }
    }
    best.map(|(id, _)| id)
}

/// Live particles whose body intersects a circle of `radius` around `position`.
pub fn particles_within(particles: &[Particle], position: Vec2, radius: f32) -> Vec<ParticleId> {
    particles
        .iter()
        .filter(|p| p.is_live() && p.position.distance(position) < radius + p.size)
        .map(|p| p.id)
        .collect()
}
