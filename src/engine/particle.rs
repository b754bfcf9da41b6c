//! Particle and joint records shared with the physics engine.

use super::color::Color;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable particle identifier assigned by the particle system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticleId(pub u64);

impl fmt::Display for ParticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A simulated particle.
///
/// Carries everything needed to reconstruct it exactly, which is what the
/// undo log and session snapshots store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub id: ParticleId,
    pub position: Vec2,
    #[serde(default)]
    pub velocity: Vec2,
    #[serde(default)]
    pub acceleration: Vec2,
    pub mass: f32,
    /// Radius in world units.
    pub size: f32,
    pub color: Color,
    #[serde(default)]
    pub pinned: bool,
    /// Held by the grab tool; the engine skips force integration while set.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub grabbed: bool,
}

impl Particle {
    /// Creates a particle at rest. The id is a placeholder until the system assigns one.
    pub fn new(position: Vec2, size: f32, mass: f32, color: Color) -> Self {
        Self {
            id: ParticleId(0),
            position,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            mass,
            size,
            color,
            pinned: false,
            grabbed: false,
        }
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_pinned(mut self, pinned: bool) -> Self {
        self.pinned = pinned;
        self
    }

    /// Removal marks a particle by zeroing its mass; compaction happens later.
    pub fn is_live(&self) -> bool {
        self.mass > 0.0
    }
}

/// Distance constraint between two particles. The endpoint pair is unordered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Joint {
    pub a: ParticleId,
    pub b: ParticleId,
    pub rest_length: f32,
}

impl Joint {
    pub fn new(a: ParticleId, b: ParticleId, rest_length: f32) -> Self {
        Self { a, b, rest_length }
    }

    /// True when this joint links `a` and `b` in either order.
    pub fn connects(&self, a: ParticleId, b: ParticleId) -> bool {
        (self.a == a && self.b == b) || (self.a == b && self.b == a)
    }

    pub fn touches(&self, id: ParticleId) -> bool {
        self.a == id || self.b == id
    }
}
