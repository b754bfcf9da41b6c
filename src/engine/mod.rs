//! Collaborator interfaces to the physics engine and renderer.
//!
//! The interaction layer never owns particles: it mutates a [`ParticleSystem`]
//! and [`JointSystem`] in place and only keeps [`ParticleId`]s, re-validating
//! them on every use. Preview visuals are pushed to a [`PreviewRenderer`].
//!
//! In-memory implementations ([`SandboxSystem`], [`SandboxJoints`],
//! [`PreviewBuffer`]) back the replay CLI and the test suite.

pub mod color;
pub mod particle;
pub mod preview;
pub mod sandbox;

pub use color::Color;
pub use particle::{Joint, Particle, ParticleId};
pub use preview::{
    Camera, JointPreview, PreviewBuffer, PreviewParticle, PreviewRenderer, RemovalPreview,
};
pub use sandbox::{SandboxJoints, SandboxSystem};

/// Live particle storage owned by the physics engine.
pub trait ParticleSystem {
    /// Adds a particle under a freshly allocated id and returns that id.
    fn add_particle(&mut self, particle: Particle) -> ParticleId;

    /// Re-inserts a particle under its existing id (undo, redo, session load).
    fn insert_particle(&mut self, particle: Particle);

    fn remove_particle(&mut self, id: ParticleId) -> Option<Particle>;

    fn particle(&self, id: ParticleId) -> Option<&Particle>;

    fn particle_mut(&mut self, id: ParticleId) -> Option<&mut Particle>;

    fn particles(&self) -> &[Particle];

    fn particles_mut(&mut self) -> &mut [Particle];

    fn clear(&mut self);

    /// Next id [`add_particle`](Self::add_particle) will hand out.
    fn id_counter(&self) -> u64;

    fn set_id_counter(&mut self, next: u64);

    /// Returns the particle only if it still exists and has not been marked for removal.
    fn live_particle(&self, id: ParticleId) -> Option<&Particle> {
        self.particle(id).filter(|p| p.is_live())
    }
}

/// Joint storage owned by the physics engine.
pub trait JointSystem {
    /// Creates a joint, or returns `None` when the engine rejects the pair.
    fn create_joint(&mut self, a: ParticleId, b: ParticleId, rest_length: f32) -> Option<Joint>;

    fn joints(&self) -> &[Joint];

    /// Removes the joint linking `a` and `b` in either order.
    fn remove_joint(&mut self, a: ParticleId, b: ParticleId) -> bool;

    /// Removes and returns every joint touching `id`.
    fn remove_joints_for_particle(&mut self, id: ParticleId) -> Vec<Joint>;

    fn clear(&mut self);

    fn has_joint(&self, a: ParticleId, b: ParticleId) -> bool {
        self.joints().iter().any(|joint| joint.connects(a, b))
    }

    fn joints_for_particle(&self, id: ParticleId) -> Vec<Joint> {
        self.joints()
            .iter()
            .filter(|joint| joint.touches(id))
            .copied()
            .collect()
    }
}
