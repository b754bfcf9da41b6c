//! Minimal in-memory particle and joint storage.

use super::{Joint, JointSystem, Particle, ParticleId, ParticleSystem};
use log::debug;

/// Vector-backed [`ParticleSystem`] with a monotonically increasing id counter.
#[derive(Debug, Clone)]
pub struct SandboxSystem {
    particles: Vec<Particle>,
    next_id: u64,
}

impl Default for SandboxSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl SandboxSystem {
    pub fn new() -> Self {
        Self {
            particles: Vec::new(),
            next_id: 1,
        }
    }

    /// Drops particles marked for removal (zero mass) and returns their ids.
    ///
    /// Callers holding a [`JointSystem`] should detach joints for the returned ids.
    pub fn compact(&mut self) -> Vec<ParticleId> {
        let dead: Vec<ParticleId> = self
            .particles
            .iter()
            .filter(|p| !p.is_live())
            .map(|p| p.id)
            .collect();
        if !dead.is_empty() {
            self.particles.retain(|p| p.is_live());
            debug!("Compacted {} removed particles", dead.len());
        }
        dead
    }

    fn index_of(&self, id: ParticleId) -> Option<usize> {
        self.particles.iter().position(|p| p.id == id)
    }
}

impl ParticleSystem for SandboxSystem {
    fn add_particle(&mut self, mut particle: Particle) -> ParticleId {
        let id = ParticleId(self.next_id);
        self.next_id += 1;
        particle.id = id;
        self.particles.push(particle);
        id
    }

    fn insert_particle(&mut self, particle: Particle) {
        if particle.id.0 >= self.next_id {
            self.next_id = particle.id.0 + 1;
        }
        match self.index_of(particle.id) {
            Some(index) => self.particles[index] = particle,
            None => self.particles.push(particle),
        }
    }

    fn remove_particle(&mut self, id: ParticleId) -> Option<Particle> {
        let index = self.index_of(id)?;
        Some(self.particles.remove(index))
    }

    fn particle(&self, id: ParticleId) -> Option<&Particle> {
        self.particles.iter().find(|p| p.id == id)
    }

    fn particle_mut(&mut self, id: ParticleId) -> Option<&mut Particle> {
        self.particles.iter_mut().find(|p| p.id == id)
    }

    fn particles(&self) -> &[Particle] {
        &self.particles
    }

    fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    fn clear(&mut self) {
        self.particles.clear();
    }

    fn id_counter(&self) -> u64 {
        self.next_id
    }

    fn set_id_counter(&mut self, next: u64) {
        self.next_id = next;
    }
}

/// Vector-backed [`JointSystem`]. Rejects self-joints only.
#[derive(Debug, Clone, Default)]
pub struct SandboxJoints {
    joints: Vec<Joint>,
}

impl SandboxJoints {
    pub fn new() -> Self {
        Self::default()
    }
}

impl JointSystem for SandboxJoints {
    fn create_joint(&mut self, a: ParticleId, b: ParticleId, rest_length: f32) -> Option<Joint> {
        if a == b {
            return None;
        }
        let joint = Joint::new(a, b, rest_length);
        self.joints.push(joint);
        Some(joint)
    }

    fn joints(&self) -> &[Joint] {
        &self.joints
    }

    fn remove_joint(&mut self, a: ParticleId, b: ParticleId) -> bool {
        let before = self.joints.len();
        self.joints.retain(|joint| !joint.connects(a, b));
        self.joints.len() != before
    }

    fn remove_joints_for_particle(&mut self, id: ParticleId) -> Vec<Joint> {
        let (removed, kept): (Vec<Joint>, Vec<Joint>) =
            self.joints.iter().partition(|joint| joint.touches(id));
        self.joints = kept;
        removed
    }

    fn clear(&mut self) {
        self.joints.clear();
    }
}
