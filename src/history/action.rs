//! Reversible edit records.

use crate::engine::{Joint, Particle, ParticleId};
use serde::{Deserialize, Serialize};

/// What an [`UndoAction`] describes; decides how it is inverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UndoKind {
    SpawnSingle,
    SpawnBatch,
    RemoveSingle,
    RemoveBatch,
    SystemClear,
    JointCreate,
    JointRemove,
    PinToggle,
    DrawBatch,
    ShapeSpawn,
}

impl UndoKind {
    /// Kinds whose forward direction adds particles.
    pub fn adds_particles(self) -> bool {
        matches!(
            self,
            Self::SpawnSingle | Self::SpawnBatch | Self::DrawBatch | Self::ShapeSpawn
        )
    }

    /// Kinds whose forward direction removes particles.
    pub fn removes_particles(self) -> bool {
        matches!(
            self,
            Self::RemoveSingle | Self::RemoveBatch | Self::SystemClear
        )
    }
}

/// Particle id counter before and after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdCounterSpan {
    pub before: u64,
    pub after: u64,
}

/// Flags flipped by the pin tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinChange {
    pub particle: ParticleId,
    pub previous_pinned: bool,
    pub previous_grabbed: bool,
    pub pinned: bool,
}

/// Immutable description of one finished edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UndoAction {
    pub kind: UndoKind,
    /// Full particle snapshots taken when the action was finalized.
    pub particles: Vec<Particle>,
    pub joints: Vec<Joint>,
    pub id_counter: Option<IdCounterSpan>,
    pub pin: Option<PinChange>,
}

impl UndoAction {
    fn with_particles(kind: UndoKind, particles: Vec<Particle>, joints: Vec<Joint>) -> Self {
        Self {
            kind,
            particles,
            joints,
            id_counter: None,
            pin: None,
        }
    }

    /// Spawn record; one particle becomes `SpawnSingle`, more become `SpawnBatch`.
    pub fn spawn(particles: Vec<Particle>, id_counter: IdCounterSpan) -> Self {
        let kind = if particles.len() == 1 {
            UndoKind::SpawnSingle
        } else {
            UndoKind::SpawnBatch
        };
        Self::with_particles(kind, particles, Vec::new()).with_id_counter(id_counter)
    }

    /// Stream record; always a batch, even for a single particle.
    pub fn stream(particles: Vec<Particle>, id_counter: IdCounterSpan) -> Self {
        Self::with_particles(UndoKind::SpawnBatch, particles, Vec::new())
            .with_id_counter(id_counter)
    }

    pub fn draw(particles: Vec<Particle>, joints: Vec<Joint>, id_counter: IdCounterSpan) -> Self {
        Self::with_particles(UndoKind::DrawBatch, particles, joints).with_id_counter(id_counter)
    }

    pub fn shape(particles: Vec<Particle>, joints: Vec<Joint>, id_counter: IdCounterSpan) -> Self {
        Self::with_particles(UndoKind::ShapeSpawn, particles, joints).with_id_counter(id_counter)
    }

    /// Removal record holding pre-removal snapshots and the joints they had.
    pub fn remove(particles: Vec<Particle>, joints: Vec<Joint>) -> Self {
        let kind = if particles.len() == 1 {
            UndoKind::RemoveSingle
        } else {
            UndoKind::RemoveBatch
        };
        Self::with_particles(kind, particles, joints)
    }

    pub fn clear(particles: Vec<Particle>, joints: Vec<Joint>, id_counter: u64) -> Self {
        Self::with_particles(UndoKind::SystemClear, particles, joints).with_id_counter(
            IdCounterSpan {
                before: id_counter,
                after: id_counter,
            },
        )
    }

    pub fn joint_create(joint: Joint) -> Self {
        Self::with_particles(UndoKind::JointCreate, Vec::new(), vec![joint])
    }

    pub fn joint_remove(joints: Vec<Joint>) -> Self {
        Self::with_particles(UndoKind::JointRemove, Vec::new(), joints)
    }

    pub fn pin_toggle(change: PinChange) -> Self {
        Self {
            kind: UndoKind::PinToggle,
            particles: Vec::new(),
            joints: Vec::new(),
            id_counter: None,
            pin: Some(change),
        }
    }

    pub fn with_id_counter(mut self, span: IdCounterSpan) -> Self {
        self.id_counter = Some(span);
        self
    }

    /// Whether the record carries any change worth keeping.
    pub fn is_empty(&self) -> bool {
        match self.kind {
            UndoKind::PinToggle => self.pin.is_none(),
            UndoKind::JointCreate | UndoKind::JointRemove => self.joints.is_empty(),
            UndoKind::SystemClear => self.particles.is_empty() && self.joints.is_empty(),
            _ => self.particles.is_empty(),
        }
    }
}
