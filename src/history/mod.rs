//! Linear undo/redo history for edit operations.
//!
//! Each finished edit is recorded as an [`UndoAction`] holding enough particle
//! and joint snapshots to reverse it. Undo pops the newest action, applies its
//! inverse to the engine and moves it to the redo stack; redo re-applies it.
//! Recording a new action clears the redo stack.

mod action;

pub use action::{IdCounterSpan, PinChange, UndoAction, UndoKind};

use crate::engine::{JointSystem, ParticleSystem};
use log::{debug, info};
use std::collections::VecDeque;

/// Default number of actions kept before the oldest is evicted.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Bounded undo stack plus redo stack.
#[derive(Debug, Clone)]
pub struct UndoLog {
    undo_stack: VecDeque<UndoAction>,
    redo_stack: Vec<UndoAction>,
    capacity: usize,
}

impl Default for UndoLog {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl UndoLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Pushes a finished action and clears the redo stack.
    ///
    /// Empty records are dropped. Returns `true` if the action was kept.
    pub fn record(&mut self, action: UndoAction) -> bool {
        if action.is_empty() {
            debug!("Dropping empty {:?} record", action.kind);
            return false;
        }

        debug!(
            "Recording {:?} ({} particles, {} joints)",
            action.kind,
            action.particles.len(),
            action.joints.len()
        );
        self.undo_stack.push_back(action);
        while self.undo_stack.len() > self.capacity {
            self.undo_stack.pop_front();
        }
        self.redo_stack.clear();
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Most recent undoable action, if any.
    pub fn last(&self) -> Option<&UndoAction> {
        self.undo_stack.back()
    }

    /// Reverts the newest action. Returns `false` when there is nothing to undo.
    pub fn undo(
        &mut self,
        system: &mut dyn ParticleSystem,
        joints: Option<&mut dyn JointSystem>,
    ) -> bool {
        let Some(action) = self.undo_stack.pop_back() else {
            return false;
        };
        revert(&action, system, joints);
        info!("Undid {:?}", action.kind);
        self.redo_stack.push(action);
        true
    }

    /// Re-applies the most recently undone action.
    pub fn redo(
        &mut self,
        system: &mut dyn ParticleSystem,
        joints: Option<&mut dyn JointSystem>,
    ) -> bool {
        let Some(action) = self.redo_stack.pop() else {
            return false;
        };
        reapply(&action, system, joints);
        info!("Redid {:?}", action.kind);
        self.undo_stack.push_back(action);
        true
    }

    /// Empties both stacks, e.g. when a different session is loaded.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

fn revert<J: JointSystem + ?Sized>(
    action: &UndoAction,
    system: &mut dyn ParticleSystem,
    mut joints: Option<&mut J>,
) {
    let kind = action.kind;
    if kind.adds_particles() {
        detach_particles(action, system, joints.as_deref_mut());
    } else if kind.removes_particles() {
        restore_particles(action, system, joints.as_deref_mut());
    } else {
        match kind {
            UndoKind::JointCreate => {
                if let Some(joints) = joints.as_deref_mut() {
                    for joint in &action.joints {
                        joints.remove_joint(joint.a, joint.b);
                    }
                }
            }
            UndoKind::JointRemove => {
                if let Some(joints) = joints.as_deref_mut() {
                    recreate_joints(action, system, joints);
                }
            }
            UndoKind::PinToggle => {
                if let Some(change) = action.pin {
                    if let Some(particle) = system.particle_mut(change.particle) {
                        particle.pinned = change.previous_pinned;
                        particle.grabbed = change.previous_grabbed;
                    }
                }
            }
            _ => {}
        }
    }

    if let Some(span) = action.id_counter {
        system.set_id_counter(span.before);
    }
}

fn reapply<J: JointSystem + ?Sized>(
    action: &UndoAction,
    system: &mut dyn ParticleSystem,
    mut joints: Option<&mut J>,
) {
    let kind = action.kind;
    if kind.adds_particles() {
        restore_particles(action, system, joints.as_deref_mut());
    } else if kind == UndoKind::SystemClear {
        system.clear();
        if let Some(joints) = joints.as_deref_mut() {
            joints.clear();
        }
    } else if kind.removes_particles() {
        detach_particles(action, system, joints.as_deref_mut());
    } else {
        match kind {
            UndoKind::JointCreate => {
                if let Some(joints) = joints.as_deref_mut() {
                    recreate_joints(action, system, joints);
                }
            }
            UndoKind::JointRemove => {
                if let Some(joints) = joints.as_deref_mut() {
                    for joint in &action.joints {
                        joints.remove_joint(joint.a, joint.b);
                    }
                }
            }
            UndoKind::PinToggle => {
                if let Some(change) = action.pin {
                    if let Some(particle) = system.particle_mut(change.particle) {
                        particle.pinned = change.pinned;
                        particle.grabbed = false;
                    }
                }
            }
            _ => {}
        }
    }

    if let Some(span) = action.id_counter {
        system.set_id_counter(span.after);
    }
}

/// Takes the action's particles (and their joints) out of the engine.
fn detach_particles<J: JointSystem + ?Sized>(
    action: &UndoAction,
    system: &mut dyn ParticleSystem,
    mut joints: Option<&mut J>,
) {
    if let Some(joints) = joints.as_deref_mut() {
        for joint in &action.joints {
            joints.remove_joint(joint.a, joint.b);
        }
    }
    for snapshot in &action.particles {
        if let Some(joints) = joints.as_deref_mut() {
            joints.remove_joints_for_particle(snapshot.id);
        }
        system.remove_particle(snapshot.id);
    }
}

/// Puts the action's particle snapshots back under their original ids.
///
/// Particles still present (marked but not compacted) are overwritten in place.
fn restore_particles<J: JointSystem + ?Sized>(
    action: &UndoAction,
    system: &mut dyn ParticleSystem,
    joints: Option<&mut J>,
) {
    for snapshot in &action.particles {
        system.insert_particle(snapshot.clone());
    }
    if let Some(joints) = joints {
        recreate_joints(action, system, joints);
    }
}

fn recreate_joints<J: JointSystem + ?Sized>(
    action: &UndoAction,
    system: &dyn ParticleSystem,
    joints: &mut J,
) {
    for joint in &action.joints {
        let endpoints_present =
            system.particle(joint.a).is_some() && system.particle(joint.b).is_some();
        if endpoints_present && !joints.has_joint(joint.a, joint.b) {
            joints.create_joint(joint.a, joint.b, joint.rest_length);
        }
    }
}
