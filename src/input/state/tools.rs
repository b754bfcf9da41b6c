use crate::engine::{
    JointPreview, JointSystem, ParticleId, ParticleSystem, PreviewRenderer, RemovalPreview,
};
use crate::history::{PinChange, UndoAction};
use crate::input::spatial;
use glam::Vec2;
use log::{debug, info};
use std::time::Instant;

use super::core::{GestureMode, GrabState, RemovalState};
use super::InputState;

impl<S, J, R> InputState<S, J, R>
where
    S: ParticleSystem,
    J: JointSystem,
    R: PreviewRenderer,
{
    pub(crate) fn begin_removal(&mut self) {
        self.enter_mode(GestureMode::Removing(RemovalState::default()));
        self.sweep_removal(self.gesture.start);
    }

    /// Marks every live particle under the brush for removal.
    ///
    /// Particles are snapshotted before their mass and size are zeroed; the
    /// engine compacts them away later. Joints touching a swept particle are
    /// captured once each so undo can restore them.
    pub(crate) fn sweep_removal(&mut self, position: Vec2) {
        let radius =
            spatial::screen_to_world_distance(self.interaction.removal_radius_px, self.zoom());
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.set_removal_preview(Some(RemovalPreview { position, radius }));
        }
        self.needs_redraw = true;

        let Some(system) = self.system.as_mut() else {
            return;
        };
        let GestureMode::Removing(removal) = &mut self.gesture.mode else {
            return;
        };
        for id in spatial::particles_within(system.particles(), position, radius) {
            let Some(particle) = system.particle_mut(id) else {
                continue;
            };
            removal.particles.push(particle.clone());
            particle.mass = 0.0;
            particle.size = 0.0;
            if let Some(joints) = self.joints.as_ref() {
                for joint in joints.joints_for_particle(id) {
                    removal.add_joint(joint);
                }
            }
            debug!("Marked particle {} for removal", id);
        }
    }

    /// Joint tool press: first click selects, second click on another
    /// particle joins the pair. Empty space or the selected particle itself
    /// clears the selection. With Shift held the new endpoint becomes the
    /// next selection, for chaining.
    pub(crate) fn click_joint(&mut self) {
        if self.joints.is_none() {
            return;
        }
        let target = self.pick(self.gesture.start);
        let selected = self.joint_selection();

        match (selected, target) {
            (_, None) => self.clear_joint_selection(),
            (None, Some(target)) => self.select_joint_particle(target),
            (Some(selected), Some(target)) if selected == target => self.clear_joint_selection(),
            (Some(selected), Some(target)) => {
                let duplicate = self
                    .joints
                    .as_ref()
                    .is_some_and(|joints| joints.has_joint(selected, target));
                if duplicate {
                    debug!("Joint {}-{} already exists", selected, target);
                } else if let Some(joint) = self.join(selected, target) {
                    info!("Joined {} and {}", selected, target);
                    self.record(UndoAction::joint_create(joint));
                }
                if self.modifiers.keep_joining() {
                    self.select_joint_particle(target);
                } else {
                    self.clear_joint_selection();
                }
            }
        }
    }

    /// Current joint endpoint, dropped if it has since been removed.
    pub(crate) fn joint_selection(&mut self) -> Option<ParticleId> {
        let GestureMode::JointSelecting { selected } = self.gesture.mode else {
            return None;
        };
        if self.is_live(selected) {
            Some(selected)
        } else {
            debug!("Selected particle {} is gone", selected);
            self.clear_joint_selection();
            None
        }
    }

    fn select_joint_particle(&mut self, particle: ParticleId) {
        self.gesture.mode = GestureMode::JointSelecting { selected: particle };
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.set_selected_particle(Some(particle));
            renderer.set_joint_preview(Some(JointPreview {
                particle,
                target: self.gesture.current,
            }));
        }
        self.needs_redraw = true;
    }

    pub(crate) fn clear_joint_selection(&mut self) {
        if matches!(self.gesture.mode, GestureMode::JointSelecting { .. }) {
            self.gesture.mode = GestureMode::Idle;
        }
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.set_selected_particle(None);
            renderer.set_joint_preview(None);
        }
        self.needs_redraw = true;
    }

    /// Hover feedback for the picking tools: highlight under the pointer and,
    /// with a joint endpoint selected, a line to the pointer.
    pub(crate) fn update_hover(&mut self, position: Vec2) {
        let hovered = self.pick(position);
        self.set_highlight(hovered);
        if let Some(selected) = self.joint_selection() {
            if let Some(renderer) = self.renderer.as_mut() {
                renderer.set_joint_preview(Some(JointPreview {
                    particle: selected,
                    target: position,
                }));
            }
            self.needs_redraw = true;
        }
    }

    pub(crate) fn begin_grab(&mut self, now: Instant) {
        let start = self.gesture.start;
        let Some(id) = self.pick(start) else {
            return;
        };
        let Some(particle) = self.system.as_mut().and_then(|s| s.particle_mut(id)) else {
            return;
        };
        particle.grabbed = true;
        particle.velocity = Vec2::ZERO;
        let grab = GrabState {
            particle: id,
            offset: start - particle.position,
            last_position: particle.position,
            last_time: now,
            velocity: Vec2::ZERO,
        };
        debug!("Grabbed particle {}", id);
        self.enter_mode(GestureMode::Grabbing(grab));
        self.set_highlight(Some(id));
    }

    /// Moves the held particle with the pointer and re-estimates the throw
    /// velocity from the last two samples.
    pub(crate) fn drag_grabbed(&mut self, position: Vec2, now: Instant) {
        let GestureMode::Grabbing(grab) = &mut self.gesture.mode else {
            return;
        };
        let Some(particle) = self
            .system
            .as_mut()
            .and_then(|s| s.particle_mut(grab.particle))
            .filter(|p| p.is_live())
        else {
            let id = grab.particle;
            debug!("Grabbed particle {} is gone", id);
            self.gesture.mode = GestureMode::Idle;
            // Marked but not yet compacted
            if let Some(particle) = self.system.as_mut().and_then(|s| s.particle_mut(id)) {
                particle.grabbed = false;
            }
            return;
        };

        let target = position - grab.offset;
        let elapsed = now.saturating_duration_since(grab.last_time).as_secs_f32();
        if elapsed > 0.0 {
            grab.velocity = (target - grab.last_position) / elapsed * self.interaction.throw_scale;
            grab.last_position = target;
            grab.last_time = now;
        }
        particle.position = target;
        particle.velocity = Vec2::ZERO;
        self.needs_redraw = true;
    }

    /// Lets go of the held particle, throwing it unless pinned or cancelled.
    pub(crate) fn release_grab(&mut self, grab: GrabState, throw: bool) {
        let Some(particle) = self
            .system
            .as_mut()
            .and_then(|s| s.particle_mut(grab.particle))
        else {
            return;
        };
        particle.grabbed = false;
        if throw && particle.is_live() && !particle.pinned {
            particle.velocity = grab.velocity;
            debug!("Threw particle {} at {:?}", grab.particle, grab.velocity);
        }
        self.needs_redraw = true;
    }

    pub(crate) fn toggle_pin(&mut self) {
        let Some(id) = self.pick(self.gesture.start) else {
            return;
        };
        let Some(particle) = self.system.as_mut().and_then(|s| s.particle_mut(id)) else {
            return;
        };
        let change = PinChange {
            particle: id,
            previous_pinned: particle.pinned,
            previous_grabbed: particle.grabbed,
            pinned: !particle.pinned,
        };
        particle.pinned = change.pinned;
        info!(
            "Particle {} {}",
            id,
            if change.pinned { "pinned" } else { "unpinned" }
        );
        self.needs_redraw = true;
        self.record(UndoAction::pin_toggle(change));
    }
}
