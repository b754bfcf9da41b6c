use crate::config::Action;
use crate::engine::{JointSystem, ParticleSystem, PreviewRenderer};
use crate::history::UndoAction;
use crate::input::{events::Key, tool::Tool};
use log::{debug, info};
use std::time::Instant;

use super::core::GestureMode;
use super::InputState;

impl<S, J, R> InputState<S, J, R>
where
    S: ParticleSystem,
    J: JointSystem,
    R: PreviewRenderer,
{
    /// Processes a key press.
    ///
    /// Modifier keys update the tracker (and may switch the gesture's
    /// sub-mode); other keys are looked up in the keybinding map. Escape
    /// cancels even when it has been unbound.
    pub fn on_key_press(&mut self, key: Key, now: Instant) {
        if matches!(key, Key::Shift | Key::Ctrl | Key::Meta | Key::Alt) {
            let transition = self.modifiers.apply_key(key, true);
            if !transition.is_empty() {
                self.apply_modifier_transition(transition, now);
            }
            return;
        }

        let Some(name) = key.binding_name() else {
            return;
        };
        match self.action_for(&name) {
            Some(action) => self.handle_action(action),
            None if key == Key::Escape => self.cancel(),
            None => {}
        }
    }

    pub fn on_key_release(&mut self, key: Key, now: Instant) {
        let transition = self.modifiers.apply_key(key, false);
        if !transition.is_empty() {
            self.apply_modifier_transition(transition, now);
        }
    }

    /// Executes a bound action.
    pub fn handle_action(&mut self, action: Action) {
        debug!("Action {:?}", action);
        match action {
            Action::Undo => {
                self.undo();
            }
            Action::Redo => {
                self.redo();
            }
            Action::Cancel => self.cancel(),
            Action::ClearSystem => self.clear_system(),
            Action::RemoveSelectedJoints => self.remove_selected_joints(),
            Action::CycleSpawnMode => {
                self.spawn.mode = self.spawn.mode.next();
                info!("Spawn mode: {:?}", self.spawn.mode);
                self.needs_redraw = true;
            }
            Action::SelectSpawnTool => self.set_tool(Tool::Spawn),
            Action::SelectRemoveTool => self.set_tool(Tool::Remove),
            Action::SelectJointTool => self.set_tool(Tool::Joint),
            Action::SelectGrabTool => self.set_tool(Tool::Grab),
            Action::SelectPinTool => self.set_tool(Tool::Pin),
            Action::SelectDrawTool => self.set_tool(Tool::Draw),
            Action::SelectShapeTool => self.set_tool(Tool::Shape),
            Action::SelectEmitterTool => self.set_tool(Tool::Emitter),
        }
    }

    /// Escape: clears a joint selection first, otherwise abandons the
    /// gesture without committing a pending spawn.
    pub fn cancel(&mut self) {
        match self.gesture.mode {
            GestureMode::JointSelecting { .. } => {
                debug!("Joint selection cancelled");
                self.clear_joint_selection();
            }
            GestureMode::Idle if !self.gesture.pointer_down => {}
            _ => {
                debug!("Gesture cancelled");
                self.end_gesture(false);
            }
        }
    }

    /// Switches tools, ending whatever the old tool was doing.
    pub fn set_tool(&mut self, tool: Tool) {
        if self.tool == tool {
            return;
        }
        self.end_gesture(false);
        self.clear_joint_selection();
        self.set_highlight(None);
        self.tool = tool;
        info!("Tool: {:?}", tool);
        self.needs_redraw = true;
    }

    /// Reverts the newest history entry. Returns `false` if nothing was undone.
    pub fn undo(&mut self) -> bool {
        self.finish_for_history();
        let Some(system) = self.system.as_mut() else {
            return false;
        };
        let joints: Option<&mut dyn JointSystem> = match self.joints.as_mut() {
            Some(joints) => Some(joints),
            None => None,
        };
        let changed = self.history.undo(system, joints);
        if changed {
            self.after_history_change();
        }
        changed
    }

    /// Re-applies the most recently undone entry.
    pub fn redo(&mut self) -> bool {
        self.finish_for_history();
        let Some(system) = self.system.as_mut() else {
            return false;
        };
        let joints: Option<&mut dyn JointSystem> = match self.joints.as_mut() {
            Some(joints) => Some(joints),
            None => None,
        };
        let changed = self.history.redo(system, joints);
        if changed {
            self.after_history_change();
        }
        changed
    }

    /// A gesture still writing to the engine is closed before history moves.
    fn finish_for_history(&mut self) {
        let active = !matches!(
            self.gesture.mode,
            GestureMode::Idle | GestureMode::JointSelecting { .. }
        );
        if active || self.gesture.pointer_down {
            self.end_gesture(false);
        }
    }

    fn after_history_change(&mut self) {
        // Selection or highlight may point at a particle that was just detached
        self.joint_selection();
        if let Some(highlighted) = self.highlighted {
            if !self.is_live(highlighted) {
                self.set_highlight(None);
            }
        }
        self.needs_redraw = true;
    }

    /// Removes every particle and joint as one undoable step.
    pub fn clear_system(&mut self) {
        self.end_gesture(false);
        self.clear_joint_selection();
        self.set_highlight(None);

        let before = self.id_counter();
        let Some(system) = self.system.as_mut() else {
            return;
        };
        let particles: Vec<_> = system
            .particles()
            .iter()
            .filter(|p| p.is_live())
            .cloned()
            .collect();
        system.clear();
        let joints = match self.joints.as_mut() {
            Some(joint_system) => {
                let joints = joint_system.joints().to_vec();
                joint_system.clear();
                joints
            }
            None => Vec::new(),
        };
        info!(
            "Cleared {} particles and {} joints",
            particles.len(),
            joints.len()
        );
        self.needs_redraw = true;
        self.record(UndoAction::clear(particles, joints, before));
    }

    /// Deletes every joint attached to the selected joint endpoint.
    pub fn remove_selected_joints(&mut self) {
        let Some(selected) = self.joint_selection() else {
            return;
        };
        let Some(joint_system) = self.joints.as_mut() else {
            return;
        };
        let removed = joint_system.remove_joints_for_particle(selected);
        if removed.is_empty() {
            return;
        }
        info!("Removed {} joints from {}", removed.len(), selected);
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.set_joint_preview(None);
        }
        self.needs_redraw = true;
        self.record(UndoAction::joint_remove(removed));
    }
}
