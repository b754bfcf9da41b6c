use crate::config::SpawnMode;
use crate::engine::{JointSystem, ParticleSystem, PreviewRenderer};
use crate::input::{
    events::{MouseButton, PointerEvent},
    modifiers::ModifierTransition,
    tool::Tool,
};
use log::debug;
use std::time::Instant;

use super::core::{DragIntent, GestureMode, StreamOrigin, StreamSource, SubMode};
use super::InputState;

impl<S, J, R> InputState<S, J, R>
where
    S: ParticleSystem,
    J: JointSystem,
    R: PreviewRenderer,
{
    /// Processes a pointer press.
    ///
    /// # Behavior
    /// - Left press: starts a gesture for the active tool (and, for the spawn
    ///   tool, the configured spawn mode). Ctrl/Meta held at this point fixes
    ///   the drag intent to velocity; Shift starts a stream right away.
    /// - Right press: cancels the current action, like Escape
    pub fn on_pointer_down(&mut self, event: PointerEvent) {
        if !self.is_ready() {
            return;
        }
        match event.button {
            MouseButton::Left => {}
            MouseButton::Right => {
                self.cancel();
                return;
            }
            MouseButton::Middle => return,
        }

        if self.gesture.pointer_down {
            // Missed the release (focus loss); finish the old gesture first
            debug!("Pointer down while already down; ending previous gesture");
            self.end_gesture(true);
        }

        self.modifiers.sync(event.modifiers);
        let world = self.to_world(event.position);
        self.gesture.pointer_down = true;
        self.gesture.start = world;
        self.gesture.current = world;
        self.gesture.dragging = false;
        self.gesture.intent = DragIntent::None;

        match self.tool {
            Tool::Spawn => match self.spawn.mode {
                SpawnMode::Single => self.begin_single_spawn(event.timestamp),
                SpawnMode::Stream => {
                    self.begin_stream(StreamOrigin::SpawnMode, StreamSource::Live, event.timestamp)
                }
                SpawnMode::Draw => self.begin_draw(),
                SpawnMode::Shape => self.stamp_shape(),
            },
            Tool::Remove => self.begin_removal(),
            Tool::Joint => self.click_joint(),
            Tool::Grab => self.begin_grab(event.timestamp),
            Tool::Pin => self.toggle_pin(),
            Tool::Draw => self.begin_draw(),
            Tool::Shape => self.stamp_shape(),
            Tool::Emitter => {
                self.begin_stream(StreamOrigin::Emitter, StreamSource::Live, event.timestamp)
            }
        }
    }

    /// Processes pointer motion, pressed or not.
    ///
    /// Modifier flags on the event are applied first, so a Shift or Ctrl
    /// change seen here switches sub-mode before the move is handled.
    pub fn on_pointer_move(&mut self, event: PointerEvent) {
        if !self.is_ready() {
            return;
        }
        let world = self.to_world(event.position);
        self.gesture.current = world;

        let transition = self.modifiers.sync(event.modifiers);
        if !transition.is_empty() {
            self.apply_modifier_transition(transition, event.timestamp);
        }

        if !self.gesture.pointer_down {
            if self.tool.picks_particles() {
                self.update_hover(world);
            }
            return;
        }

        if let GestureMode::Streaming(stream) = &mut self.gesture.mode {
            if stream.follows_pointer() {
                stream.position = world;
            }
            return;
        }

        match self.gesture.mode.sub_mode() {
            SubMode::Sizing => self.update_sizing(),
            SubMode::Velocity => {
                self.gesture.dragging = self.past_drag_threshold();
                self.refresh_spawn_preview();
            }
            SubMode::Drawing => self.extend_draw(world),
            SubMode::Removing => self.sweep_removal(world),
            SubMode::Grabbing => self.drag_grabbed(world, event.timestamp),
            SubMode::Streaming => {}
            SubMode::JointSelecting | SubMode::Idle => {
                if self.tool.picks_particles() {
                    self.update_hover(world);
                }
            }
        }
    }

    /// Processes a pointer release.
    ///
    /// Commits a pending single spawn and flushes any batch into history.
    /// A release without a matching press is ignored.
    pub fn on_pointer_up(&mut self, event: PointerEvent) {
        if !self.is_ready() || event.button != MouseButton::Left {
            return;
        }
        if !self.gesture.pointer_down {
            return;
        }
        let world = self.to_world(event.position);
        // The release is the last grab sample; a held-still pointer throws nothing
        if matches!(self.gesture.mode, GestureMode::Grabbing(_)) {
            self.drag_grabbed(world, event.timestamp);
        }
        if world != self.gesture.current {
            self.gesture.current = world;
            if matches!(self.gesture.mode, GestureMode::Sizing { .. }) {
                self.update_sizing();
            }
        }
        self.end_gesture(true);
    }

    /// Pointer left the canvas: abandons the gesture without committing a
    /// pending spawn. Batches already laid down are still recorded.
    pub fn on_pointer_leave(&mut self) {
        if !self.is_ready() {
            return;
        }
        if self.gesture.pointer_down {
            debug!("Pointer left canvas mid-gesture");
            self.end_gesture(false);
        }
        self.set_highlight(None);
    }

    /// Window lost focus; modifier keyups may never arrive.
    pub fn on_focus_lost(&mut self, now: Instant) {
        let transition = self.modifiers.release_all();
        if !transition.is_empty() {
            self.apply_modifier_transition(transition, now);
        }
    }

    /// Reacts to Shift or Ctrl/Meta changing while the pointer is down.
    ///
    /// - Shift pressed while sizing or aiming: streams with the previewed
    ///   size and mass frozen
    /// - Shift released: ends a Shift-started stream
    /// - Ctrl pressed while sizing: switches to velocity aiming, keeping the
    ///   current size
    /// - Ctrl released while aiming: back to sizing
    pub(crate) fn apply_modifier_transition(&mut self, transition: ModifierTransition, now: Instant) {
        if !self.is_ready() || !self.gesture.pointer_down {
            return;
        }

        if transition.stream_pressed
            && matches!(
                self.gesture.mode,
                GestureMode::Sizing { .. } | GestureMode::Velocity { .. }
            )
        {
            if let Some(pending) = self.pending_spawn() {
                let source = StreamSource::Frozen {
                    size: pending.size,
                    mass: pending.mass,
                };
                self.begin_stream(StreamOrigin::Modifier, source, now);
            }
            return;
        }

        if transition.stream_released {
            if let GestureMode::Streaming(stream) = &self.gesture.mode {
                if stream.origin == StreamOrigin::Modifier {
                    // Stream ends, the press itself stays active
                    self.settle_mode(true);
                    return;
                }
            }
        }

        if transition.velocity_pressed {
            if let GestureMode::Sizing { size } = self.gesture.mode {
                let sized_by_drag = self.gesture.dragging;
                self.enter_mode(GestureMode::Velocity {
                    size,
                    sized_by_drag,
                });
                self.refresh_spawn_preview();
            }
        } else if transition.velocity_released {
            if let GestureMode::Velocity { size, .. } = self.gesture.mode {
                self.enter_mode(GestureMode::Sizing { size });
                self.update_sizing();
            }
        }
    }
}
