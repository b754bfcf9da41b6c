//! Gesture state machine and input state management.

use crate::config::{Action, Config, InteractionConfig, KeyBinding, SpawnConfig};
use crate::engine::{
    Joint, JointSystem, Particle, ParticleId, ParticleSystem, PreviewBuffer, PreviewParticle,
    PreviewRenderer, SandboxJoints, SandboxSystem,
};
use crate::history::{IdCounterSpan, UndoAction, UndoLog};
use crate::input::{modifiers::Modifiers, spatial, tool::Tool};
use crate::util;
use glam::Vec2;
use log::{debug, info};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// What a drag is taken to mean, fixed when the pointer goes down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragIntent {
    /// Dragging sizes the particle
    Size,
    /// Ctrl/Meta was held at press; dragging aims the launch velocity
    Velocity,
    /// The active tool does not spawn a single particle
    #[default]
    None,
}

/// Which gesture started a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOrigin {
    /// Shift held during a spawn gesture; ends when Shift is released
    Modifier,
    /// Spawn mode set to stream; ends on pointer-up
    SpawnMode,
    /// Emitter tool; stays at the pressed point
    Emitter,
}

/// Where streamed particles take their size and mass from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StreamSource {
    /// Captured from the preview when the stream started
    Frozen { size: f32, mass: f32 },
    /// Re-read from the spawn configuration on every tick
    Live,
}

/// Running stream: timer deadline plus the batch accumulated so far.
#[derive(Debug, Clone)]
pub struct StreamState {
    /// Gesture that started the stream; decides how it ends
    pub origin: StreamOrigin,
    pub source: StreamSource,
    /// Emission point in world coordinates
    pub position: Vec2,
    /// Time between emissions at the current rate
    pub interval: Duration,
    /// Deadline of the next emission; dropping the state cancels it
    pub next_due: Instant,
    /// Particles emitted so far, recorded as one batch
    pub particles: Vec<Particle>,
    /// Engine id counter when the stream started
    pub id_counter_before: u64,
}

impl StreamState {
    pub fn follows_pointer(&self) -> bool {
        self.origin != StreamOrigin::Emitter
    }
}

/// Chain being laid down by the draw tool.
#[derive(Debug, Clone)]
pub struct DrawState {
    /// Particles laid down so far
    pub particles: Vec<Particle>,
    /// Joints linking consecutive particles of the chain
    pub joints: Vec<Joint>,
    /// Most recent chain particle, joined to the next one
    pub last: Option<ParticleId>,
    /// Where the last particle was placed; the step is measured from here
    pub last_position: Vec2,
    /// Engine id counter when drawing started
    pub id_counter_before: u64,
}

/// Particles (pre-removal snapshots) and joints swept by the removal brush.
#[derive(Debug, Clone, Default)]
pub struct RemovalState {
    pub particles: Vec<Particle>,
    pub joints: Vec<Joint>,
}

impl RemovalState {
    pub(crate) fn add_joint(&mut self, joint: Joint) {
        if !self.joints.iter().any(|j| j.connects(joint.a, joint.b)) {
            self.joints.push(joint);
        }
    }
}

/// Particle held by the grab tool.
#[derive(Debug, Clone, Copy)]
pub struct GrabState {
    pub particle: ParticleId,
    /// Pointer position minus particle position at pickup
    pub offset: Vec2,
    pub last_position: Vec2,
    pub last_time: Instant,
    /// Estimated from the last two pointer samples, already scaled for throwing
    pub velocity: Vec2,
}

/// Sub-mode of the current gesture. Variants are mutually exclusive.
#[derive(Debug, Clone, Default)]
pub enum GestureMode {
    #[default]
    Idle,
    Sizing {
        size: f32,
    },
    Velocity {
        size: f32,
        /// The size came from an actual drag rather than the default
        sized_by_drag: bool,
    },
    Streaming(StreamState),
    Drawing(DrawState),
    Removing(RemovalState),
    /// First joint endpoint chosen; survives pointer-up
    JointSelecting {
        selected: ParticleId,
    },
    Grabbing(GrabState),
}

/// Payload-free view of [`GestureMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubMode {
    Idle,
    Sizing,
    Velocity,
    Streaming,
    Drawing,
    Removing,
    JointSelecting,
    Grabbing,
}

impl GestureMode {
    pub fn sub_mode(&self) -> SubMode {
        match self {
            GestureMode::Idle => SubMode::Idle,
            GestureMode::Sizing { .. } => SubMode::Sizing,
            GestureMode::Velocity { .. } => SubMode::Velocity,
            GestureMode::Streaming(_) => SubMode::Streaming,
            GestureMode::Drawing(_) => SubMode::Drawing,
            GestureMode::Removing(_) => SubMode::Removing,
            GestureMode::JointSelecting { .. } => SubMode::JointSelecting,
            GestureMode::Grabbing(_) => SubMode::Grabbing,
        }
    }
}

/// Pointer state for the gesture in progress. Positions are world coordinates.
#[derive(Debug, Clone, Default)]
pub struct GestureState {
    pub pointer_down: bool,
    pub start: Vec2,
    pub current: Vec2,
    /// Pointer is currently at or beyond the drag threshold from the press
    pub dragging: bool,
    pub intent: DragIntent,
    pub mode: GestureMode,
}

/// Spawn a sizing or velocity gesture would commit right now.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingSpawn {
    pub position: Vec2,
    pub size: f32,
    pub mass: f32,
    pub velocity: Vec2,
}

/// Main input state for the sandbox.
///
/// Owns the collaborators (particle system, joint system, preview renderer),
/// the active tool, modifier state and the undo log. Pointer and keyboard
/// events are fed in by the host; every handler is a no-op until the
/// particle system and renderer are attached.
pub struct InputState<S = SandboxSystem, J = SandboxJoints, R = PreviewBuffer> {
    pub(crate) system: Option<S>,
    pub(crate) joints: Option<J>,
    pub(crate) renderer: Option<R>,
    /// Spawn settings, read fresh on every event
    pub spawn: SpawnConfig,
    /// Pointer tolerances, read fresh on every event
    pub interaction: InteractionConfig,
    /// Current modifier key state
    pub modifiers: Modifiers,
    pub(crate) tool: Tool,
    pub(crate) gesture: GestureState,
    /// Particle under the pointer for picking tools
    pub(crate) highlighted: Option<ParticleId>,
    pub(crate) history: UndoLog,
    /// Keybinding action map for efficient lookup
    pub(crate) action_map: HashMap<KeyBinding, Action>,
    /// Particles spawned so far; indexes the palette
    pub(crate) spawn_counter: usize,
    /// Whether the host should redraw
    pub needs_redraw: bool,
}

impl InputState {
    /// Input state wired to fresh in-memory collaborators.
    pub fn sandbox(config: &Config) -> Result<Self, String> {
        let mut state = Self::from_config(config)?;
        state.attach(SandboxSystem::new(), SandboxJoints::new(), PreviewBuffer::new());
        Ok(state)
    }
}

impl<S, J, R> InputState<S, J, R>
where
    S: ParticleSystem,
    J: JointSystem,
    R: PreviewRenderer,
{
    /// Creates an input state with no collaborators attached.
    pub fn with_defaults(
        spawn: SpawnConfig,
        interaction: InteractionConfig,
        history_capacity: usize,
        action_map: HashMap<KeyBinding, Action>,
    ) -> Self {
        Self {
            system: None,
            joints: None,
            renderer: None,
            spawn,
            interaction,
            modifiers: Modifiers::new(),
            tool: Tool::default(),
            gesture: GestureState::default(),
            highlighted: None,
            history: UndoLog::new(history_capacity),
            action_map,
            spawn_counter: 0,
            needs_redraw: false,
        }
    }

    /// Builds the input state from a loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self, String> {
        let action_map = config.keybindings.build_action_map()?;
        Ok(Self::with_defaults(
            config.spawn.clone(),
            config.interaction.clone(),
            config.history.capacity,
            action_map,
        ))
    }

    pub fn attach(&mut self, system: S, joints: J, renderer: R) {
        self.system = Some(system);
        self.joints = Some(joints);
        self.renderer = Some(renderer);
        debug!("Collaborators attached");
    }

    pub fn attach_system(&mut self, system: S) {
        self.system = Some(system);
    }

    pub fn attach_joints(&mut self, joints: J) {
        self.joints = Some(joints);
    }

    pub fn attach_renderer(&mut self, renderer: R) {
        self.renderer = Some(renderer);
    }

    pub fn system(&self) -> Option<&S> {
        self.system.as_ref()
    }

    pub fn system_mut(&mut self) -> Option<&mut S> {
        self.system.as_mut()
    }

    pub fn joints(&self) -> Option<&J> {
        self.joints.as_ref()
    }

    pub fn joints_mut(&mut self) -> Option<&mut J> {
        self.joints.as_mut()
    }

    pub fn renderer(&self) -> Option<&R> {
        self.renderer.as_ref()
    }

    pub fn renderer_mut(&mut self) -> Option<&mut R> {
        self.renderer.as_mut()
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn gesture(&self) -> &GestureState {
        &self.gesture
    }

    pub fn sub_mode(&self) -> SubMode {
        self.gesture.mode.sub_mode()
    }

    pub fn highlighted(&self) -> Option<ParticleId> {
        self.highlighted
    }

    pub fn history(&self) -> &UndoLog {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub(crate) fn action_for(&self, binding_name: &str) -> Option<Action> {
        let ctrl = self.modifiers.ctrl || self.modifiers.meta;
        self.action_map
            .iter()
            .find(|(binding, _)| {
                binding.matches(binding_name, ctrl, self.modifiers.shift, self.modifiers.alt)
            })
            .map(|(_, action)| *action)
    }

    /// Particle system and renderer are both present.
    pub(crate) fn is_ready(&self) -> bool {
        self.system.is_some() && self.renderer.is_some()
    }

    pub(crate) fn zoom(&self) -> f32 {
        self.renderer.as_ref().map_or(1.0, |r| r.zoom())
    }

    pub(crate) fn to_world(&self, screen: Vec2) -> Vec2 {
        self.renderer
            .as_ref()
            .map_or(screen, |r| r.screen_to_world(screen))
    }

    pub(crate) fn id_counter(&self) -> u64 {
        self.system.as_ref().map_or(0, |s| s.id_counter())
    }

    pub(crate) fn id_span(&self, before: u64) -> IdCounterSpan {
        IdCounterSpan {
            before,
            after: self.id_counter(),
        }
    }

    pub(crate) fn is_live(&self, id: ParticleId) -> bool {
        self.system
            .as_ref()
            .is_some_and(|s| s.live_particle(id).is_some())
    }

    /// Live particle nearest `position` within the pick tolerance.
    pub(crate) fn pick(&self, position: Vec2) -> Option<ParticleId> {
        let tolerance =
            spatial::screen_to_world_distance(self.interaction.pick_tolerance_px, self.zoom());
        let system = self.system.as_ref()?;
        spatial::nearest_particle(system.particles(), position, tolerance)
    }

    /// Radius for a drag of `distance` world units, clamped to the size limits.
    pub(crate) fn drag_size(&self, distance: f32) -> f32 {
        let min = self.spawn.min_size;
        let max = (self.spawn.max_size / self.zoom().max(f32::EPSILON)).max(min);
        (distance / 2.0).clamp(min, max)
    }

    /// Whether the pointer is far enough from the press to count as a drag.
    ///
    /// A pointer that has not moved never drags, even with a zero threshold.
    pub(crate) fn past_drag_threshold(&self) -> bool {
        let threshold =
            spatial::screen_to_world_distance(self.interaction.drag_threshold_px, self.zoom());
        let distance = self.gesture.current.distance(self.gesture.start);
        distance > 0.0 && distance >= threshold
    }

    /// Size, mass and velocity a sizing or velocity gesture would commit.
    ///
    /// Previews and commits both read this, so what is shown is what lands.
    pub fn pending_spawn(&self) -> Option<PendingSpawn> {
        let gesture = &self.gesture;
        match gesture.mode {
            GestureMode::Sizing { size } => {
                let (size, mass) = if gesture.dragging {
                    (size, util::area_mass(size))
                } else {
                    (self.spawn.default_size, self.spawn.default_mass)
                };
                Some(PendingSpawn {
                    position: gesture.start,
                    size,
                    mass,
                    velocity: Vec2::ZERO,
                })
            }
            GestureMode::Velocity {
                size,
                sized_by_drag,
            } => {
                let mass = if gesture.intent == DragIntent::Size && sized_by_drag {
                    util::area_mass(size)
                } else {
                    self.spawn.default_mass
                };
                let size = if gesture.intent == DragIntent::Velocity {
                    self.spawn.default_size
                } else {
                    size
                };
                Some(PendingSpawn {
                    position: gesture.start,
                    size,
                    mass,
                    velocity: (gesture.current - gesture.start) * self.spawn.velocity_scale,
                })
            }
            _ => None,
        }
    }

    /// Pushes the pending spawn to the renderer (solid while sizing, dashed with an
    /// arrow while aiming).
    pub(crate) fn refresh_spawn_preview(&mut self) {
        let pending = self.pending_spawn();
        let aiming = matches!(self.gesture.mode, GestureMode::Velocity { .. });
        let color = self.spawn.color_at(self.spawn_counter);
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        match pending {
            Some(pending) => {
                renderer.set_preview_particle(
                    Some(PreviewParticle {
                        position: pending.position,
                        size: pending.size,
                        mass: pending.mass,
                        color,
                    }),
                    aiming,
                );
                renderer.set_preview_velocity(aiming.then_some(pending.velocity));
            }
            None => {
                renderer.set_preview_particle(None, false);
                renderer.set_preview_velocity(None);
            }
        }
        self.needs_redraw = true;
    }

    /// Clears every transient preview. Selection and highlight are left alone.
    pub(crate) fn clear_previews(&mut self) {
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.set_preview_particle(None, false);
            renderer.set_preview_velocity(None);
            renderer.set_removal_preview(None);
            renderer.set_joint_preview(None);
        }
        self.needs_redraw = true;
    }

    /// Switches sub-mode, dropping previews that belonged to the old one.
    pub(crate) fn enter_mode(&mut self, mode: GestureMode) {
        self.clear_previews();
        debug!(
            "Gesture mode {:?} -> {:?}",
            self.gesture.mode.sub_mode(),
            mode.sub_mode()
        );
        self.gesture.mode = mode;
    }

    /// Adds one particle with the configured color and pin flag.
    pub(crate) fn spawn_particle(
        &mut self,
        position: Vec2,
        size: f32,
        mass: f32,
        velocity: Vec2,
    ) -> Option<Particle> {
        let color = self.spawn.color_at(self.spawn_counter);
        let pinned = self.spawn.pinned;
        let system = self.system.as_mut()?;
        let id = system.add_particle(
            Particle::new(position, size, mass, color)
                .with_velocity(velocity)
                .with_pinned(pinned),
        );
        self.spawn_counter = self.spawn_counter.wrapping_add(1);
        self.needs_redraw = true;
        system.particle(id).cloned()
    }

    /// Joins two live particles at their current distance.
    pub(crate) fn join(&mut self, a: ParticleId, b: ParticleId) -> Option<Joint> {
        let system = self.system.as_ref()?;
        let rest_length = system
            .live_particle(a)?
            .position
            .distance(system.live_particle(b)?.position);
        self.joints.as_mut()?.create_joint(a, b, rest_length)
    }

    pub(crate) fn record(&mut self, action: UndoAction) {
        let kind = action.kind;
        if self.history.record(action) {
            info!("Recorded {:?} (undo depth {})", kind, self.history.undo_len());
        }
    }

    /// Ends the current sub-mode but keeps the pointer state.
    ///
    /// Batches are always flushed into history. A pending single spawn is only
    /// committed when `commit` is set; a grabbed particle is only thrown then.
    pub(crate) fn settle_mode(&mut self, commit: bool) {
        let mode = std::mem::take(&mut self.gesture.mode);
        match mode {
            GestureMode::Idle => {}
            GestureMode::Sizing { .. } | GestureMode::Velocity { .. } => {
                // pending_spawn reads the mode, so put it back while committing
                self.gesture.mode = mode;
                if commit {
                    self.commit_single_spawn();
                } else {
                    debug!("Discarding pending spawn");
                }
                self.gesture.mode = GestureMode::Idle;
            }
            GestureMode::Streaming(stream) => self.flush_stream(stream),
            GestureMode::Drawing(draw) => self.flush_draw(draw),
            GestureMode::Removing(removal) => self.flush_removal(removal),
            GestureMode::Grabbing(grab) => self.release_grab(grab, commit),
            GestureMode::JointSelecting { selected } => {
                self.gesture.mode = GestureMode::JointSelecting { selected };
            }
        }
        self.clear_previews();
    }

    /// Single cleanup path for pointer-up, pointer-leave, tool switches and
    /// cancellation: stops the stream timer, flushes batches, clears previews
    /// and resets the transient pointer state.
    pub(crate) fn end_gesture(&mut self, commit: bool) {
        self.settle_mode(commit);
        self.gesture.pointer_down = false;
        self.gesture.dragging = false;
        self.gesture.intent = DragIntent::None;
    }

    fn commit_single_spawn(&mut self) {
        let Some(pending) = self.pending_spawn() else {
            return;
        };
        let before = self.id_counter();
        if let Some(particle) =
            self.spawn_particle(pending.position, pending.size, pending.mass, pending.velocity)
        {
            info!(
                "Spawned particle {} (size {:.1}, mass {:.2})",
                particle.id, particle.size, particle.mass
            );
            let span = self.id_span(before);
            self.record(UndoAction::spawn(vec![particle], span));
        }
    }

    fn flush_stream(&mut self, stream: StreamState) {
        debug!("Stream ended after {} particles", stream.particles.len());
        if stream.particles.is_empty() {
            return;
        }
        let span = self.id_span(stream.id_counter_before);
        self.record(UndoAction::stream(stream.particles, span));
    }

    fn flush_draw(&mut self, draw: DrawState) {
        if draw.particles.is_empty() {
            return;
        }
        let span = self.id_span(draw.id_counter_before);
        self.record(UndoAction::draw(draw.particles, draw.joints, span));
    }

    fn flush_removal(&mut self, removal: RemovalState) {
        if removal.particles.is_empty() {
            return;
        }
        info!("Removed {} particles", removal.particles.len());
        self.record(UndoAction::remove(removal.particles, removal.joints));
    }

    /// Replaces the collaborators' contents wholesale (session load).
    ///
    /// Any gesture is dropped and the undo log is cleared, since its records
    /// refer to particles that no longer exist.
    pub fn replace_contents(&mut self, particles: Vec<Particle>, joints: &[Joint], id_counter: u64) {
        self.end_gesture(false);
        self.clear_joint_selection();
        self.set_highlight(None);
        let Some(system) = self.system.as_mut() else {
            return;
        };
        system.clear();
        for particle in particles {
            system.insert_particle(particle);
        }
        system.set_id_counter(id_counter);
        if let Some(joint_system) = self.joints.as_mut() {
            joint_system.clear();
            for joint in joints {
                joint_system.create_joint(joint.a, joint.b, joint.rest_length);
            }
        }
        self.history.clear();
        self.needs_redraw = true;
    }

    pub(crate) fn set_highlight(&mut self, particle: Option<ParticleId>) {
        if self.highlighted == particle {
            return;
        }
        self.highlighted = particle;
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.set_highlighted_particle(particle);
        }
        self.needs_redraw = true;
    }
}
