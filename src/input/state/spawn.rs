use crate::engine::{JointSystem, ParticleSystem, PreviewRenderer};
use crate::history::UndoAction;
use crate::util;
use glam::Vec2;
use log::{debug, info};
use std::time::Instant;

use super::core::{DragIntent, DrawState, GestureMode, StreamOrigin, StreamSource, StreamState};
use super::InputState;

impl<S, J, R> InputState<S, J, R>
where
    S: ParticleSystem,
    J: JointSystem,
    R: PreviewRenderer,
{
    pub(crate) fn begin_single_spawn(&mut self, now: Instant) {
        self.gesture.intent = if self.modifiers.velocity() {
            DragIntent::Velocity
        } else {
            DragIntent::Size
        };

        if self.modifiers.streaming() {
            let source = StreamSource::Frozen {
                size: self.spawn.default_size,
                mass: self.spawn.default_mass,
            };
            self.begin_stream(StreamOrigin::Modifier, source, now);
            return;
        }

        let size = self.spawn.default_size;
        let mode = match self.gesture.intent {
            DragIntent::Velocity => GestureMode::Velocity {
                size,
                sized_by_drag: false,
            },
            _ => GestureMode::Sizing { size },
        };
        self.enter_mode(mode);
        self.refresh_spawn_preview();
    }

    /// Recomputes the size preview from the drag distance.
    pub(crate) fn update_sizing(&mut self) {
        if !matches!(self.gesture.mode, GestureMode::Sizing { .. }) {
            return;
        }
        self.gesture.dragging = self.past_drag_threshold();
        let size = if self.gesture.dragging {
            self.drag_size(self.gesture.current.distance(self.gesture.start))
        } else {
            self.spawn.default_size
        };
        self.gesture.mode = GestureMode::Sizing { size };
        self.refresh_spawn_preview();
    }

    /// Starts a stream at the pointer; the first particle lands immediately.
    pub(crate) fn begin_stream(&mut self, origin: StreamOrigin, source: StreamSource, now: Instant) {
        let interval = util::stream_interval(self.spawn.stream_rate);
        let stream = StreamState {
            origin,
            source,
            position: self.gesture.current,
            interval,
            next_due: now + interval,
            particles: Vec::new(),
            id_counter_before: self.id_counter(),
        };
        debug!("Stream started ({:?}, every {:?})", origin, interval);
        self.enter_mode(GestureMode::Streaming(stream));
        self.emit_stream_particle();
    }

    fn emit_stream_particle(&mut self) {
        let GestureMode::Streaming(stream) = &self.gesture.mode else {
            return;
        };
        let position = stream.position;
        let (size, mass) = match stream.source {
            StreamSource::Frozen { size, mass } => (size, mass),
            StreamSource::Live => (self.spawn.default_size, self.spawn.default_mass),
        };
        if let Some(particle) = self.spawn_particle(position, size, mass, Vec2::ZERO) {
            if let GestureMode::Streaming(stream) = &mut self.gesture.mode {
                stream.particles.push(particle);
            }
        }
    }

    /// Drives the stream timer. Emits one particle per elapsed period and
    /// returns how many were emitted.
    ///
    /// Hosts call this from their frame loop; with no stream running it does
    /// nothing.
    pub fn advance(&mut self, now: Instant) -> usize {
        if !self.is_ready() {
            return 0;
        }
        let mut emitted = 0;
        loop {
            let GestureMode::Streaming(stream) = &mut self.gesture.mode else {
                break;
            };
            if now < stream.next_due {
                break;
            }
            if stream.source == StreamSource::Live {
                stream.interval = util::stream_interval(self.spawn.stream_rate);
            }
            stream.next_due += stream.interval;
            self.emit_stream_particle();
            emitted += 1;
        }
        emitted
    }

    /// Time of the next stream emission, if a stream is running.
    pub fn next_stream_deadline(&self) -> Option<Instant> {
        match &self.gesture.mode {
            GestureMode::Streaming(stream) => Some(stream.next_due),
            _ => None,
        }
    }

    pub(crate) fn begin_draw(&mut self) {
        let before = self.id_counter();
        let start = self.gesture.start;
        let Some(particle) =
            self.spawn_particle(start, self.spawn.default_size, self.spawn.default_mass, Vec2::ZERO)
        else {
            return;
        };
        self.enter_mode(GestureMode::Drawing(DrawState {
            last: Some(particle.id),
            last_position: start,
            particles: vec![particle],
            joints: Vec::new(),
            id_counter_before: before,
        }));
    }

    /// Lays the next chain link once the pointer is a full step from the last one.
    pub(crate) fn extend_draw(&mut self, position: Vec2) {
        let GestureMode::Drawing(draw) = &self.gesture.mode else {
            return;
        };
        let step = self.spawn.draw_step.max(f32::EPSILON);
        if position.distance(draw.last_position) < step {
            return;
        }
        let previous = draw.last;

        let Some(particle) = self.spawn_particle(
            position,
            self.spawn.default_size,
            self.spawn.default_mass,
            Vec2::ZERO,
        ) else {
            return;
        };
        let joint = previous.and_then(|previous| self.join(previous, particle.id));

        if let GestureMode::Drawing(draw) = &mut self.gesture.mode {
            draw.last = Some(particle.id);
            draw.last_position = position;
            draw.particles.push(particle);
            draw.joints.extend(joint);
        }
    }

    /// Stamps a regular polygon of particles around the press point, every
    /// pair of vertices joined.
    pub(crate) fn stamp_shape(&mut self) {
        let before = self.id_counter();
        let sides = self.spawn.shape_sides.max(3);
        let vertices = util::polygon_vertices(self.gesture.start, sides, self.spawn.shape_length);
        let (size, mass) = (self.spawn.default_size, self.spawn.default_mass);

        let particles: Vec<_> = vertices
            .into_iter()
            .filter_map(|vertex| self.spawn_particle(vertex, size, mass, Vec2::ZERO))
            .collect();

        let mut joints = Vec::new();
        for (i, a) in particles.iter().enumerate() {
            for b in &particles[i + 1..] {
                joints.extend(self.join(a.id, b.id));
            }
        }

        info!(
            "Stamped {}-sided shape ({} joints)",
            particles.len(),
            joints.len()
        );
        let span = self.id_span(before);
        self.record(UndoAction::shape(particles, joints, span));
    }
}
