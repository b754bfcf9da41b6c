//! Preview channel to the renderer plus a recording implementation.

use super::{Color, ParticleId};
use glam::Vec2;

/// Ghost particle drawn while a spawn gesture is pending.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewParticle {
    pub position: Vec2,
    pub size: f32,
    pub mass: f32,
    pub color: Color,
}

/// Circle showing the removal tool's reach, in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RemovalPreview {
    pub position: Vec2,
    pub radius: f32,
}

/// Line from the selected joint endpoint to the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointPreview {
    pub particle: ParticleId,
    pub target: Vec2,
}

/// Renderer-side hooks used for previews and coordinate conversion.
///
/// None of these calls have a physics effect.
pub trait PreviewRenderer {
    fn set_preview_particle(&mut self, particle: Option<PreviewParticle>, dashed: bool);
    /// Velocity arrow anchored at the preview particle.
    fn set_preview_velocity(&mut self, velocity: Option<Vec2>);
    fn set_removal_preview(&mut self, preview: Option<RemovalPreview>);
    fn set_joint_preview(&mut self, preview: Option<JointPreview>);
    fn set_highlighted_particle(&mut self, particle: Option<ParticleId>);
    fn set_selected_particle(&mut self, particle: Option<ParticleId>);
    fn screen_to_world(&self, screen: Vec2) -> Vec2;
    fn zoom(&self) -> f32;
}

/// Pan/zoom transform: `world = offset + screen / zoom`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub offset: Vec2,
    pub zoom: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl Camera {
    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        self.offset + screen / self.zoom.max(f32::EPSILON)
    }
}

/// Stores the latest preview state so a frame loop (or a test) can read it back.
#[derive(Debug, Clone, Default)]
pub struct PreviewBuffer {
    pub camera: Camera,
    pub particle: Option<PreviewParticle>,
    pub dashed: bool,
    pub velocity: Option<Vec2>,
    pub removal: Option<RemovalPreview>,
    pub joint: Option<JointPreview>,
    pub highlighted: Option<ParticleId>,
    pub selected: Option<ParticleId>,
}

impl PreviewBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_camera(camera: Camera) -> Self {
        Self {
            camera,
            ..Self::default()
        }
    }

    /// True when no transient preview is showing (selection/highlight excluded).
    pub fn is_clear(&self) -> bool {
        self.particle.is_none()
            && self.velocity.is_none()
            && self.removal.is_none()
            && self.joint.is_none()
    }
}

impl PreviewRenderer for PreviewBuffer {
    fn set_preview_particle(&mut self, particle: Option<PreviewParticle>, dashed: bool) {
        self.particle = particle;
        self.dashed = particle.is_some() && dashed;
    }

    fn set_preview_velocity(&mut self, velocity: Option<Vec2>) {
        self.velocity = velocity;
    }

    fn set_removal_preview(&mut self, preview: Option<RemovalPreview>) {
        self.removal = preview;
    }

    fn set_joint_preview(&mut self, preview: Option<JointPreview>) {
        self.joint = preview;
    }

    fn set_highlighted_particle(&mut self, particle: Option<ParticleId>) {
        self.highlighted = particle;
    }

    fn set_selected_particle(&mut self, particle: Option<ParticleId>) {
        self.selected = particle;
    }

    fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        self.camera.screen_to_world(screen)
    }

    fn zoom(&self) -> f32 {
        self.camera.zoom
    }
}
