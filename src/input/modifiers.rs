//! Keyboard modifier state tracking.

use super::events::{Key, ModifierFlags};

/// Change in the two modifiers that steer gestures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModifierTransition {
    pub stream_pressed: bool,
    pub stream_released: bool,
    pub velocity_pressed: bool,
    pub velocity_released: bool,
}

impl ModifierTransition {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Tracks which modifier keys are held.
///
/// Shift is the streaming modifier (and "keep joining" for the joint tool);
/// Ctrl or Meta is the velocity modifier. Pointer events carry their own
/// flags, which always win over whatever key events reported, so a keyup
/// delivered to another element cannot leave a modifier stuck.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub meta: bool,
    pub alt: bool,
}

impl Modifiers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn streaming(&self) -> bool {
        self.shift
    }

    pub fn velocity(&self) -> bool {
        self.ctrl || self.meta
    }

    pub fn keep_joining(&self) -> bool {
        self.shift
    }

    /// Re-derives state from a pointer event's flags.
    pub fn sync(&mut self, flags: ModifierFlags) -> ModifierTransition {
        let previous = *self;
        self.shift = flags.shift;
        self.ctrl = flags.ctrl;
        self.meta = flags.meta;
        self.alt = flags.alt;
        previous.transition_to(self)
    }

    /// Applies a key press or release. Non-modifier keys are ignored.
    pub fn apply_key(&mut self, key: Key, pressed: bool) -> ModifierTransition {
        let previous = *self;
        match key {
            Key::Shift => self.shift = pressed,
            Key::Ctrl => self.ctrl = pressed,
            Key::Meta => self.meta = pressed,
            Key::Alt => self.alt = pressed,
            _ => {}
        }
        previous.transition_to(self)
    }

    /// Drops every held modifier, e.g. when the window loses focus.
    pub fn release_all(&mut self) -> ModifierTransition {
        let previous = *self;
        *self = Self::default();
        previous.transition_to(self)
    }

    fn transition_to(&self, next: &Modifiers) -> ModifierTransition {
        ModifierTransition {
            stream_pressed: !self.streaming() && next.streaming(),
            stream_released: self.streaming() && !next.streaming(),
            velocity_pressed: !self.velocity() && next.velocity(),
            velocity_released: self.velocity() && !next.velocity(),
        }
    }
}
