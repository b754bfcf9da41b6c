//! Pointer interaction layer.
//!
//! This module turns host pointer and keyboard events into edits on the
//! particle and joint systems. It tracks the active tool and modifier keys,
//! runs the gesture state machine (sizing, velocity aiming, streaming,
//! drawing, removal, joint selection, grabbing) and records every finished
//! edit in the undo log.

pub mod events;
pub mod modifiers;
pub mod spatial;
pub mod state;
pub mod tool;

// Re-export commonly used types at module level
pub use events::{Key, ModifierFlags, MouseButton, PointerEvent};
pub use modifiers::Modifiers;
pub use state::{GestureMode, InputState, SubMode};
pub use tool::Tool;
