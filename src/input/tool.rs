//! Tool selection.

use serde::{Deserialize, Serialize};

/// The tool the pointer currently drives. Exactly one is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    /// Spawn particles; behaviour follows the configured spawn mode
    #[default]
    Spawn,
    /// Brush that removes particles under the pointer
    Remove,
    /// Click two particles to join them
    Joint,
    /// Drag a particle and throw it on release
    Grab,
    /// Toggle a particle's pinned flag
    Pin,
    /// Lay down a jointed chain
    Draw,
    /// Stamp a jointed polygon
    Shape,
    /// Stationary stream at the pressed point
    Emitter,
}

impl Tool {
    /// Tools that act on an existing particle under the pointer.
    pub fn picks_particles(self) -> bool {
        matches!(self, Tool::Joint | Tool::Grab | Tool::Pin)
    }
}
