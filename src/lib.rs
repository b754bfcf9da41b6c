//! Pointer interaction layer for a particle-physics sandbox.
//!
//! Turns pointer and keyboard events into edits on a particle/joint engine:
//! click-to-spawn with drag sizing, velocity aiming, streaming, chain
//! drawing, shape stamping, brush removal, joint creation, grab-and-throw and
//! pinning, all backed by an undo log. Sessions can be stored, exported and
//! re-imported, and event scripts can be replayed headlessly.

pub mod config;
pub mod engine;
pub mod history;
pub mod input;
pub mod replay;
pub mod session;
pub mod util;

pub use config::Config;
pub use input::InputState;
