mod actions;
mod core;
mod mouse;
mod spawn;
#[cfg(test)]
mod tests;
mod tools;

pub use core::{
    DragIntent, DrawState, GestureMode, GestureState, GrabState, InputState, PendingSpawn,
    RemovalState, StreamOrigin, StreamSource, StreamState, SubMode,
};
