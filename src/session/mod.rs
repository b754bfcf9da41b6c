//! Session persistence (save/restore) support.
//!
//! Converts the engine contents behind an [`InputState`](crate::input::InputState)
//! into a serialisable [`SessionData`], stores it in a named-session store
//! with locking, and exports/imports single sessions as plain or
//! gzip-compressed JSON.

mod error;
mod snapshot;
mod storage;

pub use error::SessionError;
pub use snapshot::{
    CURRENT_VERSION, SessionData, decode_session, encode_session, export_session, import_session,
};
pub use storage::{FileSessionStore, SessionMetadata, SessionStore, sanitize_identifier};
