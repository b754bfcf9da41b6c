use super::error::SessionError;
use super::snapshot::{self, SessionData};
use crate::config::Config;
use chrono::{DateTime, Utc};
use fs2::FileExt;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

const INDEX_FILE: &str = "index.json";
const LOCK_FILE: &str = "index.lock";

/// Index entry describing one stored session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub id: String,
    pub name: String,
    pub saved_at: DateTime<Utc>,
    pub particle_count: usize,
    pub joint_count: usize,
}

impl SessionMetadata {
    fn describe(id: String, data: &SessionData) -> Self {
        Self {
            id,
            name: data.name.clone(),
            saved_at: data.saved_at,
            particle_count: data.particles.len(),
            joint_count: data.joints.len(),
        }
    }
}

/// Named-session storage.
pub trait SessionStore {
    /// Stores the session under an id derived from its name, replacing any
    /// session with the same id. Returns the id.
    fn save(&mut self, data: &SessionData) -> Result<String, SessionError>;

    fn load(&self, id: &str) -> Result<Option<SessionData>, SessionError>;

    /// Stored sessions, newest first.
    fn list(&self) -> Result<Vec<SessionMetadata>, SessionError>;

    /// Returns `false` if no session had that id.
    fn delete(&mut self, id: &str) -> Result<bool, SessionError>;
}

/// Directory-backed store: `<id>.json` per session plus an `index.json`.
///
/// Writers hold an exclusive lock on `index.lock`, readers a shared one, so
/// two processes sharing the directory never see a half-written index.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at the configured (or default) session directory.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self::new(config.session_dir()?))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn session_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    fn index_path(&self) -> PathBuf {
        self.dir.join(INDEX_FILE)
    }

    fn lock(&self, exclusive: bool) -> Result<File, SessionError> {
        fs::create_dir_all(&self.dir).map_err(|err| SessionError::io(&self.dir, err))?;
        let lock_path = self.dir.join(LOCK_FILE);
        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|err| SessionError::io(&lock_path, err))?;
        let locked = if exclusive {
            lock_file.lock_exclusive()
        } else {
            lock_file.lock_shared()
        };
        locked.map_err(|err| SessionError::io(&lock_path, err))?;
        Ok(lock_file)
    }

    fn unlock(&self, lock_file: File) {
        lock_file.unlock().unwrap_or_else(|err| {
            warn!(
                "failed to unlock session index in {}: {}",
                self.dir.display(),
                err
            )
        });
    }

    fn read_index(&self) -> Result<Vec<SessionMetadata>, SessionError> {
        let path = self.index_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let bytes = fs::read(&path).map_err(|err| SessionError::io(&path, err))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn write_index(&self, index: &[SessionMetadata]) -> Result<(), SessionError> {
        let bytes = serde_json::to_vec_pretty(index)?;
        snapshot::write_atomically(&self.index_path(), &bytes)
    }

    fn with_lock<T>(
        &self,
        exclusive: bool,
        f: impl FnOnce(&Self) -> Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        let lock_file = self.lock(exclusive)?;
        let result = f(self);
        self.unlock(lock_file);
        result
    }
}

impl SessionStore for FileSessionStore {
    fn save(&mut self, data: &SessionData) -> Result<String, SessionError> {
        let id = sanitize_identifier(&data.name);
        if id.is_empty() {
            return Err(SessionError::InvalidName(data.name.clone()));
        }
        self.with_lock(true, |store| {
            let bytes = snapshot::encode_session(data, false)?;
            snapshot::write_atomically(&store.session_path(&id), &bytes)?;

            let mut index = store.read_index()?;
            index.retain(|entry| entry.id != id);
            index.push(SessionMetadata::describe(id.clone(), data));
            store.write_index(&index)?;
            info!(
                "Session '{}' saved to {} ({} bytes)",
                data.name,
                store.session_path(&id).display(),
                bytes.len()
            );
            Ok(id.clone())
        })
    }

    fn load(&self, id: &str) -> Result<Option<SessionData>, SessionError> {
        let id = sanitize_identifier(id);
        self.with_lock(false, |store| {
            let path = store.session_path(&id);
            if !path.exists() {
                debug!("No session file at {}", path.display());
                return Ok(None);
            }
            let bytes = fs::read(&path).map_err(|err| SessionError::io(&path, err))?;
            snapshot::decode_session(&bytes).map(Some)
        })
    }

    fn list(&self) -> Result<Vec<SessionMetadata>, SessionError> {
        let mut index = self.with_lock(false, |store| store.read_index())?;
        index.sort_by(|a, b| b.saved_at.cmp(&a.saved_at).then_with(|| a.id.cmp(&b.id)));
        Ok(index)
    }

    fn delete(&mut self, id: &str) -> Result<bool, SessionError> {
        let id = sanitize_identifier(id);
        self.with_lock(true, |store| {
            let path = store.session_path(&id);
            let existed = path.exists();
            if existed {
                fs::remove_file(&path).map_err(|err| SessionError::io(&path, err))?;
            }
            let mut index = store.read_index()?;
            let before = index.len();
            index.retain(|entry| entry.id != id);
            if index.len() != before {
                store.write_index(&index)?;
            }
            if existed {
                info!("Deleted session '{}'", id);
            }
            Ok(existed)
        })
    }
}

/// Maps a session name to a file-safe id.
pub fn sanitize_identifier(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}
