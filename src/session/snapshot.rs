use super::error::SessionError;
use crate::config::SpawnConfig;
use crate::engine::{Joint, JointSystem, Particle, ParticleSystem, PreviewRenderer};
use crate::input::InputState;
use chrono::{DateTime, Utc};
use flate2::{Compression, bufread::GzDecoder, write::GzEncoder};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Newest on-disk format. Version 0 files predate the stored id counter.
pub const CURRENT_VERSION: u32 = 1;

/// Engine contents plus the spawn settings in effect when it was captured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub saved_at: DateTime<Utc>,
    #[serde(default)]
    pub particles: Vec<Particle>,
    #[serde(default)]
    pub joints: Vec<Joint>,
    #[serde(default)]
    pub id_counter: u64,
    #[serde(default)]
    pub spawn: SpawnConfig,
}

impl SessionData {
    /// Brings an older file up to [`CURRENT_VERSION`].
    pub fn migrate(mut self) -> Result<Self, SessionError> {
        if self.version > CURRENT_VERSION {
            return Err(SessionError::UnsupportedVersion {
                found: self.version,
                supported: CURRENT_VERSION,
            });
        }
        if self.version == 0 {
            let next = self.particles.iter().map(|p| p.id.0).max().map_or(1, |max| max + 1);
            debug!("Migrating version 0 session; id counter derived as {}", next);
            self.id_counter = next;
            self.version = CURRENT_VERSION;
        }
        // Never hand out an id that a stored particle already has
        if let Some(max) = self.particles.iter().map(|p| p.id.0).max() {
            if self.id_counter <= max {
                warn!(
                    "Session id counter {} is behind particle #{}; bumping",
                    self.id_counter, max
                );
                self.id_counter = max + 1;
            }
        }
        Ok(self)
    }
}

impl<S, J, R> InputState<S, J, R>
where
    S: ParticleSystem,
    J: JointSystem,
    R: PreviewRenderer,
{
    /// Captures live particles and joints. Returns `None` without a particle system.
    pub fn snapshot_session(&self, name: &str) -> Option<SessionData> {
        let system = self.system()?;
        let particles: Vec<Particle> = system
            .particles()
            .iter()
            .filter(|p| p.is_live())
            .cloned()
            .collect();
        let joints = self
            .joints()
            .map(|joints| {
                joints
                    .joints()
                    .iter()
                    .filter(|j| {
                        system.live_particle(j.a).is_some() && system.live_particle(j.b).is_some()
                    })
                    .copied()
                    .collect()
            })
            .unwrap_or_default();
        Some(SessionData {
            version: CURRENT_VERSION,
            name: name.to_string(),
            saved_at: Utc::now(),
            particles,
            joints,
            id_counter: system.id_counter(),
            spawn: self.spawn.clone(),
        })
    }

    /// Replaces the engine contents with a stored session.
    ///
    /// Ends any gesture and clears history; undo never crosses a session
    /// boundary.
    pub fn load_session(&mut self, data: SessionData) {
        info!(
            "Loading session '{}' ({} particles, {} joints)",
            data.name,
            data.particles.len(),
            data.joints.len()
        );
        self.spawn = data.spawn;
        self.replace_contents(data.particles, &data.joints, data.id_counter);
    }
}

/// Serialises a session as pretty JSON, gzip-compressed if requested.
pub fn encode_session(data: &SessionData, compress: bool) -> Result<Vec<u8>, SessionError> {
    let json = serde_json::to_vec_pretty(data)?;
    if !compress {
        return Ok(json);
    }
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&json)
        .map_err(|err| SessionError::io("<gzip>", err))?;
    encoder
        .finish()
        .map_err(|err| SessionError::io("<gzip>", err))
}

/// Parses plain or gzip-compressed JSON and migrates it.
pub fn decode_session(bytes: &[u8]) -> Result<SessionData, SessionError> {
    let json = if is_gzip(bytes) {
        let mut decoder = GzDecoder::new(bytes);
        let mut out = Vec::new();
        decoder
            .read_to_end(&mut out)
            .map_err(|err| SessionError::io("<gzip>", err))?;
        out
    } else {
        bytes.to_vec()
    };
    let data: SessionData = serde_json::from_slice(&json)?;
    data.migrate()
}

/// Writes one session to `path`; a `.gz` extension selects compression.
pub fn export_session(data: &SessionData, path: &Path) -> Result<(), SessionError> {
    let compress = path.extension().is_some_and(|ext| ext == "gz");
    let bytes = encode_session(data, compress)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| SessionError::io(parent, err))?;
    }
    write_atomically(path, &bytes)?;
    info!(
        "Exported session '{}' to {} ({} bytes, compression={})",
        data.name,
        path.display(),
        bytes.len(),
        compress
    );
    Ok(())
}

/// Reads a session exported by [`export_session`] (compression is sniffed).
pub fn import_session(path: &Path) -> Result<SessionData, SessionError> {
    let bytes = fs::read(path).map_err(|err| SessionError::io(path, err))?;
    let data = decode_session(&bytes)?;
    info!("Imported session '{}' from {}", data.name, path.display());
    Ok(data)
}

/// Writes to a sibling temp file then renames it over `target`.
pub(crate) fn write_atomically(target: &Path, bytes: &[u8]) -> Result<(), SessionError> {
    let tmp_path = temp_path(target);
    {
        let mut tmp_file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&tmp_path)
            .map_err(|err| SessionError::io(&tmp_path, err))?;
        tmp_file
            .write_all(bytes)
            .map_err(|err| SessionError::io(&tmp_path, err))?;
        tmp_file
            .sync_all()
            .map_err(|err| SessionError::io(&tmp_path, err))?;
    }
    fs::rename(&tmp_path, target).map_err(|err| SessionError::io(target, err))
}

fn is_gzip(bytes: &[u8]) -> bool {
    bytes.len() > 2 && bytes[0] == 0x1f && bytes[1] == 0x8b
}

fn temp_path(target: &Path) -> PathBuf {
    let file_name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "session".to_string());
    let mut candidate = target.with_file_name(format!("{}.tmp", file_name));
    let mut counter = 0u32;
    while candidate.exists() {
        counter += 1;
        candidate = target.with_file_name(format!("{}.tmp{}", file_name, counter));
    }
    candidate
}
