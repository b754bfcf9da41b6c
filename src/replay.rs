//! Scripted event replay against the in-memory sandbox.
//!
//! A script is a JSON list of timestamped pointer, keyboard and tool events.
//! Timestamps are milliseconds from the start of the script; before each
//! event the stream timer is advanced to that time, so held streams emit
//! exactly as they would live.

use crate::engine::{JointSystem, ParticleSystem};
use crate::input::{InputState, Key, ModifierFlags, MouseButton, PointerEvent, Tool};
use anyhow::{Context, Result};
use glam::Vec2;
use log::{debug, info};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

/// One scripted event.
#[derive(Debug, Clone, Deserialize)]
pub struct ScriptEvent {
    /// Milliseconds since the script started
    #[serde(default)]
    pub at: u64,
    #[serde(flatten)]
    pub action: ScriptAction,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptAction {
    Down {
        x: f32,
        y: f32,
        #[serde(default)]
        button: MouseButton,
        #[serde(flatten)]
        modifiers: ModifierFlags,
    },
    Move {
        x: f32,
        y: f32,
        #[serde(flatten)]
        modifiers: ModifierFlags,
    },
    Up {
        x: f32,
        y: f32,
        #[serde(default)]
        button: MouseButton,
        #[serde(flatten)]
        modifiers: ModifierFlags,
    },
    Leave,
    KeyDown {
        key: Key,
    },
    KeyUp {
        key: Key,
    },
    Tool {
        tool: Tool,
    },
    /// Frame boundary: runs due stream emissions and compacts removed particles
    Tick,
    Undo,
    Redo,
    Clear,
}

/// A parsed script. Accepts a bare event array or `{ "events": [...] }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ScriptFile {
    Events(Vec<ScriptEvent>),
    Wrapped { events: Vec<ScriptEvent> },
}

#[derive(Debug, Clone)]
pub struct Script {
    pub events: Vec<ScriptEvent>,
}

impl Script {
    pub fn parse(json: &str) -> Result<Self> {
        let file: ScriptFile = serde_json::from_str(json).context("Failed to parse event script")?;
        let events = match file {
            ScriptFile::Events(events) | ScriptFile::Wrapped { events } => events,
        };
        Ok(Self { events })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read script {}", path.display()))?;
        Self::parse(&json).with_context(|| format!("Invalid script {}", path.display()))
    }
}

/// What the sandbox looks like after a replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaySummary {
    pub events: usize,
    pub particles: usize,
    pub joints: usize,
    pub undo_depth: usize,
    pub redo_depth: usize,
}

impl ReplaySummary {
    pub fn capture(input: &InputState, events: usize) -> Self {
        Self {
            events,
            particles: input.system().map_or(0, |s| {
                s.particles().iter().filter(|p| p.is_live()).count()
            }),
            joints: input.joints().map_or(0, |j| j.joints().len()),
            undo_depth: input.history().undo_len(),
            redo_depth: input.history().redo_len(),
        }
    }
}

impl fmt::Display for ReplaySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "events: {}", self.events)?;
        writeln!(f, "particles: {}", self.particles)?;
        writeln!(f, "joints: {}", self.joints)?;
        writeln!(f, "undo depth: {}", self.undo_depth)?;
        write!(f, "redo depth: {}", self.redo_depth)
    }
}

/// Feeds every event into `input`, with script time zero at `base`.
pub fn run(input: &mut InputState, script: &Script, base: Instant) -> ReplaySummary {
    for event in &script.events {
        let now = base + Duration::from_millis(event.at);
        input.advance(now);
        debug!("t+{}ms {:?}", event.at, event.action);
        apply(input, &event.action, now);
    }
    let summary = ReplaySummary::capture(input, script.events.len());
    info!(
        "Replayed {} events: {} particles, {} joints",
        summary.events, summary.particles, summary.joints
    );
    summary
}

fn apply(input: &mut InputState, action: &ScriptAction, now: Instant) {
    let pointer = |x: f32, y: f32, button: MouseButton, modifiers: ModifierFlags| {
        PointerEvent::new(Vec2::new(x, y), now)
            .with_button(button)
            .with_modifiers(modifiers)
    };
    match *action {
        ScriptAction::Down {
            x,
            y,
            button,
            modifiers,
        } => input.on_pointer_down(pointer(x, y, button, modifiers)),
        ScriptAction::Move { x, y, modifiers } => {
            input.on_pointer_move(pointer(x, y, MouseButton::Left, modifiers))
        }
        ScriptAction::Up {
            x,
            y,
            button,
            modifiers,
        } => input.on_pointer_up(pointer(x, y, button, modifiers)),
        ScriptAction::Leave => input.on_pointer_leave(),
        ScriptAction::KeyDown { key } => input.on_key_press(key, now),
        ScriptAction::KeyUp { key } => input.on_key_release(key, now),
        ScriptAction::Tool { tool } => input.set_tool(tool),
        ScriptAction::Tick => compact(input),
        ScriptAction::Undo => {
            input.undo();
        }
        ScriptAction::Redo => {
            input.redo();
        }
        ScriptAction::Clear => input.clear_system(),
    }
}

/// Stands in for the engine's per-frame compaction of removed particles.
fn compact(input: &mut InputState) {
    let Some(system) = input.system_mut() else {
        return;
    };
    let dead = system.compact();
    if let Some(joints) = input.joints_mut() {
        for id in dead {
            joints.remove_joints_for_particle(id);
        }
    }
}
