//! Keybinding configuration types and parsing.
//!
//! Shortcuts for history, tool selection and cancellation are configurable.
//! Modifier keys that steer gestures (Shift to stream, Ctrl/Cmd to aim
//! velocity) are fixed and handled by the input layer.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// All actions that can be bound to keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Undo,
    Redo,
    /// Cancel joint selection or the pending gesture
    Cancel,
    ClearSystem,
    RemoveSelectedJoints,
    CycleSpawnMode,

    SelectSpawnTool,
    SelectRemoveTool,
    SelectJointTool,
    SelectGrabTool,
    SelectPinTool,
    SelectDrawTool,
    SelectShapeTool,
    SelectEmitterTool,
}

/// A single keybinding: a key with optional modifiers.
///
/// `Cmd`/`Meta` are folded into `ctrl` so one binding serves both platforms.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub key: String,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl KeyBinding {
    /// Parse a keybinding string like "Ctrl+Shift+Z" or "Escape".
    /// Modifiers may appear in any order and spaces around '+' are ignored.
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();
        if s.is_empty() {
            return Err("Empty keybinding string".to_string());
        }

        let normalized = s.replace(" + ", "+").replace("+ ", "+").replace(" +", "+");

        let mut ctrl = false;
        let mut shift = false;
        let mut alt = false;
        let mut key_parts = Vec::new();

        for part in normalized.split('+') {
            match part.to_lowercase().as_str() {
                "ctrl" | "control" | "cmd" | "meta" => ctrl = true,
                "shift" => shift = true,
                "alt" | "option" => alt = true,
                _ => key_parts.push(part),
            }
        }

        if key_parts.is_empty() {
            return Err(format!("No key specified in: {}", s));
        }

        // "Ctrl++" splits into trailing empty parts; the key itself is '+'
        let key = key_parts.join("+");
        let key = if key.is_empty() { "+".to_string() } else { key };

        Ok(Self {
            key,
            ctrl,
            shift,
            alt,
        })
    }

    /// Check if this keybinding matches the given key and modifier state.
    pub fn matches(&self, key: &str, ctrl: bool, shift: bool, alt: bool) -> bool {
        self.key.eq_ignore_ascii_case(key)
            && self.ctrl == ctrl
            && self.shift == shift
            && self.alt == alt
    }
}

/// Configuration for all keybindings.
///
/// ```toml
/// [keybindings]
/// undo = ["Ctrl+Z"]
/// redo = ["Ctrl+Shift+Z", "Ctrl+Y"]
/// select_joint_tool = ["3", "J"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct KeybindingsConfig {
    #[serde(default = "default_undo")]
    pub undo: Vec<String>,

    #[serde(default = "default_redo")]
    pub redo: Vec<String>,

    #[serde(default = "default_cancel")]
    pub cancel: Vec<String>,

    #[serde(default = "default_clear_system")]
    pub clear_system: Vec<String>,

    #[serde(default = "default_remove_selected_joints")]
    pub remove_selected_joints: Vec<String>,

    #[serde(default = "default_cycle_spawn_mode")]
    pub cycle_spawn_mode: Vec<String>,

    #[serde(default = "default_select_spawn_tool")]
    pub select_spawn_tool: Vec<String>,

    #[serde(default = "default_select_remove_tool")]
    pub select_remove_tool: Vec<String>,

    #[serde(default = "default_select_joint_tool")]
    pub select_joint_tool: Vec<String>,

    #[serde(default = "default_select_grab_tool")]
    pub select_grab_tool: Vec<String>,

    #[serde(default = "default_select_pin_tool")]
    pub select_pin_tool: Vec<String>,

    #[serde(default = "default_select_draw_tool")]
    pub select_draw_tool: Vec<String>,

    #[serde(default = "default_select_shape_tool")]
    pub select_shape_tool: Vec<String>,

    #[serde(default = "default_select_emitter_tool")]
    pub select_emitter_tool: Vec<String>,
}

impl Default for KeybindingsConfig {
    fn default() -> Self {
        Self {
            undo: default_undo(),
            redo: default_redo(),
            cancel: default_cancel(),
            clear_system: default_clear_system(),
            remove_selected_joints: default_remove_selected_joints(),
            cycle_spawn_mode: default_cycle_spawn_mode(),
            select_spawn_tool: default_select_spawn_tool(),
            select_remove_tool: default_select_remove_tool(),
            select_joint_tool: default_select_joint_tool(),
            select_grab_tool: default_select_grab_tool(),
            select_pin_tool: default_select_pin_tool(),
            select_draw_tool: default_select_draw_tool(),
            select_shape_tool: default_select_shape_tool(),
            select_emitter_tool: default_select_emitter_tool(),
        }
    }
}

impl KeybindingsConfig {
    /// Build a lookup map from keybindings to actions.
    /// Returns an error if any keybinding string is invalid or bound twice.
    pub fn build_action_map(&self) -> Result<HashMap<KeyBinding, Action>, String> {
        let mut map = HashMap::new();

        let groups: [(&Vec<String>, Action); 14] = [
            (&self.undo, Action::Undo),
            (&self.redo, Action::Redo),
            (&self.cancel, Action::Cancel),
            (&self.clear_system, Action::ClearSystem),
            (&self.remove_selected_joints, Action::RemoveSelectedJoints),
            (&self.cycle_spawn_mode, Action::CycleSpawnMode),
            (&self.select_spawn_tool, Action::SelectSpawnTool),
            (&self.select_remove_tool, Action::SelectRemoveTool),
            (&self.select_joint_tool, Action::SelectJointTool),
            (&self.select_grab_tool, Action::SelectGrabTool),
            (&self.select_pin_tool, Action::SelectPinTool),
            (&self.select_draw_tool, Action::SelectDrawTool),
            (&self.select_shape_tool, Action::SelectShapeTool),
            (&self.select_emitter_tool, Action::SelectEmitterTool),
        ];

        for (bindings, action) in groups {
            for binding_str in bindings {
                let binding = KeyBinding::parse(binding_str)?;
                if let Some(existing) = map.insert(binding, action) {
                    return Err(format!(
                        "Duplicate keybinding '{}' assigned to both {:?} and {:?}",
                        binding_str, existing, action
                    ));
                }
            }
        }

        Ok(map)
    }
}

fn bindings(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|key| key.to_string()).collect()
}

fn default_undo() -> Vec<String> {
    bindings(&["Ctrl+Z"])
}

fn default_redo() -> Vec<String> {
    bindings(&["Ctrl+Shift+Z", "Ctrl+Y"])
}

fn default_cancel() -> Vec<String> {
    bindings(&["Escape"])
}

fn default_clear_system() -> Vec<String> {
    bindings(&["Ctrl+Backspace"])
}

fn default_remove_selected_joints() -> Vec<String> {
    bindings(&["Delete"])
}

fn default_cycle_spawn_mode() -> Vec<String> {
    bindings(&["M"])
}

fn default_select_spawn_tool() -> Vec<String> {
    bindings(&["1", "S"])
}

fn default_select_remove_tool() -> Vec<String> {
    bindings(&["2", "X"])
}

fn default_select_joint_tool() -> Vec<String> {
    bindings(&["3", "J"])
}

fn default_select_grab_tool() -> Vec<String> {
    bindings(&["4", "G"])
}

fn default_select_pin_tool() -> Vec<String> {
    bindings(&["5", "P"])
}

fn default_select_draw_tool() -> Vec<String> {
    bindings(&["6", "D"])
}

fn default_select_shape_tool() -> Vec<String> {
    bindings(&["7"])
}

fn default_select_emitter_tool() -> Vec<String> {
    bindings(&["8", "E"])
}
