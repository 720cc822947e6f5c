//! Per-player key bindings
//!
//! Each side maps the four logical actions to one physical key code
//! (`KeyboardEvent.code` strings such as `KeyW` or `ArrowUp`). Bindings are
//! the only thing the engine persists.

mod capture;

pub use capture::{BindingEditor, CaptureOutcome};

use serde::{Deserialize, Serialize};

use crate::Side;
use crate::platform::{KeyValueStore, StorageError};

/// Logical per-side actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Up,
    Down,
    Boost,
    Shield,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Up, Action::Down, Action::Boost, Action::Shield];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Up => "up",
            Action::Down => "down",
            Action::Boost => "boost",
            Action::Shield => "shield",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "up" => Some(Action::Up),
            "down" => Some(Action::Down),
            "boost" => Some(Action::Boost),
            "shield" => Some(Action::Shield),
            _ => None,
        }
    }
}

/// A single binding slot: one action of one side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot {
    pub side: Side,
    pub action: Action,
}

impl Slot {
    pub fn new(side: Side, action: Action) -> Self {
        Self { side, action }
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.side.as_str(), self.action.as_str())
    }
}

/// Two slots bound to the same code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub first: Slot,
    pub second: Slot,
    pub code: String,
}

/// Key codes for one side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideBindings {
    pub up: String,
    pub down: String,
    pub boost: String,
    pub shield: String,
}

impl SideBindings {
    /// Built-in defaults for a side
    pub fn default_for(side: Side) -> Self {
        let codes = match side {
            Side::One => ["KeyW", "KeyS", "KeyA", "KeyD"],
            Side::Two => ["ArrowUp", "ArrowDown", "ArrowRight", "ArrowLeft"],
        };
        Self {
            up: codes[0].to_string(),
            down: codes[1].to_string(),
            boost: codes[2].to_string(),
            shield: codes[3].to_string(),
        }
    }

    pub fn get(&self, action: Action) -> &str {
        match action {
            Action::Up => &self.up,
            Action::Down => &self.down,
            Action::Boost => &self.boost,
            Action::Shield => &self.shield,
        }
    }

    pub fn set(&mut self, action: Action, code: impl Into<String>) {
        let code = code.into();
        match action {
            Action::Up => self.up = code,
            Action::Down => self.down = code,
            Action::Boost => self.boost = code,
            Action::Shield => self.shield = code,
        }
    }

    fn is_complete(&self) -> bool {
        Action::ALL.iter().all(|&a| !self.get(a).is_empty())
    }
}

/// Bindings for both sides
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBindings {
    pub p1: SideBindings,
    pub p2: SideBindings,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            p1: SideBindings::default_for(Side::One),
            p2: SideBindings::default_for(Side::Two),
        }
    }
}

impl KeyBindings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "pong.bindings.v1";

    pub fn side(&self, side: Side) -> &SideBindings {
        match side {
            Side::One => &self.p1,
            Side::Two => &self.p2,
        }
    }

    pub fn side_mut(&mut self, side: Side) -> &mut SideBindings {
        match side {
            Side::One => &mut self.p1,
            Side::Two => &mut self.p2,
        }
    }

    pub fn code(&self, slot: Slot) -> &str {
        self.side(slot.side).get(slot.action)
    }

    pub fn set(&mut self, slot: Slot, code: impl Into<String>) {
        self.side_mut(slot.side).set(slot.action, code);
    }

    /// All eight slots in display order (side One first)
    pub fn slots(&self) -> impl Iterator<Item = (Slot, &str)> + '_ {
        Side::BOTH.into_iter().flat_map(move |side| {
            Action::ALL
                .into_iter()
                .map(move |action| (Slot::new(side, action), self.side(side).get(action)))
        })
    }

    /// Every slot bound to `code`
    pub fn resolve(&self, code: &str) -> Vec<Slot> {
        self.slots()
            .filter(|(_, bound)| *bound == code)
            .map(|(slot, _)| slot)
            .collect()
    }

    /// Every pair of slots sharing a code, in slot order
    pub fn find_conflicts(&self) -> Vec<Conflict> {
        let all: Vec<(Slot, &str)> = self.slots().collect();
        let mut conflicts = Vec::new();
        for (i, (first, code)) in all.iter().enumerate() {
            for (second, other) in &all[i + 1..] {
                if code == other {
                    conflicts.push(Conflict {
                        first: *first,
                        second: *second,
                        code: code.to_string(),
                    });
                }
            }
        }
        conflicts
    }

    pub fn reset_side(&mut self, side: Side) {
        *self.side_mut(side) = SideBindings::default_for(side);
    }

    pub fn reset_all(&mut self) {
        *self = Self::default();
    }

    pub fn swap_sides(&mut self) {
        std::mem::swap(&mut self.p1, &mut self.p2);
    }

    /// Parse persisted bindings, rejecting incomplete entries
    pub fn from_json(json: &str) -> Option<Self> {
        serde_json::from_str::<KeyBindings>(json)
            .ok()
            .filter(|b| b.p1.is_complete() && b.p2.is_complete())
    }

    /// Load bindings, falling back to defaults on missing or malformed data
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match store.get(Self::STORAGE_KEY) {
            Some(json) => match Self::from_json(&json) {
                Some(bindings) => {
                    log::info!("Loaded key bindings");
                    bindings
                }
                None => {
                    log::info!("Stored key bindings unreadable, using defaults");
                    Self::default()
                }
            },
            None => {
                log::info!("Using default key bindings");
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StorageError> {
        let json = serde_json::to_string(self).map_err(|e| StorageError::Write {
            key: Self::STORAGE_KEY.to_string(),
            reason: e.to_string(),
        })?;
        store.set(Self::STORAGE_KEY, &json)?;
        log::debug!("Key bindings saved");
        Ok(())
    }
}

/// Short display label for a key code
pub fn label_for_code(code: &str) -> String {
    if let Some(rest) = code.strip_prefix("Key") {
        return rest.to_string();
    }
    if let Some(rest) = code.strip_prefix("Digit") {
        return rest.to_string();
    }
    let special = match code {
        "ArrowUp" => "↑",
        "ArrowDown" => "↓",
        "ArrowLeft" => "←",
        "ArrowRight" => "→",
        "Space" => "Space",
        "ShiftLeft" => "L-Shift",
        "ShiftRight" => "R-Shift",
        "ControlLeft" => "L-Ctrl",
        "ControlRight" => "R-Ctrl",
        "AltLeft" => "L-Alt",
        "AltRight" => "R-Alt",
        other => other,
    };
    special.to_string()
}
