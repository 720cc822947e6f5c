//! Match options chosen before a match starts
//!
//! Speed, win condition and map are plain presets. They are not persisted:
//! only key bindings survive a restart.

use serde::{Deserialize, Serialize};

/// Base ball speed presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpeedPreset {
    Slow,
    #[default]
    Medium,
    Fast,
}

impl SpeedPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpeedPreset::Slow => "slow",
            SpeedPreset::Medium => "medium",
            SpeedPreset::Fast => "fast",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "slow" => Some(SpeedPreset::Slow),
            "medium" | "med" => Some(SpeedPreset::Medium),
            "fast" => Some(SpeedPreset::Fast),
            _ => None,
        }
    }

    /// Ball speed in world units per reference frame
    pub fn base_speed(&self) -> f32 {
        match self {
            SpeedPreset::Slow => 0.12,
            SpeedPreset::Medium => 0.16,
            SpeedPreset::Fast => 0.22,
        }
    }
}

/// Best-of-N win conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WinMode {
    #[default]
    Bo5,
    Bo9,
    Bo19,
}

impl WinMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WinMode::Bo5 => "bo5",
            WinMode::Bo9 => "bo9",
            WinMode::Bo19 => "bo19",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "bo5" | "best of 5" => Some(WinMode::Bo5),
            "bo9" | "best of 9" => Some(WinMode::Bo9),
            "bo19" | "best of 19" => Some(WinMode::Bo19),
            _ => None,
        }
    }

    /// Points needed to win the match
    pub fn win_target(&self) -> u32 {
        match self {
            WinMode::Bo5 => 3,
            WinMode::Bo9 => 5,
            WinMode::Bo19 => 10,
        }
    }
}

/// Arena layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MapKey {
    #[default]
    Default,
    /// Everything scaled up, faster ball
    Large,
    /// Large layout plus two mid-field walls
    Obstacles,
}

impl MapKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            MapKey::Default => "default",
            MapKey::Large => "large",
            MapKey::Obstacles => "obstacles",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "default" => Some(MapKey::Default),
            "large" => Some(MapKey::Large),
            "obstacles" => Some(MapKey::Obstacles),
            _ => None,
        }
    }

    /// Multiplier applied on top of the speed preset
    pub fn speed_multiplier(&self) -> f32 {
        match self {
            MapKey::Default => 1.0,
            MapKey::Large | MapKey::Obstacles => 2.0,
        }
    }
}

/// Options for a single match
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct MatchSettings {
    pub speed: SpeedPreset,
    pub win_mode: WinMode,
    pub map: MapKey,
}

impl MatchSettings {
    pub fn win_target(&self) -> u32 {
        self.win_mode.win_target()
    }

    /// Serve speed with the map multiplier applied
    pub fn serve_speed(&self) -> f32 {
        self.speed.base_speed() * self.map.speed_multiplier()
    }
}
