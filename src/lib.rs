//! Rally Pong - A two-player arcade pong engine
//!
//! Core modules:
//! - `sim`: Match simulation (swept collisions, boost/shield modifiers, match lifecycle)
//! - `bindings`: Per-player key bindings with capture-based rebinding
//! - `input`: Raw input events resolved against the bindings
//! - `tournament`: Seeded single-elimination bracket with byes
//! - `report`: Result records handed to the external reporting adapter
//! - `settings`: Match presets (speed, win mode, map)
//! - `platform`: Storage and logging glue for browser/native hosts
//! - `web`: wasm-bindgen surface for a browser host (wasm32 only)

pub mod bindings;
pub mod input;
pub mod platform;
pub mod report;
pub mod settings;
pub mod sim;
pub mod tournament;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use bindings::{Action, BindingEditor, KeyBindings};
pub use settings::{MapKey, MatchSettings, SpeedPreset, WinMode};
pub use tournament::{Bracket, Entrant};

use serde::{Deserialize, Serialize};

/// Game configuration constants
///
/// Distances are world units on the floor plane; speeds are per reference
/// frame and get scaled by [`delta_factor`].
pub mod consts {
    /// Frame rate the per-frame speeds were tuned at
    pub const REFERENCE_FPS: f32 = 60.0;
    /// Duration of one reference frame in milliseconds
    pub const REFERENCE_FRAME_MS: f32 = 1000.0 / REFERENCE_FPS;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 0.2;
    /// Serve direction before normalization (signs are randomized per rally)
    pub const SERVE_X: f32 = 0.07;
    pub const SERVE_Y: f32 = 0.04;

    /// Paddle defaults - paddles sit at ±PADDLE_DISTANCE on the x axis
    pub const PADDLE_DISTANCE: f32 = 8.0;
    pub const PADDLE_HALF_WIDTH: f32 = 0.15;
    pub const PADDLE_HALF_DEPTH: f32 = 1.0;
    /// Paddle travel per reference frame
    pub const PADDLE_SPEED: f32 = 0.125;

    /// Side walls
    pub const WALL_DISTANCE: f32 = 6.2;
    pub const WALL_HALF_LENGTH: f32 = 50.0;
    pub const WALL_HALF_DEPTH: f32 = 0.25;

    /// Distance past the paddle line where a point is scored
    pub const GOAL_MARGIN: f32 = 1.5;

    /// Speed multiplier for a boosted paddle hit
    pub const BOOST_MULTIPLIER: f32 = 1.25;
    /// Ball glow = BOOST_GLOW_FACTOR * level²
    pub const BOOST_GLOW_FACTOR: f32 = 0.05;
    /// Boost level below which no visual effect applies
    pub const BOOST_VISUAL_THRESHOLD: u32 = 1;

    /// Shield defaults
    pub const SHIELD_MAX_HP: u8 = 3;
    pub const SHIELD_HALF_WIDTH: f32 = 0.1;
    pub const SHIELD_HALF_DEPTH: f32 = 0.75;
    pub const SHIELD_GAP: f32 = 0.05;

    /// Delay between a scored point and the next rally (milliseconds)
    pub const SETTLE_DELAY_MS: f64 = 500.0;

    /// Rating given to entrants without a usable one
    pub const BASELINE_RATING: f64 = 1000.0;
}

/// One of the two players. Side One defends +x, side Two defends -x.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    #[serde(rename = "p1")]
    One,
    #[serde(rename = "p2")]
    Two,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::One, Side::Two];

    /// Array index for per-side storage
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Side::One => 0,
            Side::Two => 1,
        }
    }

    #[inline]
    pub fn opponent(self) -> Side {
        match self {
            Side::One => Side::Two,
            Side::Two => Side::One,
        }
    }

    /// Sign of the x axis this side defends
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Side::One => 1.0,
            Side::Two => -1.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::One => "p1",
            Side::Two => "p2",
        }
    }
}

/// Convert a tick duration into the reference-frame scaling factor
#[inline]
pub fn delta_factor(dt_ms: f32) -> f32 {
    dt_ms.max(0.0) / consts::REFERENCE_FRAME_MS
}
