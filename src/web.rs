//! Browser host surface
//!
//! The page owns rendering, audio and the frame loop. It forwards keyboard
//! codes and frame deltas here and draws from the JSON snapshots.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::Side;
use crate::bindings::{Action, BindingEditor};
use crate::input::InputEvent;
use crate::platform::{self, LocalStore};
use crate::settings::MatchSettings;
use crate::sim::{Ball, MatchConfig, MatchPhase, MatchSession, Score, VolumeRegistry};

#[derive(Serialize)]
struct ShieldView {
    active: bool,
    broken: bool,
    spent: bool,
    hp: u8,
}

#[derive(Serialize)]
struct Snapshot<'a> {
    phase: MatchPhase,
    score: Score,
    ball: &'a Ball,
    paddles: [f32; 2],
    shields: [ShieldView; 2],
    boost_level: u32,
    boost_glow: f32,
    trail: f32,
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        log::error!("Failed to encode snapshot: {}", e);
        "null".to_string()
    })
}

/// One match plus the saved key bindings
#[wasm_bindgen]
pub struct WebMatch {
    session: MatchSession<VolumeRegistry>,
    editor: BindingEditor<LocalStore>,
}

#[wasm_bindgen]
impl WebMatch {
    /// `settings_json` is a serialized `MatchSettings`; bad input means defaults
    #[wasm_bindgen(constructor)]
    pub fn new(name1: String, name2: String, settings_json: &str, seed: f64) -> WebMatch {
        platform::init_logging();
        let settings: MatchSettings = serde_json::from_str(settings_json).unwrap_or_else(|e| {
            log::warn!("Invalid match settings ({}), using defaults", e);
            MatchSettings::default()
        });
        let config = MatchConfig::new(name1, name2, settings).with_seed(seed.max(0.0) as u64);
        WebMatch {
            session: MatchSession::new(config, VolumeRegistry::new()),
            editor: BindingEditor::new(LocalStore, true),
        }
    }

    /// Returns true when the key went to a pending rebind instead of the game
    pub fn key_down(&mut self, code: &str) -> bool {
        if self.editor.handle_key(code).consumed() {
            return true;
        }
        self.session
            .handle_input(self.editor.bindings(), &InputEvent::pressed(code));
        false
    }

    pub fn key_up(&mut self, code: &str) {
        self.session
            .handle_input(self.editor.bindings(), &InputEvent::released(code));
    }

    /// Side is 1 or 2; action is up/down/boost/shield
    pub fn begin_capture(&mut self, side: u8, action: &str) -> bool {
        let side = match side {
            1 => Side::One,
            2 => Side::Two,
            _ => return false,
        };
        match Action::from_str(action) {
            Some(action) => {
                self.editor.begin_capture(side, action);
                true
            }
            None => false,
        }
    }

    pub fn cancel_capture(&mut self) {
        self.editor.cancel_capture();
    }

    pub fn reset_bindings(&mut self) {
        self.editor.reset_all();
    }

    pub fn swap_bindings(&mut self) {
        self.editor.swap_sides();
    }

    pub fn set_enforce_unique(&mut self, enforce: bool) {
        self.editor.set_enforce_unique(enforce);
    }

    pub fn bindings_json(&self) -> String {
        to_json(self.editor.bindings())
    }

    pub fn conflict_count(&self) -> usize {
        self.editor.conflicts().len()
    }

    /// Advance one frame; returns the tick report as JSON
    pub fn step(&mut self, dt_ms: f64) -> String {
        to_json(&self.session.step(dt_ms))
    }

    pub fn snapshot(&self) -> String {
        let modifiers = self.session.modifiers();
        let boost = modifiers.boost();
        let snapshot = Snapshot {
            phase: self.session.phase(),
            score: self.session.score(),
            ball: self.session.ball(),
            paddles: Side::BOTH.map(|side| self.session.paddle(side).y),
            shields: Side::BOTH.map(|side| {
                let shield = modifiers.shield(side);
                ShieldView {
                    active: shield.active,
                    broken: shield.broken,
                    spent: shield.spent,
                    hp: shield.hp,
                }
            }),
            boost_level: boost.level,
            boost_glow: boost.glow(),
            trail: boost.trail(),
        };
        to_json(&snapshot)
    }

    pub fn is_capturing(&self) -> bool {
        self.editor.pending_capture().is_some()
    }
}
