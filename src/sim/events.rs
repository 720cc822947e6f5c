//! Events produced by the simulation
//!
//! The session never calls back into the host. Everything it wants to say
//! (effect cues, phase changes, the final result) comes out of `step()`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{MatchPhase, Score};
use crate::Side;

/// Fire-and-forget visual/audio cue for the effect provider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EffectCue {
    /// Ball touched a volume
    Impact { point: Vec2 },
    /// A boosted paddle hit
    PaddleFlash { side: Side },
    /// Ball glow/trail changed
    BoostChanged { level: u32, glow: f32 },
    ShieldRaised { side: Side },
    ShieldLowered { side: Side },
    ShieldBroken { side: Side },
    /// Ball crossed a goal line
    BallExploded { position: Vec2, velocity: Vec2 },
    /// Ball re-formed at the center for the next rally
    BallGathered,
}

/// Something that happened during a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PhaseChanged { from: MatchPhase, to: MatchPhase },
    Scored { scorer: Side, score: Score },
    Effect(EffectCue),
}

/// Final outcome of a match, reported once
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub winner: Side,
    pub winner_name: String,
    pub score1: u32,
    pub score2: u32,
    /// Tick time from session creation to the winning point
    pub duration_ms: f64,
}

/// Output of one `step()`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TickReport {
    pub events: Vec<GameEvent>,
    /// Present exactly once, on the tick the match ended
    pub finished: Option<MatchResult>,
}

impl TickReport {
    pub fn effects(&self) -> impl Iterator<Item = &EffectCue> {
        self.events.iter().filter_map(|e| match e {
            GameEvent::Effect(cue) => Some(cue),
            _ => None,
        })
    }

    pub fn scored(&self) -> Option<Side> {
        self.events.iter().find_map(|e| match e {
            GameEvent::Scored { scorer, .. } => Some(*scorer),
            _ => None,
        })
    }
}
