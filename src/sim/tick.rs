//! Match session and per-frame tick
//!
//! A [`MatchSession`] owns every piece of gameplay state for one match plus
//! the volume provider it was built on. Hosts feed it input events and frame
//! deltas; everything that happened comes back in the [`TickReport`].

use rand_pcg::Pcg32;

use super::arena::Arena;
use super::collision::{Contact, resolve_motion};
use super::events::{EffectCue, GameEvent, MatchResult, TickReport};
use super::modifiers::Modifiers;
use super::schedule::{Scheduler, TimerHandle};
use super::state::{Ball, MatchConfig, MatchPhase, Paddle, Score};
use super::volume::VolumeProvider;
use crate::bindings::{Action, KeyBindings};
use crate::consts::SETTLE_DELAY_MS;
use crate::input::{self, HeldActions, InputEvent, Intent};
use crate::{Side, delta_factor};

/// Deferred work a session can schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPurpose {
    RallyReset,
}

/// One match between two sides
#[derive(Debug)]
pub struct MatchSession<P: VolumeProvider> {
    provider: P,
    config: MatchConfig,
    rng: Pcg32,
    phase: MatchPhase,
    score: Score,
    win_target: u32,
    ball: Ball,
    arena: Arena,
    modifiers: Modifiers,
    held: HeldActions,
    scheduler: Scheduler<TimerPurpose>,
    reset_timer: Option<TimerHandle>,
    pending: Vec<GameEvent>,
    result: Option<MatchResult>,
    result_reported: bool,
}

impl<P: VolumeProvider> MatchSession<P> {
    /// Build the arena in `provider` and serve the first ball
    pub fn new(config: MatchConfig, mut provider: P) -> Self {
        let arena = Arena::build(config.settings.map, &mut provider);
        let modifiers = Modifiers::new(&arena);
        let mut rng = config.rng();
        let mut ball = Ball::default();
        ball.serve(&mut rng, config.settings.serve_speed());

        log::info!(
            "Match {} vs {}: {} speed, first to {}, {} map",
            config.names[0],
            config.names[1],
            config.settings.speed.as_str(),
            config.settings.win_target(),
            config.settings.map.as_str()
        );

        Self {
            provider,
            win_target: config.settings.win_target(),
            config,
            rng,
            phase: MatchPhase::AwaitingStart,
            score: Score::default(),
            ball,
            arena,
            modifiers,
            held: HeldActions::default(),
            scheduler: Scheduler::new(),
            reset_timer: None,
            pending: Vec::new(),
            result: None,
            result_reported: false,
        }
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn win_target(&self) -> u32 {
        self.win_target
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn paddle(&self, side: Side) -> &Paddle {
        self.arena.paddle(side)
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn modifiers(&self) -> &Modifiers {
        &self.modifiers
    }

    pub fn held(&self) -> &HeldActions {
        &self.held
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Tick time seen so far
    pub fn elapsed_ms(&self) -> f64 {
        self.scheduler.now_ms()
    }

    pub fn is_reset_pending(&self) -> bool {
        self.reset_timer.is_some()
    }

    /// Final result once the match has ended
    pub fn result(&self) -> Option<&MatchResult> {
        self.result.as_ref()
    }

    /// Feed a raw input event through the bindings
    pub fn handle_input(&mut self, bindings: &KeyBindings, event: &InputEvent) {
        for intent in input::resolve(bindings, event) {
            self.apply_intent(intent);
        }
    }

    pub fn apply_intent(&mut self, intent: Intent) {
        let locked = matches!(self.phase, MatchPhase::ScoringTransition | MatchPhase::Ended);
        match intent {
            Intent::StartPause if !locked => {
                if self.phase == MatchPhase::AwaitingStart {
                    self.start();
                } else {
                    self.toggle_pause();
                }
            }
            Intent::Press(slot) if !locked => {
                self.held.set(slot, true);
                if slot.action == Action::Shield {
                    self.request_shield(slot.side);
                }
            }
            Intent::Release(slot) => {
                self.held.set(slot, false);
                if slot.action == Action::Shield {
                    self.release_shield(slot.side);
                }
            }
            _ => log::trace!("Ignoring {:?} while {:?}", intent, self.phase),
        }
    }

    /// Launch the rally. Only valid while awaiting the start signal.
    pub fn start(&mut self) -> bool {
        if self.phase != MatchPhase::AwaitingStart {
            return false;
        }
        self.set_phase(MatchPhase::Playing);
        true
    }

    /// Toggle between Playing and Paused
    pub fn toggle_pause(&mut self) -> bool {
        match self.phase {
            MatchPhase::Playing => self.set_phase(MatchPhase::Paused),
            MatchPhase::Paused => self.set_phase(MatchPhase::Playing),
            _ => return false,
        }
        true
    }

    /// Raise a side's shield. Requires live play and a shield that is
    /// neither broken nor already used and released this rally.
    pub fn request_shield(&mut self, side: Side) -> bool {
        if !self.phase.is_live() {
            return false;
        }
        match self
            .modifiers
            .request_shield(side, &self.arena, &mut self.provider)
        {
            Some(cue) => {
                self.pending.push(GameEvent::Effect(cue));
                true
            }
            None => false,
        }
    }

    pub fn release_shield(&mut self, side: Side) {
        if let Some(cue) = self.modifiers.release_shield(side, &mut self.provider) {
            self.pending.push(GameEvent::Effect(cue));
        }
    }

    /// Advance the session by one frame
    pub fn step(&mut self, dt_ms: f64) -> TickReport {
        for (handle, purpose) in self.scheduler.advance(dt_ms) {
            match purpose {
                TimerPurpose::RallyReset => self.on_reset_due(handle),
            }
        }

        if self.phase.is_live() {
            self.simulate(delta_factor(dt_ms as f32));
        }

        let finished = match &self.result {
            Some(result) if !self.result_reported => {
                self.result_reported = true;
                Some(result.clone())
            }
            _ => None,
        };
        TickReport {
            events: std::mem::take(&mut self.pending),
            finished,
        }
    }

    /// Tear down the arena and hand the provider back
    pub fn dispose(mut self) -> P {
        self.scheduler.cancel_all();
        self.arena.dispose(&mut self.provider);
        self.provider
    }

    fn simulate(&mut self, delta_factor: f32) {
        for side in Side::BOTH {
            let direction = self.held.paddle_direction(side);
            if direction != 0.0 {
                self.arena.paddle_mut(side).move_by(direction, delta_factor);
            }
        }
        self.arena.sync_paddles(&mut self.provider);
        self.modifiers.follow_paddles(&self.arena, &mut self.provider);

        let colliders = self.arena.colliders(self.modifiers.shields_active());
        let boost_held = Side::BOTH.map(|side| self.held.is_held(side, Action::Boost));
        let mut cues = Vec::new();
        let contact = resolve_motion(
            &mut self.ball,
            delta_factor,
            &colliders,
            &mut self.provider,
            &mut self.modifiers,
            boost_held,
            &mut cues,
        );
        if let Some(Contact { kind, boosted, .. }) = contact {
            log::trace!("Contact with {:?} (boosted: {})", kind, boosted);
        }
        self.pending.extend(cues.into_iter().map(GameEvent::Effect));

        let goal_line = self.arena.layout.goal_line();
        if self.ball.pos.x > goal_line {
            self.score_point(Side::Two);
        } else if self.ball.pos.x < -goal_line {
            self.score_point(Side::One);
        }
    }

    fn score_point(&mut self, scorer: Side) {
        self.set_phase(MatchPhase::ScoringTransition);
        self.held.clear();
        let lowered = self.modifiers.lower_all(&mut self.provider);
        self.pending.extend(lowered.into_iter().map(GameEvent::Effect));
        self.pending.push(GameEvent::Effect(EffectCue::BallExploded {
            position: self.ball.pos,
            velocity: self.ball.vel,
        }));

        self.score.increment(scorer);
        self.pending.push(GameEvent::Scored {
            scorer,
            score: self.score,
        });
        log::info!(
            "{} scores: {} - {}",
            self.config.name(scorer),
            self.score.one,
            self.score.two
        );

        if let Some(winner) = self.score.winner(self.win_target) {
            self.finish(winner);
        } else {
            self.reset_timer = Some(
                self.scheduler
                    .schedule(TimerPurpose::RallyReset, SETTLE_DELAY_MS),
            );
        }
    }

    fn finish(&mut self, winner: Side) {
        self.scheduler.cancel_all();
        self.reset_timer = None;
        self.set_phase(MatchPhase::Ended);
        let result = MatchResult {
            winner,
            winner_name: self.config.name(winner).to_string(),
            score1: self.score.one,
            score2: self.score.two,
            duration_ms: self.scheduler.now_ms(),
        };
        log::info!(
            "Match over: {} wins {} - {}",
            result.winner_name,
            result.score1,
            result.score2
        );
        self.result = Some(result);
    }

    fn on_reset_due(&mut self, handle: TimerHandle) {
        if self.phase == MatchPhase::Ended || self.reset_timer != Some(handle) {
            log::debug!("Discarding stale rally reset");
            return;
        }
        self.reset_timer = None;
        self.reset_rally();
    }

    fn reset_rally(&mut self) {
        let speed = self.config.settings.serve_speed();
        self.ball.serve(&mut self.rng, speed);
        for paddle in &mut self.arena.paddles {
            paddle.recenter();
        }
        self.arena.sync_paddles(&mut self.provider);
        self.modifiers.reset_rally(&mut self.provider);
        let boost = self.modifiers.boost();
        self.pending.push(GameEvent::Effect(EffectCue::BoostChanged {
            level: boost.level,
            glow: boost.glow(),
        }));
        self.pending.push(GameEvent::Effect(EffectCue::BallGathered));
        self.set_phase(MatchPhase::AwaitingStart);
    }

    fn set_phase(&mut self, to: MatchPhase) {
        let from = self.phase;
        if from == to {
            return;
        }
        self.phase = to;
        self.pending.push(GameEvent::PhaseChanged { from, to });
    }
}
