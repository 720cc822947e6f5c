//! Rally Pong headless demo
//!
//! Runs an autopilot tournament through the real input path and logs every
//! match, bracket step and result record.

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use chrono::Utc;

    use rally_pong::bindings::{Action, BindingEditor, KeyBindings};
    use rally_pong::consts::REFERENCE_FRAME_MS;
    use rally_pong::input::{InputEvent, START_PAUSE_CODE};
    use rally_pong::platform::MemoryStore;
    use rally_pong::report::{self, LogReporter, Participant};
    use rally_pong::sim::{MatchConfig, MatchPhase, MatchSession, VolumeRegistry};
    use rally_pong::tournament::{Advance, Bracket, Entrant};
    use rally_pong::{MapKey, MatchSettings, Side, SpeedPreset, WinMode};

    const FRAME_MS: f64 = REFERENCE_FRAME_MS as f64;
    /// Give up on a match after ten minutes of tick time
    const MAX_FRAMES: u32 = 60 * 60 * 10;
    /// Paddle stops chasing inside this band
    const DEADZONE: f32 = 0.3;

    /// Keys one side is holding
    #[derive(Default)]
    struct Autopilot {
        held: [bool; 4],
    }

    impl Autopilot {
        fn action_index(action: Action) -> usize {
            match action {
                Action::Up => 0,
                Action::Down => 1,
                Action::Boost => 2,
                Action::Shield => 3,
            }
        }

        /// Press or release so that `action` ends up in the `want` state
        fn hold(
            &mut self,
            bindings: &KeyBindings,
            side: Side,
            action: Action,
            want: bool,
            out: &mut Vec<InputEvent>,
        ) {
            let idx = Self::action_index(action);
            if self.held[idx] == want {
                return;
            }
            self.held[idx] = want;
            let code = bindings.side(side).get(action).to_string();
            out.push(if want {
                InputEvent::Pressed(code)
            } else {
                InputEvent::Released(code)
            });
        }

        fn release_all(&mut self) {
            self.held = [false; 4];
        }

        fn drive(
            &mut self,
            session: &MatchSession<VolumeRegistry>,
            bindings: &KeyBindings,
            side: Side,
            frame: u32,
        ) -> Vec<InputEvent> {
            let mut out = Vec::new();
            let ball = session.ball();
            let paddle = session.paddle(side);
            let incoming = ball.vel.x * side.sign() > 0.0;

            // Lead the ball a little, with a wobble so rallies end
            let t = frame as f32 * 0.01 + side.index() as f32;
            let wobble = t.sin() * 0.6 + (t * 0.7).sin() * 0.4;
            let target = if incoming {
                ball.pos.y + ball.vel.y * 10.0 + wobble
            } else {
                0.0
            };
            let error = target - paddle.y;
            self.hold(bindings, side, Action::Up, error < -DEADZONE, &mut out);
            self.hold(bindings, side, Action::Down, error > DEADZONE, &mut out);

            let distance = (paddle.x - ball.pos.x).abs();
            self.hold(
                bindings,
                side,
                Action::Boost,
                incoming && distance < 2.0,
                &mut out,
            );
            let late = incoming && distance < 3.0 && error.abs() > paddle.half_extents.y * 2.0;
            self.hold(bindings, side, Action::Shield, late, &mut out);
            out
        }
    }

    fn play_match(
        bindings: &KeyBindings,
        entrants: [&Entrant; 2],
        settings: MatchSettings,
        seed: u64,
    ) -> rally_pong::sim::MatchResult {
        let config =
            MatchConfig::new(&entrants[0].name, &entrants[1].name, settings).with_seed(seed);
        let mut session = MatchSession::new(config, VolumeRegistry::new());
        let mut pilots = [Autopilot::default(), Autopilot::default()];
        let space = InputEvent::pressed(START_PAUSE_CODE);

        for frame in 0..MAX_FRAMES {
            if session.phase() == MatchPhase::AwaitingStart {
                for pilot in &mut pilots {
                    pilot.release_all();
                }
                session.handle_input(bindings, &space);
            }
            if session.phase() == MatchPhase::Playing {
                for side in Side::BOTH {
                    for event in pilots[side.index()].drive(&session, bindings, side, frame) {
                        session.handle_input(bindings, &event);
                    }
                }
            }

            let report = session.step(FRAME_MS);
            if let Some(scorer) = report.scored() {
                log::debug!("Point to {}", session.config().name(scorer));
            }
            if let Some(result) = report.finished {
                session.dispose();
                return result;
            }
        }

        // Nobody reached the target in time; the leader (or side One) takes it
        let score = session.score();
        let winner = if score.two > score.one {
            Side::Two
        } else {
            Side::One
        };
        log::warn!(
            "Match hit the frame limit at {} - {}, awarding it to {}",
            score.one,
            score.two,
            session.config().name(winner)
        );
        rally_pong::sim::MatchResult {
            winner,
            winner_name: session.config().name(winner).to_string(),
            score1: score.one,
            score2: score.two,
            duration_ms: session.elapsed_ms(),
        }
    }

    pub fn run() {
        let editor = BindingEditor::new(MemoryStore::new(), true);
        let bindings = editor.bindings().clone();
        for conflict in editor.conflicts() {
            log::warn!("{} and {} share {}", conflict.first, conflict.second, conflict.code);
        }

        let entrants = vec![
            Entrant::new("1", "ada", Some(1320.0)),
            Entrant::new("2", "grace", Some(1180.0)),
            Entrant::new("3", "linus", None),
            Entrant::new("4", "barbara", Some(1250.0)),
            Entrant::new("5", "ken", Some(990.0)),
        ];
        let settings = MatchSettings {
            speed: SpeedPreset::Medium,
            win_mode: WinMode::Bo5,
            map: MapKey::Obstacles,
        };

        let mut bracket = Bracket::new(entrants);
        let mut reporter = LogReporter::default();
        let mut seed = 0x5eed_u64;

        while let Some(pair) = bracket.current_pair().cloned() {
            log::info!(
                "Round {} (stage {}), match {}: {} vs {}",
                bracket.round(),
                bracket.stage(),
                bracket.match_number(),
                pair.first().name,
                pair.second().name
            );
            let result = play_match(&bindings, [pair.first(), pair.second()], settings, seed);
            seed = seed.wrapping_add(1);

            let players = [
                Participant::registered(&pair.first().id, &pair.first().name),
                Participant::registered(&pair.second().id, &pair.second().name),
            ];
            let records = report::match_records(&players, &result, Utc::now());
            let tournament = report::tournament_record("demo cup", &bracket, &result);
            if let Err(e) = report::deliver(&mut reporter, &records, tournament.as_ref()) {
                log::warn!("Result delivery failed: {}", e);
            }

            if let Advance::Champion(champion) = bracket.advance(&result.winner_name).advance {
                log::info!("{} wins the demo cup", champion.name);
            }
        }

        log::info!("{} records delivered", reporter.delivered);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    rally_pong::platform::init_logging();
    log::info!("Rally Pong (native) starting headless demo...");
    demo::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The page constructs `rally_pong::web::WebMatch` itself
}
