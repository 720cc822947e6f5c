use glam::Vec2;

use rally_pong::bindings::{Action, BindingEditor, CaptureOutcome, KeyBindings};
use rally_pong::consts::{REFERENCE_FRAME_MS, SETTLE_DELAY_MS};
use rally_pong::input::{InputEvent, START_PAUSE_CODE};
use rally_pong::platform::{KeyValueStore, MemoryStore};
use rally_pong::report::{self, Participant, ResultKind};
use rally_pong::sim::{
    Aabb, GameEvent, MatchConfig, MatchPhase, MatchResult, MatchSession, Ray, RayHit, VolumeId,
    VolumeProvider, VolumeRegistry,
};
use rally_pong::tournament::{Advance, Bracket, Entrant};
use rally_pong::{MapKey, MatchSettings, Side};

const FRAME: f64 = REFERENCE_FRAME_MS as f64;

/// Registry whose paddles and shields never block the ball, so every rally
/// ends in a goal
#[derive(Default)]
struct OpenGoals {
    inner: VolumeRegistry,
}

impl VolumeProvider for OpenGoals {
    fn create_box(&mut self, center: Vec2, half_extents: Vec2) -> VolumeId {
        self.inner.create_box(center, half_extents)
    }

    fn set_center(&mut self, id: VolumeId, center: Vec2) {
        self.inner.set_center(id, center);
    }

    fn set_enabled(&mut self, id: VolumeId, enabled: bool) {
        self.inner.set_enabled(id, enabled);
    }

    fn bounds(&self, id: VolumeId) -> Option<Aabb> {
        self.inner.bounds(id)
    }

    fn cast_ray(&self, ray: &Ray, candidates: &[VolumeId]) -> Vec<RayHit> {
        let centered: Vec<VolumeId> = candidates
            .iter()
            .copied()
            .filter(|&id| self.bounds(id).is_some_and(|b| b.center.x.abs() < 1.0))
            .collect();
        self.inner.cast_ray(ray, &centered)
    }

    fn dispose(&mut self, id: VolumeId) {
        self.inner.dispose(id);
    }
}

/// Press start whenever a rally is waiting and tick until the match ends
fn play_out<P: VolumeProvider>(
    session: &mut MatchSession<P>,
    bindings: &KeyBindings,
) -> (MatchResult, Vec<GameEvent>) {
    let mut events = Vec::new();
    let mut finished = None;
    for _ in 0..20_000 {
        if session.phase() == MatchPhase::AwaitingStart {
            session.handle_input(bindings, &InputEvent::pressed(START_PAUSE_CODE));
        }
        let report = session.step(FRAME);
        events.extend(report.events);
        if let Some(result) = report.finished {
            assert!(finished.is_none(), "result reported twice");
            finished = Some(result);
        }
        if session.phase() == MatchPhase::Ended && finished.is_some() {
            break;
        }
    }
    (finished.expect("match should finish"), events)
}

#[test]
fn test_full_match_to_win_target() {
    let config = MatchConfig::new("ada", "grace", MatchSettings::default()).with_seed(3);
    let mut session = MatchSession::new(config, OpenGoals::default());
    let bindings = KeyBindings::default();

    let (result, events) = play_out(&mut session, &bindings);
    let score = session.score();
    assert_eq!(session.phase(), MatchPhase::Ended);
    assert_eq!(score.one.max(score.two), 3);
    assert_eq!((result.score1, result.score2), (score.one, score.two));
    assert_eq!(result.winner_name, session.config().name(result.winner));
    assert!(result.duration_ms > 0.0);

    let points = events
        .iter()
        .filter(|e| matches!(e, GameEvent::Scored { .. }))
        .count();
    assert_eq!(points as u32, score.one + score.two);
    assert!(!session.is_reset_pending());

    // Nothing more happens after the end
    for _ in 0..100 {
        let report = session.step(SETTLE_DELAY_MS);
        assert!(report.events.is_empty());
        assert!(report.finished.is_none());
    }

    let provider = session.dispose();
    assert!(provider.inner.is_empty());
}

#[test]
fn test_large_map_match() {
    let settings = MatchSettings {
        map: MapKey::Large,
        ..MatchSettings::default()
    };
    let config = MatchConfig::new("a", "b", settings).with_seed(11);
    let mut session = MatchSession::new(config, OpenGoals::default());
    assert!((session.arena().layout.goal_line() - 19.9).abs() < 1e-4);
    let (result, _) = play_out(&mut session, &KeyBindings::default());
    assert_eq!(result.score1.max(result.score2), 3);
}

#[test]
fn test_rebinding_drives_gameplay() {
    let mut editor = BindingEditor::new(MemoryStore::new(), true);
    editor.begin_capture(Side::One, Action::Up);
    assert!(matches!(
        editor.handle_key("KeyI"),
        CaptureOutcome::Assigned { .. }
    ));

    let config = MatchConfig::new("a", "b", MatchSettings::default());
    let mut session = MatchSession::new(config, VolumeRegistry::new());
    let bindings = editor.bindings().clone();
    session.handle_input(&bindings, &InputEvent::pressed(START_PAUSE_CODE));

    // Old key does nothing any more
    session.handle_input(&bindings, &InputEvent::pressed("KeyW"));
    session.step(FRAME);
    assert_eq!(session.paddle(Side::One).y, 0.0);

    session.handle_input(&bindings, &InputEvent::pressed("KeyI"));
    session.step(FRAME);
    assert!(session.paddle(Side::One).y < 0.0);
    session.handle_input(&bindings, &InputEvent::released("KeyI"));
    let y = session.paddle(Side::One).y;
    session.step(FRAME);
    assert_eq!(session.paddle(Side::One).y, y);
}

#[test]
fn test_bindings_survive_reload_and_corruption() {
    let mut editor = BindingEditor::new(MemoryStore::new(), false);
    editor.swap_sides();
    let store = editor.store().clone();
    let reloaded = BindingEditor::new(store, false);
    assert_eq!(reloaded.bindings().p1.up, "ArrowUp");

    let mut corrupt = MemoryStore::new();
    corrupt
        .set(KeyBindings::STORAGE_KEY, "{not json")
        .expect("memory store write");
    let editor = BindingEditor::new(corrupt, true);
    assert_eq!(editor.bindings(), &KeyBindings::default());
}

#[test]
fn test_tournament_with_byes_to_champion() {
    let entrants = vec![
        Entrant::new("1", "ada", Some(1320.0)),
        Entrant::new("2", "grace", Some(1180.0)),
        Entrant::new("3", "linus", None),
        Entrant::new("4", "barbara", Some(1250.0)),
        Entrant::new("5", "ken", Some(990.0)),
        Entrant::new("6", "margaret", Some(-1.0)),
    ];
    let mut bracket = Bracket::new(entrants);
    assert_eq!(bracket.bracket_size(), 8);
    assert_eq!(bracket.bye_count(), 2);

    let bindings = KeyBindings::default();
    let mut tournament_records = Vec::new();
    let mut matches = 0;
    let mut seed = 1;
    let champion = loop {
        let pair = bracket.current_pair().cloned().expect("bracket in progress");
        let settings = MatchSettings::default();
        let config =
            MatchConfig::new(&pair.first().name, &pair.second().name, settings).with_seed(seed);
        seed += 1;
        let mut session = MatchSession::new(config, OpenGoals::default());
        let (result, _) = play_out(&mut session, &bindings);
        matches += 1;

        let players = [
            Participant::registered(&pair.first().id, &pair.first().name),
            Participant::registered(&pair.second().id, &pair.second().name),
        ];
        let records = report::match_records(&players, &result, chrono::Utc::now());
        assert_eq!(records.len(), 2);
        let winner_record = records
            .iter()
            .find(|r| r.result == ResultKind::Win)
            .expect("one winner");
        assert_eq!(winner_record.player_name, result.winner_name);

        tournament_records.extend(report::tournament_record("cup", &bracket, &result));

        if let Advance::Champion(champion) = bracket.advance(&result.winner_name).advance {
            break champion;
        }
    };

    assert_eq!(matches, 5);
    assert_eq!(tournament_records.len(), 5);
    let stages: Vec<u32> = tournament_records.iter().map(|r| r.stage_number).collect();
    // Round one has two matches (two byes), then two semis, then the final
    assert_eq!(stages, vec![3, 3, 2, 2, 1]);
    assert_eq!(tournament_records.last().map(|r| r.match_number), Some(1));
    assert_eq!(bracket.champion(), Some(&champion));
}
