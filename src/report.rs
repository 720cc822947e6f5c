//! Result records for the external reporting adapter
//!
//! The crate never talks to a server. It builds [`MatchRecord`]s and
//! [`TournamentRecord`]s from a finished match and hands them to whatever
//! [`ResultReporter`] the host plugs in. Delivery failures come back as
//! [`ReportError`]; the match outcome itself is never rolled back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Side;
use crate::sim::MatchResult;
use crate::tournament::Bracket;

/// Outcome from one player's perspective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    Win,
    Loss,
    Draw,
}

impl ResultKind {
    pub fn from_scores(player: u32, opponent: u32) -> Self {
        match player.cmp(&opponent) {
            std::cmp::Ordering::Greater => ResultKind::Win,
            std::cmp::Ordering::Less => ResultKind::Loss,
            std::cmp::Ordering::Equal => ResultKind::Draw,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResultKind::Win => "win",
            ResultKind::Loss => "loss",
            ResultKind::Draw => "draw",
        }
    }
}

/// Who played a side. Guests have no id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: Option<String>,
    pub name: String,
}

impl Participant {
    pub fn registered(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: name.into(),
        }
    }

    pub fn guest(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }

    pub fn is_guest(&self) -> bool {
        self.id.is_none()
    }
}

/// Match history entry for one player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub player_id: String,
    pub opponent_id: Option<String>,
    pub player_name: String,
    pub opponent_name: String,
    pub player_score: u32,
    pub opponent_score: u32,
    pub duration_seconds: u64,
    pub result: ResultKind,
    pub is_guest_opponent: bool,
    pub played_at: DateTime<Utc>,
}

impl MatchRecord {
    pub fn duration_hms(&self) -> String {
        format_hms(self.duration_seconds)
    }
}

/// Bracket history entry, always from side One's perspective
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentRecord {
    pub tournament_id: String,
    pub stage_number: u32,
    /// 1-based within the round
    pub match_number: u32,
    pub player_name: String,
    pub opponent_name: String,
    pub result: ResultKind,
}

/// Whole seconds from a tick-time duration
pub fn duration_seconds(duration_ms: f64) -> u64 {
    if duration_ms.is_finite() && duration_ms > 0.0 {
        (duration_ms / 1000.0).floor() as u64
    } else {
        0
    }
}

/// `HH:MM:SS`; hours are not capped at 24
pub fn format_hms(total_seconds: u64) -> String {
    let h = total_seconds / 3600;
    let m = (total_seconds % 3600) / 60;
    let s = total_seconds % 60;
    format!("{:02}:{:02}:{:02}", h, m, s)
}

/// History records for every registered participant
///
/// Two registered players yield one record each. Against a guest only the
/// registered player gets a record. Two guests yield nothing.
pub fn match_records(
    players: &[Participant; 2],
    result: &MatchResult,
    played_at: DateTime<Utc>,
) -> Vec<MatchRecord> {
    let scores = [result.score1, result.score2];
    let duration = duration_seconds(result.duration_ms);

    Side::BOTH
        .into_iter()
        .filter_map(|side| {
            let me = &players[side.index()];
            let them = &players[side.opponent().index()];
            let player_id = me.id.clone()?;
            let player_score = scores[side.index()];
            let opponent_score = scores[side.opponent().index()];
            Some(MatchRecord {
                player_id,
                opponent_id: them.id.clone(),
                player_name: me.name.clone(),
                opponent_name: them.name.clone(),
                player_score,
                opponent_score,
                duration_seconds: duration,
                result: ResultKind::from_scores(player_score, opponent_score),
                is_guest_opponent: them.is_guest(),
                played_at,
            })
        })
        .collect()
}

/// Bracket record for the bracket's current pair
///
/// Call before advancing the bracket. Returns `None` without a tournament id
/// or a current pair.
pub fn tournament_record(
    tournament_id: &str,
    bracket: &Bracket,
    result: &MatchResult,
) -> Option<TournamentRecord> {
    let tournament_id = tournament_id.trim();
    if tournament_id.is_empty() {
        return None;
    }
    let pair = bracket.current_pair()?;
    Some(TournamentRecord {
        tournament_id: tournament_id.to_string(),
        stage_number: bracket.stage(),
        match_number: bracket.match_number() as u32,
        player_name: pair.first().name.clone(),
        opponent_name: pair.second().name.clone(),
        result: ResultKind::from_scores(result.score1, result.score2),
    })
}

/// Reporting failures surfaced to the caller
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("transport failed: {0}")]
    Transport(String),

    #[error("rejected by server ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Host-provided sink for finished results. No retries are attempted.
pub trait ResultReporter {
    fn report_match(&mut self, record: &MatchRecord) -> Result<(), ReportError>;

    fn report_tournament(&mut self, record: &TournamentRecord) -> Result<(), ReportError>;
}

/// Send every record, then return the first failure if any
pub fn deliver<R: ResultReporter + ?Sized>(
    reporter: &mut R,
    matches: &[MatchRecord],
    tournament: Option<&TournamentRecord>,
) -> Result<(), ReportError> {
    let mut first_error = None;
    for record in matches {
        if let Err(e) = reporter.report_match(record) {
            log::warn!("Failed to report match for {}: {}", record.player_name, e);
            first_error.get_or_insert(e);
        }
    }
    if let Some(record) = tournament {
        if let Err(e) = reporter.report_tournament(record) {
            log::warn!("Failed to report tournament match: {}", e);
            first_error.get_or_insert(e);
        }
    }
    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Writes records to the log as JSON
#[derive(Debug, Default)]
pub struct LogReporter {
    pub delivered: usize,
}

impl ResultReporter for LogReporter {
    fn report_match(&mut self, record: &MatchRecord) -> Result<(), ReportError> {
        let json = serde_json::to_string(record)?;
        log::info!("match record ({}): {}", record.duration_hms(), json);
        self.delivered += 1;
        Ok(())
    }

    fn report_tournament(&mut self, record: &TournamentRecord) -> Result<(), ReportError> {
        log::info!("tournament record: {}", serde_json::to_string(record)?);
        self.delivered += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tournament::Entrant;
    use chrono::TimeZone;

    fn result(score1: u32, score2: u32) -> MatchResult {
        MatchResult {
            winner: if score1 > score2 { Side::One } else { Side::Two },
            winner_name: String::new(),
            score1,
            score2,
            duration_ms: 125_900.0,
        }
    }

    fn played_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 15, 9, 26).unwrap()
    }

    #[test]
    fn test_two_registered_players_get_mirrored_records() {
        let players = [
            Participant::registered("7", "ada"),
            Participant::registered("9", "grace"),
        ];
        let records = match_records(&players, &result(3, 1), played_at());
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].player_id, "7");
        assert_eq!(records[0].opponent_id.as_deref(), Some("9"));
        assert_eq!(records[0].result, ResultKind::Win);
        assert_eq!((records[0].player_score, records[0].opponent_score), (3, 1));

        assert_eq!(records[1].player_name, "grace");
        assert_eq!(records[1].result, ResultKind::Loss);
        assert_eq!((records[1].player_score, records[1].opponent_score), (1, 3));
        assert!(!records[1].is_guest_opponent);
        assert_eq!(records[1].duration_seconds, 125);
    }

    #[test]
    fn test_guest_opponent() {
        let players = [Participant::guest("Player 1"), Participant::registered("9", "grace")];
        let records = match_records(&players, &result(3, 2), played_at());
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.player_name, "grace");
        assert_eq!(record.opponent_id, None);
        assert!(record.is_guest_opponent);
        assert_eq!(record.result, ResultKind::Loss);

        let guests = [Participant::guest("a"), Participant::guest("b")];
        assert!(match_records(&guests, &result(3, 0), played_at()).is_empty());
    }

    #[test]
    fn test_durations() {
        assert_eq!(format_hms(0), "00:00:00");
        assert_eq!(format_hms(125), "00:02:05");
        assert_eq!(format_hms(3600 * 27 + 61), "27:01:01");
        assert_eq!(duration_seconds(999.9), 0);
        assert_eq!(duration_seconds(-5.0), 0);
        assert_eq!(duration_seconds(f64::NAN), 0);
    }

    #[test]
    fn test_record_serialization() {
        let players = [Participant::registered("7", "ada"), Participant::guest("g")];
        let records = match_records(&players, &result(3, 3), played_at());
        let json = serde_json::to_value(&records[0]).unwrap();
        assert_eq!(json["result"], "draw");
        assert_eq!(json["opponent_id"], serde_json::Value::Null);
        assert_eq!(json["played_at"], "2025-03-14T15:09:26Z");
    }

    #[test]
    fn test_tournament_record() {
        let bracket = Bracket::new(vec![
            Entrant::new("1", "a", Some(1200.0)),
            Entrant::new("2", "b", Some(1000.0)),
            Entrant::new("3", "c", Some(1100.0)),
            Entrant::new("4", "d", Some(900.0)),
        ]);
        assert!(tournament_record("   ", &bracket, &result(3, 0)).is_none());

        let record = tournament_record(" spring cup ", &bracket, &result(1, 3)).unwrap();
        assert_eq!(record.tournament_id, "spring cup");
        assert_eq!(record.stage_number, 2);
        assert_eq!(record.match_number, 1);
        assert_eq!(record.player_name, "a");
        assert_eq!(record.opponent_name, "d");
        assert_eq!(record.result, ResultKind::Loss);
    }

    struct FlakyReporter {
        fail_on: usize,
        calls: usize,
    }

    impl ResultReporter for FlakyReporter {
        fn report_match(&mut self, _record: &MatchRecord) -> Result<(), ReportError> {
            self.calls += 1;
            if self.calls == self.fail_on {
                return Err(ReportError::Rejected {
                    status: 401,
                    message: "unauthorized".to_string(),
                });
            }
            Ok(())
        }

        fn report_tournament(&mut self, _record: &TournamentRecord) -> Result<(), ReportError> {
            self.calls += 1;
            Err(ReportError::Transport("offline".to_string()))
        }
    }

    #[test]
    fn test_deliver_attempts_everything_and_returns_first_error() {
        let players = [
            Participant::registered("7", "ada"),
            Participant::registered("9", "grace"),
        ];
        let records = match_records(&players, &result(3, 1), played_at());
        let mut reporter = FlakyReporter {
            fail_on: 1,
            calls: 0,
        };
        let err = deliver(&mut reporter, &records, None).unwrap_err();
        assert_eq!(reporter.calls, 2);
        assert!(matches!(err, ReportError::Rejected { status: 401, .. }));

        let mut log = LogReporter::default();
        assert!(deliver(&mut log, &records, None).is_ok());
        assert_eq!(log.delivered, 2);
    }
}
