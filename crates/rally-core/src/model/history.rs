use crate::model::score::{GameScore, PointScore, SetScore};
use crate::model::side::Side;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    Point,
    GameWin,
    SetWin,
    MatchWin,
}

impl EventKind {
    pub const ALL: [EventKind; 4] = [
        EventKind::Point,
        EventKind::GameWin,
        EventKind::SetWin,
        EventKind::MatchWin,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            EventKind::Point => "POINT",
            EventKind::GameWin => "GAME_WIN",
            EventKind::SetWin => "SET_WIN",
            EventKind::MatchWin => "MATCH_WIN",
        }
    }
}

/// Score fields as they stood right after an event.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScoreSnapshot {
    pub sets: Vec<SetScore>,
    pub games: GameScore,
    pub points: PointScore,
    pub is_tie_break: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEvent {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(rename = "winnerId")]
    pub winner: Side,
    #[serde(default)]
    pub side_switch_after: bool,
    #[serde(default)]
    pub score_snapshot: ScoreSnapshot,
}

impl HistoryEvent {
    /// `position` is the index the event takes in the history.
    pub fn new(
        kind: EventKind,
        winner: Side,
        timestamp: i64,
        position: usize,
        side_switch_after: bool,
        score_snapshot: ScoreSnapshot,
    ) -> Self {
        Self {
            id: format!("{timestamp}-{position}"),
            timestamp,
            kind,
            winner,
            side_switch_after,
            score_snapshot,
        }
    }
}
