//! Documents a sync collaborator publishes for a match: a coarse summary
//! and a fine-grained realtime fragment. Both read leniently, accepting the
//! camelCase keys written here and the older snake_case spellings.

use crate::game::match_state::MatchState;
use crate::model::config::PartialMatchConfig;
use crate::model::history::HistoryEvent;
use crate::model::score::{GameScore, PointScore, SetScore, love_all};
use crate::model::side::{Side, SidePair};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_COLORS: SidePair<&str> = SidePair::new("blue", "red");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    #[default]
    Live,
    Finished,
}

impl<'de> Deserialize<'de> for MatchStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(match raw.as_deref() {
            Some("FINISHED") => MatchStatus::Finished,
            _ => MatchStatus::Live,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub id: String,
    #[serde(rename = "p1Name", skip_serializing_if = "Option::is_none")]
    pub name_a: Option<String>,
    #[serde(rename = "p2Name", skip_serializing_if = "Option::is_none")]
    pub name_b: Option<String>,
    #[serde(rename = "p1Color", skip_serializing_if = "Option::is_none")]
    pub color_a: Option<String>,
    #[serde(rename = "p2Color", skip_serializing_if = "Option::is_none")]
    pub color_b: Option<String>,
    pub score_summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_games: Option<GameScore>,
    pub current_sets: Vec<SetScore>,
    pub server: Side,
    pub creator_uid: String,
    pub is_doubles: bool,
    pub status: MatchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_paused: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<PartialMatchConfig>,
}

impl Summary {
    pub fn from_state(state: &MatchState, match_id: &str, creator_uid: &str) -> Self {
        let config = state.config();
        let color = |side: Side| {
            config.colors[side]
                .clone()
                .unwrap_or_else(|| DEFAULT_COLORS[side].to_string())
        };

        Self {
            id: match_id.to_string(),
            name_a: Some(config.names[Side::A].clone()),
            name_b: Some(config.names[Side::B].clone()),
            color_a: Some(color(Side::A)),
            color_b: Some(color(Side::B)),
            score_summary: score_summary(state),
            current_games: Some(*state.games()),
            current_sets: state.sets().to_vec(),
            server: state.server(),
            creator_uid: creator_uid.to_string(),
            is_doubles: config.is_doubles(),
            status: if state.is_match_over() {
                MatchStatus::Finished
            } else {
                MatchStatus::Live
            },
            duration_seconds: Some(state.duration_seconds()),
            start_time: Some(state.start_time()),
            is_paused: Some(state.is_paused()),
            config: Some(PartialMatchConfig::from(config)),
        }
    }

    /// Read a stored document. Documents may carry the same field under
    /// several spellings; the first readable one wins and anything missing
    /// or malformed falls back to its default.
    pub fn from_value(raw: &Value) -> Self {
        let Some(doc) = raw.as_object() else {
            return Self::default();
        };
        let text = |keys: &[&str]| {
            pick::<String>(doc, keys).filter(|value| !value.trim().is_empty())
        };

        Self {
            id: pick(doc, &["id"]).unwrap_or_default(),
            name_a: pick(doc, &["p1Name", "p1_name"]),
            name_b: pick(doc, &["p2Name", "p2_name"]),
            color_a: text(&["p1Color", "p1_color", "player1_color"]),
            color_b: text(&["p2Color", "p2_color", "player2_color"]),
            score_summary: pick(doc, &["scoreSummary", "score_summary"])
                .unwrap_or_else(|| "0-0".to_string()),
            current_games: pick(doc, &["currentGames", "current_games"]),
            current_sets: pick(doc, &["currentSets", "current_sets"]).unwrap_or_default(),
            server: pick(doc, &["server"]).unwrap_or_default(),
            creator_uid: pick(doc, &["creatorUid", "creator_uid"]).unwrap_or_default(),
            is_doubles: pick(doc, &["isDoubles", "is_doubles"]).unwrap_or(false),
            status: pick(doc, &["status"]).unwrap_or_default(),
            duration_seconds: pick(doc, &["durationSeconds", "match_duration"]),
            start_time: pick(doc, &["startTime"]),
            is_paused: pick(doc, &["isPaused"]),
            config: doc
                .get("config")
                .and_then(Value::as_object)
                .map(read_embedded_config),
        }
    }

    pub fn name(&self, side: Side) -> Option<&str> {
        match side {
            Side::A => self.name_a.as_deref(),
            Side::B => self.name_b.as_deref(),
        }
    }

    /// Display color for `side`; blank strings count as unset.
    pub fn color(&self, side: Side) -> Option<&str> {
        let raw = match side {
            Side::A => self.color_a.as_deref(),
            Side::B => self.color_b.as_deref(),
        };
        raw.filter(|value| !value.trim().is_empty())
    }

    pub fn is_finished(&self) -> bool {
        self.status == MatchStatus::Finished
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let raw: Value = serde_json::from_str(json)?;
        Ok(Self::from_value(&raw))
    }
}

impl<'de> Deserialize<'de> for Summary {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self::from_value(&Value::deserialize(deserializer)?))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeFragment {
    pub points: PointScore,
    pub is_tie_break: bool,
    pub history: Vec<HistoryEvent>,
}

impl Default for RealtimeFragment {
    fn default() -> Self {
        Self {
            points: love_all(),
            is_tie_break: false,
            history: Vec::new(),
        }
    }
}

impl RealtimeFragment {
    pub fn from_value(raw: &Value) -> Self {
        let Some(doc) = raw.as_object() else {
            return Self::default();
        };
        Self {
            points: pick(doc, &["points", "current_points"]).unwrap_or_else(love_all),
            is_tie_break: pick(doc, &["isTieBreak", "is_tie_break"]).unwrap_or(false),
            history: pick(doc, &["history"]).unwrap_or_default(),
        }
    }

    pub fn from_state(state: &MatchState) -> Self {
        Self {
            points: *state.points(),
            is_tie_break: state.is_tie_break(),
            history: state.history().to_vec(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let raw: Value = serde_json::from_str(json)?;
        Ok(Self::from_value(&raw))
    }
}

impl<'de> Deserialize<'de> for RealtimeFragment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self::from_value(&Value::deserialize(deserializer)?))
    }
}

/// Embedded config, field by field. Side-specific text is read from the
/// nested pair (`names.P1`) first, then from the flat keys older writers used
/// (`p1Name`, `p1_name`). Anything missing stays `None`.
fn read_embedded_config(doc: &Map<String, Value>) -> PartialMatchConfig {
    PartialMatchConfig {
        names: side_text(
            doc,
            "names",
            SidePair::new(["p1Name", "p1_name"], ["p2Name", "p2_name"]),
        ),
        colors: side_text(
            doc,
            "colors",
            SidePair::new(["p1Color", "p1_color"], ["p2Color", "p2_color"]),
        ),
        partner_names: side_text(
            doc,
            "partnerNames",
            SidePair::new(
                ["p1PartnerName", "p1_partner_name"],
                ["p2PartnerName", "p2_partner_name"],
            ),
        ),
        partner_colors: side_text(
            doc,
            "partnerColors",
            SidePair::new(
                ["p1PartnerColor", "p1_partner_color"],
                ["p2PartnerColor", "p2_partner_color"],
            ),
        ),
        sets_to_win: pick(doc, &["setsToWin", "sets_to_win"]),
        use_advantage: pick(doc, &["useAdvantage", "use_advantage"]),
        final_set_type: pick(doc, &["finalSetType", "final_set_type"]),
        tie_break_at: pick(doc, &["tieBreakAt", "tie_break_at"]),
        tie_break_points: pick(doc, &["tieBreakPoints", "tie_break_points"]),
        mode: pick(doc, &["mode"]),
    }
}

fn side_text(
    doc: &Map<String, Value>,
    pair_key: &str,
    flat_keys: SidePair<[&str; 2]>,
) -> SidePair<Option<String>> {
    let pair = doc.get(pair_key).and_then(Value::as_object);
    flat_keys.map(|side, keys| {
        pair.and_then(|pair| pick::<String>(pair, &[side.as_str()]))
            .or_else(|| pick::<String>(doc, keys))
            .filter(|value| !value.trim().is_empty())
    })
}

/// First key whose value is present and decodes as `T`.
fn pick<T: DeserializeOwned>(doc: &Map<String, Value>, keys: &[&str]) -> Option<T> {
    keys.iter()
        .filter_map(|key| doc.get(*key))
        .filter(|value| !value.is_null())
        .find_map(|value| T::deserialize(value).ok())
}

/// Completed sets then the running game count, e.g. `6-4, 2-1`.
pub fn score_summary(state: &MatchState) -> String {
    let completed_count = state.current_set_index().min(state.sets().len());
    let mut parts: Vec<String> = state.sets()[..completed_count]
        .iter()
        .map(|set| format!("{}-{}", set[Side::A], set[Side::B]))
        .collect();
    let games = state.games();
    parts.push(format!("{}-{}", games[Side::A], games[Side::B]));
    parts.join(", ")
}
