use crate::model::config::MatchConfig;
use crate::model::history::{HistoryEvent, ScoreSnapshot};
use crate::model::score::{GameScore, PointScore, SetScore, love_all};
use crate::model::side::Side;
use rand::Rng;
use serde::{Deserialize, Serialize};

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 8;

/// Complete live state of one match.
///
/// Values are never changed in place by the scoring operations: every
/// transition in [`crate::game`] reads `&self` and returns a new state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) match_id: Option<String>,
    pub(crate) config: MatchConfig,
    pub(crate) start_time: i64,
    pub(crate) duration_seconds: u64,
    pub(crate) is_paused: bool,
    pub(crate) is_match_over: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) winner: Option<Side>,
    pub(crate) current_set_index: usize,
    pub(crate) sets: Vec<SetScore>,
    pub(crate) games: GameScore,
    pub(crate) points: PointScore,
    pub(crate) is_tie_break: bool,
    pub(crate) should_switch_sides: bool,
    pub(crate) server: Side,
    pub(crate) history: Vec<HistoryEvent>,
}

impl MatchState {
    /// Fresh match at 0-0 in the first set, side A serving.
    pub fn initialize(config: MatchConfig, started_at_ms: i64) -> Self {
        Self {
            match_id: None,
            config,
            start_time: started_at_ms,
            duration_seconds: 0,
            is_paused: false,
            is_match_over: false,
            winner: None,
            current_set_index: 0,
            sets: vec![SetScore::ZERO],
            games: GameScore::ZERO,
            points: love_all(),
            is_tie_break: false,
            should_switch_sides: false,
            server: Side::A,
            history: Vec::new(),
        }
    }

    pub fn with_match_id(self, match_id: impl Into<String>) -> Self {
        Self {
            match_id: Some(match_id.into()),
            ..self
        }
    }

    /// Same score data under a replaced configuration.
    pub fn with_config(&self, config: MatchConfig) -> Self {
        Self {
            config,
            ..self.clone()
        }
    }

    pub fn match_id(&self) -> Option<&str> {
        self.match_id.as_deref()
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn start_time(&self) -> i64 {
        self.start_time
    }

    pub fn duration_seconds(&self) -> u64 {
        self.duration_seconds
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    pub fn is_match_over(&self) -> bool {
        self.is_match_over
    }

    pub fn winner(&self) -> Option<Side> {
        self.winner
    }

    pub fn current_set_index(&self) -> usize {
        self.current_set_index
    }

    pub fn sets(&self) -> &[SetScore] {
        &self.sets
    }

    pub fn games(&self) -> &GameScore {
        &self.games
    }

    pub fn points(&self) -> &PointScore {
        &self.points
    }

    pub fn is_tie_break(&self) -> bool {
        self.is_tie_break
    }

    pub fn should_switch_sides(&self) -> bool {
        self.should_switch_sides
    }

    pub fn server(&self) -> Side {
        self.server
    }

    pub fn history(&self) -> &[HistoryEvent] {
        &self.history
    }

    pub fn last_event(&self) -> Option<&HistoryEvent> {
        self.history.last()
    }

    pub fn snapshot(&self) -> ScoreSnapshot {
        ScoreSnapshot {
            sets: self.sets.clone(),
            games: self.games,
            points: self.points,
            is_tie_break: self.is_tie_break,
        }
    }
}

/// Match identifier of the form `<now_ms>-<8 base36 chars>`.
pub fn new_match_id<R: Rng + ?Sized>(now_ms: i64, rng: &mut R) -> String {
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| char::from(ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())]))
        .collect();
    format!("{now_ms}-{suffix}")
}
