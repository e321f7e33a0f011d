use crate::game::match_state::MatchState;
use crate::model::config::MatchConfig;
use crate::model::score::{GameScore, SetScore, love_all};
use crate::model::side::Side;
use crate::sync::summary::{RealtimeFragment, Summary};
use tracing::{Level, event};

/// Resolve each field on its own: the summary's top-level name and color
/// first, then whatever the embedded config carries, then `fallback`.
pub fn resolve_config(summary: &Summary, fallback: &MatchConfig) -> MatchConfig {
    let mut config = match &summary.config {
        Some(embedded) => embedded.apply_to(fallback.clone()),
        None => fallback.clone(),
    };

    for side in Side::BOTH {
        if let Some(name) = summary.name(side) {
            config.names[side] = name.to_string();
        }
        if let Some(color) = summary.color(side) {
            config.colors[side] = Some(color.to_string());
        }
    }

    config
}

/// Rebuild a match from published documents when no local history exists.
///
/// Without a realtime fragment the in-game points, tie-break flag and
/// history start over at their defaults. The winner is never restored.
pub fn reconstruct(
    summary: &Summary,
    realtime: Option<&RealtimeFragment>,
    fallback: &MatchConfig,
    now_ms: i64,
) -> MatchState {
    let sets = if summary.current_sets.is_empty() {
        event!(
            target: "rally_core::sync",
            Level::WARN,
            match_id = %summary.id,
            "summary carries no sets, starting from 0-0"
        );
        vec![SetScore::ZERO]
    } else {
        summary.current_sets.clone()
    };
    let current_set_index = sets.len().saturating_sub(1);

    if realtime.is_none() {
        event!(
            target: "rally_core::sync",
            Level::DEBUG,
            match_id = %summary.id,
            "no realtime fragment, point progress and history reset"
        );
    }

    MatchState {
        match_id: Some(summary.id.clone()),
        config: resolve_config(summary, fallback),
        start_time: summary.start_time.unwrap_or(now_ms),
        duration_seconds: summary.duration_seconds.unwrap_or(0),
        is_paused: summary.is_paused.unwrap_or(false),
        is_match_over: summary.is_finished(),
        winner: None,
        current_set_index,
        sets,
        games: summary.current_games.unwrap_or(GameScore::ZERO),
        points: realtime.map_or_else(love_all, |fragment| fragment.points),
        is_tie_break: realtime.is_some_and(|fragment| fragment.is_tie_break),
        should_switch_sides: false,
        server: summary.server,
        history: realtime.map_or_else(Vec::new, |fragment| fragment.history.clone()),
    }
}
