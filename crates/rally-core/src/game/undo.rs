use crate::game::match_state::MatchState;
use tracing::{Level, event};

impl MatchState {
    /// Revert the most recent history event.
    ///
    /// Undoing the only event resets the score to a fresh match that keeps
    /// the original start time, accumulated duration and match id. Other
    /// undos restore the score fields from the new last event's snapshot;
    /// the serving side is left as it is.
    pub fn undo(&self) -> MatchState {
        let Some((_, remaining)) = self.history.split_last() else {
            return self.clone();
        };

        let Some(previous) = remaining.last() else {
            event!(
                target: "rally_core::undo",
                Level::DEBUG,
                match_id = self.match_id.as_deref().unwrap_or(""),
                "undo emptied history, score reset"
            );
            let reset = MatchState::initialize(self.config.clone(), self.start_time);
            return MatchState {
                match_id: self.match_id.clone(),
                duration_seconds: self.duration_seconds,
                ..reset
            };
        };

        let snapshot = previous.score_snapshot.clone();
        let current_set_index = snapshot.sets.len().saturating_sub(1);

        MatchState {
            history: remaining.to_vec(),
            sets: snapshot.sets,
            games: snapshot.games,
            points: snapshot.points,
            is_tie_break: snapshot.is_tie_break,
            should_switch_sides: previous.side_switch_after,
            is_match_over: false,
            winner: None,
            current_set_index,
            ..self.clone()
        }
    }
}
