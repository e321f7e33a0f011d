use crate::game::clock::{Clock, SystemClock};
use crate::game::match_state::MatchState;
use crate::model::config::MatchConfig;
use crate::model::side::Side;
use crate::sync::reconstruct::reconstruct;
use crate::sync::summary::{RealtimeFragment, Summary};
use tracing::{Level, event};

/// Front door for a host application: every call takes the current state
/// and hands back the next one, reading time from the owned clock.
#[derive(Debug, Default)]
pub struct MatchSession<C = SystemClock> {
    clock: C,
}

impl<C: Clock> MatchSession<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn create(&self, config: MatchConfig) -> MatchState {
        MatchState::initialize(config, self.clock.now_ms())
    }

    pub fn score_point(&self, state: &MatchState, winner: Side) -> MatchState {
        state.add_point(winner, self.clock.now_ms())
    }

    pub fn undo(&self, state: &MatchState) -> MatchState {
        state.undo()
    }

    /// Pause, or resume with the start time shifted so elapsed time picks
    /// up where it stopped.
    pub fn toggle_pause(&self, state: &MatchState) -> MatchState {
        if state.is_match_over {
            return state.clone();
        }

        if state.is_paused {
            let paused_for_ms = elapsed_ms(state.duration_seconds);
            let start_time = self.clock.now_ms().saturating_sub(paused_for_ms);
            event!(
                target: "rally_core::session",
                Level::DEBUG,
                duration_seconds = state.duration_seconds,
                start_time,
                "match resumed"
            );
            return MatchState {
                is_paused: false,
                start_time,
                ..state.clone()
            };
        }

        event!(
            target: "rally_core::session",
            Level::DEBUG,
            duration_seconds = state.duration_seconds,
            "match paused"
        );
        MatchState {
            is_paused: true,
            ..state.clone()
        }
    }

    /// Recompute whole elapsed seconds since the start time.
    pub fn tick(&self, state: &MatchState) -> MatchState {
        if state.is_paused || state.is_match_over {
            return state.clone();
        }

        let elapsed = self
            .clock
            .now_ms()
            .saturating_sub(state.start_time)
            .div_euclid(1_000);
        MatchState {
            duration_seconds: u64::try_from(elapsed).unwrap_or(0),
            ..state.clone()
        }
    }

    /// Replace the rules mid-match, keeping the score.
    pub fn edit_config(&self, state: &MatchState, config: MatchConfig) -> MatchState {
        state.with_config(config)
    }

    pub fn reconstruct(
        &self,
        summary: &Summary,
        realtime: Option<&RealtimeFragment>,
        fallback: &MatchConfig,
    ) -> MatchState {
        reconstruct(summary, realtime, fallback, self.clock.now_ms())
    }
}

fn elapsed_ms(seconds: u64) -> i64 {
    i64::try_from(seconds.saturating_mul(1_000)).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::clock::ManualClock;

    fn session_at(start_ms: i64) -> MatchSession<ManualClock> {
        MatchSession::new(ManualClock::new(start_ms))
    }

    #[test]
    fn create_stamps_current_instant() {
        let session = session_at(9_000);
        let state = session.create(MatchConfig::default());
        assert_eq!(state.start_time(), 9_000);
    }

    #[test]
    fn tick_floors_elapsed_seconds() {
        let session = session_at(0);
        let state = session.create(MatchConfig::default());
        session.clock().advance_ms(2_999);
        let state = session.tick(&state);
        assert_eq!(state.duration_seconds(), 2);
    }

    #[test]
    fn tick_clamps_clock_skew_to_zero() {
        let session = session_at(10_000);
        let state = session.create(MatchConfig::default());
        session.clock().set(4_000);
        assert_eq!(session.tick(&state).duration_seconds(), 0);
    }

    #[test]
    fn pause_freezes_duration_and_resume_continues_it() {
        let session = session_at(0);
        let state = session.create(MatchConfig::default());

        session.clock().advance_secs(30);
        let state = session.tick(&state);
        let state = session.toggle_pause(&state);
        assert!(state.is_paused());

        session.clock().advance_secs(120);
        let paused = session.tick(&state);
        assert_eq!(paused.duration_seconds(), 30);
        assert_eq!(session.score_point(&paused, Side::A), paused);

        let resumed = session.toggle_pause(&paused);
        assert!(!resumed.is_paused());
        assert_eq!(resumed.start_time(), 120_000);

        session.clock().advance_secs(5);
        assert_eq!(session.tick(&resumed).duration_seconds(), 35);
    }

    #[test]
    fn finished_match_ignores_pause_and_tick() {
        let session = session_at(0);
        let config = MatchConfig {
            sets_to_win: 1,
            tie_break_at: 1,
            ..MatchConfig::default()
        };
        let mut state = session.create(config);
        for _ in 0..8 {
            state = session.score_point(&state, Side::B);
        }
        assert!(state.is_match_over());

        session.clock().advance_secs(10);
        assert_eq!(session.toggle_pause(&state), state);
        assert_eq!(session.tick(&state), state);
    }

    #[test]
    fn score_point_stamps_events_with_clock() {
        let session = session_at(1_000);
        let state = session.create(MatchConfig::default());
        session.clock().advance_ms(250);
        let state = session.score_point(&state, Side::B);
        assert_eq!(state.last_event().map(|e| e.timestamp), Some(1_250));
        assert_eq!(session.undo(&state).history().len(), 0);
    }
}
