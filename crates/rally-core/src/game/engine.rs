//! Point resolution: how one won point moves the game, set and match.

use crate::game::match_state::MatchState;
use crate::model::history::{EventKind, HistoryEvent};
use crate::model::point::PointLabel;
use crate::model::score::{GameScore, SetScore, love_all, sets_won, tie_break_start};
use crate::model::side::Side;
use tracing::{Level, event};

/// Cumulative tie-break points between change-overs.
pub const TIE_BREAK_SWITCH_INTERVAL: u32 = 6;

impl MatchState {
    /// Award one point to `winner`.
    ///
    /// Returns the state unchanged when the match is over or paused.
    /// Every other call appends exactly one history event.
    pub fn add_point(&self, winner: Side, now_ms: i64) -> MatchState {
        if self.is_match_over || self.is_paused {
            return self.clone();
        }

        let mut next = self.clone();

        let game_won = if next.is_tie_break {
            next.resolve_tie_break_point(winner)
        } else {
            next.resolve_standard_point(winner)
        };

        if !game_won {
            next.record(EventKind::Point, winner, now_ms);
            return next;
        }

        next.games[winner] += 1;
        next.points = love_all();

        if !next.finishes_set(winner) {
            next.server = next.server.other();
            if tracing::enabled!(Level::DEBUG) {
                event!(
                    target: "rally_core::engine",
                    Level::DEBUG,
                    winner = winner.as_str(),
                    games_a = next.games[Side::A],
                    games_b = next.games[Side::B],
                    tie_break = next.is_tie_break,
                    "game won"
                );
            }
            next.record(EventKind::GameWin, winner, now_ms);
            return next;
        }

        let set_index = next.current_set_index;
        if let Some(slot) = next.sets.get_mut(set_index) {
            *slot = next.games;
        }

        let wins = sets_won(&next.sets);
        let sets_to_win = u32::from(next.config.sets_to_win);
        if wins[Side::A] >= sets_to_win || wins[Side::B] >= sets_to_win {
            let match_winner = if wins[Side::A] > wins[Side::B] {
                Side::A
            } else {
                Side::B
            };
            next.is_match_over = true;
            next.winner = Some(match_winner);
            event!(
                target: "rally_core::engine",
                Level::DEBUG,
                winner = match_winner.as_str(),
                sets_a = wins[Side::A],
                sets_b = wins[Side::B],
                "match won"
            );
            next.record(EventKind::MatchWin, winner, now_ms);
            return next;
        }

        next.current_set_index += 1;
        next.sets.push(SetScore::ZERO);
        next.games = GameScore::ZERO;
        next.server = next.server.other();

        let super_tie_break = next.config.plays_super_tie_break(next.current_set_index);
        next.is_tie_break = super_tie_break;
        if super_tie_break {
            next.points = tie_break_start();
        }

        event!(
            target: "rally_core::engine",
            Level::DEBUG,
            winner = winner.as_str(),
            set_number = set_index + 1,
            super_tie_break,
            "set won"
        );
        next.record(EventKind::SetWin, winner, now_ms);
        next
    }

    fn resolve_tie_break_point(&mut self, winner: Side) -> bool {
        let loser = winner.other();
        let winner_points = self.points[winner].tie_break_value() + 1;
        let loser_points = self.points[loser].tie_break_value();

        self.points[winner] = PointLabel::TieBreak(winner_points);

        let target = self.config.tie_break_target(self.current_set_index);
        winner_points >= target && winner_points >= loser_points + 2
    }

    fn resolve_standard_point(&mut self, winner: Side) -> bool {
        let loser = winner.other();
        let winner_label = self.points[winner];
        let loser_label = self.points[loser];

        if winner_label == PointLabel::Advantage {
            return true;
        }

        if winner_label != PointLabel::Forty {
            self.points[winner] = winner_label.next();
            return false;
        }

        if loser_label == PointLabel::Advantage {
            self.points[loser] = PointLabel::Forty;
            return false;
        }

        if loser_label == PointLabel::Forty && self.config.use_advantage {
            self.points[winner] = PointLabel::Advantage;
            return false;
        }

        true
    }

    /// Decide whether the game just added to `winner` closes the set. When
    /// both sides reach the threshold the set continues into a tie-break.
    fn finishes_set(&mut self, winner: Side) -> bool {
        if self.is_tie_break {
            return true;
        }

        let threshold = self.config.tie_break_at;
        let winner_games = self.games[winner];
        let loser_games = self.games[winner.other()];

        if winner_games > threshold && winner_games >= loser_games + 2 {
            return true;
        }

        if winner_games == threshold && loser_games + 2 <= threshold {
            return true;
        }

        if winner_games == threshold && loser_games == threshold {
            self.is_tie_break = true;
            self.points = tie_break_start();
            event!(
                target: "rally_core::engine",
                Level::DEBUG,
                set_number = self.current_set_index + 1,
                games = threshold,
                "tie-break entered"
            );
        }

        false
    }

    fn record(&mut self, kind: EventKind, winner: Side, now_ms: i64) {
        let switch_sides = self.switch_after(kind);
        self.should_switch_sides = switch_sides;
        let position = self.history.len();
        let event = HistoryEvent::new(
            kind,
            winner,
            now_ms,
            position,
            switch_sides,
            self.snapshot(),
        );
        self.history.push(event);
    }

    /// Change-over rule evaluated on the state after the event applied.
    fn switch_after(&self, kind: EventKind) -> bool {
        match kind {
            EventKind::Point => {
                if !self.is_tie_break {
                    return false;
                }
                let total = self.points[Side::A].tie_break_value()
                    + self.points[Side::B].tie_break_value();
                total > 0 && total % TIE_BREAK_SWITCH_INTERVAL == 0
            }
            EventKind::GameWin => {
                let total = self.games.total();
                total > 0 && total % 2 == 1
            }
            EventKind::SetWin => self
                .current_set_index
                .checked_sub(1)
                .and_then(|index| self.sets.get(index))
                .is_some_and(|set| set.total() % 2 == 1),
            EventKind::MatchWin => self
                .sets
                .get(self.current_set_index)
                .is_some_and(|set| set.total() % 2 == 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::config::{FinalSetType, MatchConfig};

    fn no_ad() -> MatchConfig {
        MatchConfig {
            use_advantage: false,
            ..MatchConfig::default()
        }
    }

    fn play(state: MatchState, sides: &[Side]) -> MatchState {
        sides
            .iter()
            .fold(state, |current, side| current.add_point(*side, 0))
    }

    fn win_game(state: MatchState, side: Side) -> MatchState {
        play(state, &[side; 4])
    }

    fn deuce(config: MatchConfig) -> MatchState {
        play(
            MatchState::initialize(config, 0),
            &[Side::A, Side::B, Side::A, Side::B, Side::A, Side::B],
        )
    }

    #[test]
    fn ladder_moves_one_rung_per_point() {
        let state = MatchState::initialize(no_ad(), 0);
        let state = state.add_point(Side::A, 10);
        assert_eq!(state.points()[Side::A], PointLabel::Fifteen);
        assert_eq!(state.points()[Side::B], PointLabel::Love);
        let last = state.last_event().expect("event recorded");
        assert_eq!(last.kind, EventKind::Point);
        assert_eq!(last.winner, Side::A);
        assert_eq!(last.timestamp, 10);
        assert!(!last.side_switch_after);
    }

    #[test]
    fn no_ad_deuce_point_wins_game() {
        let state = deuce(no_ad());
        assert_eq!(state.points()[Side::A], PointLabel::Forty);
        assert_eq!(state.points()[Side::B], PointLabel::Forty);

        let state = state.add_point(Side::B, 0);
        assert_eq!(*state.games(), GameScore::new(0, 1));
        assert_eq!(*state.points(), love_all());
        assert_eq!(state.last_event().map(|e| e.kind), Some(EventKind::GameWin));
    }

    #[test]
    fn advantage_returns_to_deuce_when_lost() {
        let config = MatchConfig {
            use_advantage: true,
            ..MatchConfig::default()
        };
        let state = deuce(config).add_point(Side::A, 0);
        assert_eq!(state.points()[Side::A], PointLabel::Advantage);
        assert_eq!(state.points()[Side::B], PointLabel::Forty);

        let state = state.add_point(Side::B, 0);
        assert_eq!(state.points()[Side::A], PointLabel::Forty);
        assert_eq!(state.points()[Side::B], PointLabel::Forty);

        let state = play(state, &[Side::B, Side::B]);
        assert_eq!(*state.games(), GameScore::new(0, 1));
    }

    #[test]
    fn forty_against_lower_score_wins_game() {
        let state = play(
            MatchState::initialize(MatchConfig::default(), 0),
            &[Side::A, Side::A, Side::A, Side::B],
        );
        let state = state.add_point(Side::A, 0);
        assert_eq!(*state.games(), GameScore::new(1, 0));
    }

    #[test]
    fn paused_or_finished_match_ignores_points() {
        let mut paused = MatchState::initialize(MatchConfig::default(), 0);
        paused.is_paused = true;
        assert_eq!(paused.add_point(Side::A, 0), paused);

        let mut over = MatchState::initialize(MatchConfig::default(), 0);
        over.is_match_over = true;
        over.winner = Some(Side::B);
        assert_eq!(over.add_point(Side::A, 0), over);
    }

    #[test]
    fn server_alternates_once_per_game() {
        let state = MatchState::initialize(no_ad(), 0);
        let state = play(state, &[Side::A, Side::A, Side::A]);
        assert_eq!(state.server(), Side::A);
        let state = state.add_point(Side::A, 0);
        assert_eq!(state.server(), Side::B);
        let state = win_game(state, Side::B);
        assert_eq!(state.server(), Side::A);
    }

    #[test]
    fn odd_game_totals_request_change_of_ends() {
        let state = win_game(MatchState::initialize(no_ad(), 0), Side::A);
        assert!(state.should_switch_sides());
        let state = win_game(state, Side::B);
        assert!(!state.should_switch_sides());
        let state = state.add_point(Side::A, 0);
        assert!(!state.should_switch_sides());
    }

    #[test]
    fn level_games_at_threshold_enter_tie_break() {
        let config = MatchConfig {
            tie_break_at: 2,
            ..no_ad()
        };
        let mut state = MatchState::initialize(config, 0);
        for side in [Side::A, Side::B, Side::A, Side::B] {
            state = win_game(state, side);
        }

        assert!(state.is_tie_break());
        assert_eq!(*state.points(), tie_break_start());
        assert_eq!(*state.games(), GameScore::new(2, 2));
        assert_eq!(state.last_event().map(|e| e.kind), Some(EventKind::GameWin));
    }

    #[test]
    fn two_game_lead_at_threshold_wins_set() {
        let mut state = MatchState::initialize(no_ad(), 0);
        for _ in 0..6 {
            state = win_game(state, Side::A);
        }
        assert_eq!(state.sets()[0], SetScore::new(6, 0));
        assert_eq!(state.current_set_index(), 1);
        assert_eq!(state.sets().len(), 2);
        assert_eq!(*state.games(), GameScore::ZERO);
        assert_eq!(state.last_event().map(|e| e.kind), Some(EventKind::SetWin));
        assert!(!state.should_switch_sides());
    }

    #[test]
    fn seven_five_closes_set_after_six_five() {
        let mut state = MatchState::initialize(no_ad(), 0);
        for _ in 0..5 {
            state = win_game(state, Side::A);
            state = win_game(state, Side::B);
        }
        state = win_game(state, Side::A);
        assert_eq!(*state.games(), GameScore::new(6, 5));
        assert_eq!(state.current_set_index(), 0);

        state = win_game(state, Side::A);
        assert_eq!(state.sets()[0], SetScore::new(7, 5));
        assert_eq!(state.current_set_index(), 1);
    }

    fn tie_break_state(points_a: u32, points_b: u32) -> MatchState {
        let mut state = MatchState::initialize(no_ad(), 0);
        state.games = GameScore::new(6, 6);
        state.is_tie_break = true;
        state.points = crate::model::score::PointScore::new(
            PointLabel::TieBreak(points_a),
            PointLabel::TieBreak(points_b),
        );
        state
    }

    #[test]
    fn tie_break_needs_two_point_margin() {
        let state = tie_break_state(6, 6).add_point(Side::A, 0);
        assert!(state.is_tie_break());
        assert_eq!(state.points()[Side::A], PointLabel::TieBreak(7));
        assert_eq!(state.current_set_index(), 0);

        let state = tie_break_state(6, 5).add_point(Side::A, 0);
        assert!(!state.is_tie_break());
        assert_eq!(state.sets()[0], SetScore::new(7, 6));
        assert_eq!(state.current_set_index(), 1);
    }

    #[test]
    fn tie_break_switches_every_six_points() {
        let state = tie_break_state(3, 2).add_point(Side::B, 0);
        assert!(state.should_switch_sides());
        assert!(state.last_event().is_some_and(|e| e.side_switch_after));

        let state = state.add_point(Side::B, 0);
        assert!(!state.should_switch_sides());
    }

    #[test]
    fn tie_break_game_flips_server() {
        let mut state = tie_break_state(6, 4);
        state.server = Side::B;
        let state = state.add_point(Side::A, 0);
        assert_eq!(state.server(), Side::A);
    }

    fn deciding_super_tie_break(points_a: u32, points_b: u32) -> MatchState {
        let config = MatchConfig {
            sets_to_win: 2,
            final_set_type: FinalSetType::SuperTieBreak,
            ..no_ad()
        };
        let mut state = MatchState::initialize(config, 0);
        state.sets = vec![SetScore::new(6, 4), SetScore::new(4, 6), SetScore::ZERO];
        state.current_set_index = 2;
        state.is_tie_break = true;
        state.points = crate::model::score::PointScore::new(
            PointLabel::TieBreak(points_a),
            PointLabel::TieBreak(points_b),
        );
        state
    }

    #[test]
    fn super_tie_break_ignores_configured_points() {
        let state = deciding_super_tie_break(6, 3).add_point(Side::A, 0);
        assert!(!state.is_match_over());
        assert_eq!(state.points()[Side::A], PointLabel::TieBreak(7));
    }

    #[test]
    fn super_tie_break_at_ten_wins_match() {
        let state = deciding_super_tie_break(9, 8).add_point(Side::A, 0);
        assert!(state.is_match_over());
        assert_eq!(state.winner(), Some(Side::A));
        assert_eq!(state.sets()[2], SetScore::new(1, 0));
        assert_eq!(state.last_event().map(|e| e.kind), Some(EventKind::MatchWin));
        assert!(state.should_switch_sides());
    }

    fn win_games(state: MatchState, side: Side, count: usize) -> MatchState {
        (0..count).fold(state, |current, _| win_game(current, side))
    }

    #[test]
    fn single_game_lead_at_threshold_one_is_not_enough() {
        let config = MatchConfig {
            tie_break_at: 1,
            ..no_ad()
        };
        let state = win_game(MatchState::initialize(config, 0), Side::A);
        assert_eq!(*state.games(), GameScore::new(1, 0));
        assert_eq!(state.current_set_index(), 0);
    }

    #[test]
    fn split_sets_start_super_tie_break() {
        let config = MatchConfig {
            tie_break_at: 1,
            ..no_ad()
        };
        let state = win_games(MatchState::initialize(config, 0), Side::A, 2);
        assert_eq!(state.current_set_index(), 1);
        assert!(!state.is_tie_break());

        let state = win_games(state, Side::B, 2);
        assert_eq!(state.current_set_index(), 2);
        assert_eq!(state.sets()[1], SetScore::new(0, 2));
        assert!(state.is_tie_break());
        assert_eq!(*state.points(), tie_break_start());
        assert_eq!(state.last_event().map(|e| e.kind), Some(EventKind::SetWin));
        assert!(!state.should_switch_sides());
    }

    #[test]
    fn straight_sets_end_match_without_flipping_server() {
        let config = MatchConfig {
            sets_to_win: 1,
            tie_break_at: 1,
            ..no_ad()
        };
        let state = win_games(MatchState::initialize(config, 0), Side::B, 2);
        assert!(state.is_match_over());
        assert_eq!(state.winner(), Some(Side::B));
        assert_eq!(state.server(), Side::B);
        assert_eq!(state.history().len(), 8);

        let after = state.add_point(Side::A, 0);
        assert_eq!(after, state);
    }

    #[test]
    fn history_ids_follow_position() {
        let state = play(
            MatchState::initialize(no_ad(), 0),
            &[Side::A, Side::B, Side::A],
        );
        let ids: Vec<&str> = state.history().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["0-0", "0-1", "0-2"]);
    }
}
