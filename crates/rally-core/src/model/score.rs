use crate::model::point::PointLabel;
use crate::model::side::{Side, SidePair};

/// Games won by each side in the current set.
pub type GameScore = SidePair<u32>;

/// Games won by each side in one set, completed or in progress.
pub type SetScore = SidePair<u32>;

/// Point labels of both sides inside the current game.
pub type PointScore = SidePair<PointLabel>;

pub const fn love_all() -> PointScore {
    SidePair::new(PointLabel::Love, PointLabel::Love)
}

pub const fn tie_break_start() -> PointScore {
    SidePair::new(PointLabel::TieBreak(0), PointLabel::TieBreak(0))
}

/// Sets won per side; a set counts for a side only when it holds strictly
/// more games than the opponent.
pub fn sets_won(sets: &[SetScore]) -> SidePair<u32> {
    let mut wins = SidePair::ZERO;
    for set in sets {
        for side in Side::BOTH {
            if set[side] > set[side.other()] {
                wins[side] += 1;
            }
        }
    }
    wins
}
