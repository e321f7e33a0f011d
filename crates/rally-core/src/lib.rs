#![deny(warnings)]
pub mod game;
pub mod model;
pub mod sync;

pub use game::clock::{Clock, ManualClock, SystemClock};
pub use game::match_state::MatchState;
pub use game::session::MatchSession;
pub use model::config::{FinalSetType, MatchConfig, MatchMode, PartialMatchConfig};
pub use model::history::{EventKind, HistoryEvent, ScoreSnapshot};
pub use model::point::PointLabel;
pub use model::side::{Side, SidePair};
pub use sync::reconstruct::reconstruct;
pub use sync::summary::{MatchStatus, RealtimeFragment, Summary};
