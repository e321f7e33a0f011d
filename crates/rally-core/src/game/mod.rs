pub mod clock;
pub mod engine;
pub mod match_state;
pub mod session;
pub mod undo;
