pub mod config;
pub mod history;
pub mod point;
pub mod score;
pub mod side;
