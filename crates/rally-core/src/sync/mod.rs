pub mod reconstruct;
pub mod summary;
