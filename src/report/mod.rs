pub mod export;
pub mod stats;

pub use export::export_all;
pub use stats::{compute_statistics, daily_completion_rate, Statistics};
