pub mod arena;
pub mod day;
pub mod task;
pub mod views;

pub use arena::TaskArena;
pub use day::{is_weekend, Day};
pub use task::Task;
pub use views::{display_cmp, flatten_day, sorted_for_display, tree_connector, FlatRow};
