pub mod app;
pub mod event;
pub mod md;
pub mod widgets;

pub use app::{run_tui, App};
