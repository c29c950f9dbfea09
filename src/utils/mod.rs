//! Utility functions

mod sanitize;
pub mod tui_log;

pub use sanitize::output_stem;
pub use tui_log::{QuietWhileTui, ScreenGuard};
