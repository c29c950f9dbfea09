//! Interactive playlist curator

pub mod controller;
pub mod mode;
pub mod status;
pub mod tui;

pub use controller::App;
pub use tui::run;
