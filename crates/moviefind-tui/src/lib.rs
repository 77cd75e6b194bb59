//! Debounced movie search controller and terminal UI.
//!
//! Uses `ratatui` + `crossterm` for rendering and `tokio` for the
//! debounce timer and background requests.

mod app;
/// Search controller state machine.
pub mod controller;
mod cursor;
/// Reset-on-reschedule debounce timer.
pub mod debounce;
/// Search session wiring controller, debouncer, and background tasks.
pub mod session;
/// Background fetch, trending, and analytics tasks.
pub mod tasks;
mod ui;

pub use app::{BrowserOptions, run_browser};
