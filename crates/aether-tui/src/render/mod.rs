//! Rendering functions for the TUI.

mod results;

pub use results::render_launcher;
