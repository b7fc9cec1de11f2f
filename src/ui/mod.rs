//! Terminal user interface
//!
//! `render` turns session state into text, `key_dispatcher` maps keys to
//! actions, and `tui_app` runs the ratatui event loop.

pub mod key_dispatcher;
pub mod render;
pub mod tui_app;
