//! Tally - a terminal task board and expense tracker.
//!
//! This library exposes the application state for testing.
//! The binary entry point is in main.rs.

pub mod app;
pub mod board;
pub mod forms;
pub mod input;
pub mod theme;
pub mod ui;

pub use app::{App, Banner, Session, View};
