//! CO₂ emissions calculator with Dutch emission factors.
//!
//! The calculation, chart description and PDF report live in the library so
//! the desktop GUI and the terminal binary share them.

pub mod app;
pub mod chart;
pub mod config;
pub mod emissions;
pub mod i18n;
pub mod logging;
pub mod quantity;
pub mod report;
pub mod session;
pub mod ui_cli;
