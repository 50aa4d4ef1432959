// Library surface for the binary, headless integration tests and reuse.
pub mod app;
pub mod app_dirs;
pub mod attempt;
pub mod catalog;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod quiz;
pub mod runtime;
pub mod session;
pub mod timer;
pub mod ui;
pub mod users;
