//! UI layer for the console window.

pub mod app;

pub use app::{ConsoleGuiApp, StartupConfig};
