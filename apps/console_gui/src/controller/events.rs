//! Backend-to-UI events for the console GUI.

use console_core::{ActionButton, ConsoleView};
use shared::domain::NetworkConfig;

pub enum UiEvent {
    Info(String),
    /// Fresh view of the console; sent whenever the transcript or chain changes.
    View(ConsoleView),
    Actions(Vec<ActionButton>),
    Networks(Vec<NetworkConfig>),
    ActionFinished { action: String, outcome: &'static str },
    Error(String),
}
