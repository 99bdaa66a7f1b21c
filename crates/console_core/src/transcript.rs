//! Transcript store: the text shown for the current action plus its busy flag.

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tokio::sync::{broadcast, watch};

/// Lines are rendered separated by one blank line.
pub const LINE_SEPARATOR: &str = "\n\n";
const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionState {
    #[default]
    Idle,
    Running,
    Succeeded,
    Failed,
}

impl ActionState {
    pub fn is_busy(self) -> bool {
        self == Self::Running
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TranscriptSnapshot {
    pub lines: Vec<String>,
    pub state: ActionState,
}

impl TranscriptSnapshot {
    pub fn text(&self) -> String {
        self.lines.join(LINE_SEPARATOR)
    }

    pub fn busy(&self) -> bool {
        self.state.is_busy()
    }
}

/// One notification per store mutation, delivered in mutation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptEvent {
    Reset,
    Appended(String),
    Finished,
    Failed { notice: String },
    Announced(String),
}

impl TranscriptEvent {
    /// Busy flag after this event, or `None` when the event does not touch it.
    pub fn busy_after(&self) -> Option<bool> {
        match self {
            Self::Reset => Some(true),
            Self::Finished | Self::Failed { .. } | Self::Announced(_) => Some(false),
            Self::Appended(_) => None,
        }
    }
}

#[derive(Clone)]
pub struct TranscriptStore {
    snapshot: Arc<watch::Sender<TranscriptSnapshot>>,
    events: broadcast::Sender<TranscriptEvent>,
    write_lock: Arc<Mutex<()>>,
}

impl TranscriptStore {
    pub fn new() -> Self {
        let (snapshot, _) = watch::channel(TranscriptSnapshot::default());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            snapshot: Arc::new(snapshot),
            events,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Clears the transcript and marks an action as running.
    pub fn reset(&self) {
        self.mutate(TranscriptEvent::Reset, |snapshot| {
            snapshot.lines.clear();
            snapshot.state = ActionState::Running;
        });
    }

    pub fn append(&self, line: impl Into<String>) {
        let line = line.into();
        tracing::debug!(line = %line, "transcript line");
        self.mutate(TranscriptEvent::Appended(line.clone()), |snapshot| {
            snapshot.lines.push(line);
        });
    }

    pub fn finish(&self) {
        self.mutate(TranscriptEvent::Finished, |snapshot| {
            snapshot.state = ActionState::Succeeded;
        });
    }

    /// Appends `notice` and marks the action failed.
    pub fn fail(&self, notice: &str) {
        let event = TranscriptEvent::Failed {
            notice: notice.to_string(),
        };
        self.mutate(event, |snapshot| {
            snapshot.lines.push(notice.to_string());
            snapshot.state = ActionState::Failed;
        });
    }

    /// Replaces the transcript with a single status line outside of any action.
    pub fn announce(&self, line: impl Into<String>) {
        let line = line.into();
        self.mutate(TranscriptEvent::Announced(line.clone()), |snapshot| {
            snapshot.lines = vec![line];
            snapshot.state = ActionState::Idle;
        });
    }

    pub fn snapshot(&self) -> TranscriptSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn text(&self) -> String {
        self.snapshot.borrow().text()
    }

    pub fn state(&self) -> ActionState {
        self.snapshot.borrow().state
    }

    pub fn busy(&self) -> bool {
        self.state().is_busy()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TranscriptEvent> {
        self.events.subscribe()
    }

    pub fn watch(&self) -> watch::Receiver<TranscriptSnapshot> {
        self.snapshot.subscribe()
    }

    fn mutate(&self, event: TranscriptEvent, apply: impl FnOnce(&mut TranscriptSnapshot)) {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.snapshot.send_modify(apply);
        // Subscribers are optional; a send with no receivers is not an error here.
        let _ = self.events.send(event);
    }
}

impl Default for TranscriptStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "tests/transcript_tests.rs"]
mod tests;
