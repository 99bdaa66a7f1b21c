pub mod action;
pub mod binding;
pub mod catalog;
pub mod config;
pub mod error;
pub mod networks;
pub mod runner;
pub mod transcript;
pub mod units;

pub use action::{ActionContext, ActionGroup, ActionRegistry, ActionSpec};
pub use binding::{ActionButton, ConsoleBinding, ConsoleView, RunInfo, WalletEventSubscription};
pub use config::{load_config, ConfigLayer, ConsoleConfig};
pub use error::{BindingError, ConfigError};
pub use runner::{ActionOutcome, ActionRunner, ActionScope, OperationError, ReentryPolicy};
pub use transcript::{ActionState, TranscriptEvent, TranscriptSnapshot, TranscriptStore};
