//! Action runner: drives one asynchronous operation through the transcript lifecycle.
//!
//! Every run goes `reset -> op -> (append summary, finish) | fail`. Failures are
//! logged on the diagnostic channel (`tracing`) and only a generic notice reaches
//! the transcript. At most one run is active; what happens to a second request is
//! decided by [`ReentryPolicy`].

use std::{
    future::Future,
    panic::AssertUnwindSafe,
    str::FromStr,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, MutexGuard, PoisonError,
    },
    time::{Duration, Instant},
};

use anyhow::anyhow;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{error, info, warn};

use crate::transcript::TranscriptStore;

/// Transcript line written when an action fails, whatever the cause.
pub const FAILURE_NOTICE: &str = "An error occurred";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReentryPolicy {
    /// Refuse a new action while one is running; the transcript is left alone.
    #[default]
    Reject,
    /// Cancel the running action and start the new one.
    Supersede,
}

impl FromStr for ReentryPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "supersede" => Ok(Self::Supersede),
            other => Err(format!(
                "unknown reentry policy '{other}' (expected 'reject' or 'supersede')"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunnerOptions {
    pub reentry: ReentryPolicy,
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct OperationError {
    pub message: String,
    pub cause: Option<String>,
}

impl OperationError {
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let causes: Vec<String> = err.chain().skip(1).map(ToString::to_string).collect();
        Self {
            message: err.to_string(),
            cause: (!causes.is_empty()).then(|| causes.join(": ")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Succeeded { summary: String },
    Failed(OperationError),
    /// Refused because `running` was still in flight.
    Rejected { running: String },
    /// Cancelled by a newer action before it completed.
    Superseded,
}

impl ActionOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Succeeded { .. } => "succeeded",
            Self::Failed(_) => "failed",
            Self::Rejected { .. } => "rejected",
            Self::Superseded => "superseded",
        }
    }
}

struct ActiveRun {
    id: u64,
    action: String,
    cancel: Option<oneshot::Sender<()>>,
}

#[derive(Default)]
struct RunnerShared {
    active: Mutex<Option<ActiveRun>>,
    next_id: AtomicU64,
}

impl RunnerShared {
    fn lock_active(&self) -> MutexGuard<'_, Option<ActiveRun>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handle given to an operation for writing intermediate transcript lines.
///
/// Once its run is no longer the active one, appends are silently dropped.
#[derive(Clone)]
pub struct ActionScope {
    run_id: u64,
    store: TranscriptStore,
    shared: Arc<RunnerShared>,
}

impl ActionScope {
    pub fn append(&self, line: impl Into<String>) {
        let active = self.shared.lock_active();
        if active.as_ref().map(|run| run.id) == Some(self.run_id) {
            self.store.append(line);
        }
    }

    pub fn is_current(&self) -> bool {
        self.shared.lock_active().as_ref().map(|run| run.id) == Some(self.run_id)
    }

    pub fn run_id(&self) -> u64 {
        self.run_id
    }
}

#[derive(Clone)]
pub struct ActionRunner {
    store: TranscriptStore,
    options: RunnerOptions,
    shared: Arc<RunnerShared>,
}

impl ActionRunner {
    pub fn new(store: TranscriptStore, options: RunnerOptions) -> Self {
        Self {
            store,
            options,
            shared: Arc::new(RunnerShared::default()),
        }
    }

    pub fn store(&self) -> &TranscriptStore {
        &self.store
    }

    pub fn options(&self) -> RunnerOptions {
        self.options
    }

    pub fn is_running(&self) -> bool {
        self.shared.lock_active().is_some()
    }

    pub fn running_action(&self) -> Option<String> {
        self.shared
            .lock_active()
            .as_ref()
            .map(|run| run.action.clone())
    }

    /// Runs `op` as the action named `action`. Never fails; the outcome says what happened.
    pub async fn run<F, Fut>(&self, action: &str, op: F) -> ActionOutcome
    where
        F: FnOnce(ActionScope) -> Fut,
        Fut: Future<Output = anyhow::Result<String>>,
    {
        let (cancel_tx, cancel_rx) = oneshot::channel();
        let run_id = match self.begin(action, cancel_tx) {
            Ok(run_id) => run_id,
            Err(running) => return ActionOutcome::Rejected { running },
        };
        let mut guard = RunGuard {
            runner: self,
            run_id,
            action,
            armed: true,
        };

        let scope = ActionScope {
            run_id,
            store: self.store.clone(),
            shared: Arc::clone(&self.shared),
        };
        let started = Instant::now();
        let work = AssertUnwindSafe(async move { op(scope).await })
            .catch_unwind()
            .map(|caught| caught.unwrap_or_else(|_| Err(anyhow!("action panicked"))));

        let result = tokio::select! {
            result = bounded(work, self.options.timeout) => Some(result),
            _ = cancel_rx => None,
        };
        guard.armed = false;

        match result {
            Some(result) => self.complete(run_id, action, result, started.elapsed()),
            None => {
                info!(action, run_id, "action superseded");
                ActionOutcome::Superseded
            }
        }
    }

    fn begin(&self, action: &str, cancel: oneshot::Sender<()>) -> Result<u64, String> {
        let mut active = self.shared.lock_active();
        if let Some(current) = active.as_mut() {
            match self.options.reentry {
                ReentryPolicy::Reject => {
                    warn!(
                        action,
                        running = %current.action,
                        "action rejected; previous action still running"
                    );
                    return Err(current.action.clone());
                }
                ReentryPolicy::Supersede => {
                    info!(action, superseded = %current.action, "superseding running action");
                    if let Some(cancel) = current.cancel.take() {
                        let _ = cancel.send(());
                    }
                }
            }
        }

        let run_id = self.shared.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        *active = Some(ActiveRun {
            id: run_id,
            action: action.to_string(),
            cancel: Some(cancel),
        });
        self.store.reset();
        info!(action, run_id, "action started");
        Ok(run_id)
    }

    fn complete(
        &self,
        run_id: u64,
        action: &str,
        result: anyhow::Result<String>,
        elapsed: Duration,
    ) -> ActionOutcome {
        let mut active = self.shared.lock_active();
        if active.as_ref().map(|run| run.id) != Some(run_id) {
            // A newer run owns the transcript now.
            return ActionOutcome::Superseded;
        }

        let outcome = match result {
            Ok(summary) => {
                if !summary.is_empty() {
                    self.store.append(summary.clone());
                }
                self.store.finish();
                info!(
                    action,
                    run_id,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "action succeeded"
                );
                ActionOutcome::Succeeded { summary }
            }
            Err(err) => {
                error!(
                    action,
                    run_id,
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %format!("{err:#}"),
                    "action failed"
                );
                self.store.fail(FAILURE_NOTICE);
                ActionOutcome::Failed(OperationError::from_anyhow(&err))
            }
        };
        *active = None;
        outcome
    }
}

async fn bounded<Fut>(work: Fut, timeout: Option<Duration>) -> anyhow::Result<String>
where
    Fut: Future<Output = anyhow::Result<String>>,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, work)
            .await
            .unwrap_or_else(|_| Err(anyhow!("action timed out after {limit:?}"))),
        None => work.await,
    }
}

/// Releases the active slot if the run future is dropped mid-flight.
struct RunGuard<'a> {
    runner: &'a ActionRunner,
    run_id: u64,
    action: &'a str,
    armed: bool,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut active = self.runner.shared.lock_active();
        if active.as_ref().map(|run| run.id) == Some(self.run_id) {
            warn!(
                action = self.action,
                run_id = self.run_id,
                "action dropped before completion"
            );
            self.runner.store.fail(FAILURE_NOTICE);
            *active = None;
        }
    }
}

#[cfg(test)]
#[path = "tests/runner_tests.rs"]
mod tests;
