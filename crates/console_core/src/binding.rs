//! Presentation binding: what a rendering surface reads and the actions it may invoke.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::domain::{ChainId, NetworkConfig};
use tokio::{
    sync::{broadcast, watch},
    task::JoinHandle,
};
use tracing::{debug, info, warn};
use wallet_provider::{WalletEvent, WalletProvider};

use crate::{
    action::{ActionContext, ActionGroup, ActionRegistry},
    catalog::welcome_message,
    config::ConsoleConfig,
    error::BindingError,
    networks,
    runner::{ActionOutcome, ActionRunner},
    transcript::{ActionState, TranscriptEvent, TranscriptSnapshot, TranscriptStore},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunInfo {
    pub action: String,
    pub outcome: &'static str,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsoleView {
    pub transcript_text: String,
    pub busy: bool,
    pub state: ActionState,
    pub chain_id: ChainId,
    pub wallet_connected: bool,
    /// Set when the last trigger was refused; cleared by the next accepted one.
    pub notice: Option<String>,
    pub last_run: Option<RunInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionButton {
    pub name: String,
    pub label: String,
    pub group: ActionGroup,
    pub enabled: bool,
    pub input_hint: Option<String>,
}

#[derive(Clone)]
pub struct ConsoleBinding {
    config: Arc<ConsoleConfig>,
    wallet: Arc<dyn WalletProvider>,
    registry: Arc<ActionRegistry>,
    runner: ActionRunner,
    chain_id: Arc<watch::Sender<ChainId>>,
    notice: Arc<Mutex<Option<String>>>,
    last_run: Arc<Mutex<Option<RunInfo>>>,
}

impl ConsoleBinding {
    pub fn new(
        config: Arc<ConsoleConfig>,
        wallet: Arc<dyn WalletProvider>,
        registry: ActionRegistry,
    ) -> Self {
        let runner = ActionRunner::new(TranscriptStore::new(), config.runner);
        runner
            .store()
            .announce(welcome_message(wallet.is_connected()));
        let (chain_id, _) = watch::channel(wallet.chain_id());

        info!(
            actions = registry.len(),
            environment = %config.environment,
            reentry = ?config.runner.reentry,
            "console binding ready"
        );
        Self {
            config,
            wallet,
            registry: Arc::new(registry),
            runner,
            chain_id: Arc::new(chain_id),
            notice: Arc::new(Mutex::new(None)),
            last_run: Arc::new(Mutex::new(None)),
        }
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    pub fn view(&self) -> ConsoleView {
        let snapshot = self.runner.store().snapshot();
        ConsoleView {
            transcript_text: snapshot.text(),
            busy: snapshot.busy(),
            state: snapshot.state,
            chain_id: *self.chain_id.borrow(),
            wallet_connected: self.wallet.is_connected(),
            notice: lock(&self.notice).clone(),
            last_run: lock(&self.last_run).clone(),
        }
    }

    pub fn actions(&self) -> Vec<ActionButton> {
        let connected = self.wallet.is_connected();
        self.registry
            .iter()
            .filter(|spec| !spec.prohibited || self.config.show_prohibited_actions)
            .map(|spec| ActionButton {
                name: spec.name.clone(),
                label: spec.label.clone(),
                group: spec.group,
                enabled: connected || !spec.requires_connection,
                input_hint: spec.input_hint.clone(),
            })
            .collect()
    }

    /// Runs the named action. Only lookup and gating problems are errors; whatever
    /// the action itself does is reported through the outcome and the transcript.
    pub async fn trigger(
        &self,
        name: &str,
        input: Option<String>,
    ) -> Result<ActionOutcome, BindingError> {
        let spec = self
            .registry
            .get(name)
            .filter(|spec| !spec.prohibited || self.config.show_prohibited_actions)
            .cloned()
            .ok_or_else(|| BindingError::UnknownAction(name.to_string()))?;
        if spec.requires_connection && !self.wallet.is_connected() {
            return Err(BindingError::ActionDisabled {
                name: spec.name,
                reason: "wallet not connected".to_string(),
            });
        }

        let started_at = Utc::now();
        let wallet = Arc::clone(&self.wallet);
        let config = Arc::clone(&self.config);
        let outcome = self
            .runner
            .run(name, |scope| {
                spec.invoke(ActionContext {
                    wallet,
                    config,
                    scope,
                    input,
                })
            })
            .await;

        match &outcome {
            ActionOutcome::Rejected { running } => {
                *lock(&self.notice) = Some(format!(
                    "'{running}' is still running; wait for it to finish"
                ));
            }
            ActionOutcome::Superseded => {}
            ActionOutcome::Succeeded { .. } | ActionOutcome::Failed(_) => {
                *lock(&self.notice) = None;
                *lock(&self.last_run) = Some(RunInfo {
                    action: name.to_string(),
                    outcome: outcome.label(),
                    started_at,
                    finished_at: Utc::now(),
                });
                self.refresh_chain_id();
            }
        }
        Ok(outcome)
    }

    pub fn subscribe_transcript(&self) -> broadcast::Receiver<TranscriptEvent> {
        self.runner.store().subscribe()
    }

    pub fn watch_transcript(&self) -> watch::Receiver<TranscriptSnapshot> {
        self.runner.store().watch()
    }

    pub fn watch_chain_id(&self) -> watch::Receiver<ChainId> {
        self.chain_id.subscribe()
    }

    pub async fn network_options(&self) -> Result<Vec<NetworkConfig>, BindingError> {
        let all = self.wallet.networks().await?;
        Ok(networks::network_options(&all))
    }

    pub async fn select_network(&self, chain_id: ChainId) -> Result<(), BindingError> {
        self.wallet.set_default_chain_id(chain_id).await?;
        self.chain_id.send_replace(chain_id);
        info!(%chain_id, "default network selected");
        Ok(())
    }

    /// Mirrors provider events into the binding until the returned subscription is dropped.
    /// Must be called from within a tokio runtime.
    pub fn watch_wallet_events(&self) -> WalletEventSubscription {
        let mut events = self.wallet.subscribe_events();
        let chain_id = Arc::clone(&self.chain_id);
        let handle = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(WalletEvent::ChainChanged(id)) => {
                        info!(chain_id = %id, "wallet chain changed");
                        chain_id.send_replace(id);
                    }
                    Ok(WalletEvent::Connected { address, chain_id: id }) => {
                        info!(%address, chain_id = %id, "wallet connected");
                        chain_id.send_replace(id);
                    }
                    Ok(WalletEvent::Disconnected) => info!("wallet disconnected"),
                    Ok(WalletEvent::WindowOpened) => debug!("wallet window opened"),
                    Ok(WalletEvent::WindowClosed) => debug!("wallet window closed"),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "wallet event observer lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        WalletEventSubscription { handle }
    }

    fn refresh_chain_id(&self) {
        let current = self.wallet.chain_id();
        self.chain_id.send_if_modified(|shown| {
            let changed = *shown != current;
            *shown = current;
            changed
        });
    }
}

fn lock<T>(slot: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Observer registration on the provider's event stream; unregistered on drop.
pub struct WalletEventSubscription {
    handle: JoinHandle<()>,
}

impl WalletEventSubscription {
    pub fn is_active(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for WalletEventSubscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
#[path = "tests/binding_tests.rs"]
mod tests;
