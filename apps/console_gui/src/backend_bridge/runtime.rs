//! Worker thread: owns a tokio runtime, runs commands against the binding and
//! streams view updates back to the UI.

use std::thread;

use console_core::{ActionOutcome, ConsoleBinding};
use crossbeam_channel::{Receiver, Sender, TrySendError};

use crate::{backend_bridge::commands::BackendCommand, controller::events::UiEvent};

pub fn launch(binding: ConsoleBinding, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(format!(
                    "backend worker startup failure: failed to build runtime: {err}"
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let _wallet_events = binding.watch_wallet_events();
            tokio::spawn(forward_view_updates(binding.clone(), ui_tx.clone()));
            push_networks(&binding, &ui_tx).await;
            let _ = ui_tx.try_send(UiEvent::Info("Backend worker ready".to_string()));

            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    BackendCommand::Trigger { name, input } => {
                        let binding = binding.clone();
                        let ui_tx = ui_tx.clone();
                        tokio::spawn(async move {
                            match binding.trigger(&name, input).await {
                                Ok(outcome) => {
                                    if let ActionOutcome::Rejected { running } = &outcome {
                                        tracing::warn!(
                                            action = %name,
                                            %running,
                                            "trigger rejected"
                                        );
                                    }
                                    let _ = ui_tx.try_send(UiEvent::ActionFinished {
                                        action: name,
                                        outcome: outcome.label(),
                                    });
                                }
                                Err(err) => {
                                    let _ = ui_tx.try_send(UiEvent::Error(err.to_string()));
                                }
                            }
                            let _ = ui_tx.try_send(UiEvent::View(binding.view()));
                            let _ = ui_tx.try_send(UiEvent::Actions(binding.actions()));
                        });
                    }
                    BackendCommand::SelectNetwork(chain_id) => {
                        if let Err(err) = binding.select_network(chain_id).await {
                            let _ = ui_tx.try_send(UiEvent::Error(err.to_string()));
                        }
                    }
                    BackendCommand::RefreshNetworks => push_networks(&binding, &ui_tx).await,
                }
            }
            tracing::info!("ui command channel closed; backend worker stopping");
        });
    });
}

async fn push_networks(binding: &ConsoleBinding, ui_tx: &Sender<UiEvent>) {
    match binding.network_options().await {
        Ok(networks) => {
            let _ = ui_tx.try_send(UiEvent::Networks(networks));
        }
        Err(err) => {
            let _ = ui_tx.try_send(UiEvent::Error(format!("failed to load networks: {err}")));
        }
    }
}

async fn forward_view_updates(binding: ConsoleBinding, ui_tx: Sender<UiEvent>) {
    let mut transcript = binding.watch_transcript();
    let mut chain_id = binding.watch_chain_id();
    let _ = ui_tx.try_send(UiEvent::View(binding.view()));
    let _ = ui_tx.try_send(UiEvent::Actions(binding.actions()));

    loop {
        tokio::select! {
            changed = transcript.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            changed = chain_id.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
        if let Err(TrySendError::Disconnected(_)) = ui_tx.try_send(UiEvent::View(binding.view())) {
            break;
        }
    }
}
