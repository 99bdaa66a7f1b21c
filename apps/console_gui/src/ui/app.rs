//! Console window: network selector, grouped action buttons and the transcript panel.

use std::time::Duration;

use arboard::Clipboard;
use console_core::{ActionButton, ActionGroup, ConsoleView};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::domain::{ChainId, NetworkConfig};

use crate::{
    backend_bridge::commands::BackendCommand,
    controller::{events::UiEvent, orchestration::dispatch_backend_command},
};

/// Shown in the header; fixed for the lifetime of the window.
pub struct StartupConfig {
    pub environment: String,
    pub wallet_app_url: String,
    pub project_access_key: String,
    pub is_custom: bool,
}

pub struct ConsoleGuiApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    startup: StartupConfig,
    view: Option<ConsoleView>,
    actions: Vec<ActionButton>,
    networks: Vec<NetworkConfig>,
    email_input: String,
    show_email_prompt: bool,
    email_warning: bool,
    status: String,
}

impl ConsoleGuiApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        startup: StartupConfig,
    ) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            startup,
            view: None,
            actions: Vec::new(),
            networks: Vec::new(),
            email_input: String::new(),
            show_email_prompt: false,
            email_warning: false,
            status: "Starting...".to_string(),
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => self.status = message,
                UiEvent::View(view) => {
                    if let Some(notice) = &view.notice {
                        self.status = notice.clone();
                    }
                    self.view = Some(view);
                }
                UiEvent::Actions(actions) => self.actions = actions,
                UiEvent::Networks(networks) => self.networks = networks,
                UiEvent::ActionFinished { action, outcome } => {
                    self.status = format!("{action}: {outcome}");
                }
                UiEvent::Error(message) => {
                    tracing::warn!(error = %message, "backend reported an error");
                    self.status = message;
                }
            }
        }
    }

    fn trigger(&mut self, name: &str, input: Option<String>) {
        dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::Trigger {
                name: name.to_string(),
                input,
            },
            &mut self.status,
        );
    }

    fn show_header(&mut self, ui: &mut egui::Ui) {
        ui.heading("Demo Dapp");
        ui.label("A console for exercising wallet connect, signing and transaction flows.");
        ui.separator();

        egui::Grid::new("environment_grid")
            .num_columns(2)
            .spacing([12.0, 4.0])
            .show(ui, |ui| {
                ui.label("Environment");
                let environment = if self.startup.is_custom {
                    format!("{} (custom)", self.startup.environment)
                } else {
                    self.startup.environment.clone()
                };
                ui.label(environment);
                ui.end_row();

                ui.label("Wallet URL");
                ui.hyperlink(&self.startup.wallet_app_url);
                ui.end_row();

                ui.label("Project Access Key");
                ui.monospace(self.startup.project_access_key.as_str());
                ui.end_row();
            });
        ui.separator();
        self.show_network_selector(ui);
    }

    fn show_network_selector(&mut self, ui: &mut egui::Ui) {
        let current = self.view.as_ref().map(|view| view.chain_id);
        let selected_text = current
            .and_then(|id| self.networks.iter().find(|n| n.chain_id == id))
            .map(|network| network.title.clone())
            .or_else(|| current.map(|id| format!("chain {id}")))
            .unwrap_or_else(|| "loading...".to_string());

        let mut picked: Option<ChainId> = None;
        ui.horizontal(|ui| {
            ui.label("Network");
            egui::ComboBox::from_id_salt("network_selector")
                .selected_text(selected_text)
                .show_ui(ui, |ui| {
                    for network in &self.networks {
                        let is_current = Some(network.chain_id) == current;
                        let label = ui.selectable_label(is_current, network.title.as_str());
                        if label.clicked() && !is_current {
                            picked = Some(network.chain_id);
                        }
                    }
                });
            if ui.small_button("⟳").on_hover_text("Reload networks").clicked() {
                dispatch_backend_command(
                    &self.cmd_tx,
                    BackendCommand::RefreshNetworks,
                    &mut self.status,
                );
            }
        });

        if let Some(chain_id) = picked {
            dispatch_backend_command(
                &self.cmd_tx,
                BackendCommand::SelectNetwork(chain_id),
                &mut self.status,
            );
        }
    }

    fn show_action_groups(&mut self, ui: &mut egui::Ui) {
        let mut clicked: Option<ActionButton> = None;
        for group in ActionGroup::ALL {
            let buttons: Vec<&ActionButton> =
                self.actions.iter().filter(|b| b.group == group).collect();
            if buttons.is_empty() {
                continue;
            }
            let title = if group == ActionGroup::Prohibited {
                format!("{} - FOR TESTING ONLY! DO NOT CONFIRM!", group.title())
            } else {
                group.title().to_string()
            };
            egui::CollapsingHeader::new(title)
                .default_open(true)
                .show(ui, |ui| {
                    ui.horizontal_wrapped(|ui| {
                        for button in buttons {
                            let widget = egui::Button::new(button.label.as_str());
                            if ui.add_enabled(button.enabled, widget).clicked() {
                                clicked = Some(button.clone());
                            }
                        }
                    });
                });
        }

        if let Some(button) = clicked {
            if button.input_hint.is_some() {
                self.show_email_prompt = true;
                self.email_warning = false;
            } else {
                self.trigger(&button.name, None);
            }
        }
    }

    fn show_email_prompt(&mut self, ctx: &egui::Context) {
        if !self.show_email_prompt {
            return;
        }
        let mut open = true;
        let mut submit = false;
        egui::Window::new("Connect with Email")
            .collapsible(false)
            .resizable(false)
            .open(&mut open)
            .show(ctx, |ui| {
                ui.label("Please provide an email address");
                let response = ui.text_edit_singleline(&mut self.email_input);
                if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    submit = true;
                }
                if self.email_warning {
                    ui.colored_label(egui::Color32::YELLOW, "Invalid email address");
                }
                if ui.button("Login").clicked() {
                    submit = true;
                }
            });

        if submit {
            if console_core::catalog::sanitize_email(&self.email_input).is_some() {
                let email = std::mem::take(&mut self.email_input);
                self.trigger("connect_with_email", Some(email));
                self.show_email_prompt = false;
            } else {
                self.email_warning = true;
            }
        }
        if !open {
            self.show_email_prompt = false;
        }
    }

    fn show_transcript(&mut self, ui: &mut egui::Ui) {
        let (text, busy) = self
            .view
            .as_ref()
            .map(|view| (view.transcript_text.clone(), view.busy))
            .unwrap_or_default();

        ui.horizontal(|ui| {
            ui.strong("Console");
            if busy {
                ui.spinner();
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.add_enabled(!text.is_empty(), egui::Button::new("Copy")).clicked() {
                    let copied = Clipboard::new()
                        .and_then(|mut clipboard| clipboard.set_text(text.clone()));
                    self.status = match copied {
                        Ok(()) => "Console output copied to clipboard".to_string(),
                        Err(err) => format!("Clipboard unavailable: {err}"),
                    };
                }
            });
        });

        egui::ScrollArea::vertical()
            .stick_to_bottom(true)
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.add(
                    egui::Label::new(egui::RichText::new(text).monospace())
                        .wrap()
                        .selectable(true),
                );
            });
    }
}

impl eframe::App for ConsoleGuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let connected = self.view.as_ref().is_some_and(|view| view.wallet_connected);
                ui.label(if connected { "● connected" } else { "○ disconnected" });
                ui.separator();
                ui.label(self.status.as_str());
            });
        });

        egui::SidePanel::right("console_panel")
            .resizable(true)
            .default_width(460.0)
            .show(ctx, |ui| self.show_transcript(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                self.show_header(ui);
                ui.separator();
                self.show_action_groups(ui);
            });
        });

        self.show_email_prompt(ctx);

        let busy = self.view.as_ref().is_some_and(|view| view.busy);
        ctx.request_repaint_after(if busy {
            Duration::from_millis(16)
        } else {
            Duration::from_millis(100)
        });
    }
}
