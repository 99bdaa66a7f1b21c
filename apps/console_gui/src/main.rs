use std::{path::PathBuf, sync::Arc};

mod backend_bridge;
mod controller;
mod ui;

use anyhow::Context;
use clap::Parser;
use console_core::{
    catalog::wallet_actions, load_config, ConfigLayer, ConsoleBinding, ReentryPolicy,
};
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;
use wallet_provider::SimulatedWallet;

use crate::{
    backend_bridge::commands::BackendCommand,
    controller::events::UiEvent,
    ui::{ConsoleGuiApp, StartupConfig},
};

#[derive(Parser, Debug)]
#[command(about = "Desktop console for the demo wallet dapp")]
struct Args {
    /// Path to a console.toml; defaults to ./console.toml or the user config dir.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Environment preset: production, development, local or custom.
    #[arg(long)]
    env: Option<String>,
    #[arg(long)]
    wallet_app_url: Option<String>,
    #[arg(long)]
    project_access_key: Option<String>,
    #[arg(long)]
    chain_id: Option<u64>,
    #[arg(long)]
    show_prohibited_actions: bool,
    /// reject or supersede
    #[arg(long)]
    reentry: Option<ReentryPolicy>,
    /// Per-action timeout in seconds; 0 disables it.
    #[arg(long)]
    timeout_secs: Option<u64>,
}

impl Args {
    fn overrides(&self) -> ConfigLayer {
        ConfigLayer {
            env: self.env.clone(),
            wallet_app_url: self.wallet_app_url.clone(),
            project_access_key: self.project_access_key.clone(),
            default_chain_id: self.chain_id,
            show_prohibited_actions: self.show_prohibited_actions.then_some(true),
            action_timeout_secs: self.timeout_secs,
            reentry_policy: self.reentry,
            ..ConfigLayer::default()
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let config = Arc::new(
        load_config(args.config.as_deref(), args.overrides())
            .context("failed to load console configuration")?,
    );
    let wallet = Arc::new(SimulatedWallet::demo(config.default_chain_id));
    let registry = wallet_actions(&config).context("failed to build the action catalog")?;
    let binding = ConsoleBinding::new(config.clone(), wallet, registry);

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    backend_bridge::runtime::launch(binding, cmd_rx, ui_tx);

    let startup = StartupConfig {
        environment: config.environment.clone(),
        wallet_app_url: config.wallet_app_url.clone(),
        project_access_key: config.project_access_key.clone(),
        is_custom: config.is_custom,
    };
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Demo Dapp Console")
            .with_inner_size([1180.0, 760.0])
            .with_min_inner_size([820.0, 520.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Demo Dapp Console",
        options,
        Box::new(|_cc| Ok(Box::new(ConsoleGuiApp::new(cmd_tx, ui_rx, startup)))),
    )
    .map_err(|err| anyhow::anyhow!("console window failed: {err}"))
}
