use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use console_core::{
    catalog::wallet_actions, load_config, ActionGroup, ActionOutcome, ConfigLayer,
    ConsoleBinding, ReentryPolicy,
};
use tracing_subscriber::EnvFilter;
use wallet_provider::SimulatedWallet;

#[derive(Parser, Debug)]
#[command(about = "Run demo dapp wallet actions and print the console transcript")]
struct Args {
    #[command(flatten)]
    config: ConfigArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(ClapArgs, Debug, Default)]
struct ConfigArgs {
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(long, global = true)]
    env: Option<String>,
    #[arg(long, global = true)]
    wallet_app_url: Option<String>,
    #[arg(long, global = true)]
    project_access_key: Option<String>,
    #[arg(long, global = true)]
    chain_id: Option<u64>,
    #[arg(long, global = true)]
    show_prohibited_actions: bool,
    #[arg(long, global = true)]
    reentry: Option<ReentryPolicy>,
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,
}

impl ConfigArgs {
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

#[derive(Subcommand, Debug)]
enum Command {
    /// List every action, grouped, with whether it can run right now.
    List,
    /// Run actions one after another, printing the transcript after each.
    Run {
        #[arg(required = true)]
        names: Vec<String>,
        /// Handed to every action that takes input (e.g. the email for connect_with_email).
        #[arg(long)]
        input: Option<String>,
    },
    /// Print the selectable networks.
    Networks,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let config = Arc::new(
        load_config(args.config.config.as_deref(), args.config.overrides())
            .context("failed to load console configuration")?,
    );
    let wallet = Arc::new(SimulatedWallet::demo(config.default_chain_id));
    let registry = wallet_actions(&config).context("failed to build the action catalog")?;
    let binding = ConsoleBinding::new(config, wallet, registry);

    match args.command {
        Command::List => print_actions(&binding),
        Command::Networks => {
            let networks = binding.network_options().await?;
            for network in networks {
                println!(
                    "{:>9}  {:<24} {:?}",
                    network.chain_id, network.title, network.network_type
                );
            }
        }
        Command::Run { names, input } => run_actions(&binding, &names, input).await?,
    }
    Ok(())
}

fn print_actions(binding: &ConsoleBinding) {
    let actions = binding.actions();
    for group in ActionGroup::ALL {
        let mut in_group = actions.iter().filter(|a| a.group == group).peekable();
        if in_group.peek().is_none() {
            continue;
        }
        println!("{}", group.title());
        for action in in_group {
            let marker = if action.enabled { ' ' } else { '-' };
            println!("  {marker} {:<28} {}", action.name, action.label);
        }
    }
}

async fn run_actions(
    binding: &ConsoleBinding,
    names: &[String],
    input: Option<String>,
) -> Result<()> {
    let mut failures = 0usize;
    for name in names {
        let takes_input = binding
            .actions()
            .iter()
            .any(|a| &a.name == name && a.input_hint.is_some());
        let outcome = binding
            .trigger(name, takes_input.then(|| input.clone()).flatten())
            .await
            .with_context(|| format!("cannot run '{name}'"))?;

        println!("=== {name} ({}) ===", outcome.label());
        println!("{}", binding.view().transcript_text);
        if let ActionOutcome::Failed(err) = &outcome {
            tracing::warn!(action = %name, error = %err, "action failed");
            failures += 1;
        }
    }
    if failures > 0 {
        bail!("{failures} of {} actions failed", names.len());
    }
    Ok(())
}
