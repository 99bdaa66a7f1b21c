//! The demo's wallet actions, registered in display order.

mod connection;
mod signing;
mod state;
mod transactions;

use std::sync::OnceLock;

use regex::Regex;
use shared::protocol::ConnectOptions;

use crate::{
    action::{ActionGroup, ActionRegistry, ActionSpec},
    config::ConsoleConfig,
    error::RegistryError,
};

pub const DAPP_NAME: &str = "Demo Dapp";
pub const CONNECTED_STATUS: &str = "Status: Wallet is connected :)";
pub const DISCONNECTED_STATUS: &str = "Status: Wallet not connected. Please connect wallet first.";

const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,6}$";

pub fn welcome_message(connected: bool) -> &'static str {
    if connected {
        CONNECTED_STATUS
    } else {
        DISCONNECTED_STATUS
    }
}

/// Trims `raw` and returns it if it looks like an email address.
pub fn sanitize_email(raw: &str) -> Option<&str> {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    let email = raw.trim();
    let pattern = EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).ok()).as_ref()?;
    pattern.is_match(email).then_some(email)
}

pub(crate) fn default_connect_options() -> ConnectOptions {
    ConnectOptions {
        app: DAPP_NAME.to_string(),
        ask_for_email: Some(true),
        ..ConnectOptions::default()
    }
}

/// Builds the full action catalog. Wallet self-administration actions are only
/// included when `show_prohibited_actions` is set.
pub fn wallet_actions(config: &ConsoleConfig) -> Result<ActionRegistry, RegistryError> {
    use ActionGroup::*;

    let mut registry = ActionRegistry::new();
    let mut specs = vec![
        ActionSpec::new("connect", "Connect", Connection, |ctx| {
            connection::connect(ctx, ConnectOptions::for_app("Demo dapp"))
        }),
        ActionSpec::new(
            "connect_and_auth",
            "Connect & Auth",
            Connection,
            |ctx| connection::connect(ctx, ConnectOptions::for_app(DAPP_NAME).authorized()),
        ),
        ActionSpec::new(
            "connect_with_settings",
            "Connect with Settings",
            Connection,
            |ctx| connection::connect(ctx, connection::options_with_settings()),
        ),
        ActionSpec::new(
            "connect_with_email",
            "Connect with Email",
            Connection,
            connection::connect_with_email,
        )
        .with_input("email address"),
        ActionSpec::new(
            "connect_with_google",
            "Connect with Google",
            Connection,
            |ctx| connection::connect(ctx, connection::options_with_google()),
        ),
        ActionSpec::new("disconnect", "Disconnect", Connection, connection::disconnect),
        ActionSpec::new("open_wallet", "Open Wallet", Basics, state::open_wallet)
            .requires_connection(),
        ActionSpec::new(
            "open_wallet_with_settings",
            "Open Wallet with Settings",
            Basics,
            state::open_wallet_with_settings,
        )
        .requires_connection(),
        ActionSpec::new("close_wallet", "Close Wallet", Basics, state::close_wallet)
            .requires_connection(),
        ActionSpec::new("is_connected", "Is Connected?", Basics, state::is_connected)
            .requires_connection(),
        ActionSpec::new("is_opened", "Is Opened?", Basics, state::is_opened)
            .requires_connection(),
        ActionSpec::new("chain_id", "ChainID", State, state::chain_id).requires_connection(),
        ActionSpec::new("networks", "Networks", State, state::networks).requires_connection(),
        ActionSpec::new("accounts", "Get Accounts", State, state::accounts)
            .requires_connection(),
        ActionSpec::new("balance", "Get Balance", State, state::balance).requires_connection(),
        ActionSpec::new("sign_message", "Sign Message", Signing, signing::sign_message)
            .requires_connection(),
        ActionSpec::new(
            "sign_message_hex",
            "Sign Message (Hex)",
            Signing,
            signing::sign_message_hex,
        )
        .requires_connection(),
        ActionSpec::new(
            "sign_message_bytes",
            "Sign Message (Bytes)",
            Signing,
            signing::sign_message_bytes,
        )
        .requires_connection(),
        ActionSpec::new(
            "sign_typed_data",
            "Sign TypedData",
            Signing,
            signing::sign_typed_data,
        )
        .requires_connection(),
        ActionSpec::new(
            "estimate_unwrap_gas",
            "Estimate Unwrap Gas",
            Simulation,
            transactions::estimate_unwrap_gas,
        )
        .requires_connection(),
        ActionSpec::new("send_funds", "Send funds", Transactions, |ctx| async move {
            let chain_id = ctx.wallet.chain_id();
            transactions::send_funds(ctx, chain_id).await
        })
        .requires_connection(),
        ActionSpec::new("send_on_l2", "Send on L2", Transactions, transactions::send_on_l2)
            .requires_connection(),
        ActionSpec::new("send_dai", "Send DAI", Transactions, transactions::send_dai)
            .requires_connection(),
        ActionSpec::new(
            "send_sepolia_usdc",
            "Send USDC on Sepolia",
            Transactions,
            transactions::send_sepolia_usdc,
        )
        .requires_connection(),
        ActionSpec::new(
            "read_token_contract",
            "Read Symbol and Balance",
            Various,
            transactions::read_token_contract,
        )
        .requires_connection(),
        ActionSpec::new(
            "fetch_token_balances",
            "Fetch Token Balances",
            Various,
            transactions::fetch_token_balances,
        )
        .requires_connection(),
    ];

    if config.show_prohibited_actions {
        specs.extend([
            ActionSpec::new(
                "update_implementation",
                "Update Implementation",
                Prohibited,
                transactions::update_implementation,
            ),
            ActionSpec::new(
                "update_image_hash",
                "Update Image Hash",
                Prohibited,
                transactions::update_image_hash,
            ),
            ActionSpec::new(
                "delegate_call",
                "Delegate Call",
                Prohibited,
                transactions::delegate_call,
            ),
            ActionSpec::new("add_hook", "Add Hook", Prohibited, transactions::add_hook),
            ActionSpec::new(
                "set_extra_image_hash",
                "Set Extra Image Hash",
                Prohibited,
                transactions::set_extra_image_hash,
            ),
        ]);
    }

    for spec in specs {
        let spec = if spec.prohibited {
            spec.requires_connection()
        } else {
            spec
        };
        registry.register(spec)?;
    }
    tracing::debug!(actions = registry.len(), "wallet action catalog built");
    Ok(registry)
}

#[cfg(test)]
#[path = "../tests/catalog_tests.rs"]
mod tests;
