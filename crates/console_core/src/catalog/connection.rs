use anyhow::{bail, Context, Result};
use shared::protocol::{ConnectOptions, WalletSettings};
use tracing::info;

use super::{default_connect_options, sanitize_email, welcome_message, DAPP_NAME};
use crate::action::ActionContext;

const BANNER_URL: &str = "/images/skyweaver-banner.png";
const BANNER_LARGE_URL: &str = "/images/skyweaver-banner-large.png";

pub(super) fn options_with_settings() -> ConnectOptions {
    ConnectOptions::for_app(DAPP_NAME)
        .authorized()
        .with_settings(WalletSettings {
            theme: Some("dark".to_string()),
            banner_url: Some(BANNER_LARGE_URL.to_string()),
            banner_size: Some("medium".to_string()),
            included_payment_providers: vec!["moonpay".to_string()],
            default_funding_currency: Some("matic".to_string()),
            default_purchase_amount: Some(111),
            ..WalletSettings::default()
        })
}

pub(super) fn options_with_google() -> ConnectOptions {
    ConnectOptions::for_app(DAPP_NAME)
        .authorized()
        .with_settings(WalletSettings {
            sign_in_with: Some("google".to_string()),
            theme: Some("dark".to_string()),
            banner_url: Some(BANNER_URL.to_string()),
            ..WalletSettings::default()
        })
}

pub(super) async fn connect(ctx: ActionContext, options: ConnectOptions) -> Result<String> {
    if ctx.wallet.is_connected() {
        return Ok("Wallet already connected!".to_string());
    }

    let options = options.merged_over(&default_connect_options());
    ctx.log("Connecting");
    let details = ctx
        .wallet
        .connect(options.clone())
        .await
        .context("wallet connect request failed")?;

    if options.authorize && details.connected {
        if let Some(proof) = &details.proof {
            let chain_id = details.chain_id.unwrap_or_else(|| ctx.wallet.chain_id());
            let address = match &details.account_address {
                Some(address) => address.clone(),
                None => ctx.wallet.address()?,
            };

            let api_valid = ctx
                .wallet
                .is_valid_eth_auth_proof(
                    &ctx.config.api_url,
                    chain_id,
                    &address,
                    &proof.proof_string,
                )
                .await
                .context("auth proof API check failed")?;
            ctx.log(format!("isValid (API)?: {api_valid}"));

            let is_valid = ctx
                .wallet
                .is_valid_typed_data_signature(
                    &address,
                    &proof.typed_data,
                    &proof.signature,
                    chain_id,
                )
                .await
                .context("auth proof verification failed")?;
            ctx.log(format!("connected using chainId: {chain_id}"));
            ctx.log(format!("isValid (client)?: {is_valid}"));
        }
    }

    if !details.connected {
        return Ok(format!(
            "Failed to connect wallet - {}",
            details.error.as_deref().unwrap_or("unknown error")
        ));
    }

    info!(app = %options.app, authorize = options.authorize, "wallet connected");
    ctx.log("Wallet connected!");
    Ok(format!(
        "shared email: {}",
        details.email.as_deref().unwrap_or("none")
    ))
}

pub(super) async fn connect_with_email(ctx: ActionContext) -> Result<String> {
    let raw = ctx.input.clone().unwrap_or_default();
    let Some(email) = sanitize_email(&raw) else {
        bail!("'{}' is not a valid email address", raw.trim());
    };

    let options = ConnectOptions::for_app(DAPP_NAME)
        .authorized()
        .with_settings(WalletSettings {
            sign_in_with_email: Some(email.to_string()),
            theme: Some("dark".to_string()),
            banner_url: Some(BANNER_URL.to_string()),
            ..WalletSettings::default()
        });
    connect(ctx, options).await
}

pub(super) async fn disconnect(ctx: ActionContext) -> Result<String> {
    ctx.wallet.disconnect().await.context("disconnect failed")?;
    info!("wallet disconnected");
    Ok(welcome_message(false).to_string())
}
