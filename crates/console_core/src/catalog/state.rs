use anyhow::{Context, Result};
use shared::protocol::{OpenWalletIntent, WalletSettings};

use super::DAPP_NAME;
use crate::action::ActionContext;

const ADD_FUNDS_PATH: &str = "wallet/add-funds";

pub(super) async fn open_wallet(ctx: ActionContext) -> Result<String> {
    ctx.wallet.open_wallet(None).await.context("open wallet failed")?;
    Ok(format!("isOpened?: {}", ctx.wallet.is_opened()))
}

pub(super) async fn open_wallet_with_settings(ctx: ActionContext) -> Result<String> {
    let intent = OpenWalletIntent {
        path: Some(ADD_FUNDS_PATH.to_string()),
        app: DAPP_NAME.to_string(),
        settings: WalletSettings {
            theme: Some("light".to_string()),
            included_payment_providers: vec!["moonpay".to_string(), "ramp".to_string()],
            default_funding_currency: Some("eth".to_string()),
            default_purchase_amount: Some(400),
            lock_funding_currency_to_default: Some(false),
            ..WalletSettings::default()
        },
    };
    ctx.wallet
        .open_wallet(Some(intent))
        .await
        .context("open wallet failed")?;
    Ok(format!("opened wallet at {ADD_FUNDS_PATH}"))
}

pub(super) async fn close_wallet(ctx: ActionContext) -> Result<String> {
    ctx.wallet.close_wallet().await.context("close wallet failed")?;
    Ok(format!("isOpened?: {}", ctx.wallet.is_opened()))
}

pub(super) async fn is_connected(ctx: ActionContext) -> Result<String> {
    Ok(format!("isConnected?: {}", ctx.wallet.is_connected()))
}

pub(super) async fn is_opened(ctx: ActionContext) -> Result<String> {
    Ok(format!("isOpened?: {}", ctx.wallet.is_opened()))
}

pub(super) async fn chain_id(ctx: ActionContext) -> Result<String> {
    let top = ctx.wallet.chain_id();
    ctx.log(format!("top chainId: {top}"));

    let networks = ctx.wallet.networks().await.context("network list unavailable")?;
    let provider = networks
        .iter()
        .find(|network| network.chain_id == top)
        .map(|network| network.chain_id)
        .with_context(|| format!("no provider configured for chain {top}"))?;
    ctx.log(format!("provider.getChainId(): {provider}"));

    // The signer belongs to the connected account.
    ctx.wallet.address().context("no signer available")?;
    Ok(format!("signer.getChainId(): {}", ctx.wallet.chain_id()))
}

pub(super) async fn networks(ctx: ActionContext) -> Result<String> {
    let networks = ctx.wallet.networks().await.context("network list unavailable")?;
    Ok(format!("networks: {}", serde_json::to_string_pretty(&networks)?))
}

pub(super) async fn accounts(ctx: ActionContext) -> Result<String> {
    let address = ctx.wallet.address()?;
    ctx.log(format!("getAddress(): {address}"));

    let accounts = ctx.wallet.list_accounts().await.context("account list unavailable")?;
    Ok(format!("accounts: {}", serde_json::to_string(&accounts)?))
}

pub(super) async fn balance(ctx: ActionContext) -> Result<String> {
    let chain_id = ctx.wallet.chain_id();
    let account = ctx.wallet.address()?;
    let first = ctx
        .wallet
        .balance(chain_id, &account)
        .await
        .with_context(|| format!("balance lookup on chain {chain_id} failed"))?;
    ctx.log(format!("balance check 1: {first}"));

    let accounts = ctx.wallet.list_accounts().await?;
    let signer = accounts.first().cloned().unwrap_or(account);
    let second = ctx.wallet.balance(chain_id, &signer).await?;
    Ok(format!("balance check 2: {second}"))
}
