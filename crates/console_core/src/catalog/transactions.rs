use alloy_primitives::U256;
use anyhow::{Context, Result};
use shared::{
    domain::{Address, ChainId},
    protocol::{ContractCall, Transaction, TransactionResponse},
};
use tracing::{info, warn};

use crate::{
    action::ActionContext,
    units::{parse_ether, parse_units, to_hex},
};

const WMATIC_POLYGON: &str = "0x0d500B1d8E8eF31E21C99d1Db9A6444d3ADf1270";
const DAI_POLYGON: &str = "0x8f3Cf7ad23Cd3CaDbD9735AFf958023239c6A063";
const USDC_POLYGON: &str = "0x2791bca1f2de4661ed88a30c99a7a9449aa84174";
const USDC_SEPOLIA: &str = "0x07865c6e87b9f70255377e024ace6630c1eaa37f";
const SKYWEAVER_COLLECTIBLES: &str = "0x631998e91476DA5B870D741192fc5Cbc55F5a52E";

const ZERO_HASH: &str = "0x0000000000000000000000000000000000000000000000000000000000000000";
const MAX_UINT256: &str = "0xffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff";
const TRANSFER_GAS_LIMIT: &str = "0x55555";
const ERC20_TRANSFER: &str = "transfer(address,uint256)";

fn transfer_to_self(to: &Address, wei: U256) -> Transaction {
    Transaction {
        to: to.clone(),
        value: Some(wei.to_string()),
        gas_limit: Some(TRANSFER_GAS_LIMIT.to_string()),
        ..Transaction::default()
    }
}

fn erc20_transfer(token: &str, recipient: &Address, amount: U256) -> Transaction {
    Transaction {
        to: Address::new(token),
        value: Some("0".to_string()),
        data: Some(ContractCall::new(
            ERC20_TRANSFER,
            [recipient.to_string(), to_hex(amount)],
        )),
        gas_limit: Some(TRANSFER_GAS_LIMIT.to_string()),
        ..Transaction::default()
    }
}

fn response_line(label: &str, response: &TransactionResponse) -> Result<String> {
    Ok(format!("{label}: {}", serde_json::to_string(response)?))
}

pub(super) async fn estimate_unwrap_gas(ctx: ActionContext) -> Result<String> {
    let withdraw = Transaction {
        to: Address::new(WMATIC_POLYGON),
        data: Some(ContractCall::new(
            "withdraw(uint256)",
            [parse_ether("1")?.to_string()],
        )),
        ..Transaction::default()
    };
    let estimate = ctx
        .wallet
        .estimate_gas(ctx.wallet.chain_id(), &withdraw)
        .await
        .context("gas estimation failed")?;
    Ok(format!(
        "estimated gas needed for wmatic withdrawal : {estimate}"
    ))
}

/// Sends two native transfers back to the connected account on `chain_id`.
pub(super) async fn send_funds(ctx: ActionContext, chain_id: ChainId) -> Result<String> {
    ctx.log(format!("Transfer txn on {chain_id} chainId"));
    let to = ctx.wallet.address()?;
    let batch = [
        transfer_to_self(&to, parse_ether("1.234")?),
        transfer_to_self(&to, parse_ether("0.4242")?),
    ];

    let before = ctx.wallet.balance(chain_id, &to).await?;
    ctx.log(format!("balance of {to}, before: {before}"));

    let response = ctx
        .wallet
        .send_transactions(chain_id, &batch)
        .await
        .with_context(|| format!("sending funds on chain {chain_id} failed"))?;
    info!(%chain_id, hash = %response.hash, "funds sent");
    ctx.log(response_line("txnResponse", &response)?);

    let after = ctx.wallet.balance(chain_id, &to).await?;
    Ok(format!("balance of {to}, after: {after}"))
}

pub(super) async fn send_on_l2(ctx: ActionContext) -> Result<String> {
    let target = if ctx.wallet.chain_id() == ChainId::ARBITRUM {
        ChainId::OPTIMISM
    } else {
        ChainId::ARBITRUM
    };
    send_funds(ctx, target).await
}

pub(super) async fn send_dai(ctx: ActionContext) -> Result<String> {
    let chain_id = ctx.wallet.chain_id();
    let to = ctx.wallet.address()?;
    let transfer = erc20_transfer(DAI_POLYGON, &to, parse_units("0.05", 18)?);
    let response = ctx
        .wallet
        .send_transactions(chain_id, &[transfer])
        .await
        .context("DAI transfer failed")?;
    response_line("txnResponse", &response)
}

pub(super) async fn send_sepolia_usdc(ctx: ActionContext) -> Result<String> {
    let to = ctx.wallet.address()?;
    let transfer = erc20_transfer(USDC_SEPOLIA, &to, parse_units("1", 1)?);
    let response = ctx
        .wallet
        .send_transactions(ChainId::SEPOLIA, &[transfer])
        .await
        .context("USDC transfer on Sepolia failed")?;
    response_line("txnResponse", &response)
}

pub(super) async fn read_token_contract(ctx: ActionContext) -> Result<String> {
    let usdc = Address::new(USDC_POLYGON);
    let symbol = ctx
        .wallet
        .call_contract(
            ChainId::POLYGON,
            &usdc,
            &ContractCall::new("symbol()", Vec::<String>::new()),
        )
        .await
        .context("token symbol read failed")?;
    ctx.log(format!("Token symbol: {symbol}"));

    let owner = ctx.wallet.address()?;
    let balance = ctx
        .wallet
        .call_contract(
            ChainId::POLYGON,
            &usdc,
            &ContractCall::new("balanceOf(address)", [owner.to_string()]),
        )
        .await
        .context("token balance read failed")?;
    Ok(format!("Token Balance: {balance}"))
}

pub(super) async fn fetch_token_balances(ctx: ActionContext) -> Result<String> {
    let account = ctx.wallet.address()?;
    let networks = ctx.wallet.networks().await?;
    let polygon = networks
        .iter()
        .find(|network| network.chain_id == ChainId::POLYGON)
        .context("Could not find Polygon network in networks list")?;
    if polygon.indexer_url.is_none() {
        warn!(chain_id = %polygon.chain_id, "polygon network has no indexer url");
    }

    let tokens = ctx
        .wallet
        .token_balances(ChainId::POLYGON, &account, None)
        .await
        .context("token balance lookup failed")?;
    ctx.log(format!(
        "tokens in your account: {}",
        serde_json::to_string(&tokens)?
    ));

    let collectibles = ctx
        .wallet
        .token_balances(
            ChainId::POLYGON,
            &account,
            Some(&Address::new(SKYWEAVER_COLLECTIBLES)),
        )
        .await
        .context("collectible balance lookup failed")?;
    Ok(format!(
        "skyweaver collectibles in your account: {}",
        serde_json::to_string(&collectibles)?
    ))
}

async fn send_to_self(
    ctx: ActionContext,
    build: impl FnOnce(Address) -> Transaction,
) -> Result<String> {
    let chain_id = ctx.wallet.chain_id();
    let transaction = build(ctx.wallet.address()?);
    warn!(
        %chain_id,
        to = %transaction.to,
        "sending wallet self-administration transaction"
    );
    let response = ctx
        .wallet
        .send_transactions(chain_id, &[transaction])
        .await
        .context("wallet transaction failed")?;
    response_line("response", &response)
}

pub(super) async fn update_implementation(ctx: ActionContext) -> Result<String> {
    send_to_self(ctx, |wallet| Transaction {
        to: wallet,
        data: Some(ContractCall::new(
            "updateImplementation(address)",
            [Address::ZERO],
        )),
        ..Transaction::default()
    })
    .await
}

pub(super) async fn update_image_hash(ctx: ActionContext) -> Result<String> {
    send_to_self(ctx, |wallet| Transaction {
        to: wallet,
        data: Some(ContractCall::new("updateImageHash(bytes32)", [ZERO_HASH])),
        ..Transaction::default()
    })
    .await
}

pub(super) async fn delegate_call(ctx: ActionContext) -> Result<String> {
    send_to_self(ctx, |wallet| Transaction {
        to: wallet,
        delegate_call: true,
        ..Transaction::default()
    })
    .await
}

pub(super) async fn add_hook(ctx: ActionContext) -> Result<String> {
    send_to_self(ctx, |wallet| Transaction {
        to: wallet,
        data: Some(ContractCall::new(
            "addHook(bytes4,address)",
            ["0x01234567", Address::ZERO],
        )),
        ..Transaction::default()
    })
    .await
}

pub(super) async fn set_extra_image_hash(ctx: ActionContext) -> Result<String> {
    send_to_self(ctx, |wallet| Transaction {
        to: wallet,
        data: Some(ContractCall::new(
            "setExtraImageHash(bytes32,uint256)",
            [ZERO_HASH, MAX_UINT256],
        )),
        ..Transaction::default()
    })
    .await
}
