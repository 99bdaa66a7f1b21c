//! In-memory wallet used by the demo surfaces and tests.
//!
//! Signatures are SHA-256 digests over the signer, chain and payload. They are
//! deterministic placeholders so the console flows can be exercised offline;
//! nothing here is a real signature scheme.

use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use alloy_primitives::U256;
use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use sha2::{Digest, Sha256};
use shared::{
    domain::{Address, ChainId, NetworkConfig, NetworkType},
    error::{WalletError, WalletResult},
    protocol::{
        AuthProof, ConnectDetails, ConnectOptions, ContractCall, MessagePayload,
        OpenWalletIntent, TokenBalance, Transaction, TransactionResponse, TypedData,
        TypedDataDomain, TypedDataField,
    },
};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::{WalletEvent, WalletProvider};

const BASE_TX_GAS: u64 = 21_000;
const CALLDATA_BYTE_GAS: u64 = 16;
const DEFAULT_EMAIL: &str = "demo@example.com";
pub const DEMO_ACCOUNT: &str = "0x8e3E38fe7367dd3b52D1e281E4e8400447C8d8B9";
const ONE_ETHER: u128 = 1_000_000_000_000_000_000;

struct KnownToken {
    chain_id: ChainId,
    contract: &'static str,
    symbol: &'static str,
    decimals: u8,
}

const KNOWN_TOKENS: &[KnownToken] = &[
    KnownToken {
        chain_id: ChainId::POLYGON,
        contract: "0x2791bca1f2de4661ed88a30c99a7a9449aa84174",
        symbol: "USDC",
        decimals: 6,
    },
    KnownToken {
        chain_id: ChainId::POLYGON,
        contract: "0x8f3cf7ad23cd3cadbd9735aff958023239c6a063",
        symbol: "DAI",
        decimals: 18,
    },
    KnownToken {
        chain_id: ChainId::SEPOLIA,
        contract: "0x07865c6e87b9f70255377e024ace6630c1eaa37f",
        symbol: "USDC",
        decimals: 6,
    },
    KnownToken {
        chain_id: ChainId::POLYGON,
        contract: "0x631998e91476da5b870d741192fc5cbc55f5a52e",
        symbol: "SWV",
        decimals: 0,
    },
];

fn known_token(chain_id: ChainId, contract: &Address) -> Option<&'static KnownToken> {
    KNOWN_TOKENS.iter().find(|token| {
        token.chain_id == chain_id && token.contract.eq_ignore_ascii_case(contract.as_str())
    })
}

fn network(
    chain_id: ChainId,
    name: &str,
    title: &str,
    network_type: NetworkType,
    deprecated: bool,
    indexer_url: Option<&str>,
) -> NetworkConfig {
    NetworkConfig {
        chain_id,
        name: name.to_string(),
        title: title.to_string(),
        network_type,
        deprecated,
        indexer_url: indexer_url.map(str::to_string),
        logo_uri: None,
    }
}

/// Network catalogue advertised by the simulated wallet, in no particular order.
pub fn default_networks() -> Vec<NetworkConfig> {
    use NetworkType::{Mainnet, Testnet};
    vec![
        network(
            ChainId::POLYGON,
            "polygon",
            "Polygon",
            Mainnet,
            false,
            Some("https://polygon-indexer.sequence.app"),
        ),
        network(
            ChainId::MAINNET,
            "mainnet",
            "Ethereum",
            Mainnet,
            false,
            Some("https://mainnet-indexer.sequence.app"),
        ),
        network(ChainId::ARBITRUM, "arbitrum", "Arbitrum One", Mainnet, false, None),
        network(ChainId::OPTIMISM, "optimism", "Optimism", Mainnet, false, None),
        network(ChainId::SEPOLIA, "sepolia", "Sepolia", Testnet, false, None),
        network(ChainId::GOERLI, "goerli", "Goerli", Testnet, true, None),
        network(ChainId::RINKEBY, "rinkeby", "Rinkeby", Testnet, false, None),
        network(ChainId::HARDHAT, "hardhat", "Hardhat", Testnet, false, None),
        network(ChainId::BASE_GOERLI, "base-goerli", "Base Goerli", Testnet, false, None),
    ]
}

struct SimulatedState {
    connected: bool,
    opened: bool,
    chain_id: ChainId,
    address: Address,
    email: Option<String>,
    reject_connect: bool,
    reject_signatures: bool,
    networks: Vec<NetworkConfig>,
    native_balances: HashMap<ChainId, U256>,
    token_balances: HashMap<(ChainId, String), U256>,
    sent_batches: u64,
}

pub struct SimulatedWallet {
    state: RwLock<SimulatedState>,
    events: broadcast::Sender<WalletEvent>,
}

impl SimulatedWallet {
    pub fn new(address: Address, chain_id: ChainId) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            state: RwLock::new(SimulatedState {
                connected: false,
                opened: false,
                chain_id,
                address,
                email: Some(DEFAULT_EMAIL.to_string()),
                reject_connect: false,
                reject_signatures: false,
                networks: default_networks(),
                native_balances: HashMap::new(),
                token_balances: HashMap::new(),
                sent_batches: 0,
            }),
            events,
        }
    }

    /// Wallet for the demo surfaces, funded on every chain the demo actions touch.
    pub fn demo(chain_id: ChainId) -> Self {
        let mut wallet = Self::new(Address::new(DEMO_ACCOUNT), chain_id);
        for chain in [
            ChainId::MAINNET,
            ChainId::POLYGON,
            ChainId::ARBITRUM,
            ChainId::OPTIMISM,
            ChainId::SEPOLIA,
        ] {
            wallet = wallet.with_native_balance(chain, 5 * ONE_ETHER);
        }
        for token in KNOWN_TOKENS {
            let amount = 250 * 10u128.pow(u32::from(token.decimals));
            let contract = Address::new(token.contract);
            wallet = wallet.with_token_balance(token.chain_id, &contract, amount);
        }
        wallet
    }

    pub fn with_native_balance(self, chain_id: ChainId, wei: u128) -> Self {
        self.write().native_balances.insert(chain_id, U256::from(wei));
        self
    }

    pub fn with_token_balance(
        self,
        chain_id: ChainId,
        contract: &Address,
        amount: u128,
    ) -> Self {
        self.write().token_balances.insert(
            (chain_id, contract.as_str().to_ascii_lowercase()),
            U256::from(amount),
        );
        self
    }

    pub fn with_email(self, email: Option<String>) -> Self {
        self.write().email = email;
        self
    }

    /// Every connect attempt reports `connected: false`, as when the user closes the prompt.
    pub fn rejecting_connections(self) -> Self {
        self.write().reject_connect = true;
        self
    }

    /// Signature checks answer `false`, as for a signer the verifier does not recognise.
    pub fn rejecting_signatures(self) -> Self {
        self.write().reject_signatures = true;
        self
    }

    pub fn connected(self) -> Self {
        self.write().connected = true;
        self
    }

    fn read(&self) -> RwLockReadGuard<'_, SimulatedState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SimulatedState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: WalletEvent) {
        // No subscribers is fine; the event is simply dropped.
        let _ = self.events.send(event);
    }

    fn require_connected(&self) -> WalletResult<Address> {
        let state = self.read();
        if !state.connected {
            return Err(WalletError::NotConnected);
        }
        Ok(state.address.clone())
    }

    fn require_chain(&self, chain_id: ChainId) -> WalletResult<()> {
        if self.read().networks.iter().any(|n| n.chain_id == chain_id) {
            Ok(())
        } else {
            Err(WalletError::UnsupportedChain(chain_id))
        }
    }

    fn digest(signer: &Address, chain_id: ChainId, payload: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(signer.as_str().to_ascii_lowercase().as_bytes());
        hasher.update(chain_id.0.to_be_bytes());
        hasher.update(payload);
        format!("0x{}", hex::encode(hasher.finalize()))
    }

    fn typed_data_bytes(typed_data: &TypedData) -> WalletResult<Vec<u8>> {
        serde_json::to_vec(typed_data)
            .map_err(|err| WalletError::InvalidRequest(format!("unserializable typed data: {err}")))
    }

    fn auth_proof(
        &self,
        address: &Address,
        chain_id: ChainId,
        app: &str,
    ) -> WalletResult<AuthProof> {
        let typed_data = TypedData {
            types: [(
                "Claims".to_string(),
                vec![
                    TypedDataField::new("app", "string"),
                    TypedDataField::new("wallet", "address"),
                ],
            )]
            .into_iter()
            .collect(),
            primary_type: "Claims".to_string(),
            domain: TypedDataDomain {
                name: "ETHAuth".to_string(),
                version: "1".to_string(),
                chain_id,
                verifying_contract: Address::zero(),
            },
            message: serde_json::json!({ "app": app, "wallet": address }),
        };
        let signature = Self::digest(address, chain_id, &Self::typed_data_bytes(&typed_data)?);
        let claims = URL_SAFE_NO_PAD.encode(typed_data.message.to_string());
        let wallet = address.as_str().to_ascii_lowercase();
        Ok(AuthProof {
            proof_string: format!("eth.{wallet}.{claims}.{signature}"),
            typed_data,
            signature,
        })
    }

    /// Decimal or `0x`-prefixed hex quantity.
    fn parse_amount(raw: &str) -> WalletResult<U256> {
        raw.parse::<U256>()
            .map_err(|_| WalletError::InvalidRequest(format!("invalid amount '{raw}'")))
    }

    fn apply_transaction(
        state: &mut SimulatedState,
        chain_id: ChainId,
        transaction: &Transaction,
    ) -> WalletResult<()> {
        if let Some(value) = &transaction.value {
            let value = Self::parse_amount(value)?;
            if !value.is_zero() && !transaction.to.same_as(&state.address) {
                let balance = state.native_balances.entry(chain_id).or_default();
                *balance = balance.checked_sub(value).ok_or_else(|| {
                    WalletError::InvalidRequest("insufficient native balance".to_string())
                })?;
            }
        }

        if let Some(call) = &transaction.data {
            if call.function_name() == "transfer" {
                let recipient = call.args.first().map(|a| Address::new(a.clone()));
                let amount = call.args.get(1).map(|a| Self::parse_amount(a)).transpose()?;
                if let (Some(recipient), Some(amount)) = (recipient, amount) {
                    if !recipient.same_as(&state.address) {
                        let key = (chain_id, transaction.to.as_str().to_ascii_lowercase());
                        let balance = state.token_balances.entry(key).or_default();
                        *balance = balance.checked_sub(amount).ok_or_else(|| {
                            WalletError::InvalidRequest("insufficient token balance".to_string())
                        })?;
                    }
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl WalletProvider for SimulatedWallet {
    async fn connect(&self, options: ConnectOptions) -> WalletResult<ConnectDetails> {
        let (address, chain_id, reject, stored_email) = {
            let state = self.read();
            (
                state.address.clone(),
                state.chain_id,
                state.reject_connect,
                state.email.clone(),
            )
        };

        if reject {
            return Ok(ConnectDetails {
                connected: false,
                chain_id: None,
                account_address: None,
                email: None,
                proof: None,
                error: Some("user closed the wallet window".to_string()),
            });
        }

        let email = options
            .settings
            .sign_in_with_email
            .clone()
            .or_else(|| options.ask_for_email.unwrap_or(false).then_some(stored_email).flatten());
        let proof = if options.authorize {
            Some(self.auth_proof(&address, chain_id, &options.app)?)
        } else {
            None
        };

        self.write().connected = true;
        info!(app = %options.app, %address, %chain_id, "simulated wallet connected");
        self.emit(WalletEvent::Connected {
            address: address.clone(),
            chain_id,
        });

        Ok(ConnectDetails {
            connected: true,
            chain_id: Some(chain_id),
            account_address: Some(address),
            email,
            proof,
            error: None,
        })
    }

    async fn disconnect(&self) -> WalletResult<()> {
        {
            let mut state = self.write();
            state.connected = false;
            state.opened = false;
        }
        self.emit(WalletEvent::Disconnected);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.read().connected
    }

    fn is_opened(&self) -> bool {
        self.read().opened
    }

    async fn open_wallet(&self, intent: Option<OpenWalletIntent>) -> WalletResult<()> {
        self.write().opened = true;
        let path = intent.as_ref().and_then(|i| i.path.as_deref());
        debug!(?path, "simulated wallet window opened");
        self.emit(WalletEvent::WindowOpened);
        Ok(())
    }

    async fn close_wallet(&self) -> WalletResult<()> {
        self.write().opened = false;
        self.emit(WalletEvent::WindowClosed);
        Ok(())
    }

    fn chain_id(&self) -> ChainId {
        self.read().chain_id
    }

    async fn set_default_chain_id(&self, chain_id: ChainId) -> WalletResult<()> {
        self.require_chain(chain_id)?;
        let changed = {
            let mut state = self.write();
            let changed = state.chain_id != chain_id;
            state.chain_id = chain_id;
            changed
        };
        if changed {
            self.emit(WalletEvent::ChainChanged(chain_id));
        }
        Ok(())
    }

    fn address(&self) -> WalletResult<Address> {
        self.require_connected()
    }

    async fn list_accounts(&self) -> WalletResult<Vec<Address>> {
        Ok(vec![self.require_connected()?])
    }

    async fn networks(&self) -> WalletResult<Vec<NetworkConfig>> {
        Ok(self.read().networks.clone())
    }

    async fn balance(&self, chain_id: ChainId, account: &Address) -> WalletResult<String> {
        self.require_chain(chain_id)?;
        let state = self.read();
        let balance = if account.same_as(&state.address) {
            state.native_balances.get(&chain_id).copied().unwrap_or_default()
        } else {
            U256::ZERO
        };
        Ok(balance.to_string())
    }

    async fn sign_message(
        &self,
        chain_id: ChainId,
        message: &MessagePayload,
    ) -> WalletResult<String> {
        let signer = self.require_connected()?;
        self.require_chain(chain_id)?;
        Ok(Self::digest(&signer, chain_id, &message.as_bytes()))
    }

    async fn sign_typed_data(
        &self,
        chain_id: ChainId,
        typed_data: &TypedData,
    ) -> WalletResult<String> {
        let signer = self.require_connected()?;
        self.require_chain(chain_id)?;
        Ok(Self::digest(
            &signer,
            chain_id,
            &Self::typed_data_bytes(typed_data)?,
        ))
    }

    async fn is_valid_message_signature(
        &self,
        address: &Address,
        message: &MessagePayload,
        signature: &str,
        chain_id: ChainId,
    ) -> WalletResult<bool> {
        if self.read().reject_signatures {
            return Ok(false);
        }
        Ok(Self::digest(address, chain_id, &message.as_bytes()) == signature)
    }

    async fn is_valid_typed_data_signature(
        &self,
        address: &Address,
        typed_data: &TypedData,
        signature: &str,
        chain_id: ChainId,
    ) -> WalletResult<bool> {
        if self.read().reject_signatures {
            return Ok(false);
        }
        let payload = Self::typed_data_bytes(typed_data)?;
        Ok(Self::digest(address, chain_id, &payload) == signature)
    }

    async fn is_valid_eth_auth_proof(
        &self,
        api_url: &str,
        chain_id: ChainId,
        address: &Address,
        proof_string: &str,
    ) -> WalletResult<bool> {
        if api_url.trim().is_empty() {
            return Err(WalletError::InvalidRequest(
                "auth proof check needs an API url".to_string(),
            ));
        }
        self.require_chain(chain_id)?;
        debug!(%api_url, %chain_id, "checking auth proof");

        // eth.<wallet>.<claims>.<signature>
        let mut parts = proof_string.splitn(4, '.');
        let (Some("eth"), Some(wallet), Some(claims), Some(_)) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Ok(false);
        };
        if !address.as_str().eq_ignore_ascii_case(wallet) {
            return Ok(false);
        }
        let app = URL_SAFE_NO_PAD
            .decode(claims)
            .ok()
            .and_then(|raw| serde_json::from_slice::<serde_json::Value>(&raw).ok())
            .and_then(|claims| claims.get("app")?.as_str().map(str::to_string));
        let Some(app) = app else {
            return Ok(false);
        };
        Ok(self.auth_proof(address, chain_id, &app)?.proof_string == proof_string)
    }

    async fn estimate_gas(
        &self,
        chain_id: ChainId,
        transaction: &Transaction,
    ) -> WalletResult<u64> {
        self.require_chain(chain_id)?;
        let calldata_len = transaction
            .data
            .as_ref()
            .map(|call| 4 + 32 * call.args.len() as u64)
            .unwrap_or_default();
        Ok(BASE_TX_GAS + calldata_len * CALLDATA_BYTE_GAS)
    }

    async fn send_transactions(
        &self,
        chain_id: ChainId,
        transactions: &[Transaction],
    ) -> WalletResult<TransactionResponse> {
        let from = self.require_connected()?;
        self.require_chain(chain_id)?;
        if transactions.is_empty() {
            return Err(WalletError::InvalidRequest(
                "transaction batch is empty".to_string(),
            ));
        }

        let payload = serde_json::to_vec(transactions)
            .map_err(|err| WalletError::InvalidRequest(err.to_string()))?;
        let nonce = {
            let mut state = self.write();
            let native_before = state.native_balances.clone();
            let tokens_before = state.token_balances.clone();
            for transaction in transactions {
                if let Err(err) = Self::apply_transaction(&mut state, chain_id, transaction) {
                    state.native_balances = native_before;
                    state.token_balances = tokens_before;
                    return Err(err);
                }
            }
            state.sent_batches += 1;
            state.sent_batches
        };

        let mut salted = payload;
        salted.extend_from_slice(&nonce.to_be_bytes());
        Ok(TransactionResponse {
            hash: Self::digest(&from, chain_id, &salted),
            chain_id,
            from,
            transaction_count: transactions.len(),
        })
    }

    async fn call_contract(
        &self,
        chain_id: ChainId,
        contract: &Address,
        call: &ContractCall,
    ) -> WalletResult<String> {
        self.require_chain(chain_id)?;
        let token = known_token(chain_id, contract).ok_or_else(|| {
            WalletError::InvalidRequest(format!("no contract at {contract} on chain {chain_id}"))
        })?;

        match call.function_name() {
            "symbol" => Ok(token.symbol.to_string()),
            "decimals" => Ok(token.decimals.to_string()),
            "balanceOf" => {
                let owner = call
                    .args
                    .first()
                    .map(|a| Address::new(a.clone()))
                    .ok_or_else(|| {
                        WalletError::InvalidRequest("balanceOf requires an owner".to_string())
                    })?;
                let state = self.read();
                let balance = if owner.same_as(&state.address) {
                    state
                        .token_balances
                        .get(&(chain_id, token.contract.to_string()))
                        .copied()
                        .unwrap_or_default()
                } else {
                    U256::ZERO
                };
                Ok(balance.to_string())
            }
            other => Err(WalletError::InvalidRequest(format!(
                "unsupported read call '{other}'"
            ))),
        }
    }

    async fn token_balances(
        &self,
        chain_id: ChainId,
        account: &Address,
        contract: Option<&Address>,
    ) -> WalletResult<Vec<TokenBalance>> {
        self.require_chain(chain_id)?;
        let state = self.read();
        if !account.same_as(&state.address) {
            return Ok(Vec::new());
        }

        let mut balances: Vec<TokenBalance> = state
            .token_balances
            .iter()
            .filter(|((chain, _), _)| *chain == chain_id)
            .filter(|((_, token), _)| {
                contract.map_or(true, |c| c.as_str().eq_ignore_ascii_case(token))
            })
            .map(|((_, token), amount)| {
                let token_address = Address::new(token.clone());
                TokenBalance {
                    symbol: known_token(chain_id, &token_address).map(|t| t.symbol.to_string()),
                    contract_address: token_address,
                    account_address: account.clone(),
                    balance: amount.to_string(),
                    token_id: None,
                }
            })
            .collect();
        balances.sort_by(|a, b| a.contract_address.cmp(&b.contract_address));
        Ok(balances)
    }

    fn subscribe_events(&self) -> broadcast::Receiver<WalletEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
#[path = "tests/simulated_tests.rs"]
mod tests;
