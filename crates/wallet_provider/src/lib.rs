use async_trait::async_trait;
use shared::{
    domain::{Address, ChainId, NetworkConfig},
    error::{WalletError, WalletResult},
    protocol::{
        ConnectDetails, ConnectOptions, ContractCall, MessagePayload, OpenWalletIntent,
        TokenBalance, Transaction, TransactionResponse, TypedData,
    },
};
use tokio::sync::broadcast;

mod simulated;
pub use simulated::{default_networks, SimulatedWallet, DEMO_ACCOUNT};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    Connected { address: Address, chain_id: ChainId },
    Disconnected,
    ChainChanged(ChainId),
    WindowOpened,
    WindowClosed,
}

/// Contract of the external wallet SDK as consumed by the console.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    async fn connect(&self, options: ConnectOptions) -> WalletResult<ConnectDetails>;
    async fn disconnect(&self) -> WalletResult<()>;
    fn is_connected(&self) -> bool;
    fn is_opened(&self) -> bool;
    async fn open_wallet(&self, intent: Option<OpenWalletIntent>) -> WalletResult<()>;
    async fn close_wallet(&self) -> WalletResult<()>;
    fn chain_id(&self) -> ChainId;
    async fn set_default_chain_id(&self, chain_id: ChainId) -> WalletResult<()>;
    fn address(&self) -> WalletResult<Address>;
    async fn list_accounts(&self) -> WalletResult<Vec<Address>>;
    async fn networks(&self) -> WalletResult<Vec<NetworkConfig>>;
    async fn balance(&self, chain_id: ChainId, account: &Address) -> WalletResult<String>;
    async fn sign_message(
        &self,
        chain_id: ChainId,
        message: &MessagePayload,
    ) -> WalletResult<String>;
    async fn sign_typed_data(&self, chain_id: ChainId, typed_data: &TypedData)
        -> WalletResult<String>;
    async fn is_valid_message_signature(
        &self,
        address: &Address,
        message: &MessagePayload,
        signature: &str,
        chain_id: ChainId,
    ) -> WalletResult<bool>;
    async fn is_valid_typed_data_signature(
        &self,
        address: &Address,
        typed_data: &TypedData,
        signature: &str,
        chain_id: ChainId,
    ) -> WalletResult<bool>;
    /// Asks the wallet API at `api_url` whether `proof_string` is a valid
    /// ETHAuth proof for `address` on `chain_id`.
    async fn is_valid_eth_auth_proof(
        &self,
        api_url: &str,
        chain_id: ChainId,
        address: &Address,
        proof_string: &str,
    ) -> WalletResult<bool>;
    async fn estimate_gas(&self, chain_id: ChainId, transaction: &Transaction)
        -> WalletResult<u64>;
    async fn send_transactions(
        &self,
        chain_id: ChainId,
        transactions: &[Transaction],
    ) -> WalletResult<TransactionResponse>;
    async fn call_contract(
        &self,
        chain_id: ChainId,
        contract: &Address,
        call: &ContractCall,
    ) -> WalletResult<String>;
    async fn token_balances(
        &self,
        chain_id: ChainId,
        account: &Address,
        contract: Option<&Address>,
    ) -> WalletResult<Vec<TokenBalance>>;
    fn subscribe_events(&self) -> broadcast::Receiver<WalletEvent>;
}

/// Stand-in used when no wallet SDK is configured; every request fails.
pub struct MissingWalletProvider {
    events: broadcast::Sender<WalletEvent>,
}

impl MissingWalletProvider {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        Self { events }
    }

    fn unavailable<T>(&self) -> WalletResult<T> {
        Err(WalletError::Provider(
            "no wallet provider configured".to_string(),
        ))
    }
}

impl Default for MissingWalletProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WalletProvider for MissingWalletProvider {
    async fn connect(&self, _options: ConnectOptions) -> WalletResult<ConnectDetails> {
        self.unavailable()
    }

    async fn disconnect(&self) -> WalletResult<()> {
        Ok(())
    }

    fn is_connected(&self) -> bool {
        false
    }

    fn is_opened(&self) -> bool {
        false
    }

    async fn open_wallet(&self, _intent: Option<OpenWalletIntent>) -> WalletResult<()> {
        self.unavailable()
    }

    async fn close_wallet(&self) -> WalletResult<()> {
        Ok(())
    }

    fn chain_id(&self) -> ChainId {
        ChainId::MAINNET
    }

    async fn set_default_chain_id(&self, chain_id: ChainId) -> WalletResult<()> {
        Err(WalletError::UnsupportedChain(chain_id))
    }

    fn address(&self) -> WalletResult<Address> {
        Err(WalletError::NotConnected)
    }

    async fn list_accounts(&self) -> WalletResult<Vec<Address>> {
        Ok(Vec::new())
    }

    async fn networks(&self) -> WalletResult<Vec<NetworkConfig>> {
        Ok(Vec::new())
    }

    async fn balance(&self, _chain_id: ChainId, _account: &Address) -> WalletResult<String> {
        self.unavailable()
    }

    async fn sign_message(
        &self,
        _chain_id: ChainId,
        _message: &MessagePayload,
    ) -> WalletResult<String> {
        Err(WalletError::NotConnected)
    }

    async fn sign_typed_data(
        &self,
        _chain_id: ChainId,
        _typed_data: &TypedData,
    ) -> WalletResult<String> {
        Err(WalletError::NotConnected)
    }

    async fn is_valid_message_signature(
        &self,
        _address: &Address,
        _message: &MessagePayload,
        _signature: &str,
        _chain_id: ChainId,
    ) -> WalletResult<bool> {
        self.unavailable()
    }

    async fn is_valid_typed_data_signature(
        &self,
        _address: &Address,
        _typed_data: &TypedData,
        _signature: &str,
        _chain_id: ChainId,
    ) -> WalletResult<bool> {
        self.unavailable()
    }

    async fn is_valid_eth_auth_proof(
        &self,
        _api_url: &str,
        _chain_id: ChainId,
        _address: &Address,
        _proof_string: &str,
    ) -> WalletResult<bool> {
        self.unavailable()
    }

    async fn estimate_gas(
        &self,
        _chain_id: ChainId,
        _transaction: &Transaction,
    ) -> WalletResult<u64> {
        self.unavailable()
    }

    async fn send_transactions(
        &self,
        _chain_id: ChainId,
        _transactions: &[Transaction],
    ) -> WalletResult<TransactionResponse> {
        Err(WalletError::NotConnected)
    }

    async fn call_contract(
        &self,
        _chain_id: ChainId,
        _contract: &Address,
        _call: &ContractCall,
    ) -> WalletResult<String> {
        self.unavailable()
    }

    async fn token_balances(
        &self,
        _chain_id: ChainId,
        _account: &Address,
        _contract: Option<&Address>,
    ) -> WalletResult<Vec<TokenBalance>> {
        self.unavailable()
    }

    fn subscribe_events(&self) -> broadcast::Receiver<WalletEvent> {
        self.events.subscribe()
    }
}
