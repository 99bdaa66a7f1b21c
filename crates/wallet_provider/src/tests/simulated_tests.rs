use super::*;

const ACCOUNT: &str = "0x1111111111111111111111111111111111111111";
const OTHER: &str = "0x2222222222222222222222222222222222222222";

fn wallet() -> SimulatedWallet {
    SimulatedWallet::new(Address::new(ACCOUNT), ChainId::POLYGON)
}

#[tokio::test]
async fn connect_reports_account_and_emits_event() {
    let wallet = wallet();
    let mut events = wallet.subscribe_events();

    let details = wallet
        .connect(ConnectOptions::for_app("Demo Dapp"))
        .await
        .expect("connect");

    assert!(details.connected);
    assert_eq!(details.account_address, Some(Address::new(ACCOUNT)));
    assert_eq!(details.chain_id, Some(ChainId::POLYGON));
    assert!(details.proof.is_none());
    assert!(wallet.is_connected());
    assert_eq!(
        events.recv().await.expect("event"),
        WalletEvent::Connected {
            address: Address::new(ACCOUNT),
            chain_id: ChainId::POLYGON,
        }
    );
}

#[tokio::test]
async fn authorized_connect_produces_verifiable_proof() {
    let wallet = wallet();
    let details = wallet
        .connect(ConnectOptions::for_app("Demo Dapp").authorized())
        .await
        .expect("connect");

    let proof = details.proof.expect("proof");
    assert!(proof.proof_string.starts_with("eth.0x1111"));
    let valid = wallet
        .is_valid_typed_data_signature(
            &Address::new(ACCOUNT),
            &proof.typed_data,
            &proof.signature,
            ChainId::POLYGON,
        )
        .await
        .expect("verify");
    assert!(valid);
}

#[tokio::test]
async fn rejecting_wallet_reports_not_connected() {
    let wallet = wallet().rejecting_connections();
    let details = wallet
        .connect(ConnectOptions::for_app("Demo Dapp"))
        .await
        .expect("connect");

    assert!(!details.connected);
    assert!(details.error.is_some());
    assert!(!wallet.is_connected());
}

#[tokio::test]
async fn signing_requires_connection() {
    let wallet = wallet();
    let err = wallet
        .sign_message(ChainId::POLYGON, &MessagePayload::Text("hi".to_string()))
        .await
        .expect_err("not connected");
    assert_eq!(err, WalletError::NotConnected);
}

#[tokio::test]
async fn message_signature_verifies_only_for_signer_and_payload() {
    let wallet = wallet().connected();
    let message = MessagePayload::Text("Hello, world!".to_string());
    let signature = wallet
        .sign_message(ChainId::POLYGON, &message)
        .await
        .expect("sign");

    assert!(wallet
        .is_valid_message_signature(
            &Address::new(ACCOUNT),
            &message,
            &signature,
            ChainId::POLYGON,
        )
        .await
        .expect("verify"));
    assert!(!wallet
        .is_valid_message_signature(&Address::new(OTHER), &message, &signature, ChainId::POLYGON)
        .await
        .expect("verify"));
    assert!(!wallet
        .is_valid_message_signature(
            &Address::new(ACCOUNT),
            &MessagePayload::Text("tampered".to_string()),
            &signature,
            ChainId::POLYGON
        )
        .await
        .expect("verify"));
}

#[tokio::test]
async fn set_default_chain_emits_change_once() {
    let wallet = wallet();
    let mut events = wallet.subscribe_events();

    wallet
        .set_default_chain_id(ChainId::ARBITRUM)
        .await
        .expect("switch");
    wallet
        .set_default_chain_id(ChainId::ARBITRUM)
        .await
        .expect("same chain");

    assert_eq!(wallet.chain_id(), ChainId::ARBITRUM);
    assert_eq!(
        events.recv().await.expect("event"),
        WalletEvent::ChainChanged(ChainId::ARBITRUM)
    );
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn unknown_chain_is_rejected() {
    let wallet = wallet();
    let err = wallet
        .set_default_chain_id(ChainId(999_999))
        .await
        .expect_err("unsupported");
    assert_eq!(err, WalletError::UnsupportedChain(ChainId(999_999)));
}

#[tokio::test]
async fn self_transfer_keeps_balance_and_foreign_transfer_debits() {
    let wallet = wallet()
        .connected()
        .with_native_balance(ChainId::POLYGON, 5_000);

    let to_self = Transaction {
        to: Address::new(ACCOUNT),
        value: Some("1000".to_string()),
        ..Transaction::default()
    };
    let response = wallet
        .send_transactions(ChainId::POLYGON, &[to_self])
        .await
        .expect("send");
    assert_eq!(response.transaction_count, 1);
    assert_eq!(
        wallet
            .balance(ChainId::POLYGON, &Address::new(ACCOUNT))
            .await
            .expect("balance"),
        "5000"
    );

    let to_other = Transaction {
        to: Address::new(OTHER),
        value: Some("0x3e8".to_string()),
        ..Transaction::default()
    };
    wallet
        .send_transactions(ChainId::POLYGON, &[to_other])
        .await
        .expect("send");
    assert_eq!(
        wallet
            .balance(ChainId::POLYGON, &Address::new(ACCOUNT))
            .await
            .expect("balance"),
        "4000"
    );
}

#[tokio::test]
async fn failed_batch_leaves_balances_untouched() {
    let wallet = wallet()
        .connected()
        .with_native_balance(ChainId::POLYGON, 100);

    let spend = |value: &str| Transaction {
        to: Address::new(OTHER),
        value: Some(value.to_string()),
        ..Transaction::default()
    };
    let err = wallet
        .send_transactions(ChainId::POLYGON, &[spend("60"), spend("60")])
        .await
        .expect_err("overdraft");

    assert!(matches!(err, WalletError::InvalidRequest(_)));
    assert_eq!(
        wallet
            .balance(ChainId::POLYGON, &Address::new(ACCOUNT))
            .await
            .expect("balance"),
        "100"
    );
}

#[tokio::test]
async fn token_reads_resolve_known_contracts() {
    let usdc = Address::new("0x2791bca1f2de4661ed88a30c99a7a9449aa84174");
    let wallet = wallet().with_token_balance(ChainId::POLYGON, &usdc, 42);

    let symbol = wallet
        .call_contract(
            ChainId::POLYGON,
            &usdc,
            &ContractCall::new("symbol()", Vec::<String>::new()),
        )
        .await
        .expect("symbol");
    let balance = wallet
        .call_contract(
            ChainId::POLYGON,
            &usdc,
            &ContractCall::new("balanceOf(address)", [ACCOUNT]),
        )
        .await
        .expect("balance");

    assert_eq!(symbol, "USDC");
    assert_eq!(balance, "42");

    let balances = wallet
        .token_balances(ChainId::POLYGON, &Address::new(ACCOUNT), None)
        .await
        .expect("balances");
    assert_eq!(balances.len(), 1);
    assert_eq!(balances[0].symbol.as_deref(), Some("USDC"));
}

#[tokio::test]
async fn missing_provider_fails_every_request() {
    let provider = crate::MissingWalletProvider::new();
    assert!(!provider.is_connected());
    assert!(provider
        .connect(ConnectOptions::for_app("Demo Dapp"))
        .await
        .is_err());
    assert_eq!(provider.address(), Err(WalletError::NotConnected));
}

#[tokio::test]
async fn demo_wallet_is_funded_for_every_flow() {
    let wallet = SimulatedWallet::demo(ChainId::MAINNET).connected();
    let account = Address::new(crate::DEMO_ACCOUNT);

    assert_eq!(
        wallet.balance(ChainId::ARBITRUM, &account).await.expect("balance"),
        "5000000000000000000"
    );
    let tokens = wallet
        .token_balances(ChainId::POLYGON, &account, None)
        .await
        .expect("tokens");
    assert_eq!(tokens.len(), 3);
    let usdc = tokens
        .iter()
        .find(|token| token.symbol.as_deref() == Some("USDC"))
        .expect("usdc");
    assert_eq!(usdc.balance, "250000000");
}

#[tokio::test]
async fn auth_proof_api_check_accepts_only_the_issued_proof() {
    let wallet = wallet();
    let details = wallet
        .connect(ConnectOptions::for_app("Demo Dapp").authorized())
        .await
        .expect("connect");
    let proof = details.proof.expect("proof").proof_string;
    let account = Address::new(ACCOUNT);
    let api = "https://api.sequence.app";

    let check = |address: Address, proof: String| {
        let wallet = &wallet;
        async move {
            wallet
                .is_valid_eth_auth_proof(api, ChainId::POLYGON, &address, &proof)
                .await
                .expect("api check")
        }
    };
    assert!(check(account.clone(), proof.clone()).await);
    assert!(!check(Address::new(OTHER), proof.clone()).await);
    assert!(!check(account.clone(), proof.replacen("eth.", "btc.", 1)).await);
    assert!(!check(account.clone(), format!("{proof}00")).await);

    let err = wallet
        .is_valid_eth_auth_proof(" ", ChainId::POLYGON, &account, &proof)
        .await
        .expect_err("empty api url");
    assert!(matches!(err, WalletError::InvalidRequest(_)));
}

#[tokio::test]
async fn values_beyond_128_bits_are_parsed_and_checked_against_balance() {
    let wallet = wallet()
        .connected()
        .with_native_balance(ChainId::POLYGON, 100);
    let huge = Transaction {
        to: Address::new(OTHER),
        value: Some(format!("0x1{}", "0".repeat(40))),
        ..Transaction::default()
    };

    let err = wallet
        .send_transactions(ChainId::POLYGON, &[huge])
        .await
        .expect_err("overdraft");
    assert_eq!(
        err,
        WalletError::InvalidRequest("insufficient native balance".to_string())
    );
}

#[tokio::test]
async fn rejecting_signatures_fails_verification() {
    let wallet = wallet().connected().rejecting_signatures();
    let message = MessagePayload::Text("hello".to_string());
    let signature = wallet
        .sign_message(ChainId::POLYGON, &message)
        .await
        .expect("sign");

    let valid = wallet
        .is_valid_message_signature(&Address::new(ACCOUNT), &message, &signature, ChainId::POLYGON)
        .await
        .expect("verify");
    assert!(!valid);
}
