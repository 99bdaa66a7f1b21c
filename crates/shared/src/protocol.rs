use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Address, ChainId};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sign_in_with_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sign_in_with: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub included_payment_providers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_funding_currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_purchase_amount: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_funding_currency_to_default: Option<bool>,
}

impl WalletSettings {
    /// Field-wise merge: values set on `self` win, gaps are filled from `base`.
    pub fn merged_over(self, base: &WalletSettings) -> WalletSettings {
        WalletSettings {
            theme: self.theme.or_else(|| base.theme.clone()),
            banner_url: self.banner_url.or_else(|| base.banner_url.clone()),
            banner_size: self.banner_size.or_else(|| base.banner_size.clone()),
            sign_in_with_email: self
                .sign_in_with_email
                .or_else(|| base.sign_in_with_email.clone()),
            sign_in_with: self.sign_in_with.or_else(|| base.sign_in_with.clone()),
            included_payment_providers: if self.included_payment_providers.is_empty() {
                base.included_payment_providers.clone()
            } else {
                self.included_payment_providers
            },
            default_funding_currency: self
                .default_funding_currency
                .or_else(|| base.default_funding_currency.clone()),
            default_purchase_amount: self
                .default_purchase_amount
                .or(base.default_purchase_amount),
            lock_funding_currency_to_default: self
                .lock_funding_currency_to_default
                .or(base.lock_funding_currency_to_default),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectOptions {
    pub app: String,
    #[serde(default)]
    pub authorize: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ask_for_email: Option<bool>,
    #[serde(default)]
    pub settings: WalletSettings,
}

impl ConnectOptions {
    pub fn for_app(app: impl Into<String>) -> Self {
        Self {
            app: app.into(),
            ..Self::default()
        }
    }

    pub fn authorized(mut self) -> Self {
        self.authorize = true;
        self
    }

    pub fn with_settings(mut self, settings: WalletSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Applies `self` on top of `defaults`; settings are merged rather than replaced.
    pub fn merged_over(self, defaults: &ConnectOptions) -> ConnectOptions {
        let app = if self.app.is_empty() {
            defaults.app.clone()
        } else {
            self.app
        };
        ConnectOptions {
            app,
            authorize: self.authorize || defaults.authorize,
            ask_for_email: self.ask_for_email.or(defaults.ask_for_email),
            settings: self.settings.merged_over(&defaults.settings),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedDataField {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl TypedDataField {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedDataDomain {
    pub name: String,
    pub version: String,
    pub chain_id: ChainId,
    pub verifying_contract: Address,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedData {
    pub types: BTreeMap<String, Vec<TypedDataField>>,
    pub primary_type: String,
    pub domain: TypedDataDomain,
    pub message: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthProof {
    pub proof_string: String,
    pub typed_data: TypedData,
    pub signature: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectDetails {
    pub connected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<ChainId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<AuthProof>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "encoding", content = "value", rename_all = "snake_case")]
pub enum MessagePayload {
    Text(String),
    Hex(String),
    Bytes(Vec<u8>),
}

impl MessagePayload {
    pub fn as_bytes(&self) -> Vec<u8> {
        match self {
            Self::Text(text) => text.as_bytes().to_vec(),
            Self::Hex(hex) => hex.as_bytes().to_vec(),
            Self::Bytes(bytes) => bytes.clone(),
        }
    }
}

/// Contract call described by its function signature; the provider encodes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractCall {
    pub signature: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ContractCall {
    pub fn new<I, S>(signature: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            signature: signature.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn function_name(&self) -> &str {
        self.signature
            .split('(')
            .next()
            .unwrap_or(self.signature.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub to: Address,
    /// Base-unit amount as a decimal string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ContractCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_limit: Option<String>,
    #[serde(default)]
    pub delegate_call: bool,
    #[serde(default)]
    pub revert_on_error: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub hash: String,
    pub chain_id: ChainId,
    pub from: Address,
    pub transaction_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalance {
    pub contract_address: Address,
    pub account_address: Address,
    pub balance: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenWalletIntent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub app: String,
    #[serde(default)]
    pub settings: WalletSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_transaction_targets_the_zero_address() {
        let transaction = Transaction::default();
        assert_eq!(transaction.to, Address::zero());
        assert!(transaction.value.is_none());
        assert!(!transaction.delegate_call);
    }

    #[test]
    fn connect_options_merge_keeps_default_settings_not_overridden() {
        let defaults = ConnectOptions {
            app: "Demo Dapp".to_string(),
            authorize: false,
            ask_for_email: Some(true),
            settings: WalletSettings {
                theme: Some("light".to_string()),
                default_purchase_amount: Some(400),
                ..WalletSettings::default()
            },
        };

        let merged = ConnectOptions::for_app("")
            .authorized()
            .with_settings(WalletSettings {
                theme: Some("dark".to_string()),
                ..WalletSettings::default()
            })
            .merged_over(&defaults);

        assert_eq!(merged.app, "Demo Dapp");
        assert!(merged.authorize);
        assert_eq!(merged.ask_for_email, Some(true));
        assert_eq!(merged.settings.theme.as_deref(), Some("dark"));
        assert_eq!(merged.settings.default_purchase_amount, Some(400));
    }

    #[test]
    fn contract_call_function_name_strips_parameters() {
        let call = ContractCall::new("transfer(address,uint256)", ["0xabc", "0x1"]);
        assert_eq!(call.function_name(), "transfer");
        assert_eq!(call.args, vec!["0xabc".to_string(), "0x1".to_string()]);
    }

    #[test]
    fn message_payload_serializes_with_encoding_tag() {
        let payload = MessagePayload::Hex("0x48656c6c6f".to_string());
        let json = serde_json::to_value(&payload).expect("serialize");
        assert_eq!(json["encoding"], "hex");
        assert_eq!(json["value"], "0x48656c6c6f");
    }
}
