use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::ChainId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NotConnected,
    UserRejected,
    Network,
    InvalidRequest,
    UnsupportedChain,
    Provider,
}

/// Failure reported by a wallet provider call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WalletError {
    #[error("wallet is not connected")]
    NotConnected,
    #[error("request rejected by user")]
    UserRejected,
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("chain {0} is not supported by this wallet")]
    UnsupportedChain(ChainId),
    #[error("provider error: {0}")]
    Provider(String),
}

impl WalletError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotConnected => ErrorCode::NotConnected,
            Self::UserRejected => ErrorCode::UserRejected,
            Self::Network(_) => ErrorCode::Network,
            Self::InvalidRequest(_) => ErrorCode::InvalidRequest,
            Self::UnsupportedChain(_) => ErrorCode::UnsupportedChain,
            Self::Provider(_) => ErrorCode::Provider,
        }
    }
}

pub type WalletResult<T> = Result<T, WalletError>;
