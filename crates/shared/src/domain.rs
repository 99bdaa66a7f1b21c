use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(ChainId);

impl ChainId {
    pub const MAINNET: ChainId = ChainId(1);
    pub const ROPSTEN: ChainId = ChainId(3);
    pub const RINKEBY: ChainId = ChainId(4);
    pub const GOERLI: ChainId = ChainId(5);
    pub const OPTIMISM: ChainId = ChainId(10);
    pub const KOVAN: ChainId = ChainId(42);
    pub const POLYGON: ChainId = ChainId(137);
    pub const ARBITRUM: ChainId = ChainId(42161);
    pub const HOMEVERSE_TESTNET: ChainId = ChainId(40875);
    pub const BASE_GOERLI: ChainId = ChainId(84531);
    pub const HARDHAT: ChainId = ChainId(31337);
    pub const HARDHAT_2: ChainId = ChainId(31338);
    pub const SEPOLIA: ChainId = ChainId(11_155_111);
}

/// Hex encoded account or contract address, kept as the provider reports it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(pub String);

impl Address {
    pub const ZERO: &'static str = "0x0000000000000000000000000000000000000000";

    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn zero() -> Self {
        Self(Self::ZERO.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison; checksummed and lowercase forms name the same account.
    pub fn same_as(&self, other: &Address) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

/// The zero address.
impl Default for Address {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkType {
    Mainnet,
    Testnet,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    pub chain_id: ChainId,
    pub name: String,
    pub title: String,
    pub network_type: NetworkType,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexer_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_uri: Option<String>,
}
