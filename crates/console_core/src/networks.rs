use shared::domain::{ChainId, NetworkConfig, NetworkType};

/// Chains never offered in the network selector.
pub const OMITTED_CHAINS: [ChainId; 7] = [
    ChainId::RINKEBY,
    ChainId::HARDHAT,
    ChainId::HARDHAT_2,
    ChainId::KOVAN,
    ChainId::ROPSTEN,
    ChainId::HOMEVERSE_TESTNET,
    ChainId::BASE_GOERLI,
];

/// Mainnets by ascending chain id, then testnets by ascending chain id, without
/// deprecated or omitted chains.
pub fn network_options(all: &[NetworkConfig]) -> Vec<NetworkConfig> {
    let of_type = |network_type: NetworkType| {
        let mut networks: Vec<&NetworkConfig> = all
            .iter()
            .filter(|network| network.network_type == network_type)
            .collect();
        networks.sort_by_key(|network| network.chain_id);
        networks
    };

    of_type(NetworkType::Mainnet)
        .into_iter()
        .chain(of_type(NetworkType::Testnet))
        .filter(|network| !network.deprecated && !OMITTED_CHAINS.contains(&network.chain_id))
        .cloned()
        .collect()
}
