//! Backend commands queued from UI to backend worker.

use shared::domain::ChainId;

pub enum BackendCommand {
    Trigger { name: String, input: Option<String> },
    SelectNetwork(ChainId),
    RefreshNetworks,
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Trigger { .. } => "trigger",
            Self::SelectNetwork(_) => "select_network",
            Self::RefreshNetworks => "refresh_networks",
        }
    }
}
