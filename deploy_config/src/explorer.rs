use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Block-explorer integrations, keyed by explorer network name.
///
/// Only read here; source verification itself is done by an external service.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct EtherscanConfig {
    #[serde(default)]
    pub api_key: BTreeMap<String, String>,
    #[serde(default)]
    pub custom_chains: Vec<ExplorerChain>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ExplorerChain {
    pub network: String,
    pub chain_id: u64,
    pub urls: ExplorerUrls,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ExplorerUrls {
    pub api_url: String,
    pub browser_url: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct SourcifyConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Default for SourcifyConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

impl EtherscanConfig {
    pub fn chain_for(&self, chain_id: u64) -> Option<&ExplorerChain> {
        self.custom_chains.iter().find(|c| c.chain_id == chain_id)
    }

    pub fn chain_named(&self, network: &str) -> Option<&ExplorerChain> {
        self.custom_chains.iter().find(|c| c.network == network)
    }

    pub fn api_key_for(&self, network: &str) -> Option<&str> {
        self.api_key
            .get(network)
            .map(String::as_str)
            .filter(|k| !k.is_empty())
    }
}

impl ExplorerChain {
    /// Link to an address page on the explorer's browser.
    pub fn address_url(&self, address: &str) -> String {
        let base = self.urls.browser_url.trim_end_matches('/');
        format!("{base}/address/{address}")
    }
}
