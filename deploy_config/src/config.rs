use std::{collections::BTreeMap, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    compiler::SolidityConfig,
    env::interpolate_value,
    error::ConfigError,
    explorer::{EtherscanConfig, ExplorerChain, SourcifyConfig},
    network::{NetworkEntry, NetworkProfile},
};

pub const DEFAULT_CONFIG_PATH: &str = "deploy.toml";

/// The whole toolchain config: compilers, networks, explorers, reporting hints.
///
/// Built once at startup and handed by reference to whatever needs it.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct DeployConfig {
    #[serde(default)]
    pub solidity: SolidityConfig,
    #[serde(default)]
    pub networks: BTreeMap<String, NetworkEntry>,
    #[serde(default)]
    pub etherscan: EtherscanConfig,
    #[serde(default)]
    pub sourcify: SourcifyConfig,
    #[serde(default)]
    pub gas_reporter: GasReporterConfig,
    #[serde(default)]
    pub contract_sizer: ContractSizerConfig,
}

/// Settings for an external gas reporter.
///
/// Parsed and validated so the file stays compatible, but nothing in the
/// deployment reads them.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct GasReporterConfig {
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl Default for GasReporterConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
        }
    }
}

fn default_currency() -> String {
    String::from("USD")
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct ContractSizerConfig {
    /// refuse to deploy runtime code over the size limit instead of warning
    #[serde(default)]
    pub strict: bool,
}

impl DeployConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_toml_str(&raw)?;
        tracing::debug!(
            path = %path.display(),
            networks = config.networks.len(),
            "loaded deploy config"
        );
        Ok(config)
    }

    /// Parse a config document, interpolating `${VAR}` references.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = toml::from_str(raw)?;
        let mut value = toml::Value::Table(table);
        interpolate_value(&mut value)?;
        Ok(value.try_into()?)
    }

    /// Resolve the named network into a validated profile.
    pub fn network(&self, name: &str) -> Result<NetworkProfile, ConfigError> {
        let entry = self
            .networks
            .get(name)
            .ok_or_else(|| ConfigError::UnknownNetwork(name.to_owned()))?;
        entry.resolve(name)
    }

    pub fn network_names(&self) -> impl Iterator<Item = &str> {
        self.networks.keys().map(String::as_str)
    }

    /// Explorer descriptor for a chain, if verification is configured for it.
    pub fn explorer_for(&self, chain_id: u64) -> Option<&ExplorerChain> {
        self.etherscan.chain_for(chain_id)
    }
}
