use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ConfigError;

/// Default endpoint for the local development network, which has no `url`.
pub const LOCAL_RPC_URL: &str = "http://127.0.0.1:8545";
pub const DEFAULT_HD_PATH: &str = "m/44'/60'/0'/0";
pub const DEFAULT_HD_COUNT: u32 = 20;

/// A `[networks.<name>]` entry, as written in the config file.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct NetworkEntry {
    pub url: Option<String>,
    #[serde(default)]
    pub accounts: Accounts,
    pub chain_id: Option<u64>,
    /// fixed gas limit for transactions, estimated when unset
    pub gas: Option<u64>,
    /// fixed gas price in wei, taken from the node when unset
    pub gas_price: Option<u64>,
}

/// Either a list of raw keys or an HD wallet description.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Accounts {
    Keys(Vec<String>),
    Hd(HdAccounts),
}

impl Default for Accounts {
    fn default() -> Self {
        Accounts::Keys(Vec::new())
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct HdAccounts {
    pub mnemonic: String,
    #[serde(default = "default_hd_path")]
    pub path: String,
    #[serde(default)]
    pub initial_index: u32,
    #[serde(default = "default_hd_count")]
    pub count: u32,
}

fn default_hd_path() -> String {
    DEFAULT_HD_PATH.to_owned()
}

fn default_hd_count() -> u32 {
    DEFAULT_HD_COUNT
}

/// Signing material for one network.
#[derive(Clone, PartialEq)]
pub enum Credential {
    PrivateKeys(Vec<String>),
    Mnemonic {
        phrase: String,
        path: String,
        initial_index: u32,
        count: u32,
    },
}

// keep secrets out of logs
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::PrivateKeys(keys) => write!(f, "PrivateKeys(<{} redacted>)", keys.len()),
            Credential::Mnemonic {
                path,
                initial_index,
                count,
                ..
            } => f
                .debug_struct("Mnemonic")
                .field("phrase", &"<redacted>")
                .field("path", path)
                .field("initial_index", initial_index)
                .field("count", count)
                .finish(),
        }
    }
}

/// A resolved, validated network: endpoint plus signing credential.
#[derive(Clone, Debug, PartialEq)]
pub struct NetworkProfile {
    pub name: String,
    pub rpc_url: String,
    pub credential: Credential,
    pub chain_id: Option<u64>,
    pub gas_limit: Option<u64>,
    pub gas_price: Option<u64>,
}

impl NetworkEntry {
    /// Validate this entry into a [`NetworkProfile`].
    ///
    /// Fails when the url does not parse or when no non-empty credential is
    /// present, so an unset secret never reaches the signer.
    pub fn resolve(&self, name: &str) -> Result<NetworkProfile, ConfigError> {
        let rpc_url = match &self.url {
            Some(url) => url.trim().to_owned(),
            None => LOCAL_RPC_URL.to_owned(),
        };
        Url::parse(&rpc_url).map_err(|source| ConfigError::InvalidUrl {
            network: name.to_owned(),
            url: rpc_url.clone(),
            source,
        })?;

        let credential = match &self.accounts {
            Accounts::Keys(keys) => {
                let keys: Vec<String> = keys
                    .iter()
                    .map(|k| k.trim())
                    .filter(|k| !k.is_empty())
                    .map(str::to_owned)
                    .collect();
                if keys.is_empty() {
                    return Err(ConfigError::MissingCredential(name.to_owned()));
                }
                Credential::PrivateKeys(keys)
            }
            Accounts::Hd(hd) => {
                if hd.mnemonic.trim().is_empty() || hd.count == 0 {
                    return Err(ConfigError::MissingCredential(name.to_owned()));
                }
                Credential::Mnemonic {
                    phrase: hd.mnemonic.trim().to_owned(),
                    path: hd.path.clone(),
                    initial_index: hd.initial_index,
                    count: hd.count,
                }
            }
        };

        Ok(NetworkProfile {
            name: name.to_owned(),
            rpc_url,
            credential,
            chain_id: self.chain_id,
            gas_limit: self.gas,
            gas_price: self.gas_price,
        })
    }
}
