use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("unterminated `${{` placeholder in `{0}`")]
    BadPlaceholder(String),
    #[error("network `{0}` is not declared in the config")]
    UnknownNetwork(String),
    #[error("network `{network}` has an invalid url `{url}`: {source}")]
    InvalidUrl {
        network: String,
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("network `{0}` has no signing credential (is the private key set?)")]
    MissingCredential(String),
    #[error("no compiler declared under [solidity]")]
    NoCompilers,
    #[error("invalid compiler version `{version}`: {source}")]
    InvalidVersion {
        version: String,
        #[source]
        source: semver::Error,
    },
}
