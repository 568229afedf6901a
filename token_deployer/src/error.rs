use std::path::PathBuf;

use deploy_config::ConfigError;
use thiserror::Error;

/// Which step of the deployment failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    Config,
    Signer,
    Network,
    Artifact,
    Constructor,
    Submission,
}

#[derive(Debug, Error)]
pub enum DeployError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("could not build signer for network `{network}`: {reason}")]
    Signer { network: String, reason: String },
    #[error("network `{network}` is unreachable: {reason}")]
    Network { network: String, reason: String },
    #[error("could not read artifact {path}: {source}")]
    ArtifactRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid artifact {path}: {source}")]
    ArtifactParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("artifact for `{contract}` is not deployable: {reason}")]
    ArtifactUnusable { contract: String, reason: String },
    #[error("constructor arguments rejected for `{contract}`: {reason}")]
    Constructor { contract: String, reason: String },
    #[error("deployment of `{contract}` failed: {reason}")]
    Submission { contract: String, reason: String },
}

impl DeployError {
    pub fn kind(&self) -> FailureKind {
        match self {
            DeployError::Config(_) => FailureKind::Config,
            DeployError::Signer { .. } => FailureKind::Signer,
            DeployError::Network { .. } => FailureKind::Network,
            DeployError::ArtifactRead { .. }
            | DeployError::ArtifactParse { .. }
            | DeployError::ArtifactUnusable { .. } => FailureKind::Artifact,
            DeployError::Constructor { .. } => FailureKind::Constructor,
            DeployError::Submission { .. } => FailureKind::Submission,
        }
    }
}
