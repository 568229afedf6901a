use std::path::PathBuf;

use deploy_config::DeployConfig;
use ethers::signers::Signer;

use crate::{
    artifact::{default_artifact_path, ContractArtifact},
    deployment::{ConstructorArgs, Deployment, DeploymentResult, DEFAULT_CONTRACT_NAME},
    error::DeployError,
    signer,
};

/// What to deploy, and where.
#[derive(Clone, Debug, PartialEq)]
pub struct DeployTask {
    pub network: String,
    pub contract_name: String,
    pub artifact_path: PathBuf,
}

impl DeployTask {
    pub fn new(network: impl Into<String>) -> Self {
        Self {
            network: network.into(),
            contract_name: DEFAULT_CONTRACT_NAME.to_owned(),
            artifact_path: default_artifact_path(DEFAULT_CONTRACT_NAME),
        }
    }

    pub fn contract(mut self, name: impl Into<String>, artifact_path: Option<PathBuf>) -> Self {
        let name = name.into();
        self.artifact_path = artifact_path.unwrap_or_else(|| default_artifact_path(&name));
        self.contract_name = name;
        self
    }

    /// Run the whole procedure: identity, factory, deploy.
    ///
    /// Stops at the first failing step; nothing is retried.
    pub async fn run(&self, config: &DeployConfig) -> Result<DeploymentResult, DeployError> {
        let profile = config.network(&self.network)?;

        let client = signer::connect(&profile).await?;
        let deployer = client.address();
        let chain_id = client.signer().chain_id();

        let artifact = ContractArtifact::load(&self.artifact_path, &self.contract_name)?;
        let deployment = Deployment::new(client, artifact, profile.name.clone())
            .strict_size(config.contract_sizer.strict)
            .gas(profile.gas_limit, profile.gas_price);

        let result = deployment
            .deploy(ConstructorArgs::for_deployer(deployer))
            .await?;

        if let Some(explorer) = config.explorer_for(chain_id) {
            tracing::info!(
                explorer = %explorer.network,
                url = %explorer.address_url(&result.address_hex()),
                sourcify = config.sourcify.enabled,
                "contract can be verified on the block explorer"
            );
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use crate::{artifact::test_utils::hardhat_artifact, error::FailureKind};

    use super::*;

    fn config(accounts: &str) -> DeployConfig {
        DeployConfig::from_toml_str(&format!(
            r#"
[networks.testnet]
url = "http://127.0.0.1:1"
accounts = {accounts}
chain_id = 943
"#
        ))
        .unwrap()
    }

    #[test]
    fn test_defaults() {
        let task = DeployTask::new("testnet");
        assert_eq!(task.contract_name, "SUNMinimealSTBL");
        assert_eq!(
            task.artifact_path,
            PathBuf::from("artifacts/contracts/SUNMinimealSTBL.sol/SUNMinimealSTBL.json")
        );

        let task = DeployTask::new("testnet").contract("Other", None);
        assert_eq!(
            task.artifact_path,
            PathBuf::from("artifacts/contracts/Other.sol/Other.json")
        );
    }

    #[tokio::test]
    async fn test_missing_credential_fails_before_any_request() {
        let err = DeployTask::new("testnet")
            .run(&config(r#"[""]"#))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::Config);
    }

    #[tokio::test]
    async fn test_unknown_network() {
        let err = DeployTask::new("mainnet")
            .run(&config(r#"["0x01"]"#))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::Config);
    }

    #[tokio::test]
    async fn test_missing_artifact() {
        let task = DeployTask::new("testnet")
            .contract("Token", Some(PathBuf::from("artifacts/does-not-exist.json")));
        let err = task
            .run(&config(
                r#"["0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"]"#,
            ))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::Artifact);
    }

    #[tokio::test]
    async fn test_unreachable_node() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(hardhat_artifact("Token").as_bytes()).unwrap();

        let task = DeployTask::new("testnet").contract("Token", Some(file.path().to_path_buf()));
        let err = task
            .run(&config(
                r#"["0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"]"#,
            ))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::Submission);
    }
}
