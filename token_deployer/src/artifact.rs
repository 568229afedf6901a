use std::path::{Path, PathBuf};

use ethers::{abi::Abi, types::Bytes};
use serde::Deserialize;

use crate::error::DeployError;

/// EIP-170 runtime code size limit.
pub const CONTRACT_SIZE_LIMIT: usize = 24_576;

/// Compiled contract as emitted by hardhat (`artifacts/`) or forge (`out/`).
#[derive(Clone, Debug)]
pub struct ContractArtifact {
    pub contract_name: String,
    pub source_name: Option<String>,
    pub abi: Abi,
    pub bytecode: Bytes,
    pub deployed_bytecode: Option<Bytes>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArtifact {
    contract_name: Option<String>,
    source_name: Option<String>,
    abi: Abi,
    bytecode: RawBytecode,
    deployed_bytecode: Option<RawBytecode>,
}

/// hardhat writes a bare hex string, forge writes `{ "object": "0x.." }`
#[derive(Deserialize)]
#[serde(untagged)]
enum RawBytecode {
    Hex(String),
    Object { object: String },
}

impl RawBytecode {
    fn into_hex(self) -> String {
        match self {
            RawBytecode::Hex(s) => s,
            RawBytecode::Object { object } => object,
        }
    }
}

/// Default hardhat artifact location for a contract compiled from
/// `contracts/<name>.sol`.
pub fn default_artifact_path(contract_name: &str) -> PathBuf {
    Path::new("artifacts")
        .join("contracts")
        .join(format!("{contract_name}.sol"))
        .join(format!("{contract_name}.json"))
}

impl ContractArtifact {
    pub fn load(path: impl AsRef<Path>, contract_name: &str) -> Result<Self, DeployError> {
        let path = path.as_ref();
        let raw = std::fs::read(path).map_err(|source| DeployError::ArtifactRead {
            path: path.to_path_buf(),
            source,
        })?;
        let parsed: RawArtifact =
            serde_json::from_slice(&raw).map_err(|source| DeployError::ArtifactParse {
                path: path.to_path_buf(),
                source,
            })?;

        let artifact = Self::from_raw(parsed, contract_name)?;
        tracing::debug!(
            path = %path.display(),
            contract = %artifact.contract_name,
            init_code_len = artifact.bytecode.len(),
            "loaded contract artifact"
        );
        Ok(artifact)
    }

    fn from_raw(raw: RawArtifact, contract_name: &str) -> Result<Self, DeployError> {
        let unusable = |reason: String| DeployError::ArtifactUnusable {
            contract: contract_name.to_owned(),
            reason,
        };

        if let Some(name) = &raw.contract_name {
            if name != contract_name {
                return Err(unusable(format!("artifact is for `{name}`")));
            }
        }

        let bytecode = decode_bytecode(raw.bytecode.into_hex()).map_err(unusable)?;
        if bytecode.is_empty() {
            return Err(unusable(String::from(
                "bytecode is empty (abstract contract or interface?)",
            )));
        }
        let deployed_bytecode = match raw.deployed_bytecode {
            Some(code) => Some(decode_bytecode(code.into_hex()).map_err(unusable)?),
            None => None,
        };

        Ok(Self {
            contract_name: contract_name.to_owned(),
            source_name: raw.source_name,
            abi: raw.abi,
            bytecode,
            deployed_bytecode,
        })
    }

    /// Runtime code size, when the artifact carries it.
    pub fn runtime_size(&self) -> Option<usize> {
        self.deployed_bytecode.as_ref().map(|code| code.len())
    }

    pub fn exceeds_size_limit(&self) -> bool {
        self.runtime_size()
            .map_or(false, |size| size > CONTRACT_SIZE_LIMIT)
    }
}

fn decode_bytecode(hex_str: String) -> Result<Bytes, String> {
    let trimmed = hex_str.trim();
    if trimmed.contains("__") {
        return Err(String::from("bytecode has unlinked library placeholders"));
    }
    let trimmed = trimmed.trim_start_matches("0x");
    ethers::utils::hex::decode(trimmed)
        .map(Bytes::from)
        .map_err(|e| format!("bytecode is not valid hex: {e}"))
}


#[cfg(test)]
mod tests {
    use std::io::Write;

    use crate::error::FailureKind;

    use super::{test_utils::*, *};

    fn write_artifact(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_hardhat_artifact() {
        let file = write_artifact(&hardhat_artifact("SUNMinimealSTBL"));
        let artifact = ContractArtifact::load(file.path(), "SUNMinimealSTBL").unwrap();

        assert_eq!(artifact.contract_name, "SUNMinimealSTBL");
        assert_eq!(
            artifact.source_name.as_deref(),
            Some("contracts/SUNMinimealSTBL.sol")
        );
        assert_eq!(artifact.abi.constructor().unwrap().inputs.len(), 3);
        assert_eq!(artifact.bytecode.len(), 17);
        assert_eq!(artifact.runtime_size(), Some(9));
        assert!(!artifact.exceeds_size_limit());
    }

    #[test]
    fn test_load_forge_artifact() {
        let contents = format!(
            r#"{{
                "abi": {TOKEN_ABI},
                "bytecode": {{ "object": "{TOKEN_BYTECODE}", "linkReferences": {{}} }},
                "deployedBytecode": {{ "object": "{TOKEN_RUNTIME}" }}
            }}"#
        );
        let file = write_artifact(&contents);
        let artifact = ContractArtifact::load(file.path(), "SUNMinimealSTBL").unwrap();
        assert_eq!(artifact.bytecode.len(), 17);
        assert!(artifact.source_name.is_none());
    }

    #[test]
    fn test_wrong_contract_name() {
        let file = write_artifact(&hardhat_artifact("Other"));
        let err = ContractArtifact::load(file.path(), "SUNMinimealSTBL").unwrap_err();
        assert_eq!(err.kind(), FailureKind::Artifact);
    }

    #[test]
    fn test_interface_artifact_rejected() {
        let contents = format!(r#"{{ "abi": {TOKEN_ABI}, "bytecode": "0x" }}"#);
        let file = write_artifact(&contents);
        let err = ContractArtifact::load(file.path(), "IToken").unwrap_err();
        assert!(matches!(err, DeployError::ArtifactUnusable { .. }));
    }

    #[test]
    fn test_unlinked_artifact_rejected() {
        let contents = format!(
            r#"{{ "abi": {TOKEN_ABI}, "bytecode": "0x6080__$1b2c3d4e5f6a7b8c9d0e1f2a3b4c5d6e7f$__6000" }}"#
        );
        let file = write_artifact(&contents);
        let err = ContractArtifact::load(file.path(), "Token").unwrap_err();
        assert!(err.to_string().contains("unlinked"));
    }

    #[test]
    fn test_missing_and_malformed_files() {
        let err = ContractArtifact::load("artifacts/none.json", "Token").unwrap_err();
        assert!(matches!(err, DeployError::ArtifactRead { .. }));

        let file = write_artifact("{ not json");
        let err = ContractArtifact::load(file.path(), "Token").unwrap_err();
        assert!(matches!(err, DeployError::ArtifactParse { .. }));
        assert_eq!(err.kind(), FailureKind::Artifact);
    }

    #[test]
    fn test_oversized_runtime_detected() {
        let mut artifact = ContractArtifact::load(
            write_artifact(&hardhat_artifact("Token")).path(),
            "Token",
        )
        .unwrap();
        artifact.deployed_bytecode = Some(Bytes::from(vec![0u8; CONTRACT_SIZE_LIMIT + 1]));
        assert!(artifact.exceeds_size_limit());
    }

    #[test]
    fn test_default_artifact_path() {
        assert_eq!(
            default_artifact_path("SUNMinimealSTBL"),
            Path::new("artifacts/contracts/SUNMinimealSTBL.sol/SUNMinimealSTBL.json")
        );
    }
}
