use std::sync::Arc;

use deploy_config::{Credential, NetworkProfile};
use ethers::{
    core::k256::ecdsa::SigningKey,
    middleware::SignerMiddleware,
    providers::{Http, Middleware, Provider},
    signers::{coins_bip39::English, LocalWallet, MnemonicBuilder, Signer, Wallet},
};

use crate::error::DeployError;

pub type EtherSigner = SignerMiddleware<Provider<Http>, Wallet<SigningKey>>;

/// The deployer identity: first account of the network's credential set.
pub fn deployer_wallet(profile: &NetworkProfile) -> Result<LocalWallet, DeployError> {
    let signer_err = |reason: String| DeployError::Signer {
        network: profile.name.clone(),
        reason,
    };

    match &profile.credential {
        Credential::PrivateKeys(keys) => {
            // resolved profiles always carry at least one key
            let key = keys
                .first()
                .ok_or_else(|| signer_err(String::from("no private key configured")))?;
            key.parse::<LocalWallet>()
                .map_err(|e| signer_err(format!("invalid private key: {e}")))
        }
        Credential::Mnemonic {
            phrase,
            path,
            initial_index,
            ..
        } => {
            let path = format!("{}/{initial_index}", path.trim_end_matches('/'));
            MnemonicBuilder::<English>::default()
                .phrase(phrase.as_str())
                .derivation_path(&path)
                .map_err(|e| signer_err(format!("invalid derivation path `{path}`: {e}")))?
                .build()
                .map_err(|e| signer_err(format!("invalid mnemonic: {e}")))
        }
    }
}

/// Connect to the profile's endpoint and bind the deployer wallet to it.
///
/// The chain id comes from the profile when declared, otherwise from the node.
pub async fn connect(profile: &NetworkProfile) -> Result<Arc<EtherSigner>, DeployError> {
    let wallet = deployer_wallet(profile)?;

    let network_err = |reason: String| DeployError::Network {
        network: profile.name.clone(),
        reason,
    };

    let provider = Provider::<Http>::try_from(profile.rpc_url.as_str())
        .map_err(|e| network_err(e.to_string()))?;

    let chain_id = match profile.chain_id {
        Some(id) => id,
        None => provider
            .get_chainid()
            .await
            .map_err(|e| network_err(e.to_string()))?
            .as_u64(),
    };

    tracing::info!(
        network = %profile.name,
        chain_id,
        deployer = ?wallet.address(),
        "acquired signing identity"
    );

    let wallet = wallet.with_chain_id(chain_id);
    Ok(Arc::new(SignerMiddleware::new(provider, wallet)))
}

#[cfg(test)]
mod tests {
    use ethers::types::Address;

    use super::*;

    // well-known local development accounts
    const DEV_MNEMONIC: &str = "test test test test test test test test test test test junk";
    const DEV_KEY_1: &str = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

    fn profile(credential: Credential) -> NetworkProfile {
        NetworkProfile {
            name: String::from("testnet"),
            rpc_url: String::from("http://127.0.0.1:8545"),
            credential,
            chain_id: Some(943),
            gas_limit: None,
            gas_price: None,
        }
    }

    fn mnemonic(initial_index: u32) -> Credential {
        Credential::Mnemonic {
            phrase: DEV_MNEMONIC.to_owned(),
            path: String::from("m/44'/60'/0'/0"),
            initial_index,
            count: 20,
        }
    }

    #[test]
    fn test_wallet_from_first_key() {
        let wallet = deployer_wallet(&profile(Credential::PrivateKeys(vec![
            DEV_KEY_1.to_owned(),
            String::from("0x01"),
        ])))
        .unwrap();

        let expected: Address = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8".parse().unwrap();
        assert_eq!(wallet.address(), expected);
    }

    #[test]
    fn test_wallet_from_mnemonic() {
        let wallet = deployer_wallet(&profile(mnemonic(0))).unwrap();
        let expected: Address = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".parse().unwrap();
        assert_eq!(wallet.address(), expected);

        let wallet = deployer_wallet(&profile(mnemonic(1))).unwrap();
        let expected: Address = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8".parse().unwrap();
        assert_eq!(wallet.address(), expected);
    }

    #[test]
    fn test_bad_key_is_signer_failure() {
        let err =
            deployer_wallet(&profile(Credential::PrivateKeys(vec![String::from("0xnothex")])))
                .unwrap_err();
        assert_eq!(err.kind(), crate::error::FailureKind::Signer);
    }

    #[tokio::test]
    async fn test_connect_uses_declared_chain_id() {
        // no request is made when the chain id is declared
        let client = connect(&profile(Credential::PrivateKeys(vec![DEV_KEY_1.to_owned()])))
            .await
            .unwrap();
        assert_eq!(client.signer().chain_id(), 943);
        assert_eq!(client.address(), DEV_KEY_1.parse::<LocalWallet>().unwrap().address());
    }
}
