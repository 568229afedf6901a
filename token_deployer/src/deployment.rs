use std::sync::Arc;

use ethers::{
    abi::Token,
    contract::ContractFactory,
    providers::Middleware,
    types::{transaction::eip2718::TypedTransaction, Address, H256, U256, U64},
    utils::to_checksum,
};

use crate::{
    artifact::{ContractArtifact, CONTRACT_SIZE_LIMIT},
    error::DeployError,
};

pub const DEFAULT_CONTRACT_NAME: &str = "SUNMinimealSTBL";
pub const INITIAL_SUPPLY: u64 = 1_000_000_000;

/// Token constructor arguments, encoded in this order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstructorArgs {
    pub owner: Address,
    pub fee_recipient: Address,
    pub initial_supply: U256,
}

impl ConstructorArgs {
    /// Deployer owns the token and receives fees.
    pub fn for_deployer(deployer: Address) -> Self {
        Self {
            owner: deployer,
            fee_recipient: deployer,
            initial_supply: U256::from(INITIAL_SUPPLY),
        }
    }

    pub fn tokens(&self) -> Vec<Token> {
        vec![
            Token::Address(self.owner),
            Token::Address(self.fee_recipient),
            Token::Uint(self.initial_supply),
        ]
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DeploymentResult {
    pub network: String,
    pub contract_name: String,
    pub contract_address: Address,
    pub constructor_args: ConstructorArgs,
    pub deployer: Option<Address>,
    pub transaction_hash: H256,
    pub block_number: Option<U64>,
    pub gas_used: Option<U256>,
}

impl DeploymentResult {
    /// `0x`-prefixed, checksummed address.
    pub fn address_hex(&self) -> String {
        to_checksum(&self.contract_address, None)
    }
}

/// A single deployment of one artifact through one signing client.
pub struct Deployment<M> {
    client: Arc<M>,
    artifact: ContractArtifact,
    network: String,
    strict_size: bool,
    gas_limit: Option<u64>,
    gas_price: Option<u64>,
}

impl<M> Deployment<M>
where
    M: Middleware + 'static,
{
    pub fn new(client: Arc<M>, artifact: ContractArtifact, network: impl Into<String>) -> Self {
        Self {
            client,
            artifact,
            network: network.into(),
            strict_size: false,
            gas_limit: None,
            gas_price: None,
        }
    }

    /// Refuse oversized runtime code instead of warning about it.
    pub fn strict_size(mut self, strict: bool) -> Self {
        self.strict_size = strict;
        self
    }

    /// Fixed gas limit and price; whatever is left unset is filled in by the node.
    pub fn gas(mut self, limit: Option<u64>, price: Option<u64>) -> Self {
        self.gas_limit = limit;
        self.gas_price = price;
        self
    }

    pub fn artifact(&self) -> &ContractArtifact {
        &self.artifact
    }

    /// Typed constructor handle for the artifact.
    pub fn factory(&self) -> Result<ContractFactory<M>, DeployError> {
        if self.artifact.exceeds_size_limit() {
            let size = self.artifact.runtime_size().unwrap_or_default();
            if self.strict_size {
                return Err(DeployError::ArtifactUnusable {
                    contract: self.artifact.contract_name.clone(),
                    reason: format!(
                        "runtime code is {size} bytes, over the {CONTRACT_SIZE_LIMIT} byte limit"
                    ),
                });
            }
            tracing::warn!(
                contract = %self.artifact.contract_name,
                size,
                limit = CONTRACT_SIZE_LIMIT,
                "runtime code exceeds the contract size limit, deployment will likely fail"
            );
        }

        Ok(ContractFactory::new(
            self.artifact.abi.clone(),
            self.artifact.bytecode.clone(),
            self.client.clone(),
        ))
    }

    /// The unsent deployment transaction for `args`, exactly as [`Self::deploy`]
    /// submits it.
    pub fn deployment_tx(&self, args: &ConstructorArgs) -> Result<TypedTransaction, DeployError> {
        let deployer = self
            .factory()?
            .deploy_tokens(args.tokens())
            .map_err(|e| self.constructor_err(e))?;

        let mut tx = deployer.tx;
        if let Some(gas) = self.gas_limit {
            tx.set_gas(gas);
        }
        if let Some(price) = self.gas_price {
            tx.set_gas_price(price);
        }
        Ok(tx)
    }

    /// Submit exactly one deployment transaction and wait for its inclusion.
    pub async fn deploy(&self, args: ConstructorArgs) -> Result<DeploymentResult, DeployError> {
        let tx = self.deployment_tx(&args)?;

        tracing::info!(
            network = %self.network,
            contract = %self.artifact.contract_name,
            owner = ?args.owner,
            fee_recipient = ?args.fee_recipient,
            initial_supply = %args.initial_supply,
            "submitting deployment transaction"
        );

        let pending = self
            .client
            .send_transaction(tx, None)
            .await
            .map_err(|e| self.submission_err(e))?;
        let transaction_hash = *pending;
        tracing::debug!(tx = ?transaction_hash, "deployment transaction sent");

        let receipt = pending
            .await
            .map_err(|e| self.submission_err(e))?
            .ok_or_else(|| self.submission_err("transaction was dropped before inclusion"))?;
        if receipt.status == Some(U64::zero()) {
            return Err(self.submission_err(format!(
                "deployment reverted in transaction {transaction_hash:?}"
            )));
        }
        let contract_address = receipt
            .contract_address
            .ok_or_else(|| self.submission_err("receipt has no contract address"))?;

        tracing::info!(
            tx = ?transaction_hash,
            block = ?receipt.block_number,
            gas_used = ?receipt.gas_used,
            "deployment transaction included"
        );

        Ok(DeploymentResult {
            network: self.network.clone(),
            contract_name: self.artifact.contract_name.clone(),
            contract_address,
            constructor_args: args,
            deployer: self.client.default_sender(),
            transaction_hash,
            block_number: receipt.block_number,
            gas_used: receipt.gas_used,
        })
    }

    fn constructor_err(&self, e: impl std::fmt::Display) -> DeployError {
        DeployError::Constructor {
            contract: self.artifact.contract_name.clone(),
            reason: e.to_string(),
        }
    }

    fn submission_err(&self, e: impl std::fmt::Display) -> DeployError {
        DeployError::Submission {
            contract: self.artifact.contract_name.clone(),
            reason: e.to_string(),
        }
    }
}
