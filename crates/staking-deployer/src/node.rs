//! Submission of the deployment transaction to an Ethereum node.

use {
    crate::{artifact::Artifact, parameters::DeploymentParameters},
    alloy::{
        network::{EthereumWallet, TransactionBuilder},
        primitives::{Address, TxHash},
        providers::{DynProvider, Provider, ProviderBuilder},
        rpc::{client::ClientBuilder, types::TransactionRequest},
        signers::local::PrivateKeySigner,
    },
    anyhow::{Context, Result, ensure},
    url::Url,
};

/// A contract that was created on chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Deployment {
    pub address: Address,
    pub transaction: TxHash,
}

/// Abstracts the blockchain operations needed to deploy a contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Deployer: Send + Sync {
    /// Chain ID reported by the connected node.
    async fn chain_id(&self) -> Result<u64>;

    /// Sends the contract creation transaction and waits until it is mined.
    ///
    /// There is no timeout: this waits for as long as the node takes to
    /// include the transaction.
    async fn deploy(
        &self,
        artifact: &Artifact,
        parameters: &DeploymentParameters,
    ) -> Result<Deployment>;
}

/// Node reachable over HTTP JSON-RPC that signs with a local key.
pub struct Node {
    provider: DynProvider,
    deployer: Address,
}

impl Node {
    pub fn new(url: Url, signer: PrivateKeySigner) -> Self {
        let deployer = signer.address();
        let rpc = ClientBuilder::default().http(url);
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::new(signer))
            .connect_client(rpc)
            .erased();
        Self { provider, deployer }
    }
}

#[async_trait::async_trait]
impl Deployer for Node {
    async fn chain_id(&self) -> Result<u64> {
        self.provider
            .get_chain_id()
            .await
            .context("could not fetch current chain id")
    }

    async fn deploy(
        &self,
        artifact: &Artifact,
        parameters: &DeploymentParameters,
    ) -> Result<Deployment> {
        let tx = TransactionRequest::default()
            .with_from(self.deployer)
            .with_deploy_code(artifact.creation_code(parameters));
        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .with_context(|| format!("failed to submit deployment of {}", artifact.name))?;
        let transaction = *pending.tx_hash();
        tracing::info!(
            ?transaction,
            deployer = ?self.deployer,
            "deployment submitted, waiting for confirmation"
        );

        let receipt = pending
            .get_receipt()
            .await
            .with_context(|| format!("failed to confirm deployment transaction {transaction}"))?;
        ensure!(
            receipt.status(),
            "deployment transaction {transaction} reverted"
        );
        let address = receipt
            .contract_address
            .with_context(|| format!("receipt of {transaction} has no contract address"))?;

        Ok(Deployment {
            address,
            transaction,
        })
    }
}
