use {
    crate::{
        artifact::{self, ContractFactory},
        config::{self, Config, StartTime},
        node::{Deployer, Deployment},
        parameters::DeploymentParameters,
    },
    chrono::Utc,
};

/// Everything that can go wrong during a deployment. All of them end the run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] config::Error),
    #[error("start time {0:?} overflows a unix timestamp")]
    StartTimeOverflow(StartTime),
    #[error(transparent)]
    UnknownNetwork(#[from] config::UnknownNetwork),
    #[error("network {network:?} expects chain {expected} but the node is on chain {actual}")]
    ChainMismatch {
        network: String,
        expected: u64,
        actual: u64,
    },
    #[error(transparent)]
    Artifact(#[from] artifact::Error),
    #[error("failed to query the node")]
    Node(#[source] anyhow::Error),
    #[error("deployment failed")]
    Deployment(#[source] anyhow::Error),
}

impl Error {
    /// Process exit status. No failure is retryable so they all share one.
    pub fn exit_code(&self) -> u8 {
        1
    }
}

/// Deploys the staking contract with parameters taken from `config` and the
/// token addresses of `network`.
///
/// Every call creates a new contract instance.
pub async fn deploy(
    config: &Config,
    network: &str,
    contract: &str,
    factory: &dyn ContractFactory,
    deployer: &dyn Deployer,
) -> Result<Deployment, Error> {
    let start_time = config
        .start_time
        .resolve(Utc::now())
        .ok_or(Error::StartTimeOverflow(config.start_time))?;
    tracing::info!(start_time, source = ?config.start_time, "staking start time");

    let tokens = config.network(network)?;
    if let Some(expected) = tokens.chain_id {
        let actual = deployer.chain_id().await.map_err(Error::Node)?;
        if actual != expected {
            return Err(Error::ChainMismatch {
                network: network.to_owned(),
                expected,
                actual,
            });
        }
    }

    let artifact = factory.contract(contract).await?;
    let parameters = DeploymentParameters::new(config, tokens, start_time);
    tracing::debug!(?parameters, contract, network, "deploying");

    deployer
        .deploy(&artifact, &parameters)
        .await
        .map_err(Error::Deployment)
}
