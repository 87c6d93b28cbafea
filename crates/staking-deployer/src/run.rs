use {
    crate::{
        arguments::Arguments,
        artifact::ArtifactDir,
        config,
        deploy::{self, Error},
        node::{Deployment, Node},
    },
    clap::Parser,
    std::process::ExitCode,
};

/// Parses the command line, deploys the contract and maps the outcome to the
/// process exit status.
pub async fn start(args: impl Iterator<Item = String>) -> ExitCode {
    let args = Arguments::parse_from(args);
    observe::tracing::initialize(&args.logging.observe_config());
    tracing::info!("running staking deployer with validated arguments:\n{}", args);
    ExitCode::from(report(run(args).await))
}

pub async fn run(args: Arguments) -> Result<Deployment, Error> {
    let config = config::load(&args.config).await?;
    let factory = ArtifactDir::new(args.artifacts);
    let node = Node::new(args.node_url, args.private_key);
    deploy::deploy(&config, &args.network, &args.contract, &factory, &node).await
}

/// Logs the outcome and returns the process exit status.
fn report(result: Result<Deployment, Error>) -> u8 {
    match result {
        Ok(deployment) => {
            tracing::info!(
                transaction = ?deployment.transaction,
                "staking has been deployed to: {}",
                deployment.address
            );
            0
        }
        Err(err) => {
            tracing::error!(?err, "staking deployment failed");
            err.exit_code()
        }
    }
}
