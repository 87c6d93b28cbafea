use {
    alloy::signers::local::PrivateKeySigner,
    clap::Parser,
    std::path::PathBuf,
    tracing::level_filters::LevelFilter,
    url::Url,
};

/// Deploy the staking contract
#[derive(Parser)]
#[command(version)]
pub struct Arguments {
    #[clap(flatten)]
    pub logging: LoggingArguments,

    /// Path to the deployment configuration file. This file should be in TOML
    /// format.
    #[clap(long, env)]
    pub config: PathBuf,

    /// Name of the network to deploy to. Selects the token addresses from the
    /// `networks` table of the configuration file.
    #[clap(long, env)]
    pub network: String,

    /// The Ethereum node URL to connect to.
    #[clap(long, env, default_value = "http://localhost:8545")]
    pub node_url: Url,

    /// Hex encoded private key of the account paying for the deployment.
    #[clap(long, env)]
    pub private_key: PrivateKeySigner,

    /// Directory holding the compiled contract artifacts.
    #[clap(long, env, default_value = "artifacts")]
    pub artifacts: PathBuf,

    /// Name of the contract to deploy.
    #[clap(long, env, default_value = "Staking")]
    pub contract: String,
}

#[derive(Parser)]
pub struct LoggingArguments {
    #[clap(long, env, default_value = "warn,staking_deployer=debug")]
    pub log_filter: String,

    #[clap(long, env, default_value = "error")]
    pub log_stderr_threshold: LevelFilter,

    /// Output log events as JSON.
    #[clap(long, env)]
    pub use_json_logs: bool,
}

impl LoggingArguments {
    pub fn observe_config(&self) -> observe::Config {
        observe::Config::new(
            &self.log_filter,
            self.log_stderr_threshold.into_level(),
            self.use_json_logs,
        )
    }
}

impl std::fmt::Display for Arguments {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Self {
            logging,
            config,
            network,
            node_url,
            private_key,
            artifacts,
            contract,
        } = self;

        writeln!(f, "log_filter: {}", logging.log_filter)?;
        writeln!(f, "log_stderr_threshold: {}", logging.log_stderr_threshold)?;
        writeln!(f, "use_json_logs: {}", logging.use_json_logs)?;
        writeln!(f, "config: {}", config.display())?;
        writeln!(f, "network: {network}")?;
        writeln!(f, "node_url: {node_url}")?;
        writeln!(f, "private_key: SECRET")?;
        writeln!(f, "deployer: {}", private_key.address())?;
        writeln!(f, "artifacts: {}", artifacts.display())?;
        writeln!(f, "contract: {contract}")?;
        Ok(())
    }
}
