//! Deployment configuration loaded from a TOML file.
//!
//! The file holds the constructor constants of the staking contract and a
//! `networks` table that maps a network name to the token addresses deployed
//! on that network.

use {
    alloy::primitives::{Address, U256},
    serde::Deserialize,
    serde_with::{DisplayFromStr, serde_as},
    std::{
        collections::BTreeMap,
        fmt::Debug,
        path::{Path, PathBuf},
        time::Duration,
    },
    tokio::fs,
};

const DEFAULT_START_TIME_OFFSET: Duration = Duration::from_secs(60);

#[serde_as]
#[derive(Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct File {
    /// Amount of reward tokens emitted per epoch, in token atoms. Encoded as a
    /// decimal string because it usually exceeds the TOML integer range.
    #[serde_as(as = "DisplayFromStr")]
    rewards_per_epoch: U256,

    /// Fixed unix timestamp at which staking starts. Only used when
    /// `start-time-source = "fixed-configured"`.
    start_time: Option<u64>,

    /// Where the start timestamp passed to the constructor comes from.
    #[serde(default)]
    start_time_source: StartTimeSource,

    /// Offset added to the current time when the start time is computed.
    #[serde(with = "humantime_serde", default = "default_start_time_offset")]
    start_time_offset: Duration,

    /// Length of one reward epoch in seconds.
    epoch_duration: u64,

    /// Interval in seconds after which the reward emission is halved.
    halving_duration: u64,

    /// Window in seconds after staking during which withdrawals are fined.
    fine_duration: u64,

    /// Fine applied to early withdrawals, in percent.
    fine_percentage: u64,

    /// Token addresses keyed by network name.
    #[serde(default)]
    networks: BTreeMap<String, Network>,
}

fn default_start_time_offset() -> Duration {
    DEFAULT_START_TIME_OFFSET
}

/// The two recognized sources for the staking start time.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum StartTimeSource {
    /// Current wall-clock time plus the configured offset.
    #[default]
    ComputedOffset,
    /// The `start-time` value from the configuration file.
    FixedConfigured,
}

/// Resolved start time setting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartTime {
    ComputedOffset(Duration),
    FixedConfigured(u64),
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Network {
    /// Chain the network is expected to run on. When set, deploying against a
    /// node reporting a different chain ID fails before anything is sent.
    pub chain_id: Option<u64>,
    pub dld_address: Address,
    pub dls_address: Address,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub rewards_per_epoch: U256,
    pub start_time: StartTime,
    pub epoch_duration: u64,
    pub halving_duration: u64,
    pub fine_duration: u64,
    pub fine_percentage: u64,
    pub networks: BTreeMap<String, Network>,
}

impl Config {
    /// Returns the addresses configured for the named network.
    pub fn network(&self, name: &str) -> Result<&Network, UnknownNetwork> {
        self.networks
            .get(name)
            .ok_or_else(|| UnknownNetwork(name.to_owned()))
    }
}

#[derive(Debug, thiserror::Error)]
#[error("no token addresses configured for network {0:?}")]
pub struct UnknownNetwork(pub String);

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error while reading {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse TOML config at {path:?}: {details}")]
    Parse { path: PathBuf, details: String },
    #[error("start-time-source is fixed-configured but start-time is not set")]
    MissingStartTime,
    #[error("start-time-offset of {0:?} does not fit in a unix timestamp")]
    StartTimeOffset(Duration),
}

/// Load the deployment configuration from a TOML file.
pub async fn load(path: &Path) -> Result<Config, Error> {
    let data = fs::read_to_string(path)
        .await
        .map_err(|source| Error::Io {
            path: path.to_owned(),
            source,
        })?;
    from_toml(&data, path)
}

/// Parse the deployment configuration. `path` is only used for error
/// reporting.
pub fn from_toml(data: &str, path: &Path) -> Result<Config, Error> {
    let file = toml::de::from_str::<File>(data).map_err(|err| Error::Parse {
        path: path.to_owned(),
        details: parse_error_details(err),
    })?;

    let start_time = match file.start_time_source {
        StartTimeSource::ComputedOffset => {
            let offset = file.start_time_offset;
            if i64::try_from(offset.as_secs()).is_err() {
                return Err(Error::StartTimeOffset(offset));
            }
            StartTime::ComputedOffset(offset)
        }
        StartTimeSource::FixedConfigured => {
            StartTime::FixedConfigured(file.start_time.ok_or(Error::MissingStartTime)?)
        }
    };

    Ok(Config {
        rewards_per_epoch: file.rewards_per_epoch,
        start_time,
        epoch_duration: file.epoch_duration,
        halving_duration: file.halving_duration,
        fine_duration: file.fine_duration,
        fine_percentage: file.fine_percentage,
        networks: file.networks,
    })
}

/// Detailed TOML errors quote the offending input, which may contain secrets.
fn parse_error_details<E: Debug>(err: E) -> String {
    if std::env::var("TOML_TRACE_ERROR").is_ok_and(|v| v == "1") {
        format!("{err:#?}")
    } else {
        "set TOML_TRACE_ERROR=1 to print parsing error but this may leak secrets".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use {super::*, alloy::primitives::address};

    const FULL: &str = r#"
        rewards-per-epoch = "1000000000000000000000"
        start-time = 1650000000
        start-time-source = "fixed-configured"
        epoch-duration = 86400
        halving-duration = 15552000
        fine-duration = 2592000
        fine-percentage = 20

        [networks.bscTestnet]
        chain-id = 97
        dld-address = "0x1111111111111111111111111111111111111111"
        dls-address = "0x2222222222222222222222222222222222222222"

        [networks.hardhat]
        dld-address = "0x3333333333333333333333333333333333333333"
        dls-address = "0x4444444444444444444444444444444444444444"
    "#;

    fn parse(toml: &str) -> Result<Config, Error> {
        from_toml(toml, Path::new("test.toml"))
    }

    #[test]
    fn deserialize_full() {
        let config = parse(FULL).unwrap();

        assert_eq!(
            config.rewards_per_epoch,
            U256::from(1_000_000_000_000_000_000_000u128)
        );
        assert_eq!(config.start_time, StartTime::FixedConfigured(1_650_000_000));
        assert_eq!(config.epoch_duration, 86_400);
        assert_eq!(config.halving_duration, 15_552_000);
        assert_eq!(config.fine_duration, 2_592_000);
        assert_eq!(config.fine_percentage, 20);
        assert_eq!(
            config.network("bscTestnet").unwrap(),
            &Network {
                chain_id: Some(97),
                dld_address: address!("0x1111111111111111111111111111111111111111"),
                dls_address: address!("0x2222222222222222222222222222222222222222"),
            }
        );
        assert_eq!(config.network("hardhat").unwrap().chain_id, None);
    }

    #[test]
    fn start_time_defaults_to_computed_offset() {
        let config = parse(
            r#"
            rewards-per-epoch = "10"
            epoch-duration = 1
            halving-duration = 2
            fine-duration = 3
            fine-percentage = 4
            "#,
        )
        .unwrap();

        assert_eq!(
            config.start_time,
            StartTime::ComputedOffset(Duration::from_secs(60))
        );
        assert!(config.networks.is_empty());
    }

    #[test]
    fn custom_start_time_offset() {
        let config = parse(
            r#"
            rewards-per-epoch = "10"
            start-time = 1650000000
            start-time-offset = "5m"
            epoch-duration = 1
            halving-duration = 2
            fine-duration = 3
            fine-percentage = 4
            "#,
        )
        .unwrap();

        // A configured start time is ignored unless explicitly selected.
        assert_eq!(
            config.start_time,
            StartTime::ComputedOffset(Duration::from_secs(300))
        );
    }

    #[test]
    fn fixed_start_time_requires_value() {
        let err = parse(
            r#"
            rewards-per-epoch = "10"
            start-time-source = "fixed-configured"
            epoch-duration = 1
            halving-duration = 2
            fine-duration = 3
            fine-percentage = 4
            "#,
        )
        .unwrap_err();

        assert!(matches!(err, Error::MissingStartTime));
    }

    #[test]
    fn rejects_out_of_range_start_time_offset() {
        let err = parse(
            r#"
            rewards-per-epoch = "10"
            start-time-offset = "584542046050y"
            epoch-duration = 1
            halving-duration = 2
            fine-duration = 3
            fine-percentage = 4
            "#,
        )
        .unwrap_err();

        assert!(matches!(err, Error::StartTimeOffset(_)));
    }

    #[test]
    fn rejects_unknown_fields() {
        let err = parse(
            r#"
            rewards-per-epoch = "10"
            epoch-duration = 1
            halving-duration = 2
            fine-duration = 3
            fine-percentage = 4
            halving-percentage = 50
            "#,
        )
        .unwrap_err();

        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn unknown_network_fails_closed() {
        let config = parse(FULL).unwrap();

        let err = config.network("mainnet").unwrap_err();
        assert_eq!(err.0, "mainnet");
        assert_eq!(
            err.to_string(),
            r#"no token addresses configured for network "mainnet""#
        );
    }

    #[test]
    fn example_config_is_valid() {
        let config = parse(include_str!("../config/example.toml")).unwrap();

        assert_eq!(
            config.start_time,
            StartTime::ComputedOffset(Duration::from_secs(60))
        );
        assert_eq!(config.network("hardhat").unwrap().chain_id, Some(31337));
    }

    #[tokio::test]
    async fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        let err = load(&path).await.unwrap_err();
        assert!(matches!(err, Error::Io { path: p, .. } if p == path));
    }

    #[tokio::test]
    async fn load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deploy.toml");
        std::fs::write(&path, FULL).unwrap();

        let config = load(&path).await.unwrap();
        assert_eq!(config.networks.len(), 2);
    }
}
