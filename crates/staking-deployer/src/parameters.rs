use {
    crate::config::{Config, Network, StartTime},
    alloy::{
        primitives::{Address, U256},
        sol_types::SolValue,
    },
    chrono::{DateTime, Utc},
};

/// Solidity types of the staking constructor, in declaration order.
pub const CONSTRUCTOR_TYPES: [&str; 8] = [
    "uint256", "uint256", "uint256", "uint256", "uint256", "uint256", "address", "address",
];

/// ABI representation of the staking constructor arguments.
pub type ConstructorArgs = (U256, U256, U256, U256, U256, U256, Address, Address);

/// Arguments passed to the staking contract constructor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeploymentParameters {
    pub rewards_per_epoch: U256,
    pub start_time: u64,
    pub epoch_duration: u64,
    pub halving_duration: u64,
    pub fine_duration: u64,
    pub fine_percentage: u64,
    pub dld_address: Address,
    pub dls_address: Address,
}

impl DeploymentParameters {
    pub fn new(config: &Config, network: &Network, start_time: u64) -> Self {
        Self {
            rewards_per_epoch: config.rewards_per_epoch,
            start_time,
            epoch_duration: config.epoch_duration,
            halving_duration: config.halving_duration,
            fine_duration: config.fine_duration,
            fine_percentage: config.fine_percentage,
            dld_address: network.dld_address,
            dls_address: network.dls_address,
        }
    }

    /// The arguments in the order the constructor declares them.
    pub fn constructor_args(&self) -> ConstructorArgs {
        (
            self.rewards_per_epoch,
            U256::from(self.start_time),
            U256::from(self.epoch_duration),
            U256::from(self.halving_duration),
            U256::from(self.fine_duration),
            U256::from(self.fine_percentage),
            self.dld_address,
            self.dls_address,
        )
    }

    /// ABI encoded constructor arguments, to be appended to the creation code.
    pub fn abi_encode(&self) -> Vec<u8> {
        self.constructor_args().abi_encode_params()
    }
}

impl StartTime {
    /// Unix timestamp in seconds at which staking should start, given the
    /// current time. `None` if the offset overflows the timestamp.
    pub fn resolve(&self, now: DateTime<Utc>) -> Option<u64> {
        match self {
            Self::ComputedOffset(offset) => unix_seconds(now).checked_add(offset.as_secs()),
            Self::FixedConfigured(timestamp) => Some(*timestamp),
        }
    }
}

/// Rounds to the nearest second. Times before the epoch map to 0.
fn unix_seconds(time: DateTime<Utc>) -> u64 {
    let millis = u64::try_from(time.timestamp_millis()).unwrap_or_default();
    (millis + 500) / 1000
}
