//! Network selection from the environment.

use std::{env, fmt, path::PathBuf, str::FromStr};

use alloy_primitives::Address;
use thiserror::Error;

pub const APP_ENV_VAR: &str = "APP_ENV";
pub const RPC_URL_VAR: &str = "RPC_URL";
pub const CONTRACT_ADDRESS_VAR: &str = "CONTRACT_ADDRESS";
pub const PRIV_KEY_PATH_VAR: &str = "PRIV_KEY_PATH";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown network `{0}`")]
    UnknownNetwork(String),

    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{name} is not a valid address: {value}")]
    InvalidAddress { name: &'static str, value: String },
}

/// Which deployment the page talks to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Network {
    /// A local development node.
    Local,
    /// The public test network.
    #[default]
    Development,
    Production,
}

impl Network {
    pub fn chain_id(self) -> u64 {
        match self {
            Network::Local => 412_346,
            Network::Development => 421_614,
            Network::Production => 42_161,
        }
    }

    pub fn default_rpc_url(self) -> &'static str {
        match self {
            Network::Local => "http://localhost:8547",
            Network::Development => "https://sepolia-rollup.arbitrum.io/rpc",
            Network::Production => "https://arb1.arbitrum.io/rpc",
        }
    }
}

impl FromStr for Network {
    type Err = ConfigError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_ascii_lowercase().as_str() {
            "production" | "mainnet" => Ok(Network::Production),
            "development" | "testnet" => Ok(Network::Development),
            "local" | "test" | "ci" => Ok(Network::Local),
            _ => Err(ConfigError::UnknownNetwork(name.to_string())),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Network::Local => "local",
            Network::Development => "development",
            Network::Production => "production",
        };
        f.write_str(name)
    }
}

/// Everything needed to bind the page to a deployed contract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkConfig {
    pub network: Network,
    pub chain_id: u64,
    pub rpc_url: String,
    pub contract_address: Address,
    /// File holding the hex-encoded private key used to sign in.
    pub key_path: Option<PathBuf>,
}

impl NetworkConfig {
    pub fn new(network: Network, contract_address: Address) -> Self {
        Self {
            network,
            chain_id: network.chain_id(),
            rpc_url: network.default_rpc_url().to_string(),
            contract_address,
            key_path: None,
        }
    }

    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name
    /// to its value. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let network = match var(APP_ENV_VAR) {
            Some(name) => name.parse()?,
            None => Network::default(),
        };
        let address = var(CONTRACT_ADDRESS_VAR).ok_or(ConfigError::Missing(CONTRACT_ADDRESS_VAR))?;
        let contract_address =
            address
                .trim()
                .parse::<Address>()
                .map_err(|_| ConfigError::InvalidAddress {
                    name: CONTRACT_ADDRESS_VAR,
                    value: address.clone(),
                })?;

        let mut config = Self::new(network, contract_address);
        if let Some(rpc_url) = var(RPC_URL_VAR) {
            config.rpc_url = rpc_url;
        }
        config.key_path = var(PRIV_KEY_PATH_VAR).map(PathBuf::from);
        Ok(config)
    }
}
