use crate::{
    error::{Result, TodoError},
    types::DeleteAllMode,
};
use alloy_primitives::{Address, FixedBytes};
use alloy_signer_local::PrivateKeySigner;
use serde::{Deserialize, Serialize};
use std::{env, fmt, time::Duration};
use url::Url;

/// BNB Smart Chain testnet seed node the todo-list contract was deployed on.
pub const DEFAULT_RPC_URL: &str = "https://data-seed-prebsc-1-s1.binance.org:8545";
pub const DEFAULT_CONTRACT_ADDRESS: &str = "0xe82D1C7E9640d71679DA8f60A0d891279fE8f051";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub network: NetworkConfig,
    pub contract: ContractConfig,
    /// Account used as `from` for calls; always equal to the signer address when one is set.
    pub wallet_address: Option<Address>,
    pub signer: Option<SignerConfig>,
    pub timing: TimingConfig,
    pub delete_all_mode: DeleteAllMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub rpc_url: Url,
    /// Fixed chain id. When unset the id is fetched from the node for every transaction.
    pub chain_id: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractConfig {
    pub todo_list: Address,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SignerConfig {
    #[serde(skip_serializing)]
    pub private_key: String,
    pub address: Address,
}

impl fmt::Debug for SignerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignerConfig")
            .field("private_key", &"<redacted>")
            .field("address", &self.address)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    pub delete_interval_seconds: u64,
    pub receipt_poll_interval_ms: u64,
    pub receipt_timeout_seconds: u64,
}

impl TimingConfig {
    #[must_use]
    pub const fn delete_interval(&self) -> Duration {
        Duration::from_secs(self.delete_interval_seconds)
    }

    #[must_use]
    pub const fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_interval_ms)
    }

    #[must_use]
    pub const fn receipt_timeout(&self) -> Duration {
        Duration::from_secs(self.receipt_timeout_seconds)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            delete_interval_seconds: 5,
            receipt_poll_interval_ms: 1000,
            receipt_timeout_seconds: 60,
        }
    }
}

/// Builds a signer from a hex private key, with or without the `0x` prefix.
pub fn parse_private_key(private_key: &str) -> Result<PrivateKeySigner> {
    let raw = private_key.trim();
    let raw = raw.strip_prefix("0x").unwrap_or(raw);

    PrivateKeySigner::from_bytes(&FixedBytes::<32>::try_from(hex::decode(raw)?.as_slice())?)
        .map_err(|e| TodoError::Signer(e.to_string()))
}

impl SignerConfig {
    pub fn from_private_key(private_key: impl Into<String>) -> Result<Self> {
        let private_key = private_key.into();
        let address = parse_private_key(&private_key)?.address();

        Ok(Self {
            private_key,
            address,
        })
    }

    pub fn signer(&self) -> Result<PrivateKeySigner> {
        parse_private_key(&self.private_key)
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok().filter(|value| !value.trim().is_empty()))
    }

    /// Same as [`Config::from_env`] but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let rpc_url = lookup("TODO_RPC_URL").unwrap_or_else(|| DEFAULT_RPC_URL.to_string());
        let rpc_url = Url::parse(&rpc_url)
            .map_err(|e| TodoError::Config(format!("Invalid TODO_RPC_URL: {e}")))?;

        let chain_id = lookup("TODO_CHAIN_ID")
            .map(|s| s.parse::<u64>())
            .transpose()
            .map_err(|e| TodoError::Config(format!("Invalid TODO_CHAIN_ID: {e}")))?;

        let todo_list = lookup("TODO_CONTRACT_ADDRESS")
            .unwrap_or_else(|| DEFAULT_CONTRACT_ADDRESS.to_string())
            .parse::<Address>()
            .map_err(|e| TodoError::InvalidAddress(format!("Invalid contract address: {e}")))?;

        let wallet_address = lookup("TODO_WALLET_ADDRESS")
            .map(|s| s.parse::<Address>())
            .transpose()
            .map_err(|e| TodoError::InvalidAddress(format!("Invalid wallet address: {e}")))?;

        let signer = lookup("TODO_WALLET_PRIVATE_KEY")
            .map(SignerConfig::from_private_key)
            .transpose()?;

        if let (Some(signer), Some(wallet_address)) = (&signer, wallet_address) {
            if signer.address != wallet_address {
                return Err(TodoError::Config(format!(
                    "Private key address ({}) does not match TODO_WALLET_ADDRESS ({})",
                    signer.address, wallet_address
                )));
            }
        }

        let defaults = TimingConfig::default();
        let timing = TimingConfig {
            delete_interval_seconds: parse_or(
                &lookup,
                "TODO_DELETE_INTERVAL_SECS",
                defaults.delete_interval_seconds,
            )?,
            receipt_poll_interval_ms: parse_or(
                &lookup,
                "TODO_RECEIPT_POLL_MS",
                defaults.receipt_poll_interval_ms,
            )?,
            receipt_timeout_seconds: parse_or(
                &lookup,
                "TODO_RECEIPT_TIMEOUT_SECS",
                defaults.receipt_timeout_seconds,
            )?,
        };

        let delete_all_mode = lookup("TODO_DELETE_ALL_MODE")
            .map(|s| s.parse::<DeleteAllMode>())
            .transpose()?
            .unwrap_or_default();

        let config = Self {
            network: NetworkConfig { rpc_url, chain_id },
            contract: ContractConfig { todo_list },
            wallet_address: signer.as_ref().map(|s| s.address).or(wallet_address),
            signer,
            timing,
            delete_all_mode,
        };
        config.validate()?;

        Ok(config)
    }

    /// Attaches a signing key, replacing any previous one.
    pub fn with_private_key(mut self, private_key: impl Into<String>) -> Result<Self> {
        let signer = SignerConfig::from_private_key(private_key)?;
        self.wallet_address = Some(signer.address);
        self.signer = Some(signer);
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.contract.todo_list == Address::ZERO {
            return Err(TodoError::Config(
                "Todo list contract address is required".to_string(),
            ));
        }

        if !matches!(self.network.rpc_url.scheme(), "http" | "https") {
            return Err(TodoError::Config(format!(
                "Unsupported RPC URL scheme: {}",
                self.network.rpc_url.scheme()
            )));
        }

        if self.timing.receipt_poll_interval_ms == 0 {
            return Err(TodoError::Config(
                "Receipt polling interval must be greater than 0".to_string(),
            ));
        }

        if let Some(signer) = &self.signer {
            if self.wallet_address != Some(signer.address) {
                return Err(TodoError::Config(
                    "Wallet address must match the configured signer".to_string(),
                ));
            }
        }

        Ok(())
    }
}

fn parse_or<F>(lookup: &F, key: &str, default: u64) -> Result<u64>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).map_or(Ok(default), |value| {
        value
            .trim()
            .parse()
            .map_err(|e| TodoError::Config(format!("Invalid {key}: {e}")))
    })
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: NetworkConfig {
                rpc_url: Url::parse(DEFAULT_RPC_URL).unwrap(),
                chain_id: None,
            },
            contract: ContractConfig {
                todo_list: DEFAULT_CONTRACT_ADDRESS.parse().unwrap(),
            },
            wallet_address: None,
            signer: None,
            timing: TimingConfig::default(),
            delete_all_mode: DeleteAllMode::default(),
        }
    }
}
