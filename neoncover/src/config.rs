//! Configuration file and environment overrides.
//!
//! The config lives at `~/.neoncover/config.json`. Every field is optional on
//! disk; missing fields fall back to the Neon EVM DevNet defaults. Environment
//! variables override the file.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::contracts::ContractAddresses;
use crate::error::{ConfigError, ConfigResult};
use crate::network::NetworkDescriptor;
use crate::provider::{LocalKeyProvider, LocalKeyProviderBuilder};
use crate::session::default_dir;

/// Overrides the RPC endpoint.
pub const ENV_RPC_URL: &str = "NEONCOVER_RPC_URL";
/// Overrides the insurance contract address.
pub const ENV_INSURANCE_ADDRESS: &str = "NEONCOVER_INSURANCE_ADDRESS";
/// Overrides the token contract address.
pub const ENV_TOKEN_ADDRESS: &str = "NEONCOVER_TOKEN_ADDRESS";
/// Supplies the wallet mnemonic.
pub const ENV_MNEMONIC: &str = "NEONCOVER_MNEMONIC";
/// Supplies the wallet private key.
pub const ENV_PRIVATE_KEY: &str = "NEONCOVER_PRIVATE_KEY";

/// Path of the default config file.
#[must_use]
pub fn config_path() -> PathBuf {
    default_dir().join("config.json")
}

/// Load the config file at `path`, then apply environment overrides.
pub async fn load_config(path: &Path) -> ConfigResult<CoverConfig> {
    let mut config = CoverConfig::load(path).await?;
    config.apply_env()?;
    Ok(config)
}

/// Write a default config file at `path` unless one exists.
///
/// Returns `false` when the file was already there.
pub async fn init_config(path: &Path) -> ConfigResult<bool> {
    if path.exists() {
        debug!(path = %path.display(), "config already exists");
        return Ok(false);
    }
    CoverConfig::default().save(path).await?;
    info!(path = %path.display(), "config created");
    Ok(true)
}

/// Local signing key settings.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    /// BIP39 mnemonic. Takes precedence over `private_key`.
    pub mnemonic: Option<String>,
    /// Optional BIP39 passphrase.
    pub passphrase: Option<String>,
    /// HD derivation index.
    pub index: u32,
    /// Hex private key.
    pub private_key: Option<String>,
}

impl fmt::Debug for WalletConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletConfig")
            .field("mnemonic", &self.mnemonic.as_ref().map(|_| "<redacted>"))
            .field("index", &self.index)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

/// Client configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverConfig {
    /// Target network.
    pub network: NetworkDescriptor,
    /// RPC endpoint; defaults to the network's first RPC URL.
    pub rpc_url: Option<String>,
    /// Deployed insurance contract.
    pub insurance_address: Option<Address>,
    /// Deployed pool token contract.
    pub token_address: Option<Address>,
    /// Directory of the persisted session; defaults to `~/.neoncover`.
    pub session_dir: Option<PathBuf>,
    /// Local signing key.
    pub wallet: WalletConfig,
}

impl CoverConfig {
    /// Read a config file. A missing file yields the defaults.
    pub async fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = tokio::fs::read_to_string(path).await?;
        let config = serde_json::from_str(&content)?;
        debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Write the config as pretty JSON, creating parent directories.
    pub async fn save(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, serde_json::to_string_pretty(self)?).await?;
        Ok(())
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) -> ConfigResult<()> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`, keyed by the `NEONCOVER_*` names.
    pub fn apply_vars(&mut self, lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<()> {
        let parse_address = |key: &str, value: String| {
            value
                .trim()
                .parse::<Address>()
                .map_err(|e| ConfigError::invalid(format!("{key}: {e}")))
        };

        if let Some(url) = lookup(ENV_RPC_URL) {
            self.rpc_url = Some(url);
        }
        if let Some(value) = lookup(ENV_INSURANCE_ADDRESS) {
            self.insurance_address = Some(parse_address(ENV_INSURANCE_ADDRESS, value)?);
        }
        if let Some(value) = lookup(ENV_TOKEN_ADDRESS) {
            self.token_address = Some(parse_address(ENV_TOKEN_ADDRESS, value)?);
        }
        if let Some(mnemonic) = lookup(ENV_MNEMONIC) {
            self.wallet.mnemonic = Some(mnemonic);
        }
        if let Some(key) = lookup(ENV_PRIVATE_KEY) {
            self.wallet.private_key = Some(key);
        }
        Ok(())
    }

    /// The effective RPC endpoint.
    #[must_use]
    pub fn rpc_url(&self) -> Option<&str> {
        self.rpc_url.as_deref().or_else(|| self.network.rpc_url())
    }

    /// The effective RPC endpoint, or an error naming the missing setting.
    pub fn require_rpc_url(&self) -> ConfigResult<&str> {
        self.rpc_url()
            .ok_or_else(|| ConfigError::missing("rpc_url (or network.rpcUrls)"))
    }

    /// Both contract addresses, when both are set.
    #[must_use]
    pub fn contract_addresses(&self) -> Option<ContractAddresses> {
        Some(ContractAddresses {
            insurance: self.insurance_address?,
            token: self.token_address?,
        })
    }

    /// Directory of the persisted session.
    #[must_use]
    pub fn session_dir(&self) -> PathBuf {
        self.session_dir.clone().unwrap_or_else(default_dir)
    }

    /// Whether a signing key is configured.
    #[must_use]
    pub const fn has_wallet(&self) -> bool {
        self.wallet.mnemonic.is_some() || self.wallet.private_key.is_some()
    }

    /// Builder for the local key provider, starting on the target network.
    ///
    /// The provider is pre-authorized, the way a browser wallet remembers a
    /// site permission between page loads.
    #[must_use]
    pub fn key_provider_builder(&self) -> LocalKeyProviderBuilder {
        let mut builder = LocalKeyProvider::builder()
            .index(self.wallet.index)
            .chain_id(self.network.chain_id)
            .network(self.network.clone())
            .authorized(true);
        if let Some(ref mnemonic) = self.wallet.mnemonic {
            builder = builder.mnemonic(mnemonic.clone());
        }
        if let Some(ref passphrase) = self.wallet.passphrase {
            builder = builder.passphrase(passphrase.clone());
        }
        if let Some(ref key) = self.wallet.private_key {
            builder = builder.private_key(key.clone());
        }
        builder
    }

    /// Check the config for problems.
    #[must_use]
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        match self.rpc_url() {
            None => issues.push(ConfigIssue::error("rpc_url", "no RPC endpoint configured")),
            Some(url) if !(url.starts_with("http://") || url.starts_with("https://")) => {
                issues.push(ConfigIssue::error(
                    "rpc_url",
                    format!("'{url}' is not an http(s) URL"),
                ));
            }
            Some(_) => {}
        }

        match (self.insurance_address, self.token_address) {
            (Some(_), Some(_)) => {}
            (None, None) => issues.push(ConfigIssue::warning(
                "contracts",
                "contract addresses not set; contract commands are unavailable",
            )),
            (Some(_), None) => issues.push(ConfigIssue::error(
                "token_address",
                "insurance address is set without a token address",
            )),
            (None, Some(_)) => issues.push(ConfigIssue::error(
                "insurance_address",
                "token address is set without an insurance address",
            )),
        }

        if !self.has_wallet() {
            issues.push(ConfigIssue::warning(
                "wallet",
                "no mnemonic or private key; wallet commands are unavailable",
            ));
        } else if self.wallet.mnemonic.is_some() && self.wallet.private_key.is_some() {
            issues.push(ConfigIssue::warning(
                "wallet",
                "both mnemonic and private key set; the mnemonic is used",
            ));
        }

        if usize::from(self.network.native_currency.decimals) != crate::units::TOKEN_DECIMALS {
            issues.push(ConfigIssue::warning(
                "network.nativeCurrency.decimals",
                "amounts are displayed assuming 18 decimals",
            ));
        }

        issues
    }
}

/// Severity of a [`ConfigIssue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IssueLevel {
    /// Usable, with reduced functionality.
    Warning,
    /// Not usable.
    Error,
}

/// A problem found by [`CoverConfig::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    /// Severity.
    pub level: IssueLevel,
    /// Offending field.
    pub field: &'static str,
    /// Description.
    pub message: String,
}

impl ConfigIssue {
    fn error(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            level: IssueLevel::Error,
            field,
            message: message.into(),
        }
    }

    fn warning(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            level: IssueLevel::Warning,
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.level {
            IssueLevel::Warning => "warning",
            IssueLevel::Error => "error",
        };
        write!(f, "{level}: {}: {}", self.field, self.message)
    }
}
