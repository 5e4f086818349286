//! Neoncover - wallet session and contract-call client for the SecurePool
//! insurance DApp on Neon EVM.
//!
//! # Architecture
//!
//! - **Provider** ([`provider`]) - EIP-1193 account provider trait, event hub,
//!   and a local-key implementation
//! - **Wallet** ([`wallet`]) - Connect flow with network registration/switching
//! - **Session** ([`session`]) - Session state holder with pluggable persistence
//! - **Contracts** ([`contracts`]) - Insurance and token contract wrappers
//! - **Config** ([`config`]) - JSON config file with environment overrides
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use neoncover::prelude::*;
//! use std::sync::Arc;
//!
//! let config = load_config(&config_path()).await?;
//! let provider = Arc::new(config.key_provider_builder().build()?);
//! let balances = Arc::new(RpcBalanceReader::connect(config.require_rpc_url()?).await?);
//! let adapter = WalletAdapter::new(Some(provider), balances);
//!
//! let mut session = WalletSession::new(adapter, FileStore::new(config.session_dir()));
//! session.initialize().await?;
//! session.connect_wallet().await?;
//! ```

pub mod balance;
pub mod config;
pub mod contracts;
pub mod error;
pub mod network;
pub mod provider;
pub mod session;
pub mod units;
pub mod wallet;

#[cfg(test)]
mod testing;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{
        ConfigError, ConfigResult, ContractError, CoverError, ErrorKind, LiquidityStep,
        ProviderError, ProviderErrorKind, Result, StorageError, UnitsError,
    };

    pub use crate::balance::{BalanceReader, RpcBalanceReader};
    pub use crate::config::{
        ConfigIssue, CoverConfig, IssueLevel, WalletConfig, config_path, init_config, load_config,
    };
    pub use crate::contracts::{
        AccountOverview, ContractAddresses, ContractTransport, CoverContracts, PolicyDetails,
        PoolStats, RpcTransport, TxOutcome, TxReceipt,
    };
    pub use crate::network::{NEON_DEVNET_CHAIN_ID, NativeCurrency, NetworkDescriptor};
    pub use crate::provider::{
        EventHub, InjectedProvider, LocalKeyProvider, ProviderEvent, Subscription, SubscriptionId,
    };
    pub use crate::session::{
        FileStore, MemoryStore, PersistedSession, Session, SessionPhase, SessionStore,
        WalletSession,
    };
    pub use crate::units::{to_base_units, to_display};
    pub use crate::wallet::{ConnectedWallet, WalletAdapter};
}

pub use error::{CoverError, Result};
