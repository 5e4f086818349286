//! Native balance reads against the network's JSON-RPC endpoint.
//!
//! Balances never go through the account provider, so they can be read for
//! any address without a connected wallet.

use alloy::network::Ethereum;
use alloy::primitives::{Address, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use async_trait::async_trait;
use tracing::debug;

use crate::error::{CoverError, Result};

/// Source of native-currency balances.
#[async_trait]
pub trait BalanceReader: Send + Sync {
    /// Balance of `address` in base units.
    async fn native_balance(&self, address: Address) -> Result<U256>;
}

/// [`BalanceReader`] over an HTTP JSON-RPC endpoint.
pub struct RpcBalanceReader {
    provider: DynProvider<Ethereum>,
    url: String,
}

impl std::fmt::Debug for RpcBalanceReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcBalanceReader")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl RpcBalanceReader {
    /// Connect to the endpoint at `url`.
    pub async fn connect(url: &str) -> Result<Self> {
        let provider = ProviderBuilder::new()
            .connect(url)
            .await
            .map_err(|e| CoverError::rpc(format!("failed to connect to '{url}': {e}")))?
            .erased();
        Ok(Self {
            provider,
            url: url.to_owned(),
        })
    }

    /// The endpoint URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl BalanceReader for RpcBalanceReader {
    async fn native_balance(&self, address: Address) -> Result<U256> {
        debug!(address = %address, url = %self.url, "querying native balance");
        self.provider
            .get_balance(address)
            .await
            .map_err(|e| CoverError::rpc(format!("failed to get balance: {e}")))
    }
}
