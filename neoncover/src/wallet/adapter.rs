//! Wallet provider adapter.
//!
//! Wraps an [`InjectedProvider`] with the connect flow used by the session:
//! request account access, make sure the provider is on the target network
//! (registering the network if the provider does not know it), then read the
//! native balance through the direct RPC path.

use alloy::primitives::Address;
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::balance::BalanceReader;
use crate::error::{CoverError, ProviderError, ProviderErrorKind, Result};
use crate::network::NetworkDescriptor;
use crate::provider::{InjectedProvider, Subscription, SubscriptionId, methods};
use crate::units;

/// Account and balance returned by a successful connect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectedWallet {
    /// First exposed account.
    pub address: Address,
    /// Native balance, display string.
    pub balance: String,
}

/// Connect, query and subscribe on top of an injected provider.
pub struct WalletAdapter {
    provider: Option<Arc<dyn InjectedProvider>>,
    balances: Arc<dyn BalanceReader>,
    network: NetworkDescriptor,
}

impl std::fmt::Debug for WalletAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletAdapter")
            .field("has_provider", &self.provider.is_some())
            .field("chain_id", &self.network.chain_id)
            .finish_non_exhaustive()
    }
}

impl WalletAdapter {
    /// Create an adapter targeting the Neon EVM DevNet.
    ///
    /// `provider` is `None` when no wallet is installed; every provider
    /// operation then fails with [`CoverError::NoProvider`].
    pub fn new(
        provider: Option<Arc<dyn InjectedProvider>>,
        balances: Arc<dyn BalanceReader>,
    ) -> Self {
        Self {
            provider,
            balances,
            network: NetworkDescriptor::neon_devnet(),
        }
    }

    /// Target a different network.
    #[must_use]
    pub fn with_network(mut self, network: NetworkDescriptor) -> Self {
        self.network = network;
        self
    }

    /// The target network.
    #[must_use]
    pub const fn network(&self) -> &NetworkDescriptor {
        &self.network
    }

    /// Whether a provider is attached.
    #[must_use]
    pub const fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    fn provider(&self) -> Result<&Arc<dyn InjectedProvider>> {
        self.provider.as_ref().ok_or(CoverError::NoProvider)
    }

    /// Request account access and move the provider onto the target network.
    pub async fn connect(&self) -> Result<ConnectedWallet> {
        let provider = self.provider()?;

        let accounts = provider
            .request(methods::REQUEST_ACCOUNTS, json!([]))
            .await
            .map_err(|e| {
                error!(error = %e, "account request failed");
                request_failed(e)
            })?;
        let address = *parse_accounts(accounts)?
            .first()
            .ok_or(CoverError::NoAccounts)?;

        self.ensure_network(&**provider).await?;

        let balance = self.get_balance(address).await?;
        info!(address = %address, balance = %balance, "wallet connected");
        Ok(ConnectedWallet { address, balance })
    }

    async fn ensure_network(&self, provider: &dyn InjectedProvider) -> Result<()> {
        let current = provider
            .request(methods::CHAIN_ID, json!([]))
            .await
            .map_err(|e| self.switch_failed(e))?;
        if current
            .as_str()
            .is_some_and(|hex| self.network.matches_chain_id(hex))
        {
            debug!(chain_id = self.network.chain_id, "already on target network");
            return Ok(());
        }

        match self.switch(provider).await {
            Err(e) if e.kind() == ProviderErrorKind::UnrecognizedChain => {
                info!(
                    chain_id = self.network.chain_id,
                    name = %self.network.chain_name,
                    "registering network with provider",
                );
                provider
                    .request(methods::ADD_CHAIN, self.network.add_chain_params())
                    .await
                    .map_err(|e| self.switch_failed(e))?;
                self.switch(provider).await.map_err(|e| self.switch_failed(e))
            }
            other => other.map_err(|e| self.switch_failed(e)),
        }
    }

    async fn switch(
        &self,
        provider: &dyn InjectedProvider,
    ) -> std::result::Result<(), ProviderError> {
        provider
            .request(methods::SWITCH_CHAIN, self.network.switch_chain_params())
            .await?;
        info!(chain_id = self.network.chain_id, "switched to target network");
        Ok(())
    }

    fn switch_failed(&self, e: ProviderError) -> CoverError {
        error!(error = %e, chain_id = self.network.chain_id, "network switch failed");
        if e.kind() == ProviderErrorKind::UserRejected {
            CoverError::UserRejected
        } else {
            CoverError::NetworkSwitch {
                chain_id: self.network.chain_id_hex(),
                source: e,
            }
        }
    }

    /// First exposed account, or `None`. Never fails.
    pub async fn get_address(&self) -> Option<Address> {
        let provider = self.provider.as_ref()?;
        let accounts = match provider.request(methods::ACCOUNTS, json!([])).await {
            Ok(accounts) => accounts,
            Err(e) => {
                warn!(error = %e, "error reading accounts");
                return None;
            }
        };
        match parse_accounts(accounts) {
            Ok(accounts) => accounts.first().copied(),
            Err(e) => {
                warn!(error = %e, "error reading accounts");
                None
            }
        }
    }

    /// Native balance of `address` as a display string.
    ///
    /// Reads from the RPC endpoint directly, so no prior connect is needed.
    pub async fn get_balance(&self, address: Address) -> Result<String> {
        let wei = self.balances.native_balance(address).await.map_err(|e| {
            error!(error = %e, address = %address, "error getting balance");
            e
        })?;
        Ok(units::to_display(wei))
    }

    /// Whether the provider currently exposes an account.
    pub async fn is_connected(&self) -> bool {
        self.get_address().await.is_some()
    }

    /// Subscribe to provider events.
    pub fn subscribe(&self) -> Result<Subscription> {
        Ok(self.provider()?.events().subscribe())
    }

    /// Remove exactly the subscription `id`.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.provider
            .as_ref()
            .is_some_and(|p| p.events().unsubscribe(id))
    }
}

fn request_failed(e: ProviderError) -> CoverError {
    match e.kind() {
        ProviderErrorKind::UserRejected => CoverError::UserRejected,
        _ => CoverError::Provider(e),
    }
}

fn parse_accounts(value: Value) -> Result<Vec<Address>> {
    serde_json::from_value(value)
        .map_err(|e| ProviderError::internal(format!("malformed accounts response: {e}")).into())
}
