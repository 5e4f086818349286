//! Account provider abstraction.
//!
//! An account provider is the component that owns the user's keys and
//! answers EIP-1193 `request` calls: a browser wallet extension, or the
//! in-process [`LocalKeyProvider`].
//!
//! ```text
//! InjectedProvider
//!   ├── request(method, params) → JSON result | ProviderError
//!   └── events()                → EventHub (subscribe / unsubscribe / emit)
//! ```

mod events;
mod local;

pub use events::{EventHub, ProviderEvent, Subscription, SubscriptionId};
pub use local::{LocalKeyProvider, LocalKeyProviderBuilder};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ProviderError;

/// EIP-1193 / EIP-3085 / EIP-3326 method names used by this crate.
pub mod methods {
    /// Prompt the user to expose accounts.
    pub const REQUEST_ACCOUNTS: &str = "eth_requestAccounts";
    /// Accounts already exposed, without prompting.
    pub const ACCOUNTS: &str = "eth_accounts";
    /// Active chain id.
    pub const CHAIN_ID: &str = "eth_chainId";
    /// Register a network with the provider.
    pub const ADD_CHAIN: &str = "wallet_addEthereumChain";
    /// Make a registered network active.
    pub const SWITCH_CHAIN: &str = "wallet_switchEthereumChain";
}

/// An EIP-1193 account provider.
#[async_trait]
pub trait InjectedProvider: Send + Sync {
    /// Issue a request to the provider.
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError>;

    /// The provider's event stream.
    fn events(&self) -> &EventHub;
}
