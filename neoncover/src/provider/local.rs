//! In-process account provider backed by a local signer.
//!
//! [`LocalKeyProvider`] behaves like a browser wallet extension that holds a
//! single account: it exposes the account on `eth_requestAccounts`, keeps a
//! registry of networks added through `wallet_addEthereumChain`, tracks the
//! active chain, and emits `accountsChanged` / `chainChanged` on its
//! [`EventHub`].

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

use super::events::{EventHub, ProviderEvent};
use super::{InjectedProvider, methods};
use crate::error::{ConfigError, ProviderError};
use crate::network::{NativeCurrency, NetworkDescriptor, parse_chain_id};

/// Chain a fresh provider starts on.
const DEFAULT_CHAIN_ID: u64 = 1;

/// Builder for constructing a [`LocalKeyProvider`].
///
/// ```rust,ignore
/// let provider = LocalKeyProvider::builder()
///     .mnemonic("abandon abandon ...")
///     .index(0)
///     .build()?;
/// ```
#[derive(Debug, Default)]
pub struct LocalKeyProviderBuilder {
    mnemonic: Option<String>,
    passphrase: Option<String>,
    index: u32,
    private_key: Option<String>,
    chain_id: Option<u64>,
    networks: Vec<NetworkDescriptor>,
    authorized: bool,
}

impl LocalKeyProviderBuilder {
    /// Set the BIP39 mnemonic phrase for HD key derivation.
    #[must_use]
    pub fn mnemonic(mut self, mnemonic: impl Into<String>) -> Self {
        self.mnemonic = Some(mnemonic.into());
        self
    }

    /// Set the BIP39 passphrase.
    #[must_use]
    pub fn passphrase(mut self, passphrase: impl Into<String>) -> Self {
        self.passphrase = Some(passphrase.into());
        self
    }

    /// Set the HD derivation index (default 0).
    #[must_use]
    pub const fn index(mut self, index: u32) -> Self {
        self.index = index;
        self
    }

    /// Set the private key directly (hex, with or without `0x`).
    #[must_use]
    pub fn private_key(mut self, key: impl Into<String>) -> Self {
        self.private_key = Some(key.into());
        self
    }

    /// Chain the provider starts on (default 1).
    #[must_use]
    pub const fn chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    /// Pre-register a network, as if it had been added earlier.
    #[must_use]
    pub fn network(mut self, network: NetworkDescriptor) -> Self {
        self.networks.push(network);
        self
    }

    /// Expose the account without a prior `eth_requestAccounts`, like a
    /// wallet that remembers an earlier site permission.
    #[must_use]
    pub const fn authorized(mut self, authorized: bool) -> Self {
        self.authorized = authorized;
        self
    }

    /// Build the provider. Either `mnemonic` or `private_key` must be set.
    pub fn build(self) -> Result<LocalKeyProvider, ConfigError> {
        let signer = if let Some(ref mnemonic) = self.mnemonic {
            self.signer_from_mnemonic(mnemonic)?
        } else if let Some(ref key) = self.private_key {
            signer_from_private_key(key)?
        } else {
            return Err(ConfigError::missing("either mnemonic or private_key"));
        };

        let active_chain_id = self.chain_id.unwrap_or(DEFAULT_CHAIN_ID);
        let networks = self
            .networks
            .into_iter()
            .map(|n| (n.chain_id, n))
            .collect();

        info!(
            address = %signer.address(),
            chain_id = active_chain_id,
            "local key provider initialized",
        );

        Ok(LocalKeyProvider {
            signer,
            state: Mutex::new(LocalState {
                authorized: self.authorized,
                active_chain_id,
                networks,
            }),
            events: EventHub::new(),
        })
    }

    fn signer_from_mnemonic(&self, mnemonic: &str) -> Result<PrivateKeySigner, ConfigError> {
        let wallet = kobe::Wallet::from_mnemonic(mnemonic, self.passphrase.as_deref())
            .map_err(|e| ConfigError::invalid(format!("invalid mnemonic: {e}")))?;

        let deriver = kobe_eth::Deriver::new(&wallet);
        let derived = deriver
            .derive(self.index)
            .map_err(|e| ConfigError::invalid(format!("key derivation failed: {e}")))?;

        let key_hex = &*derived.private_key_hex;
        key_hex
            .parse::<PrivateKeySigner>()
            .map_err(|e| ConfigError::invalid(format!("signer creation failed: {e}")))
    }
}

fn signer_from_private_key(key: &str) -> Result<PrivateKeySigner, ConfigError> {
    let key = key.strip_prefix("0x").unwrap_or(key);
    key.parse::<PrivateKeySigner>()
        .map_err(|e| ConfigError::invalid(format!("invalid private key: {e}")))
}

#[derive(Debug)]
struct LocalState {
    authorized: bool,
    active_chain_id: u64,
    networks: HashMap<u64, NetworkDescriptor>,
}

/// An [`InjectedProvider`] holding one local account.
pub struct LocalKeyProvider {
    signer: PrivateKeySigner,
    state: Mutex<LocalState>,
    events: EventHub,
}

impl std::fmt::Debug for LocalKeyProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalKeyProvider")
            .field("address", &self.signer.address())
            .finish_non_exhaustive()
    }
}

impl LocalKeyProvider {
    /// Create a builder.
    #[must_use]
    pub fn builder() -> LocalKeyProviderBuilder {
        LocalKeyProviderBuilder::default()
    }

    /// The account address.
    #[must_use]
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// The underlying signer, for building a signing transport.
    #[must_use]
    pub const fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }

    /// Currently active chain id.
    #[must_use]
    pub fn active_chain_id(&self) -> u64 {
        self.lock().active_chain_id
    }

    /// Descriptor of the active chain, if it was registered.
    #[must_use]
    pub fn active_network(&self) -> Option<NetworkDescriptor> {
        let state = self.lock();
        state.networks.get(&state.active_chain_id).cloned()
    }

    /// Withdraw the site permission, as a user locking the wallet would.
    pub fn revoke(&self) {
        let was_authorized = std::mem::replace(&mut self.lock().authorized, false);
        if was_authorized {
            info!("local key provider permission revoked");
            self.events.emit(&ProviderEvent::AccountsChanged(Vec::new()));
        }
    }

    fn exposed_accounts(&self) -> Value {
        if self.lock().authorized {
            json!([self.address().to_string()])
        } else {
            json!([])
        }
    }

    fn add_chain(&self, params: Value) -> Result<Value, ProviderError> {
        let param: AddChainParam = first_param(params)?;
        let chain_id = parse_chain_id(&param.chain_id)
            .ok_or_else(|| ProviderError::invalid_params("chainId must be 0x-prefixed hex"))?;
        let network = NetworkDescriptor {
            chain_id,
            chain_name: param.chain_name,
            rpc_urls: param.rpc_urls,
            native_currency: param.native_currency,
            block_explorer_urls: param.block_explorer_urls,
        };
        debug!(chain_id, name = %network.chain_name, "network registered");
        self.lock().networks.insert(chain_id, network);
        Ok(Value::Null)
    }

    fn switch_chain(&self, params: Value) -> Result<Value, ProviderError> {
        let param: SwitchChainParam = first_param(params)?;
        let chain_id = parse_chain_id(&param.chain_id)
            .ok_or_else(|| ProviderError::invalid_params("chainId must be 0x-prefixed hex"))?;

        let changed = {
            let mut state = self.lock();
            if chain_id != state.active_chain_id && !state.networks.contains_key(&chain_id) {
                return Err(ProviderError::unrecognized_chain(&param.chain_id));
            }
            std::mem::replace(&mut state.active_chain_id, chain_id) != chain_id
        };

        if changed {
            info!(chain_id, "active chain switched");
            self.events
                .emit(&ProviderEvent::ChainChanged(format!("{chain_id:#x}")));
        }
        Ok(Value::Null)
    }

    fn lock(&self) -> MutexGuard<'_, LocalState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl InjectedProvider for LocalKeyProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        debug!(method, "local provider request");
        match method {
            methods::REQUEST_ACCOUNTS => {
                self.lock().authorized = true;
                Ok(self.exposed_accounts())
            }
            methods::ACCOUNTS => Ok(self.exposed_accounts()),
            methods::CHAIN_ID => Ok(Value::String(format!("{:#x}", self.active_chain_id()))),
            methods::ADD_CHAIN => self.add_chain(params),
            methods::SWITCH_CHAIN => self.switch_chain(params),
            other => Err(ProviderError::unsupported(other)),
        }
    }

    fn events(&self) -> &EventHub {
        &self.events
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddChainParam {
    chain_id: String,
    chain_name: String,
    rpc_urls: Vec<String>,
    native_currency: NativeCurrency,
    #[serde(default)]
    block_explorer_urls: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SwitchChainParam {
    chain_id: String,
}

fn first_param<T: DeserializeOwned>(params: Value) -> Result<T, ProviderError> {
    serde_json::from_value::<Vec<T>>(params)
        .map_err(|e| ProviderError::invalid_params(e.to_string()))?
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::invalid_params("expected one parameter object"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorKind;

    // Anvil's first development key.
    const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const TEST_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    fn provider() -> LocalKeyProvider {
        LocalKeyProvider::builder()
            .private_key(TEST_KEY)
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_requires_key() {
        let err = LocalKeyProvider::builder().build().unwrap_err();
        assert!(matches!(err, ConfigError::Missing(_)));

        let err = LocalKeyProvider::builder()
            .private_key("not-hex")
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[tokio::test]
    async fn test_accounts_require_permission() {
        let provider = provider();
        assert_eq!(provider.address(), TEST_ADDRESS.parse::<Address>().unwrap());

        let accounts = provider.request(methods::ACCOUNTS, json!([])).await.unwrap();
        assert_eq!(accounts, json!([]));

        let accounts = provider
            .request(methods::REQUEST_ACCOUNTS, json!([]))
            .await
            .unwrap();
        assert_eq!(accounts, json!([TEST_ADDRESS]));

        let accounts = provider.request(methods::ACCOUNTS, json!([])).await.unwrap();
        assert_eq!(accounts, json!([TEST_ADDRESS]));
    }

    #[tokio::test]
    async fn test_switch_unknown_chain_then_add() {
        let provider = provider();
        let neon = NetworkDescriptor::neon_devnet();
        let mut sub = provider.events().subscribe();

        let err = provider
            .request(methods::SWITCH_CHAIN, neon.switch_chain_params())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ProviderErrorKind::UnrecognizedChain);

        provider
            .request(methods::ADD_CHAIN, neon.add_chain_params())
            .await
            .unwrap();
        provider
            .request(methods::SWITCH_CHAIN, neon.switch_chain_params())
            .await
            .unwrap();

        assert_eq!(provider.active_chain_id(), neon.chain_id);
        assert_eq!(provider.active_network(), Some(neon.clone()));
        assert_eq!(
            sub.try_recv(),
            Some(ProviderEvent::ChainChanged(neon.chain_id_hex()))
        );

        let chain = provider.request(methods::CHAIN_ID, json!([])).await.unwrap();
        assert_eq!(chain, json!("0xe9ac0ce"));
    }

    #[tokio::test]
    async fn test_revoke_emits_empty_accounts() {
        let provider = LocalKeyProvider::builder()
            .private_key(TEST_KEY)
            .authorized(true)
            .build()
            .unwrap();
        let mut sub = provider.events().subscribe();

        provider.revoke();
        provider.revoke();

        assert_eq!(sub.try_recv(), Some(ProviderEvent::AccountsChanged(vec![])));
        assert_eq!(sub.try_recv(), None);
        let accounts = provider.request(methods::ACCOUNTS, json!([])).await.unwrap();
        assert_eq!(accounts, json!([]));
    }

    #[tokio::test]
    async fn test_unsupported_method() {
        let err = provider()
            .request("eth_sign", json!([]))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ProviderErrorKind::Unsupported);
    }
}
