//! Wallet session state holder.

use alloy::primitives::Address;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::storage::{PersistedSession, SessionStore};
use crate::error::{CoverError, ErrorKind, Result};
use crate::provider::{ProviderEvent, Subscription};
use crate::wallet::{ConnectedWallet, WalletAdapter};

/// Lifecycle phase of a [`Session`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionPhase {
    /// No wallet connected.
    #[default]
    Disconnected,
    /// A connect is in flight.
    Connecting,
    /// A wallet is connected.
    Connected,
}

/// In-memory wallet session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Connected account.
    pub address: Option<Address>,
    /// Native balance, display string.
    pub balance: String,
    /// Whether a wallet is connected.
    pub connected: bool,
    /// Whether a connect is in flight.
    pub loading: bool,
    /// User-facing message of the last failed connect.
    pub error: Option<String>,
    /// Classification of the last failed connect.
    pub error_kind: Option<ErrorKind>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            address: None,
            balance: "0".into(),
            connected: false,
            loading: false,
            error: None,
            error_kind: None,
        }
    }
}

impl Session {
    fn connected(address: Address, balance: String) -> Self {
        Self {
            address: Some(address),
            balance,
            connected: true,
            ..Self::default()
        }
    }

    fn failed(err: &CoverError) -> Self {
        Self {
            error: Some(err.user_message().to_owned()),
            error_kind: Some(err.kind()),
            ..Self::default()
        }
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        if self.loading {
            SessionPhase::Connecting
        } else if self.connected {
            SessionPhase::Connected
        } else {
            SessionPhase::Disconnected
        }
    }

    fn persisted(&self) -> Option<PersistedSession> {
        let address = self.address.filter(|_| self.connected)?;
        Some(PersistedSession {
            address: address.to_string(),
            balance: self.balance.clone(),
            is_connected: true,
        })
    }
}

/// Owns the wallet session and keeps it in step with the provider and the
/// session store.
///
/// ```rust,ignore
/// let mut session = WalletSession::new(adapter, FileStore::default_path());
/// session.initialize().await?;
/// session.attach()?;
/// if !session.session().connected {
///     session.connect_wallet().await?;
/// }
/// ```
pub struct WalletSession {
    adapter: WalletAdapter,
    store: Arc<dyn SessionStore>,
    session: Session,
    subscription: Option<Subscription>,
}

impl std::fmt::Debug for WalletSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletSession")
            .field("session", &self.session)
            .field("attached", &self.subscription.is_some())
            .finish_non_exhaustive()
    }
}

impl WalletSession {
    /// Create a session over `adapter`, persisted in `store`.
    pub fn new(adapter: WalletAdapter, store: impl SessionStore + 'static) -> Self {
        Self::with_store(adapter, Arc::new(store))
    }

    /// Create a session over a shared store.
    #[must_use]
    pub fn with_store(adapter: WalletAdapter, store: Arc<dyn SessionStore>) -> Self {
        Self {
            adapter,
            store,
            session: Session::default(),
            subscription: None,
        }
    }

    /// Current session state.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        self.session.phase()
    }

    /// The underlying adapter.
    #[must_use]
    pub const fn adapter(&self) -> &WalletAdapter {
        &self.adapter
    }

    /// Run the full connect flow and persist the result.
    ///
    /// On failure the session returns to `Disconnected` with the error
    /// recorded and any persisted session removed. Nothing is retried.
    pub async fn connect_wallet(&mut self) -> Result<ConnectedWallet> {
        self.session.loading = true;
        self.session.error = None;
        self.session.error_kind = None;

        match self.adapter.connect().await {
            Ok(wallet) => {
                self.session = Session::connected(wallet.address, wallet.balance.clone());
                self.persist().await;
                Ok(wallet)
            }
            Err(e) => {
                error!(error = %e, "error connecting wallet");
                self.session = Session::failed(&e);
                if let Err(clear) = self.store.clear().await {
                    warn!(error = %clear, "error clearing session after failed connect");
                }
                Err(e)
            }
        }
    }

    /// Clear the in-memory and persisted session. Idempotent.
    pub async fn disconnect_wallet(&mut self) -> Result<()> {
        let was_connected = self.session.connected;
        self.session = Session::default();
        self.store.clear().await?;
        if was_connected {
            info!("wallet disconnected");
        }
        Ok(())
    }

    /// Re-read the balance of the connected account.
    ///
    /// Updates memory only. Failures are logged and leave the previous value.
    pub async fn refresh_balance(&mut self) {
        let Some(address) = self.session.address.filter(|_| self.session.connected) else {
            return;
        };
        match self.adapter.get_balance(address).await {
            Ok(balance) => {
                debug!(address = %address, balance = %balance, "balance refreshed");
                self.session.balance = balance;
            }
            Err(e) => warn!(error = %e, address = %address, "error refreshing balance"),
        }
    }

    /// Restore a persisted session if the provider still exposes its account.
    ///
    /// The balance is read again rather than taken from the store. Anything
    /// that cannot be trusted (unparseable data, a disconnected record, a
    /// different or missing provider account, an unreadable balance) is
    /// removed from the store.
    pub async fn initialize(&mut self) -> Result<()> {
        let persisted = match self.store.load().await {
            Ok(Some(persisted)) => persisted,
            Ok(None) => return Ok(()),
            Err(e) => {
                warn!(error = %e, "discarding unreadable session data");
                self.store.clear().await?;
                return Ok(());
            }
        };

        let Some(address) = persisted
            .address
            .parse::<Address>()
            .ok()
            .filter(|_| persisted.is_connected)
        else {
            warn!(address = %persisted.address, "discarding invalid session data");
            self.store.clear().await?;
            return Ok(());
        };

        match self.adapter.get_address().await {
            Some(current) if current == address => {}
            current => {
                info!(persisted = %address, current = ?current, "persisted session is stale");
                self.session = Session::default();
                self.store.clear().await?;
                return Ok(());
            }
        }

        match self.adapter.get_balance(address).await {
            Ok(balance) => {
                info!(address = %address, balance = %balance, "session restored");
                self.session = Session::connected(address, balance);
            }
            Err(e) => {
                warn!(error = %e, address = %address, "discarding session, balance unavailable");
                self.session = Session::default();
                self.store.clear().await?;
            }
        }
        Ok(())
    }

    /// React to one provider event.
    pub async fn handle_event(&mut self, event: ProviderEvent) -> Result<()> {
        match event {
            ProviderEvent::AccountsChanged(accounts) => match accounts.first() {
                None => self.disconnect_wallet().await,
                Some(&first) if Some(first) != self.session.address => {
                    info!(address = %first, "account changed, reconnecting");
                    self.connect_wallet().await.map(drop)
                }
                Some(_) => Ok(()),
            },
            ProviderEvent::ChainChanged(chain_id) => {
                info!(chain_id = %chain_id, "chain changed, resyncing");
                self.resync().await
            }
        }
    }

    /// Drop all in-memory state and initialize again from the store.
    pub async fn resync(&mut self) -> Result<()> {
        self.session = Session::default();
        self.initialize().await
    }

    /// Start listening to provider events. A no-op when already attached.
    pub fn attach(&mut self) -> Result<()> {
        if self.subscription.is_none() {
            self.subscription = Some(self.adapter.subscribe()?);
        }
        Ok(())
    }

    /// Stop listening. Removes only this session's subscription.
    pub fn detach(&mut self) -> bool {
        self.subscription
            .take()
            .is_some_and(|sub| self.adapter.unsubscribe(sub.id()))
    }

    /// Whether the session is listening to provider events.
    #[must_use]
    pub const fn is_attached(&self) -> bool {
        self.subscription.is_some()
    }

    /// Handle every queued event without waiting. Returns how many ran.
    pub async fn pump_events(&mut self) -> Result<usize> {
        let mut handled = 0;
        while let Some(event) = self.subscription.as_mut().and_then(Subscription::try_recv) {
            self.handle_event(event).await?;
            handled += 1;
        }
        Ok(handled)
    }

    /// Wait for the next event and handle it.
    ///
    /// Returns `false` when not attached or the provider went away.
    pub async fn next_event(&mut self) -> Result<bool> {
        let Some(subscription) = self.subscription.as_mut() else {
            return Ok(false);
        };
        let Some(event) = subscription.recv().await else {
            return Ok(false);
        };
        self.handle_event(event).await?;
        Ok(true)
    }

    async fn persist(&self) {
        let Some(persisted) = self.session.persisted() else {
            return;
        };
        if let Err(e) = self.store.save(&persisted).await {
            warn!(error = %e, "error saving session");
        }
    }
}
