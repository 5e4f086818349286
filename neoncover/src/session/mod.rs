//! Wallet session state and persistence.
//!
//! [`WalletSession`] is the single owner of the session. It drives the
//! wallet adapter, mirrors the connected state into a [`SessionStore`], and
//! reconciles the two when it starts and whenever the provider reports an
//! account or chain change.

mod manager;
mod storage;

pub use manager::{Session, SessionPhase, WalletSession};
pub use storage::{FileStore, MemoryStore, PersistedSession, STORAGE_KEY, SessionStore};

pub(crate) use storage::default_dir;
