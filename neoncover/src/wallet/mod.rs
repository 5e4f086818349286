//! Wallet access on top of an injected account provider.

mod adapter;

pub use adapter::{ConnectedWallet, WalletAdapter};
