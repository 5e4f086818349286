//! Insurance and token contract access.
//!
//! [`CoverContracts`] turns user intents into contract calls over a
//! [`ContractTransport`]. Writes are awaited to confirmation one at a time;
//! reads decode base-unit integers into display strings.

#[allow(missing_docs)]
pub mod bindings;
mod client;
mod transport;
mod types;

pub use client::CoverContracts;
pub use transport::{ContractTransport, RpcTransport, TxReceipt};
pub use types::{AccountOverview, ContractAddresses, PolicyDetails, PoolStats, TxOutcome};
