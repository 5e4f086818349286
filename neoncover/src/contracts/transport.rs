//! Contract transport: raw calls, transaction submission and confirmation.

use alloy::network::{Ethereum, ReceiptResponse, TransactionBuilder};
use alloy::primitives::{Address, Bytes, Log, TxHash, U256};
use alloy::providers::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::{ContractError, ContractResult};

/// A mined transaction, reduced to what the wrappers decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    /// Transaction hash.
    pub tx_hash: TxHash,
    /// Whether execution succeeded.
    pub success: bool,
    /// Emitted logs, in order.
    pub logs: Vec<Log>,
}

/// The read/write path to deployed contracts.
#[async_trait]
pub trait ContractTransport: Send + Sync {
    /// Execute a read-only call and return the raw return data.
    async fn call(&self, to: Address, data: Bytes) -> ContractResult<Bytes>;

    /// Sign and broadcast a transaction, returning its hash.
    async fn send(&self, to: Address, data: Bytes, value: U256) -> ContractResult<TxHash>;

    /// Block until the transaction is mined and return its receipt.
    async fn confirm(&self, tx_hash: TxHash) -> ContractResult<TxReceipt>;
}

/// [`ContractTransport`] over an alloy JSON-RPC provider.
pub struct RpcTransport {
    provider: DynProvider<Ethereum>,
    from: Option<Address>,
}

impl std::fmt::Debug for RpcTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcTransport")
            .field("from", &self.from)
            .finish_non_exhaustive()
    }
}

impl RpcTransport {
    /// Read-only transport; `send` will be rejected by the node.
    pub async fn read_only(rpc_url: &str) -> ContractResult<Self> {
        let provider = ProviderBuilder::new()
            .connect(rpc_url)
            .await
            .map_err(|e| connect_failed(rpc_url, e))?
            .erased();
        Ok(Self {
            provider,
            from: None,
        })
    }

    /// Signing transport that fills nonce, gas and chain id for `signer`.
    pub async fn with_signer(signer: PrivateKeySigner, rpc_url: &str) -> ContractResult<Self> {
        let from = signer.address();
        let provider = ProviderBuilder::new()
            .wallet(signer)
            .connect(rpc_url)
            .await
            .map_err(|e| connect_failed(rpc_url, e))?
            .erased();
        info!(from = %from, rpc_url, "signing transport ready");
        Ok(Self {
            provider,
            from: Some(from),
        })
    }

    /// The sending account, if this transport signs.
    #[must_use]
    pub const fn sender(&self) -> Option<Address> {
        self.from
    }

    fn request(&self, to: Address, data: Bytes) -> TransactionRequest {
        let tx = TransactionRequest::default().with_to(to).with_input(data);
        match self.from {
            Some(from) => tx.with_from(from),
            None => tx,
        }
    }
}

#[async_trait]
impl ContractTransport for RpcTransport {
    async fn call(&self, to: Address, data: Bytes) -> ContractResult<Bytes> {
        self.provider
            .call(self.request(to, data))
            .await
            .map_err(|e| ContractError::transport(format!("call to {to} failed: {e}")))
    }

    async fn send(&self, to: Address, data: Bytes, value: U256) -> ContractResult<TxHash> {
        let tx = self.request(to, data).with_value(value);
        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| ContractError::transport(format!("send failed: {e}")))?;
        let tx_hash = *pending.tx_hash();
        debug!(tx_hash = %tx_hash, to = %to, "transaction sent");
        Ok(tx_hash)
    }

    async fn confirm(&self, tx_hash: TxHash) -> ContractResult<TxReceipt> {
        let receipt = PendingTransactionBuilder::new(self.provider.root().clone(), tx_hash)
            .get_receipt()
            .await
            .map_err(|e| ContractError::transport(format!("receipt for {tx_hash} failed: {e}")))?;

        let logs = receipt
            .inner
            .logs()
            .iter()
            .map(|log| log.inner.clone())
            .collect();
        let success = ReceiptResponse::status(&receipt);
        debug!(tx_hash = %tx_hash, success, "transaction confirmed");

        Ok(TxReceipt {
            tx_hash: receipt.transaction_hash,
            success,
            logs,
        })
    }
}

fn connect_failed(rpc_url: &str, e: impl std::fmt::Display) -> ContractError {
    ContractError::transport(format!("failed to connect to '{rpc_url}': {e}"))
}
