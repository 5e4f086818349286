//! Plain result objects returned by the contract wrappers.

use alloy::primitives::{Address, TxHash};
use serde::{Deserialize, Serialize};

/// Addresses of the deployed contracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractAddresses {
    /// The insurance contract.
    pub insurance: Address,
    /// The pool token contract.
    pub token: Address,
}

/// Result of a confirmed write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TxOutcome {
    /// Hash of the (last) confirmed transaction.
    pub tx_hash: TxHash,
    /// Identifier of a newly purchased policy, when one was emitted.
    pub policy_id: Option<u64>,
}

impl TxOutcome {
    pub(crate) const fn new(tx_hash: TxHash) -> Self {
        Self {
            tx_hash,
            policy_id: None,
        }
    }
}

/// Decoded policy record. Amounts are display strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyDetails {
    /// Policy id.
    pub id: u64,
    /// Policy holder.
    pub policyholder: Address,
    /// Covered amount.
    pub coverage_amount: String,
    /// Premium paid at purchase.
    pub premium_paid: String,
    /// Coverage start, unix seconds.
    pub start_time: u64,
    /// Coverage end, unix seconds.
    pub end_time: u64,
    /// Whether the policy is active.
    pub is_active: bool,
    /// Whether a claim has been paid.
    pub claimed: bool,
    /// Risk category.
    pub risk_type: String,
}

/// Capital pool figures. Amounts are display strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolStats {
    /// Total deposited capital.
    pub total_deposits: String,
    /// Capital not backing any policy.
    pub available_liquidity: String,
    /// Capital backing active policies.
    pub locked_liquidity: String,
    /// Rewards distributed to providers.
    pub total_rewards: String,
}

/// Independent reads for one account, fetched together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountOverview {
    /// Pool figures.
    pub pool: PoolStats,
    /// Pool token balance of the account.
    pub token_balance: String,
    /// Policies held by the account.
    pub policy_ids: Vec<u64>,
}
