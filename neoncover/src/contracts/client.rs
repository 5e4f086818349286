//! Typed wrappers around the insurance and token contracts.

use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::sol_types::{SolCall, SolEvent};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::bindings::{IFaucetToken, ISecurePoolInsurance};
use super::transport::{ContractTransport, TxReceipt};
use super::types::{AccountOverview, ContractAddresses, PolicyDetails, PoolStats, TxOutcome};
use crate::error::{ContractError, ContractResult, CoverError, LiquidityStep, Result};
use crate::units;

/// Client for the deployed insurance and token contracts.
///
/// Every write is submitted, then awaited until confirmed, before the
/// wrapper returns. Nothing is retried.
pub struct CoverContracts {
    transport: Arc<dyn ContractTransport>,
    addresses: Option<ContractAddresses>,
}

impl std::fmt::Debug for CoverContracts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoverContracts")
            .field("addresses", &self.addresses)
            .finish_non_exhaustive()
    }
}

impl CoverContracts {
    /// Create a client with no contract addresses configured.
    pub fn new(transport: impl ContractTransport + 'static) -> Self {
        Self::from_arc(Arc::new(transport))
    }

    /// Create a client over a shared transport.
    #[must_use]
    pub fn from_arc(transport: Arc<dyn ContractTransport>) -> Self {
        Self {
            transport,
            addresses: None,
        }
    }

    /// Set the deployed contract addresses.
    pub fn set_contract_addresses(&mut self, insurance: Address, token: Address) {
        info!(insurance = %insurance, token = %token, "contract addresses configured");
        self.addresses = Some(ContractAddresses { insurance, token });
    }

    /// Builder-style [`set_contract_addresses`](Self::set_contract_addresses).
    #[must_use]
    pub fn with_addresses(mut self, addresses: ContractAddresses) -> Self {
        self.set_contract_addresses(addresses.insurance, addresses.token);
        self
    }

    /// Configured addresses, if any.
    #[must_use]
    pub const fn addresses(&self) -> Option<ContractAddresses> {
        self.addresses
    }

    fn configured(&self) -> Result<ContractAddresses> {
        self.addresses.ok_or(CoverError::NotConfigured)
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    /// Purchase a policy.
    ///
    /// Reads the premium for `coverage_amount` and `duration`, submits the
    /// purchase with that premium attached, waits for confirmation and
    /// returns the id carried by the `PolicyPurchased` event.
    pub async fn purchase_policy(
        &self,
        coverage_amount: &str,
        duration: u64,
        risk_type: &str,
    ) -> Result<TxOutcome> {
        let addrs = self.configured()?;
        self.try_purchase(addrs.insurance, coverage_amount, duration, risk_type)
            .await
            .map_err(|e| {
                error!(error = %e, "error purchasing policy");
                CoverError::PurchaseFailed(e)
            })
    }

    async fn try_purchase(
        &self,
        insurance: Address,
        coverage_amount: &str,
        duration: u64,
        risk_type: &str,
    ) -> ContractResult<TxOutcome> {
        let coverage = units::to_base_units(coverage_amount)?;
        let duration = U256::from(duration);
        let premium = self.premium(insurance, coverage, duration).await?;
        debug!(coverage = %coverage, premium = %premium, "premium computed");

        let call = ISecurePoolInsurance::purchasePolicyCall {
            coverageAmount: coverage,
            duration,
            riskType: risk_type.to_owned(),
        };
        let receipt = self.submit(insurance, call.abi_encode(), premium).await?;

        let policy_id = receipt
            .logs
            .iter()
            .filter(|log| log.address == insurance)
            .filter(|log| {
                log.topics().first() == Some(&ISecurePoolInsurance::PolicyPurchased::SIGNATURE_HASH)
            })
            .map(|log| ISecurePoolInsurance::PolicyPurchased::decode_log_data(&log.data))
            .next()
            .transpose()?
            .map(|event| to_u64(event.policyId, "policy id"))
            .transpose()?;

        match policy_id {
            Some(id) => info!(policy_id = id, tx_hash = %receipt.tx_hash, "policy purchased"),
            None => warn!(
                tx_hash = %receipt.tx_hash,
                "purchase confirmed without PolicyPurchased event"
            ),
        }

        Ok(TxOutcome {
            tx_hash: receipt.tx_hash,
            policy_id,
        })
    }

    /// Submit a claim against a policy.
    pub async fn submit_claim(
        &self,
        policy_id: u64,
        claim_amount: &str,
        evidence: &str,
    ) -> Result<TxOutcome> {
        let addrs = self.configured()?;
        self.try_claim(addrs.insurance, policy_id, claim_amount, evidence)
            .await
            .map_err(|e| {
                error!(error = %e, policy_id, "error submitting claim");
                CoverError::ClaimFailed(e)
            })
    }

    async fn try_claim(
        &self,
        insurance: Address,
        policy_id: u64,
        claim_amount: &str,
        evidence: &str,
    ) -> ContractResult<TxOutcome> {
        let call = ISecurePoolInsurance::submitClaimCall {
            policyId: U256::from(policy_id),
            claimAmount: units::to_base_units(claim_amount)?,
            evidence: evidence.to_owned(),
        };
        let receipt = self.submit(insurance, call.abi_encode(), U256::ZERO).await?;
        info!(policy_id, tx_hash = %receipt.tx_hash, "claim submitted");
        Ok(TxOutcome::new(receipt.tx_hash))
    }

    /// Deposit pool tokens as liquidity.
    ///
    /// Approves the insurance contract for `amount`, waits for that approval
    /// to be confirmed, then deposits. A failed deposit leaves the approval
    /// in place; the error reports which step failed.
    pub async fn provide_liquidity(&self, amount: &str) -> Result<TxOutcome> {
        let addrs = self.configured()?;
        let fail = |step: LiquidityStep, approve_tx: Option<TxHash>, e: ContractError| {
            error!(error = %e, %step, "error providing liquidity");
            CoverError::LiquidityFailed {
                step,
                approve_tx,
                source: e,
            }
        };

        let amount = units::to_base_units(amount)
            .map_err(|e| fail(LiquidityStep::Approve, None, e.into()))?;

        let approve = IFaucetToken::approveCall {
            spender: addrs.insurance,
            amount,
        };
        let approved = self
            .submit(addrs.token, approve.abi_encode(), U256::ZERO)
            .await
            .map_err(|e| fail(LiquidityStep::Approve, None, e))?;
        debug!(tx_hash = %approved.tx_hash, "allowance approved");

        let deposit = ISecurePoolInsurance::provideLiquidityCall { amount };
        let deposited = self
            .submit(addrs.insurance, deposit.abi_encode(), U256::ZERO)
            .await
            .map_err(|e| fail(LiquidityStep::Deposit, Some(approved.tx_hash), e))?;

        info!(amount = %amount, tx_hash = %deposited.tx_hash, "liquidity provided");
        Ok(TxOutcome::new(deposited.tx_hash))
    }

    /// Withdraw previously deposited liquidity.
    pub async fn withdraw_liquidity(&self, amount: &str) -> Result<TxOutcome> {
        let addrs = self.configured()?;
        let receipt = self
            .try_withdraw(addrs.insurance, amount)
            .await
            .map_err(|e| {
                error!(error = %e, "error withdrawing liquidity");
                CoverError::LiquidityFailed {
                    step: LiquidityStep::Withdraw,
                    approve_tx: None,
                    source: e,
                }
            })?;
        info!(tx_hash = %receipt.tx_hash, "liquidity withdrawn");
        Ok(TxOutcome::new(receipt.tx_hash))
    }

    async fn try_withdraw(&self, insurance: Address, amount: &str) -> ContractResult<TxReceipt> {
        let call = ISecurePoolInsurance::withdrawLiquidityCall {
            amount: units::to_base_units(amount)?,
        };
        self.submit(insurance, call.abi_encode(), U256::ZERO).await
    }

    /// Mint test tokens to the sender through the token faucet.
    pub async fn use_faucet(&self) -> Result<TxOutcome> {
        let addrs = self.configured()?;
        let receipt = self
            .submit(addrs.token, IFaucetToken::faucetCall {}.abi_encode(), U256::ZERO)
            .await
            .map_err(|e| {
                error!(error = %e, "error using faucet");
                CoverError::FaucetFailed(e)
            })?;
        info!(tx_hash = %receipt.tx_hash, "faucet used");
        Ok(TxOutcome::new(receipt.tx_hash))
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Premium for a coverage amount and duration, as a display string.
    pub async fn calculate_premium(&self, coverage_amount: &str, duration: u64) -> Result<String> {
        let addrs = self.configured()?;
        self.premium_for(addrs.insurance, coverage_amount, duration)
            .await
            .map(units::to_display)
            .map_err(|e| read_failed("premium", e))
    }

    /// Ids of the policies held by `user`.
    pub async fn get_user_policies(&self, user: Address) -> Result<Vec<u64>> {
        let addrs = self.configured()?;
        self.user_policies(addrs.insurance, user)
            .await
            .map_err(|e| read_failed("user policies", e))
    }

    /// Full record of one policy.
    pub async fn get_policy_details(&self, policy_id: u64) -> Result<PolicyDetails> {
        let addrs = self.configured()?;
        self.policy(addrs.insurance, policy_id)
            .await
            .map_err(|e| read_failed("policy details", e))
    }

    /// Capital pool figures.
    pub async fn get_capital_pool_stats(&self) -> Result<PoolStats> {
        let addrs = self.configured()?;
        self.pool_stats(addrs.insurance)
            .await
            .map_err(|e| read_failed("capital pool stats", e))
    }

    /// Pool token balance of `user`, as a display string.
    pub async fn get_token_balance(&self, user: Address) -> Result<String> {
        let addrs = self.configured()?;
        self.token_balance(addrs.token, user)
            .await
            .map_err(|e| read_failed("token balance", e))
    }

    /// Allowance `owner` has granted the insurance contract, as a display string.
    pub async fn get_token_allowance(&self, owner: Address) -> Result<String> {
        let addrs = self.configured()?;
        self.allowance(addrs.token, owner, addrs.insurance)
            .await
            .map(units::to_display)
            .map_err(|e| read_failed("token allowance", e))
    }

    /// Pool stats, token balance and policy ids for `user`, read concurrently.
    pub async fn account_overview(&self, user: Address) -> Result<AccountOverview> {
        let addrs = self.configured()?;
        let (pool, token_balance, policy_ids) = futures::try_join!(
            self.pool_stats(addrs.insurance),
            self.token_balance(addrs.token, user),
            self.user_policies(addrs.insurance, user),
        )
        .map_err(|e| read_failed("account overview", e))?;

        Ok(AccountOverview {
            pool,
            token_balance,
            policy_ids,
        })
    }

    // ------------------------------------------------------------------
    // Single round-trips
    // ------------------------------------------------------------------

    async fn premium(
        &self,
        insurance: Address,
        coverage: U256,
        duration: U256,
    ) -> ContractResult<U256> {
        let call = ISecurePoolInsurance::calculatePremiumCall {
            coverageAmount: coverage,
            duration,
        };
        let raw = self.read(insurance, call.abi_encode()).await?;
        Ok(ISecurePoolInsurance::calculatePremiumCall::abi_decode_returns(&raw)?)
    }

    async fn premium_for(
        &self,
        insurance: Address,
        coverage_amount: &str,
        duration: u64,
    ) -> ContractResult<U256> {
        let coverage = units::to_base_units(coverage_amount)?;
        self.premium(insurance, coverage, U256::from(duration)).await
    }

    async fn user_policies(&self, insurance: Address, user: Address) -> ContractResult<Vec<u64>> {
        let call = ISecurePoolInsurance::getUserPoliciesCall { user };
        let raw = self.read(insurance, call.abi_encode()).await?;
        ISecurePoolInsurance::getUserPoliciesCall::abi_decode_returns(&raw)?
            .into_iter()
            .map(|id| to_u64(id, "policy id"))
            .collect()
    }

    async fn policy(&self, insurance: Address, policy_id: u64) -> ContractResult<PolicyDetails> {
        let call = ISecurePoolInsurance::policiesCall {
            policyId: U256::from(policy_id),
        };
        let raw = self.read(insurance, call.abi_encode()).await?;
        let p = ISecurePoolInsurance::policiesCall::abi_decode_returns(&raw)?;
        Ok(PolicyDetails {
            id: to_u64(p.id, "policy id")?,
            policyholder: p.policyholder,
            coverage_amount: units::to_display(p.coverageAmount),
            premium_paid: units::to_display(p.premiumPaid),
            start_time: to_u64(p.startTime, "start time")?,
            end_time: to_u64(p.endTime, "end time")?,
            is_active: p.isActive,
            claimed: p.claimed,
            risk_type: p.riskType,
        })
    }

    async fn pool_stats(&self, insurance: Address) -> ContractResult<PoolStats> {
        let call = ISecurePoolInsurance::getCapitalPoolStatsCall {};
        let raw = self.read(insurance, call.abi_encode()).await?;
        let s = ISecurePoolInsurance::getCapitalPoolStatsCall::abi_decode_returns(&raw)?;
        Ok(PoolStats {
            total_deposits: units::to_display(s.totalDeposits),
            available_liquidity: units::to_display(s.availableLiquidity),
            locked_liquidity: units::to_display(s.lockedLiquidity),
            total_rewards: units::to_display(s.totalRewards),
        })
    }

    async fn token_balance(&self, token: Address, user: Address) -> ContractResult<String> {
        let call = IFaucetToken::balanceOfCall { account: user };
        let raw = self.read(token, call.abi_encode()).await?;
        let balance = IFaucetToken::balanceOfCall::abi_decode_returns(&raw)?;
        Ok(units::to_display(balance))
    }

    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> ContractResult<U256> {
        let call = IFaucetToken::allowanceCall { owner, spender };
        let raw = self.read(token, call.abi_encode()).await?;
        Ok(IFaucetToken::allowanceCall::abi_decode_returns(&raw)?)
    }

    async fn read(&self, to: Address, data: Vec<u8>) -> ContractResult<Bytes> {
        self.transport.call(to, Bytes::from(data)).await
    }

    /// Send a transaction and wait for a successful receipt.
    async fn submit(&self, to: Address, data: Vec<u8>, value: U256) -> ContractResult<TxReceipt> {
        let tx_hash: TxHash = self.transport.send(to, Bytes::from(data), value).await?;
        let receipt = self.transport.confirm(tx_hash).await?;
        if receipt.success {
            Ok(receipt)
        } else {
            Err(ContractError::Reverted(receipt.tx_hash))
        }
    }
}

fn read_failed(what: &'static str, e: ContractError) -> CoverError {
    error!(error = %e, "error fetching {what}");
    CoverError::read(what, e)
}

fn to_u64(value: U256, field: &'static str) -> ContractResult<u64> {
    u64::try_from(value).map_err(|_| ContractError::OutOfRange(field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::testing::{MockTransport, Op, addr};
    use alloy::primitives::Log;
    use alloy::sol_types::SolValue;

    const INSURANCE: u8 = 0xA1;
    const TOKEN: u8 = 0xB2;

    fn tokens(n: u64) -> U256 {
        U256::from(n) * U256::from(10u64).pow(U256::from(18))
    }

    fn setup() -> (Arc<MockTransport>, CoverContracts) {
        let transport = Arc::new(MockTransport::default());
        let mut contracts = CoverContracts::from_arc(Arc::clone(&transport) as _);
        contracts.set_contract_addresses(addr(INSURANCE), addr(TOKEN));
        (transport, contracts)
    }

    fn purchased_log(from: Address, policy_id: u64) -> Log {
        let event = ISecurePoolInsurance::PolicyPurchased {
            policyId: U256::from(policy_id),
            policyholder: addr(0x77),
            coverageAmount: tokens(100),
        };
        Log {
            address: from,
            data: event.encode_log_data(),
        }
    }

    #[tokio::test]
    async fn test_not_configured() {
        let contracts = CoverContracts::new(MockTransport::default());
        let user = addr(1);

        let errors = [
            contracts.purchase_policy("1", 30, "smart-contract").await.unwrap_err(),
            contracts.submit_claim(1, "1", "evidence").await.unwrap_err(),
            contracts.provide_liquidity("1").await.unwrap_err(),
            contracts.withdraw_liquidity("1").await.unwrap_err(),
            contracts.use_faucet().await.unwrap_err(),
            contracts.calculate_premium("1", 30).await.unwrap_err(),
            contracts.get_user_policies(user).await.unwrap_err(),
            contracts.get_policy_details(1).await.unwrap_err(),
            contracts.get_capital_pool_stats().await.unwrap_err(),
            contracts.get_token_balance(user).await.unwrap_err(),
            contracts.get_token_allowance(user).await.unwrap_err(),
            contracts.account_overview(user).await.unwrap_err(),
        ];
        for err in errors {
            assert_eq!(err.kind(), ErrorKind::NotConfigured);
        }
    }

    #[tokio::test]
    async fn test_purchase_reads_premium_before_sending() {
        let (transport, contracts) = setup();
        let premium = tokens(2) / U256::from(100);
        transport.respond(
            ISecurePoolInsurance::calculatePremiumCall::SELECTOR,
            (premium,).abi_encode_params(),
        );
        let purchase = ISecurePoolInsurance::purchasePolicyCall::SELECTOR;
        // Same event signature from another contract must be ignored.
        transport.emit_on(purchase, purchased_log(addr(TOKEN), 99));
        transport.emit_on(purchase, purchased_log(addr(INSURANCE), 7));

        let outcome = contracts
            .purchase_policy("100", 30 * 86_400, "smart-contract")
            .await
            .unwrap();

        assert_eq!(outcome.policy_id, Some(7));
        assert_eq!(outcome.tx_hash, TxHash::with_last_byte(1));
        assert_eq!(
            transport.ops(),
            vec![
                Op::Call {
                    to: addr(INSURANCE),
                    selector: ISecurePoolInsurance::calculatePremiumCall::SELECTOR,
                },
                Op::Send {
                    to: addr(INSURANCE),
                    selector: purchase,
                    value: premium,
                },
                Op::Confirm(TxHash::with_last_byte(1)),
            ]
        );
    }

    #[tokio::test]
    async fn test_purchase_premium_failure_sends_nothing() {
        let (transport, contracts) = setup();
        transport.fail_call(ISecurePoolInsurance::calculatePremiumCall::SELECTOR);

        let err = contracts
            .purchase_policy("100", 30, "oracle")
            .await
            .unwrap_err();

        assert!(matches!(err, CoverError::PurchaseFailed(ContractError::Transport(_))));
        assert!(transport.sends().is_empty());
    }

    #[tokio::test]
    async fn test_purchase_rejects_bad_amount() {
        let (transport, contracts) = setup();

        let err = contracts.purchase_policy("1.2.3", 30, "oracle").await.unwrap_err();

        assert!(matches!(err, CoverError::PurchaseFailed(ContractError::Amount(_))));
        assert!(transport.ops().is_empty());
    }

    #[tokio::test]
    async fn test_liquidity_approves_then_deposits() {
        let (transport, contracts) = setup();

        let outcome = contracts.provide_liquidity("250").await.unwrap();

        assert_eq!(outcome.tx_hash, TxHash::with_last_byte(2));
        assert_eq!(
            transport.ops(),
            vec![
                Op::Send {
                    to: addr(TOKEN),
                    selector: IFaucetToken::approveCall::SELECTOR,
                    value: U256::ZERO,
                },
                Op::Confirm(TxHash::with_last_byte(1)),
                Op::Send {
                    to: addr(INSURANCE),
                    selector: ISecurePoolInsurance::provideLiquidityCall::SELECTOR,
                    value: U256::ZERO,
                },
                Op::Confirm(TxHash::with_last_byte(2)),
            ]
        );
    }

    #[tokio::test]
    async fn test_liquidity_stops_when_approve_fails() {
        let (transport, contracts) = setup();
        transport.fail_send(IFaucetToken::approveCall::SELECTOR);

        let err = contracts.provide_liquidity("250").await.unwrap_err();

        assert!(matches!(
            err,
            CoverError::LiquidityFailed {
                step: LiquidityStep::Approve,
                approve_tx: None,
                ..
            }
        ));
        assert_eq!(transport.sends().len(), 1);
    }

    #[tokio::test]
    async fn test_liquidity_reports_confirmed_approval_on_deposit_revert() {
        let (transport, contracts) = setup();
        transport.revert(ISecurePoolInsurance::provideLiquidityCall::SELECTOR);

        let err = contracts.provide_liquidity("250").await.unwrap_err();

        match err {
            CoverError::LiquidityFailed {
                step,
                approve_tx,
                source,
            } => {
                assert_eq!(step, LiquidityStep::Deposit);
                assert_eq!(approve_tx, Some(TxHash::with_last_byte(1)));
                assert!(matches!(source, ContractError::Reverted(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_claim_revert_is_failure() {
        let (transport, contracts) = setup();
        transport.revert(ISecurePoolInsurance::submitClaimCall::SELECTOR);

        let err = contracts.submit_claim(3, "10", "ipfs://evidence").await.unwrap_err();

        assert!(matches!(err, CoverError::ClaimFailed(ContractError::Reverted(_))));
        assert_eq!(err.user_message(), "Failed to submit claim");
    }

    #[tokio::test]
    async fn test_claim_sends_to_insurance() {
        let (transport, contracts) = setup();

        let outcome = contracts.submit_claim(3, "10", "ipfs://evidence").await.unwrap();

        assert_eq!(outcome.tx_hash, TxHash::with_last_byte(1));
        assert_eq!(outcome.policy_id, None);
        assert_eq!(
            transport.ops(),
            vec![
                Op::Send {
                    to: addr(INSURANCE),
                    selector: ISecurePoolInsurance::submitClaimCall::SELECTOR,
                    value: U256::ZERO,
                },
                Op::Confirm(TxHash::with_last_byte(1)),
            ]
        );
    }

    #[tokio::test]
    async fn test_purchase_without_event_has_no_policy_id() {
        let (transport, contracts) = setup();
        transport.respond(
            ISecurePoolInsurance::calculatePremiumCall::SELECTOR,
            (tokens(1),).abi_encode_params(),
        );

        let outcome = contracts.purchase_policy("50", 86_400, "oracle").await.unwrap();

        assert_eq!(outcome.tx_hash, TxHash::with_last_byte(1));
        assert_eq!(outcome.policy_id, None);
        assert_eq!(transport.sends().len(), 1);
    }

    #[tokio::test]
    async fn test_withdraw_and_faucet() {
        let (transport, contracts) = setup();

        contracts.withdraw_liquidity("5").await.unwrap();
        contracts.use_faucet().await.unwrap();

        let sends = transport.sends();
        assert_eq!(
            sends[1],
            Op::Send {
                to: addr(TOKEN),
                selector: IFaucetToken::faucetCall::SELECTOR,
                value: U256::ZERO,
            }
        );

        transport.fail_send(IFaucetToken::faucetCall::SELECTOR);
        let err = contracts.use_faucet().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FaucetFailed);
    }

    #[tokio::test]
    async fn test_pool_stats_are_display_strings() {
        let (transport, contracts) = setup();
        transport.respond(
            ISecurePoolInsurance::getCapitalPoolStatsCall::SELECTOR,
            (
                tokens(1000),
                tokens(750),
                tokens(250),
                tokens(25) / U256::from(2),
            )
                .abi_encode_params(),
        );

        let stats = contracts.get_capital_pool_stats().await.unwrap();

        assert_eq!(stats.total_deposits, "1000.0000");
        assert_eq!(stats.available_liquidity, "750.0000");
        assert_eq!(stats.locked_liquidity, "250.0000");
        assert_eq!(stats.total_rewards, "12.5000");
    }

    #[tokio::test]
    async fn test_policy_details() {
        let (transport, contracts) = setup();
        transport.respond(
            ISecurePoolInsurance::policiesCall::SELECTOR,
            (
                U256::from(4),
                addr(0x77),
                tokens(100),
                tokens(3),
                U256::from(1_700_000_000u64),
                U256::from(1_702_592_000u64),
                true,
                false,
                String::from("oracle"),
            )
                .abi_encode_params(),
        );

        let policy = contracts.get_policy_details(4).await.unwrap();

        assert_eq!(policy.id, 4);
        assert_eq!(policy.policyholder, addr(0x77));
        assert_eq!(policy.coverage_amount, "100.0000");
        assert_eq!(policy.premium_paid, "3.0000");
        assert_eq!(policy.end_time - policy.start_time, 30 * 86_400);
        assert!(policy.is_active);
        assert!(!policy.claimed);
        assert_eq!(policy.risk_type, "oracle");
    }

    #[tokio::test]
    async fn test_account_overview_joins_reads() {
        let (transport, contracts) = setup();
        transport.respond(
            ISecurePoolInsurance::getCapitalPoolStatsCall::SELECTOR,
            (tokens(10), tokens(10), U256::ZERO, U256::ZERO).abi_encode_params(),
        );
        transport.respond(IFaucetToken::balanceOfCall::SELECTOR, (tokens(42),).abi_encode_params());
        transport.respond(
            ISecurePoolInsurance::getUserPoliciesCall::SELECTOR,
            (vec![U256::from(1), U256::from(5)],).abi_encode_params(),
        );

        let overview = contracts.account_overview(addr(1)).await.unwrap();

        assert_eq!(overview.pool.total_deposits, "10.0000");
        assert_eq!(overview.token_balance, "42.0000");
        assert_eq!(overview.policy_ids, vec![1, 5]);

        transport.fail_call(IFaucetToken::balanceOfCall::SELECTOR);
        let err = contracts.account_overview(addr(1)).await.unwrap_err();
        assert!(matches!(err, CoverError::Read { what: "account overview", .. }));
    }

    #[tokio::test]
    async fn test_reads_wrap_cause() {
        let (transport, contracts) = setup();
        transport.respond(IFaucetToken::allowanceCall::SELECTOR, (tokens(7),).abi_encode_params());
        assert_eq!(contracts.get_token_allowance(addr(1)).await.unwrap(), "7.0000");

        transport.respond(IFaucetToken::balanceOfCall::SELECTOR, vec![0xde, 0xad]);
        let err = contracts.get_token_balance(addr(1)).await.unwrap_err();
        assert!(matches!(
            err,
            CoverError::Read {
                what: "token balance",
                source: ContractError::Decode(_),
            }
        ));
    }
}
