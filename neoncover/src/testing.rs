//! Scripted collaborators for unit tests.

use alloy::primitives::{Address, Bytes, Log, TxHash, U256};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::balance::BalanceReader;
use crate::contracts::{ContractTransport, TxReceipt};
use crate::error::{ContractError, ContractResult, CoverError, ProviderError, Result};
use crate::network::parse_chain_id;
use crate::provider::{EventHub, InjectedProvider, ProviderEvent, methods};

pub(crate) fn addr(byte: u8) -> Address {
    Address::with_last_byte(byte)
}

// ============================================================================
// Provider
// ============================================================================

#[derive(Debug, Default)]
struct ProviderState {
    accounts: Vec<Address>,
    chain_id: u64,
    known_chains: HashSet<u64>,
    request_error: Option<ProviderError>,
    accounts_error: Option<ProviderError>,
    switch_error: Option<ProviderError>,
    add_error: Option<ProviderError>,
    calls: Vec<(String, Value)>,
}

/// Injected provider whose answers are set by the test.
#[derive(Debug, Default)]
pub(crate) struct MockProvider {
    state: Mutex<ProviderState>,
    events: EventHub,
}

impl MockProvider {
    pub(crate) fn new(accounts: Vec<Address>, chain_id: u64) -> Self {
        let provider = Self::default();
        {
            let mut state = provider.lock();
            state.accounts = accounts;
            state.chain_id = chain_id;
            state.known_chains.insert(chain_id);
        }
        provider
    }

    pub(crate) fn knows_chain(self, chain_id: u64) -> Self {
        self.lock().known_chains.insert(chain_id);
        self
    }

    pub(crate) fn reject_requests(self, err: ProviderError) -> Self {
        self.lock().request_error = Some(err);
        self
    }

    pub(crate) fn fail_accounts(self, err: ProviderError) -> Self {
        self.lock().accounts_error = Some(err);
        self
    }

    pub(crate) fn fail_switch(self, err: ProviderError) -> Self {
        self.lock().switch_error = Some(err);
        self
    }

    pub(crate) fn fail_add(self, err: ProviderError) -> Self {
        self.lock().add_error = Some(err);
        self
    }

    /// Replace the exposed accounts and emit `accountsChanged`.
    pub(crate) fn change_accounts(&self, accounts: Vec<Address>) {
        self.lock().accounts.clone_from(&accounts);
        self.events.emit(&ProviderEvent::AccountsChanged(accounts));
    }

    /// Replace the exposed accounts silently.
    pub(crate) fn set_accounts(&self, accounts: Vec<Address>) {
        self.lock().accounts = accounts;
    }

    pub(crate) fn chain_id(&self) -> u64 {
        self.lock().chain_id
    }

    /// Methods requested so far, in order.
    pub(crate) fn methods(&self) -> Vec<String> {
        self.lock().calls.iter().map(|(m, _)| m.clone()).collect()
    }

    pub(crate) fn params_of(&self, method: &str) -> Vec<Value> {
        self.lock()
            .calls
            .iter()
            .filter(|(m, _)| m == method)
            .map(|(_, p)| p.clone())
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ProviderState> {
        self.state.lock().unwrap()
    }

    fn accounts_json(accounts: &[Address]) -> Value {
        Value::Array(accounts.iter().map(|a| json!(a.to_string())).collect())
    }
}

#[async_trait]
impl InjectedProvider for MockProvider {
    async fn request(
        &self,
        method: &str,
        params: Value,
    ) -> std::result::Result<Value, ProviderError> {
        let mut state = self.lock();
        state.calls.push((method.to_owned(), params.clone()));
        match method {
            methods::REQUEST_ACCOUNTS => match state.request_error.clone() {
                Some(err) => Err(err),
                None => Ok(Self::accounts_json(&state.accounts)),
            },
            methods::ACCOUNTS => match state.accounts_error.clone() {
                Some(err) => Err(err),
                None => Ok(Self::accounts_json(&state.accounts)),
            },
            methods::CHAIN_ID => Ok(json!(format!("{:#x}", state.chain_id))),
            methods::ADD_CHAIN => {
                if let Some(err) = state.add_error.clone() {
                    return Err(err);
                }
                let chain_id = params[0]["chainId"]
                    .as_str()
                    .and_then(parse_chain_id)
                    .ok_or_else(|| ProviderError::invalid_params("bad chainId"))?;
                state.known_chains.insert(chain_id);
                Ok(Value::Null)
            }
            methods::SWITCH_CHAIN => {
                if let Some(err) = state.switch_error.clone() {
                    return Err(err);
                }
                let hex = params[0]["chainId"].as_str().unwrap_or_default().to_owned();
                let chain_id = parse_chain_id(&hex)
                    .ok_or_else(|| ProviderError::invalid_params("bad chainId"))?;
                if !state.known_chains.contains(&chain_id) {
                    return Err(ProviderError::unrecognized_chain(&hex));
                }
                state.chain_id = chain_id;
                Ok(Value::Null)
            }
            other => Err(ProviderError::unsupported(other)),
        }
    }

    fn events(&self) -> &EventHub {
        &self.events
    }
}

// ============================================================================
// Balances
// ============================================================================

/// Balance reader over a fixed table; unknown addresses read as zero.
#[derive(Debug, Default)]
pub(crate) struct MockBalances {
    balances: Mutex<HashMap<Address, U256>>,
    failing: Mutex<bool>,
}

impl MockBalances {
    pub(crate) fn with(self, address: Address, wei: U256) -> Self {
        self.set(address, wei);
        self
    }

    pub(crate) fn set(&self, address: Address, wei: U256) {
        self.balances.lock().unwrap().insert(address, wei);
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }
}

#[async_trait]
impl BalanceReader for MockBalances {
    async fn native_balance(&self, address: Address) -> Result<U256> {
        if *self.failing.lock().unwrap() {
            return Err(CoverError::rpc("connection refused"));
        }
        Ok(self
            .balances
            .lock()
            .unwrap()
            .get(&address)
            .copied()
            .unwrap_or_default())
    }
}

// ============================================================================
// Contract transport
// ============================================================================

/// One transport round-trip, as recorded by [`MockTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Op {
    Call { to: Address, selector: [u8; 4] },
    Send { to: Address, selector: [u8; 4], value: U256 },
    Confirm(TxHash),
}

#[derive(Debug, Default)]
struct TransportState {
    responses: HashMap<[u8; 4], Vec<u8>>,
    failing_calls: HashSet<[u8; 4]>,
    failing_sends: HashSet<[u8; 4]>,
    reverting: HashSet<[u8; 4]>,
    logs: HashMap<[u8; 4], Vec<Log>>,
    pending: HashMap<TxHash, [u8; 4]>,
    sent: u8,
    ops: Vec<Op>,
}

/// Contract transport answering by function selector.
#[derive(Debug, Default)]
pub(crate) struct MockTransport {
    state: Mutex<TransportState>,
}

impl MockTransport {
    pub(crate) fn respond(&self, selector: [u8; 4], data: Vec<u8>) {
        self.lock().responses.insert(selector, data);
    }

    pub(crate) fn fail_call(&self, selector: [u8; 4]) {
        self.lock().failing_calls.insert(selector);
    }

    pub(crate) fn fail_send(&self, selector: [u8; 4]) {
        self.lock().failing_sends.insert(selector);
    }

    pub(crate) fn revert(&self, selector: [u8; 4]) {
        self.lock().reverting.insert(selector);
    }

    pub(crate) fn emit_on(&self, selector: [u8; 4], log: Log) {
        self.lock().logs.entry(selector).or_default().push(log);
    }

    pub(crate) fn ops(&self) -> Vec<Op> {
        self.lock().ops.clone()
    }

    pub(crate) fn sends(&self) -> Vec<Op> {
        self.ops()
            .into_iter()
            .filter(|op| matches!(op, Op::Send { .. }))
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, TransportState> {
        self.state.lock().unwrap()
    }
}

fn selector(data: &[u8]) -> [u8; 4] {
    let mut out = [0u8; 4];
    out.copy_from_slice(&data[..4]);
    out
}

#[async_trait]
impl ContractTransport for MockTransport {
    async fn call(&self, to: Address, data: Bytes) -> ContractResult<Bytes> {
        let selector = selector(&data);
        let mut state = self.lock();
        state.ops.push(Op::Call { to, selector });
        if state.failing_calls.contains(&selector) {
            return Err(ContractError::transport("execution reverted"));
        }
        state
            .responses
            .get(&selector)
            .cloned()
            .map(Bytes::from)
            .ok_or_else(|| ContractError::transport("no scripted response"))
    }

    async fn send(&self, to: Address, data: Bytes, value: U256) -> ContractResult<TxHash> {
        let selector = selector(&data);
        let mut state = self.lock();
        state.ops.push(Op::Send { to, selector, value });
        if state.failing_sends.contains(&selector) {
            return Err(ContractError::transport("user denied transaction signature"));
        }
        state.sent += 1;
        let tx_hash = TxHash::with_last_byte(state.sent);
        state.pending.insert(tx_hash, selector);
        Ok(tx_hash)
    }

    async fn confirm(&self, tx_hash: TxHash) -> ContractResult<TxReceipt> {
        let mut state = self.lock();
        state.ops.push(Op::Confirm(tx_hash));
        let selector = state
            .pending
            .remove(&tx_hash)
            .ok_or_else(|| ContractError::transport("unknown transaction"))?;
        Ok(TxReceipt {
            tx_hash,
            success: !state.reverting.contains(&selector),
            logs: state.logs.get(&selector).cloned().unwrap_or_default(),
        })
    }
}
