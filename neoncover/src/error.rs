//! Error types for neoncover.
//!
//! Every failure is classified where it is raised. Callers match on
//! [`CoverError::kind`] (or on the variants directly) and never inspect
//! message text. [`ErrorKind::user_message`] carries the fixed copy shown to
//! end users.

use alloy::primitives::TxHash;
use std::fmt;

// ============================================================================
// Main Error Type
// ============================================================================

/// The main error type for wallet and contract operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CoverError {
    /// No injected account provider is available.
    #[error("wallet provider not installed")]
    NoProvider,

    /// The provider returned an empty account list.
    #[error("no accounts found")]
    NoAccounts,

    /// The user declined a wallet prompt.
    #[error("user rejected the request")]
    UserRejected,

    /// The provider could not be moved onto the target network.
    #[error("failed to switch to chain {chain_id}: {source}")]
    NetworkSwitch {
        /// Hex chain id of the target network.
        chain_id: String,
        /// Underlying provider failure.
        source: ProviderError,
    },

    /// Any other provider failure during a wallet operation.
    #[error("provider: {0}")]
    Provider(#[from] ProviderError),

    /// Direct JSON-RPC read failed.
    #[error("rpc: {0}")]
    Rpc(String),

    /// Contract addresses have not been set.
    #[error("contract addresses not configured")]
    NotConfigured,

    /// Policy purchase failed at some step.
    #[error("failed to purchase policy")]
    PurchaseFailed(#[source] ContractError),

    /// Claim submission failed.
    #[error("failed to submit claim")]
    ClaimFailed(#[source] ContractError),

    /// A liquidity transaction failed. Earlier confirmed steps are not rolled back.
    #[error("liquidity {step} failed")]
    LiquidityFailed {
        /// The step that failed.
        step: LiquidityStep,
        /// Hash of the approval that was already confirmed, if any.
        approve_tx: Option<TxHash>,
        /// Underlying failure.
        source: ContractError,
    },

    /// Faucet request failed.
    #[error("failed to use faucet")]
    FaucetFailed(#[source] ContractError),

    /// A read-only contract accessor failed.
    #[error("failed to fetch {what}")]
    Read {
        /// What was being read.
        what: &'static str,
        /// Underlying failure.
        source: ContractError,
    },

    /// A display amount could not be converted.
    #[error("invalid amount: {0}")]
    InvalidAmount(#[from] UnitsError),

    /// Session persistence failed.
    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    /// Configuration is missing or invalid.
    #[error("config: {0}")]
    Config(#[from] ConfigError),
}

impl CoverError {
    /// Create an RPC error from a message.
    #[inline]
    pub fn rpc(msg: impl Into<String>) -> Self {
        Self::Rpc(msg.into())
    }

    /// Create a read error for the named accessor.
    #[inline]
    pub const fn read(what: &'static str, source: ContractError) -> Self {
        Self::Read { what, source }
    }

    /// The closed classification of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NoProvider => ErrorKind::NoProvider,
            Self::NoAccounts => ErrorKind::NoAccounts,
            Self::UserRejected => ErrorKind::UserRejected,
            Self::NetworkSwitch { .. } => ErrorKind::NetworkSwitch,
            Self::Provider(_) => ErrorKind::Provider,
            Self::Rpc(_) => ErrorKind::Rpc,
            Self::NotConfigured => ErrorKind::NotConfigured,
            Self::PurchaseFailed(_) => ErrorKind::PurchaseFailed,
            Self::ClaimFailed(_) => ErrorKind::ClaimFailed,
            Self::LiquidityFailed { .. } => ErrorKind::LiquidityFailed,
            Self::FaucetFailed(_) => ErrorKind::FaucetFailed,
            Self::Read { .. } => ErrorKind::Read,
            Self::InvalidAmount(_) => ErrorKind::InvalidAmount,
            Self::Storage(_) => ErrorKind::Storage,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// Fixed user-facing copy for this error.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        self.kind().user_message()
    }
}

/// Result type alias for neoncover operations.
pub type Result<T> = std::result::Result<T, CoverError>;

/// Fieldless classification of [`CoverError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`CoverError::NoProvider`].
    NoProvider,
    /// See [`CoverError::NoAccounts`].
    NoAccounts,
    /// See [`CoverError::UserRejected`].
    UserRejected,
    /// See [`CoverError::NetworkSwitch`].
    NetworkSwitch,
    /// See [`CoverError::Provider`].
    Provider,
    /// See [`CoverError::Rpc`].
    Rpc,
    /// See [`CoverError::NotConfigured`].
    NotConfigured,
    /// See [`CoverError::PurchaseFailed`].
    PurchaseFailed,
    /// See [`CoverError::ClaimFailed`].
    ClaimFailed,
    /// See [`CoverError::LiquidityFailed`].
    LiquidityFailed,
    /// See [`CoverError::FaucetFailed`].
    FaucetFailed,
    /// See [`CoverError::Read`].
    Read,
    /// See [`CoverError::InvalidAmount`].
    InvalidAmount,
    /// See [`CoverError::Storage`].
    Storage,
    /// See [`CoverError::Config`].
    Config,
}

impl ErrorKind {
    /// Copy shown to the user when an operation fails with this kind.
    #[must_use]
    pub const fn user_message(self) -> &'static str {
        match self {
            Self::NoProvider => "Please install a wallet extension to continue",
            Self::NoAccounts => "No accounts found. Unlock your wallet and try again",
            Self::UserRejected => "Connection cancelled by user",
            Self::NetworkSwitch => "Could not switch to the Neon EVM network",
            Self::Rpc => "Network request failed. Please try again",
            Self::NotConfigured => "Contracts are not configured yet",
            Self::PurchaseFailed => "Failed to purchase policy",
            Self::ClaimFailed => "Failed to submit claim",
            Self::LiquidityFailed => "Failed to provide liquidity",
            Self::FaucetFailed => "Failed to use faucet",
            Self::Read => "Failed to load on-chain data",
            Self::InvalidAmount => "Please enter a valid amount",
            Self::Config => "Invalid configuration",
            Self::Provider | Self::Storage => "Failed to connect wallet",
        }
    }
}

/// A step of a liquidity flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiquidityStep {
    /// Token allowance approval.
    Approve,
    /// Deposit into the pool.
    Deposit,
    /// Withdrawal from the pool.
    Withdraw,
}

impl fmt::Display for LiquidityStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Approve => "approve",
            Self::Deposit => "deposit",
            Self::Withdraw => "withdraw",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Provider Errors
// ============================================================================

/// An error returned by an injected account provider.
///
/// Codes follow EIP-1193 and EIP-3085/3326.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("provider error {code}: {message}")]
pub struct ProviderError {
    /// Numeric error code.
    pub code: i64,
    /// Provider-supplied message.
    pub message: String,
}

impl ProviderError {
    /// The user rejected the request.
    pub const USER_REJECTED: i64 = 4001;
    /// The requested account or method has not been authorized.
    pub const UNAUTHORIZED: i64 = 4100;
    /// The provider does not support the method.
    pub const UNSUPPORTED_METHOD: i64 = 4200;
    /// The provider is disconnected from all chains.
    pub const DISCONNECTED: i64 = 4900;
    /// The chain has not been added to the provider.
    pub const UNRECOGNIZED_CHAIN: i64 = 4902;
    /// Malformed request parameters.
    pub const INVALID_PARAMS: i64 = -32602;
    /// Generic internal JSON-RPC error.
    pub const INTERNAL: i64 = -32603;

    /// Create a provider error.
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// The user declined the prompt.
    #[must_use]
    pub fn user_rejected() -> Self {
        Self::new(Self::USER_REJECTED, "User rejected the request.")
    }

    /// The chain is not registered with the provider.
    #[must_use]
    pub fn unrecognized_chain(chain_id: &str) -> Self {
        Self::new(
            Self::UNRECOGNIZED_CHAIN,
            format!("Unrecognized chain ID \"{chain_id}\"."),
        )
    }

    /// The method is not supported.
    #[must_use]
    pub fn unsupported(method: &str) -> Self {
        Self::new(
            Self::UNSUPPORTED_METHOD,
            format!("The method \"{method}\" is not supported."),
        )
    }

    /// Malformed request parameters.
    pub fn invalid_params(msg: impl Into<String>) -> Self {
        Self::new(Self::INVALID_PARAMS, msg)
    }

    /// Internal provider failure.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(Self::INTERNAL, msg)
    }

    /// Classify the error by its code.
    #[must_use]
    pub const fn kind(&self) -> ProviderErrorKind {
        match self.code {
            Self::USER_REJECTED => ProviderErrorKind::UserRejected,
            Self::UNAUTHORIZED => ProviderErrorKind::Unauthorized,
            Self::UNSUPPORTED_METHOD => ProviderErrorKind::Unsupported,
            4900 | 4901 => ProviderErrorKind::Disconnected,
            Self::UNRECOGNIZED_CHAIN => ProviderErrorKind::UnrecognizedChain,
            _ => ProviderErrorKind::Other,
        }
    }
}

/// Closed classification of [`ProviderError`] codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// 4001.
    UserRejected,
    /// 4100.
    Unauthorized,
    /// 4200.
    Unsupported,
    /// 4900 / 4901.
    Disconnected,
    /// 4902.
    UnrecognizedChain,
    /// Anything else.
    Other,
}

// ============================================================================
// Contract Errors
// ============================================================================

/// Failure of a single contract interaction step.
#[derive(Debug, thiserror::Error)]
pub enum ContractError {
    /// The transport (RPC node or signer) failed.
    #[error("transport: {0}")]
    Transport(String),

    /// The transaction was mined with a failed status.
    #[error("transaction {0} reverted")]
    Reverted(TxHash),

    /// Return data or an event could not be decoded.
    #[error("abi: {0}")]
    Decode(#[from] alloy::sol_types::Error),

    /// A decoded integer does not fit the target type.
    #[error("{0} out of range")]
    OutOfRange(&'static str),

    /// An amount could not be converted to base units.
    #[error("amount: {0}")]
    Amount(#[from] UnitsError),
}

impl ContractError {
    /// Create a transport error.
    #[inline]
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }
}

/// Result type for contract transport operations.
pub type ContractResult<T> = std::result::Result<T, ContractError>;

// ============================================================================
// Unit Conversion Errors
// ============================================================================

/// Error converting a display amount into base units.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnitsError {
    /// Empty input.
    #[error("amount is empty")]
    Empty,

    /// Not a non-negative decimal number.
    #[error("'{0}' is not a decimal amount")]
    Malformed(String),

    /// More fractional digits than the token supports.
    #[error("'{amount}' has more than {max} decimal places")]
    TooPrecise {
        /// The rejected input.
        amount: String,
        /// Maximum supported fractional digits.
        max: usize,
    },

    /// The value does not fit in 256 bits.
    #[error("'{0}' is out of range")]
    Overflow(String),
}

// ============================================================================
// Storage Errors
// ============================================================================

/// Error type for session persistence.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// IO error.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;

// ============================================================================
// Configuration Errors
// ============================================================================

/// Error type for configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("parse: {0}")]
    Parse(#[from] serde_json::Error),

    /// Missing required field.
    #[error("missing: {0}")]
    Missing(String),

    /// Invalid value.
    #[error("invalid: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Create a missing field error.
    #[inline]
    pub fn missing(field: impl Into<String>) -> Self {
        Self::Missing(field.into())
    }

    /// Create an invalid value error.
    #[inline]
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
