//! Target network descriptor.
//!
//! The descriptor is handed verbatim to the provider when the network has to
//! be registered (`wallet_addEthereumChain`), and its RPC URL is the direct
//! read path for balances and contract calls.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Chain id of the Neon EVM DevNet.
pub const NEON_DEVNET_CHAIN_ID: u64 = 245_022_926;

/// Public RPC endpoint of the Neon EVM DevNet.
pub const NEON_DEVNET_RPC_URL: &str = "https://devnet.neonevm.org";

/// Native currency metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    /// Currency name.
    pub name: String,
    /// Ticker symbol.
    pub symbol: String,
    /// Decimal places of the base unit.
    pub decimals: u8,
}

/// Description of an EVM network as registered with a wallet provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDescriptor {
    /// Decimal chain id.
    pub chain_id: u64,
    /// Display name.
    pub chain_name: String,
    /// JSON-RPC endpoints, preferred first.
    pub rpc_urls: Vec<String>,
    /// Native currency.
    pub native_currency: NativeCurrency,
    /// Block explorer base URLs.
    #[serde(default)]
    pub block_explorer_urls: Vec<String>,
}

impl Default for NetworkDescriptor {
    fn default() -> Self {
        Self::neon_devnet()
    }
}

impl NetworkDescriptor {
    /// The Neon EVM DevNet.
    #[must_use]
    pub fn neon_devnet() -> Self {
        Self {
            chain_id: NEON_DEVNET_CHAIN_ID,
            chain_name: "Neon EVM DevNet".into(),
            rpc_urls: vec![NEON_DEVNET_RPC_URL.into()],
            native_currency: NativeCurrency {
                name: "NEON".into(),
                symbol: "NEON".into(),
                decimals: 18,
            },
            block_explorer_urls: vec!["https://devnet.neonscan.org".into()],
        }
    }

    /// Chain id in the `0x`-prefixed form providers expect.
    #[must_use]
    pub fn chain_id_hex(&self) -> String {
        format!("{:#x}", self.chain_id)
    }

    /// Whether a provider-reported hex chain id names this network.
    #[must_use]
    pub fn matches_chain_id(&self, hex: &str) -> bool {
        parse_chain_id(hex) == Some(self.chain_id)
    }

    /// The preferred RPC endpoint.
    #[must_use]
    pub fn rpc_url(&self) -> Option<&str> {
        self.rpc_urls.first().map(String::as_str)
    }

    /// Parameter list for `wallet_addEthereumChain`.
    #[must_use]
    pub fn add_chain_params(&self) -> Value {
        json!([{
            "chainId": self.chain_id_hex(),
            "chainName": self.chain_name,
            "rpcUrls": self.rpc_urls,
            "nativeCurrency": self.native_currency,
            "blockExplorerUrls": self.block_explorer_urls,
        }])
    }

    /// Parameter list for `wallet_switchEthereumChain`.
    #[must_use]
    pub fn switch_chain_params(&self) -> Value {
        json!([{ "chainId": self.chain_id_hex() }])
    }

    /// Explorer link for a transaction, if an explorer is known.
    #[must_use]
    pub fn explorer_tx_url(&self, tx_hash: impl std::fmt::Display) -> Option<String> {
        self.block_explorer_urls
            .first()
            .map(|base| format!("{}/tx/{tx_hash}", base.trim_end_matches('/')))
    }
}

/// Parse a `0x`-prefixed hex chain id.
#[must_use]
pub fn parse_chain_id(hex: &str) -> Option<u64> {
    let digits = hex.strip_prefix("0x").or_else(|| hex.strip_prefix("0X"))?;
    u64::from_str_radix(digits, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neon_devnet_ids() {
        let net = NetworkDescriptor::neon_devnet();
        assert_eq!(net.chain_id_hex(), "0xe9ac0ce");
        assert!(net.matches_chain_id("0xe9ac0ce"));
        assert!(net.matches_chain_id("0xE9AC0CE"));
        assert!(!net.matches_chain_id("0x1"));
        assert_eq!(net.rpc_url(), Some(NEON_DEVNET_RPC_URL));
    }

    #[test]
    fn test_add_chain_params_layout() {
        let params = NetworkDescriptor::neon_devnet().add_chain_params();
        let entry = &params[0];
        assert_eq!(entry["chainId"], "0xe9ac0ce");
        assert_eq!(entry["chainName"], "Neon EVM DevNet");
        assert_eq!(entry["rpcUrls"][0], "https://devnet.neonevm.org");
        assert_eq!(entry["nativeCurrency"]["symbol"], "NEON");
        assert_eq!(entry["nativeCurrency"]["decimals"], 18);
        assert_eq!(entry["blockExplorerUrls"][0], "https://devnet.neonscan.org");
    }

    #[test]
    fn test_parse_chain_id() {
        assert_eq!(parse_chain_id("0x1"), Some(1));
        assert_eq!(parse_chain_id("1"), None);
        assert_eq!(parse_chain_id("0xzz"), None);
    }

    #[test]
    fn test_explorer_url() {
        let net = NetworkDescriptor::neon_devnet();
        assert_eq!(
            net.explorer_tx_url("0xabc").as_deref(),
            Some("https://devnet.neonscan.org/tx/0xabc")
        );
    }
}
