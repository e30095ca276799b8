//! Contract bindings for the marketplace and the constant-flow forwarder.
//!
//! Calldata and return values go through the `sol!` bindings below; this
//! module only bridges them to the crate's string-based [`Address`].

use alloy_primitives::{hex, Address as EvmAddress};
use alloy_sol_types::sol;

use crate::{Address, MarketError, Result};

sol! {
    /// Compute-rental listing registry.
    interface IMarketplace {
        function nextId() external view returns (uint256);
        function getListing(uint256 id) external view returns (
            address provider,
            string superToken,
            uint256 flowRate,
            string title,
            string specsCID,
            address activeRenter,
            uint8 status,
            bool exists
        );
        function createListing(string superToken, uint256 flowRate, string title, string specsCID) external returns (uint256);
        function startSession(uint256 id) external;
        function stopSession(uint256 id) external;
    }

    /// Constant-flow agreement forwarder.
    interface ICFAv1Forwarder {
        function setFlowrate(address token, address receiver, int96 flowrate) external returns (bool);
        function deleteFlow(address token, address sender, address receiver, bytes userData) external returns (bool);
    }
}

/// Largest value representable as `int96`.
pub const INT96_MAX: i128 = (1i128 << 95) - 1;

impl From<alloy_sol_types::Error> for MarketError {
    fn from(err: alloy_sol_types::Error) -> Self {
        MarketError::Serialization(format!("abi: {}", err))
    }
}

/// Parse a `0x`-prefixed 20-byte hex address.
///
/// Demo placeholders such as `0xDemoProvider123` are rejected as invalid
/// input.
pub fn parse_address(address: &Address) -> Result<EvmAddress> {
    let raw = address.as_str();
    raw.strip_prefix("0x")
        .and_then(|_| raw.parse::<EvmAddress>().ok())
        .ok_or_else(|| {
            MarketError::invalid_data("address", format!("{:?} is not a 20-byte hex address", raw))
        })
}

/// EIP-55 checksummed form of a decoded address.
pub fn format_address(address: EvmAddress) -> Address {
    Address::new(address.to_checksum(None))
}

/// Hex-encode calldata for JSON-RPC.
pub fn to_hex_data(data: &[u8]) -> String {
    hex::encode_prefixed(data)
}

/// Decode a JSON-RPC hex payload. `"0x"` decodes to an empty vector.
pub fn from_hex_data(data: &str) -> Result<Vec<u8>> {
    hex::decode(data).map_err(|e| MarketError::Serialization(format!("invalid hex data: {}", e)))
}
