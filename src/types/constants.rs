//! Common constants for networks and schemes

/// CAIP-2 network identifiers
pub mod networks {
    /// Base mainnet
    pub const BASE_MAINNET: &str = "eip155:8453";
    /// Base Sepolia testnet
    pub const BASE_SEPOLIA: &str = "eip155:84532";

    /// USDC on Base mainnet
    pub const USDC_BASE_MAINNET: &str = "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913";
    /// USDC on Base Sepolia
    pub const USDC_BASE_SEPOLIA: &str = "0x036CbD53842c5426634e7929541eC2318f3dCF7e";

    /// Get USDC contract address for a network
    pub fn get_usdc_address(network: &str) -> Option<&'static str> {
        match network {
            BASE_MAINNET => Some(USDC_BASE_MAINNET),
            BASE_SEPOLIA => Some(USDC_BASE_SEPOLIA),
            _ => None,
        }
    }

    /// Check if a network is supported
    pub fn is_supported(network: &str) -> bool {
        matches!(network, BASE_MAINNET | BASE_SEPOLIA)
    }
}

/// Common payment schemes
pub mod schemes {
    /// Exact payment scheme (EIP-3009)
    pub const EXACT: &str = "exact";
}

/// CRE gateway JSON-RPC constants
pub mod cre {
    /// JSON-RPC protocol version
    pub const JSONRPC_VERSION: &str = "2.0";
    /// Method that runs a deployed workflow
    pub const WORKFLOWS_EXECUTE: &str = "workflows.execute";
}
