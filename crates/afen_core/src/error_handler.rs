use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level error type shared by the marketplace crates.
#[derive(Error, Debug)]
pub enum MarketError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Contract call failed: {0}")]
    ContractCall(String),

    #[error("No wallet connected")]
    Unauthenticated,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Classification of errors for logging and user display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// Metadata service or RPC endpoint unreachable, or a bad HTTP status.
    NetworkError,
    /// Wallet rejected the signature or the call reverted.
    ContractError,
    /// Action required a connected wallet.
    AuthError,
    /// Invalid or missing configuration.
    ConfigError,
    /// Anything else: invalid input, unexpected internal state.
    SystemError,
}

impl MarketError {
    /// Returns the broad error category for routing and display purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Network(_) => ErrorCategory::NetworkError,
            Self::ContractCall(_) => ErrorCategory::ContractError,
            Self::Unauthenticated => ErrorCategory::AuthError,
            Self::Config(_) => ErrorCategory::ConfigError,
            Self::Internal(_) => ErrorCategory::SystemError,
        }
    }

    /// Returns a user-friendly message (hides internal details).
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => "Network error. Check your connection.".into(),
            Self::ContractCall(_) => "The wallet transaction did not go through.".into(),
            Self::Unauthenticated => "Connect your wallet to continue.".into(),
            Self::Config(msg) => format!("Configuration issue: {msg}"),
            Self::Internal(_) => "An unexpected error occurred.".into(),
        }
    }
}
