//! SDK error types

use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

/// SDK error type
#[derive(Error, Debug)]
pub enum SdkError {
    /// The pool address does not resolve to an account
    #[error("Pool not found: {0}")]
    PoolNotFound(Pubkey),

    /// One of the pool's token mints could not be fetched
    #[error("Mint not found: {0}")]
    MintNotFound(Pubkey),

    /// Rejected before planning: zero amount, foreign mint, bad slippage or missing authority
    #[error("Invalid intent: {0}")]
    InvalidIntent(String),

    /// Network or RPC failure; safe to retry the whole planning call
    #[error("RPC error: {0}")]
    Rpc(String),

    /// Account exists but its data does not decode
    #[error("Failed to decode account {address}: {reason}")]
    AccountDecode { address: Pubkey, reason: String },

    /// Quote computation failed
    #[error("Quote error: {0}")]
    Quote(String),

    /// Token program instruction could not be built
    #[error("Instruction error: {0}")]
    Instruction(String),

    /// Serialization error
    #[error("Failed to serialize data: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl SdkError {
    /// Whether retrying the same planning call may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, SdkError::Rpc(_))
    }

    pub(crate) fn decode(address: Pubkey, reason: impl Into<String>) -> Self {
        SdkError::AccountDecode {
            address,
            reason: reason.into(),
        }
    }

    pub(crate) fn quote(reason: impl Into<String>) -> Self {
        SdkError::Quote(reason.into())
    }
}

impl From<solana_client::client_error::ClientError> for SdkError {
    fn from(err: solana_client::client_error::ClientError) -> Self {
        SdkError::Rpc(err.to_string())
    }
}

impl From<solana_program::program_error::ProgramError> for SdkError {
    fn from(err: solana_program::program_error::ProgramError) -> Self {
        SdkError::Instruction(err.to_string())
    }
}

impl From<std::io::Error> for SdkError {
    fn from(err: std::io::Error) -> Self {
        SdkError::Config(err.to_string())
    }
}

impl From<toml::de::Error> for SdkError {
    fn from(err: toml::de::Error) -> Self {
        SdkError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for SdkError {
    fn from(err: toml::ser::Error) -> Self {
        SdkError::Config(err.to_string())
    }
}

pub type SdkResult<T> = Result<T, SdkError>;
