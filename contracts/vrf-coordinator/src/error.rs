use cosmwasm_std::StdError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("randomness request {request_id} not found")]
    RequestNotFound { request_id: u64 },

    #[error("randomness request {request_id} already fulfilled")]
    RequestAlreadyFulfilled { request_id: u64 },

    #[error("drand round {round} does not match target round {target_round} of request {request_id}")]
    RoundMismatch {
        request_id: u64,
        round: u64,
        target_round: u64,
    },

    #[error("invalid num_words {num_words}: must be between 1 and {max}")]
    InvalidNumWords { num_words: u32, max: u32 },

    #[error("BLS verification failed: {reason}")]
    VerificationFailed { reason: String },

    #[error("invalid hex input: {field}")]
    InvalidHex { field: String },

    #[error("invalid pubkey length: expected 96 bytes, got {got}")]
    InvalidPubkeyLength { got: usize },

    #[error("period_seconds must be greater than zero")]
    InvalidPeriod,

    #[error("max_num_words must be greater than zero")]
    InvalidMaxNumWords,

    #[error("invalid chain hash: expected 32 bytes, got {got}")]
    InvalidChainHashLength { got: usize },
}
