use cosmwasm_std::{StdError, Uint128};
use thiserror::Error;

use crate::state::RaffleStatus;

#[derive(Error, Debug)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("insufficient payment: sent {sent}, entrance fee is {required}")]
    InsufficientPayment { sent: Uint128, required: Uint128 },

    #[error("send exactly one coin, in the entrance fee denom")]
    InvalidFunds,

    #[error("wrong denom: expected {expected}, got {got}")]
    WrongDenom { expected: String, got: String },

    #[error("raffle is not open")]
    RaffleNotOpen,

    #[error("upkeep not needed: state {raffle_state}, {seconds_elapsed}s elapsed, {num_players} players, pool {pool}")]
    UpkeepNotNeeded {
        raffle_state: RaffleStatus,
        seconds_elapsed: u64,
        num_players: u32,
        pool: Uint128,
    },

    #[error("unknown randomness request {request_id}")]
    UnknownRequest { request_id: u64 },

    #[error("only the VRF coordinator can fulfill randomness")]
    OnlyCoordinatorCanFulfill,

    #[error("fulfillment carried no random words")]
    NoRandomWords,

    #[error("coordinator assigned request {assigned}, expected {expected}")]
    RequestIdMismatch { expected: u64, assigned: u64 },

    #[error("coordinator response carried no request id")]
    MissingRequestId,

    #[error("unknown reply id {id}")]
    UnknownReplyId { id: u64 },

    #[error("payout failed: need {needed}, contract holds {available}")]
    PayoutFailure { needed: Uint128, available: Uint128 },

    #[error("entrance fee must be greater than zero")]
    InvalidEntranceFee,

    #[error("interval must be greater than zero")]
    InvalidInterval,

    #[error("invalid randomness request config: {reason}")]
    InvalidRequestConfig { reason: String },
}
