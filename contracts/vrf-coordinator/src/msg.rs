use cosmwasm_schema::{cw_serde, QueryResponses};

use crate::state::{CoordinatorConfig, RandomnessRequest};

#[cw_serde]
pub struct InstantiateMsg {
    pub operators: Vec<String>,
    /// Hex-encoded quicknet public key (96 bytes = 192 hex chars)
    pub drand_pubkey_hex: String,
    pub chain_hash: String,
    pub genesis_time: u64,
    pub period_seconds: u64,
    pub max_num_words: u32,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Open a randomness request on behalf of the sender.
    /// Wire-compatible with `raffle_common::CoordinatorExecuteMsg`.
    RequestRandomWords {
        key_hash: String,
        subscription_id: u64,
        request_confirmations: u16,
        callback_gas_limit: u32,
        num_words: u32,
    },
    /// Fulfill a pending request with a drand beacon. Operators only.
    FulfillRandomWords {
        request_id: u64,
        round: u64,
        /// Hex-encoded BLS signature (48 bytes = 96 hex chars)
        signature_hex: String,
    },
    /// Update operator list (admin only).
    UpdateOperators {
        add: Vec<String>,
        remove: Vec<String>,
    },
}

#[cw_serde]
pub struct MigrateMsg {}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(CoordinatorConfig)]
    Config {},

    #[returns(u64)]
    NextRequestId {},

    #[returns(Option<RandomnessRequest>)]
    Request { request_id: u64 },

    /// drand round published at the current block time
    #[returns(u64)]
    CurrentRound {},
}
