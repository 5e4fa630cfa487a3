use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Binary, Coin, Timestamp, Uint256};

use crate::state::{RaffleConfig, RaffleStateInfo, RaffleStatus, RoundResult};

#[cw_serde]
pub struct InstantiateMsg {
    pub vrf_coordinator: String,
    pub entrance_fee: Coin,
    pub interval_seconds: u64,
    pub key_hash: String,
    pub subscription_id: u64,
    pub request_confirmations: u16,
    pub callback_gas_limit: u32,
    pub num_words: u32,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Enter the current round. Must attach at least the entrance fee.
    Enter {},
    /// Start a drawing. Called by the upkeep agent once `CheckUpkeep` says so.
    PerformUpkeep { perform_data: Binary },
    /// Randomness callback. Only the VRF coordinator can call.
    /// Wire-compatible with `raffle_common::ConsumerExecuteMsg`.
    FulfillRandomWords {
        request_id: u64,
        random_words: Vec<Uint256>,
    },
}

#[cw_serde]
pub struct MigrateMsg {}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(RaffleConfig)]
    Config {},
    #[returns(Coin)]
    EntranceFee {},
    #[returns(u64)]
    Interval {},
    #[returns(RaffleStatus)]
    RaffleState {},
    #[returns(Addr)]
    Player { index: u32 },
    #[returns(u32)]
    NumPlayers {},
    #[returns(PlayersResponse)]
    Players {
        start_after: Option<u32>,
        limit: Option<u32>,
    },
    #[returns(Option<Addr>)]
    RecentWinner {},
    #[returns(Timestamp)]
    LastTimestamp {},
    #[returns(CheckUpkeepResponse)]
    CheckUpkeep { check_data: Binary },
    #[returns(RaffleStateInfo)]
    RaffleInfo {},
    #[returns(Option<RoundResult>)]
    Round { round: u64 },
    #[returns(RoundHistoryResponse)]
    RoundHistory {
        start_after: Option<u64>,
        limit: Option<u32>,
    },
}

#[cw_serde]
pub struct CheckUpkeepResponse {
    pub upkeep_needed: bool,
    pub perform_data: Binary,
    pub is_open: bool,
    pub time_passed: bool,
    pub has_players: bool,
    pub has_balance: bool,
}

#[cw_serde]
pub struct PlayersResponse {
    pub round: u64,
    pub players: Vec<Addr>,
}

#[cw_serde]
pub struct RoundHistoryResponse {
    pub rounds: Vec<RoundResult>,
}
