use std::fmt;

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Coin, Timestamp, Uint128, Uint256};
use cw_storage_plus::{Item, Map};

pub const CONFIG: Item<RaffleConfig> = Item::new("config");
pub const RAFFLE_STATE: Item<RaffleStateInfo> = Item::new("raffle_state");

/// Entrants keyed by (round, entry index). Moving to a new round empties the
/// player list without touching the old entries.
pub const PLAYERS: Map<(u64, u32), Addr> = Map::new("players");

/// Completed rounds keyed by round number
pub const ROUNDS: Map<u64, RoundResult> = Map::new("rounds");

#[cw_serde]
pub struct RaffleConfig {
    pub vrf_coordinator: Addr,
    /// Minimum payment per entry
    pub entrance_fee: Coin,
    /// Minimum seconds between a round's start and its drawing
    pub interval_seconds: u64,
    /// Gas lane forwarded to the coordinator
    pub key_hash: String,
    pub subscription_id: u64,
    pub request_confirmations: u16,
    pub callback_gas_limit: u32,
    pub num_words: u32,
}

#[cw_serde]
#[derive(Copy)]
pub enum RaffleStatus {
    Open,
    Calculating,
}

impl fmt::Display for RaffleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RaffleStatus::Open => write!(f, "open"),
            RaffleStatus::Calculating => write!(f, "calculating"),
        }
    }
}

#[cw_serde]
pub struct RaffleStateInfo {
    pub round: u64,
    pub status: RaffleStatus,
    pub player_count: u32,
    /// Sum of fee-denom amounts entered since the last reset
    pub pool: Uint128,
    pub last_timestamp: Timestamp,
    /// Set only while Calculating
    pub pending_request_id: Option<u64>,
    pub recent_winner: Option<Addr>,
    pub total_rounds_completed: u64,
    pub total_prizes_paid: Uint128,
}

#[cw_serde]
pub struct RoundResult {
    pub round: u64,
    pub winner: Addr,
    pub prize: Uint128,
    pub player_count: u32,
    pub request_id: u64,
    pub random_word: Uint256,
    pub completed_at: Timestamp,
}

/// The four conditions a drawing needs, evaluated at one instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Eligibility {
    pub is_open: bool,
    pub time_passed: bool,
    pub has_players: bool,
    pub has_balance: bool,
    pub seconds_elapsed: u64,
}

impl Eligibility {
    pub fn upkeep_needed(&self) -> bool {
        self.is_open && self.time_passed && self.has_players && self.has_balance
    }
}

impl RaffleStateInfo {
    pub fn eligibility(&self, now: Timestamp, interval_seconds: u64) -> Eligibility {
        let seconds_elapsed = now.seconds().saturating_sub(self.last_timestamp.seconds());
        Eligibility {
            is_open: self.status == RaffleStatus::Open,
            time_passed: seconds_elapsed >= interval_seconds,
            has_players: self.player_count > 0,
            has_balance: !self.pool.is_zero(),
            seconds_elapsed,
        }
    }
}
