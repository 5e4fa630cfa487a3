use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Timestamp};
use cw_storage_plus::{Item, Map};

pub const CONFIG: Item<CoordinatorConfig> = Item::new("config");
pub const NEXT_REQUEST_ID: Item<u64> = Item::new("next_request_id");
pub const REQUESTS: Map<u64, RandomnessRequest> = Map::new("requests");

#[cw_serde]
pub struct CoordinatorConfig {
    pub admin: Addr,
    /// Addresses allowed to submit beacons that fulfill requests
    pub operators: Vec<Addr>,
    /// drand quicknet public key, 96 bytes (G2 point)
    pub drand_pubkey: Vec<u8>,
    /// Hex chain hash identifying the drand network, reported on fulfillment
    pub chain_hash: String,
    /// Genesis time of the drand network (unix seconds)
    pub genesis_time: u64,
    /// Period between drand rounds in seconds (3 for quicknet)
    pub period_seconds: u64,
    pub max_num_words: u32,
}

#[cw_serde]
pub enum RequestStatus {
    Pending,
    Fulfilled,
}

#[cw_serde]
pub struct RandomnessRequest {
    pub id: u64,
    pub consumer: Addr,
    pub key_hash: String,
    pub subscription_id: u64,
    pub callback_gas_limit: u32,
    pub num_words: u32,
    /// The only drand round whose beacon may fulfill this request
    pub target_round: u64,
    pub status: RequestStatus,
    pub requested_at: Timestamp,
    pub fulfilled_round: Option<u64>,
    pub fulfilled_at: Option<Timestamp>,
}

impl CoordinatorConfig {
    /// drand round published at or before `time`. Zero before genesis.
    pub fn round_at(&self, time: Timestamp) -> u64 {
        let now = time.seconds();
        if now < self.genesis_time {
            return 0;
        }
        (now - self.genesis_time) / self.period_seconds + 1
    }
}
