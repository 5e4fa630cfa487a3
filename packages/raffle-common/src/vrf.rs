use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Event, Uint256};

/// Event the coordinator emits when it opens a request. Carries `request_id`.
pub const REQUEST_EVENT: &str = "vrf_randomness_requested";

/// Messages a consumer sends to the VRF coordinator.
#[cw_serde]
pub enum CoordinatorExecuteMsg {
    /// Open a randomness request. The coordinator assigns the next request id
    /// and later calls back `ConsumerExecuteMsg::FulfillRandomWords` on the sender.
    RequestRandomWords {
        key_hash: String,
        subscription_id: u64,
        /// Number of drand rounds to wait past the current one
        request_confirmations: u16,
        callback_gas_limit: u32,
        num_words: u32,
    },
}

/// Queries a consumer may issue against the VRF coordinator.
#[cw_serde]
#[derive(QueryResponses)]
pub enum CoordinatorQueryMsg {
    /// Id the next `RequestRandomWords` will be assigned.
    #[returns(u64)]
    NextRequestId {},
}

/// Callback the coordinator dispatches to the requesting contract.
#[cw_serde]
pub enum ConsumerExecuteMsg {
    FulfillRandomWords {
        request_id: u64,
        random_words: Vec<Uint256>,
    },
}

/// Set as response data of `RequestRandomWords`.
#[cw_serde]
pub struct RequestRandomWordsResponse {
    pub request_id: u64,
}

/// Request id reported by the coordinator's `REQUEST_EVENT` in a submessage
/// result. Custom events reach the caller with the `wasm-` type prefix.
pub fn request_id_from_events(events: &[Event]) -> Option<u64> {
    let ty = format!("wasm-{REQUEST_EVENT}");
    events
        .iter()
        .filter(|e| e.ty == ty)
        .flat_map(|e| e.attributes.iter())
        .find(|a| a.key == "request_id")
        .and_then(|a| a.value.parse().ok())
}
