pub mod randomness;
pub mod vrf;

pub use randomness::{expand_random_words, pick_index};
pub use vrf::{
    request_id_from_events, ConsumerExecuteMsg, CoordinatorExecuteMsg, CoordinatorQueryMsg,
    RequestRandomWordsResponse, REQUEST_EVENT,
};
