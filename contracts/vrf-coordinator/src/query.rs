use cosmwasm_std::{to_json_binary, Binary, Deps, Env, StdResult};

use crate::state::{CONFIG, NEXT_REQUEST_ID, REQUESTS};

pub fn query_config(deps: Deps) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    to_json_binary(&config)
}

pub fn query_next_request_id(deps: Deps) -> StdResult<Binary> {
    let next = NEXT_REQUEST_ID.load(deps.storage)?;
    to_json_binary(&next)
}

pub fn query_request(deps: Deps, request_id: u64) -> StdResult<Binary> {
    let request = REQUESTS.may_load(deps.storage, request_id)?;
    to_json_binary(&request)
}

pub fn query_current_round(deps: Deps, env: Env) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    to_json_binary(&config.round_at(env.block.time))
}
