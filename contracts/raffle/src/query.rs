use cosmwasm_std::{to_json_binary, Addr, Binary, Deps, Env, Order, StdError, StdResult};
use cw_storage_plus::Bound;

use crate::msg::{CheckUpkeepResponse, PlayersResponse, RoundHistoryResponse};
use crate::state::{CONFIG, PLAYERS, RAFFLE_STATE, ROUNDS};

pub fn query_config(deps: Deps) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    to_json_binary(&config)
}

pub fn query_entrance_fee(deps: Deps) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    to_json_binary(&config.entrance_fee)
}

pub fn query_interval(deps: Deps) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    to_json_binary(&config.interval_seconds)
}

pub fn query_raffle_state(deps: Deps) -> StdResult<Binary> {
    let state = RAFFLE_STATE.load(deps.storage)?;
    to_json_binary(&state.status)
}

pub fn query_player(deps: Deps, index: u32) -> StdResult<Binary> {
    let state = RAFFLE_STATE.load(deps.storage)?;
    let player: Addr = PLAYERS
        .may_load(deps.storage, (state.round, index))?
        .ok_or_else(|| {
            StdError::generic_err(format!(
                "index out of range: {index} (round {} has {} players)",
                state.round, state.player_count
            ))
        })?;
    to_json_binary(&player)
}

pub fn query_num_players(deps: Deps) -> StdResult<Binary> {
    let state = RAFFLE_STATE.load(deps.storage)?;
    to_json_binary(&state.player_count)
}

pub fn query_players(
    deps: Deps,
    start_after: Option<u32>,
    limit: Option<u32>,
) -> StdResult<Binary> {
    let state = RAFFLE_STATE.load(deps.storage)?;
    let limit = limit.unwrap_or(30).min(100) as usize;
    let start = start_after.map(Bound::exclusive);

    let players: Vec<Addr> = PLAYERS
        .prefix(state.round)
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .map(|r| r.map(|(_, player)| player))
        .collect::<StdResult<_>>()?;

    to_json_binary(&PlayersResponse {
        round: state.round,
        players,
    })
}

pub fn query_recent_winner(deps: Deps) -> StdResult<Binary> {
    let state = RAFFLE_STATE.load(deps.storage)?;
    to_json_binary(&state.recent_winner)
}

pub fn query_last_timestamp(deps: Deps) -> StdResult<Binary> {
    let state = RAFFLE_STATE.load(deps.storage)?;
    to_json_binary(&state.last_timestamp)
}

/// Read-only; evaluates the four drawing conditions at the current block time.
pub fn query_check_upkeep(deps: Deps, env: Env, check_data: Binary) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    let state = RAFFLE_STATE.load(deps.storage)?;
    let eligibility = state.eligibility(env.block.time, config.interval_seconds);

    to_json_binary(&CheckUpkeepResponse {
        upkeep_needed: eligibility.upkeep_needed(),
        perform_data: check_data,
        is_open: eligibility.is_open,
        time_passed: eligibility.time_passed,
        has_players: eligibility.has_players,
        has_balance: eligibility.has_balance,
    })
}

pub fn query_raffle_info(deps: Deps) -> StdResult<Binary> {
    let state = RAFFLE_STATE.load(deps.storage)?;
    to_json_binary(&state)
}

pub fn query_round(deps: Deps, round: u64) -> StdResult<Binary> {
    let result = ROUNDS.may_load(deps.storage, round)?;
    to_json_binary(&result)
}

pub fn query_round_history(
    deps: Deps,
    start_after: Option<u64>,
    limit: Option<u32>,
) -> StdResult<Binary> {
    let limit = limit.unwrap_or(20).min(100) as usize;
    let start = start_after.map(Bound::exclusive);

    let rounds: Vec<_> = ROUNDS
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .filter_map(|r| r.ok())
        .map(|(_, result)| result)
        .collect();

    to_json_binary(&RoundHistoryResponse { rounds })
}
