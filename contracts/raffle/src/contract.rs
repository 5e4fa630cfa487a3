use cosmwasm_std::{
    entry_point, Binary, Deps, DepsMut, Env, MessageInfo, Reply, Response, StdResult, Uint128,
};
use cw2::{get_contract_version, set_contract_version};

use crate::error::ContractError;
use crate::execute;
use crate::msg::{ExecuteMsg, InstantiateMsg, MigrateMsg, QueryMsg};
use crate::query;
use crate::state::{RaffleConfig, RaffleStateInfo, RaffleStatus, CONFIG, RAFFLE_STATE};

const CONTRACT_NAME: &str = "crates.io:raffle";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[entry_point]
pub fn instantiate(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    if msg.entrance_fee.amount.is_zero() {
        return Err(ContractError::InvalidEntranceFee);
    }
    if msg.interval_seconds == 0 {
        return Err(ContractError::InvalidInterval);
    }
    if msg.num_words == 0 {
        return Err(ContractError::InvalidRequestConfig {
            reason: "num_words must be at least 1".to_string(),
        });
    }
    if msg.request_confirmations == 0 {
        return Err(ContractError::InvalidRequestConfig {
            reason: "request_confirmations must be at least 1".to_string(),
        });
    }

    let config = RaffleConfig {
        vrf_coordinator: deps.api.addr_validate(&msg.vrf_coordinator)?,
        entrance_fee: msg.entrance_fee,
        interval_seconds: msg.interval_seconds,
        key_hash: msg.key_hash,
        subscription_id: msg.subscription_id,
        request_confirmations: msg.request_confirmations,
        callback_gas_limit: msg.callback_gas_limit,
        num_words: msg.num_words,
    };
    CONFIG.save(deps.storage, &config)?;

    let state = RaffleStateInfo {
        round: 1,
        status: RaffleStatus::Open,
        player_count: 0,
        pool: Uint128::zero(),
        last_timestamp: env.block.time,
        pending_request_id: None,
        recent_winner: None,
        total_rounds_completed: 0,
        total_prizes_paid: Uint128::zero(),
    };
    RAFFLE_STATE.save(deps.storage, &state)?;

    Ok(Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("contract", "raffle")
        .add_attribute("entrance_fee", config.entrance_fee.to_string())
        .add_attribute("interval_seconds", config.interval_seconds.to_string())
        .add_attribute("creator", info.sender.to_string()))
}

#[entry_point]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::Enter {} => execute::enter(deps, env, info),
        ExecuteMsg::PerformUpkeep { .. } => execute::perform_upkeep(deps, env, info),
        ExecuteMsg::FulfillRandomWords {
            request_id,
            random_words,
        } => execute::fulfill_random_words(deps, env, info, request_id, random_words),
    }
}

#[entry_point]
pub fn reply(deps: DepsMut, _env: Env, msg: Reply) -> Result<Response, ContractError> {
    match msg.id {
        execute::REQUEST_RANDOMNESS_REPLY_ID => execute::confirm_randomness_request(deps, msg),
        id => Err(ContractError::UnknownReplyId { id }),
    }
}

#[entry_point]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Config {} => query::query_config(deps),
        QueryMsg::EntranceFee {} => query::query_entrance_fee(deps),
        QueryMsg::Interval {} => query::query_interval(deps),
        QueryMsg::RaffleState {} => query::query_raffle_state(deps),
        QueryMsg::Player { index } => query::query_player(deps, index),
        QueryMsg::NumPlayers {} => query::query_num_players(deps),
        QueryMsg::Players { start_after, limit } => {
            query::query_players(deps, start_after, limit)
        }
        QueryMsg::RecentWinner {} => query::query_recent_winner(deps),
        QueryMsg::LastTimestamp {} => query::query_last_timestamp(deps),
        QueryMsg::CheckUpkeep { check_data } => query::query_check_upkeep(deps, env, check_data),
        QueryMsg::RaffleInfo {} => query::query_raffle_info(deps),
        QueryMsg::Round { round } => query::query_round(deps, round),
        QueryMsg::RoundHistory { start_after, limit } => {
            query::query_round_history(deps, start_after, limit)
        }
    }
}

#[entry_point]
pub fn migrate(deps: DepsMut, _env: Env, _msg: MigrateMsg) -> Result<Response, ContractError> {
    let stored = get_contract_version(deps.storage)?;
    if stored.contract != CONTRACT_NAME {
        return Err(ContractError::Unauthorized {
            reason: "Cannot migrate from different contract type".to_string(),
        });
    }

    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    Ok(Response::new()
        .add_attribute("action", "migrate")
        .add_attribute("from_version", stored.version)
        .add_attribute("to_version", CONTRACT_VERSION))
}
