use cosmwasm_std::{entry_point, Binary, Deps, DepsMut, Env, MessageInfo, Response, StdResult};
use cw2::{get_contract_version, set_contract_version};

use crate::error::ContractError;
use crate::execute::{self, RandomWordsRequest};
use crate::msg::{ExecuteMsg, InstantiateMsg, MigrateMsg, QueryMsg};
use crate::query;
use crate::state::{CoordinatorConfig, CONFIG, NEXT_REQUEST_ID};

const CONTRACT_NAME: &str = "crates.io:raffle-vrf-coordinator";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[entry_point]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let pubkey_bytes =
        hex::decode(&msg.drand_pubkey_hex).map_err(|_| ContractError::InvalidHex {
            field: "drand_pubkey_hex".to_string(),
        })?;
    if pubkey_bytes.len() != 96 {
        return Err(ContractError::InvalidPubkeyLength {
            got: pubkey_bytes.len(),
        });
    }
    let chain_hash_bytes = hex::decode(&msg.chain_hash).map_err(|_| ContractError::InvalidHex {
        field: "chain_hash".to_string(),
    })?;
    if chain_hash_bytes.len() != 32 {
        return Err(ContractError::InvalidChainHashLength {
            got: chain_hash_bytes.len(),
        });
    }
    if msg.period_seconds == 0 {
        return Err(ContractError::InvalidPeriod);
    }
    if msg.max_num_words == 0 {
        return Err(ContractError::InvalidMaxNumWords);
    }

    let mut operators = Vec::new();
    for op in &msg.operators {
        operators.push(deps.api.addr_validate(op)?);
    }

    let config = CoordinatorConfig {
        admin: info.sender.clone(),
        operators,
        drand_pubkey: pubkey_bytes,
        chain_hash: msg.chain_hash,
        genesis_time: msg.genesis_time,
        period_seconds: msg.period_seconds,
        max_num_words: msg.max_num_words,
    };

    CONFIG.save(deps.storage, &config)?;
    // Request ids start at 1 so that 0 never names a real request
    NEXT_REQUEST_ID.save(deps.storage, &1u64)?;

    Ok(Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("contract", "vrf-coordinator")
        .add_attribute("admin", info.sender.to_string()))
}

#[entry_point]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::RequestRandomWords {
            key_hash,
            subscription_id,
            request_confirmations,
            callback_gas_limit,
            num_words,
        } => execute::request_random_words(
            deps,
            env,
            info,
            RandomWordsRequest {
                key_hash,
                subscription_id,
                request_confirmations,
                callback_gas_limit,
                num_words,
            },
        ),
        ExecuteMsg::FulfillRandomWords {
            request_id,
            round,
            signature_hex,
        } => execute::fulfill_random_words(deps, env, info, request_id, round, signature_hex),
        ExecuteMsg::UpdateOperators { add, remove } => {
            execute::update_operators(deps, info, add, remove)
        }
    }
}

#[entry_point]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Config {} => query::query_config(deps),
        QueryMsg::NextRequestId {} => query::query_next_request_id(deps),
        QueryMsg::Request { request_id } => query::query_request(deps, request_id),
        QueryMsg::CurrentRound {} => query::query_current_round(deps, env),
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
