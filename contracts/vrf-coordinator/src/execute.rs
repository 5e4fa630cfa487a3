use cosmwasm_std::{to_json_binary, DepsMut, Env, Event, MessageInfo, Response, WasmMsg};
use raffle_common::randomness::expand_random_words;
use raffle_common::vrf::{ConsumerExecuteMsg, RequestRandomWordsResponse, REQUEST_EVENT};

use crate::error::ContractError;
use crate::state::{RandomnessRequest, RequestStatus, CONFIG, NEXT_REQUEST_ID, REQUESTS};
use crate::verify::beacon_randomness;

pub struct RandomWordsRequest {
    pub key_hash: String,
    pub subscription_id: u64,
    pub request_confirmations: u16,
    pub callback_gas_limit: u32,
    pub num_words: u32,
}

/// Open a randomness request for the sender. Anyone can call.
///
/// The request is bound to a drand round strictly after the one current at
/// request time, so neither the consumer nor the operator knows the beacon
/// when the request is made.
pub fn request_random_words(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    params: RandomWordsRequest,
) -> Result<Response, ContractError> {
    let RandomWordsRequest {
        key_hash,
        subscription_id,
        request_confirmations,
        callback_gas_limit,
        num_words,
    } = params;

    let config = CONFIG.load(deps.storage)?;
    if num_words == 0 || num_words > config.max_num_words {
        return Err(ContractError::InvalidNumWords {
            num_words,
            max: config.max_num_words,
        });
    }

    let request_id = NEXT_REQUEST_ID.load(deps.storage)?;
    NEXT_REQUEST_ID.save(deps.storage, &(request_id + 1))?;

    let confirmations = u64::from(request_confirmations.max(1));
    let target_round = config.round_at(env.block.time) + confirmations;

    let request = RandomnessRequest {
        id: request_id,
        consumer: info.sender.clone(),
        key_hash: key_hash.clone(),
        subscription_id,
        callback_gas_limit,
        num_words,
        target_round,
        status: RequestStatus::Pending,
        requested_at: env.block.time,
        fulfilled_round: None,
        fulfilled_at: None,
    };
    REQUESTS.save(deps.storage, request_id, &request)?;

    Ok(Response::new()
        .set_data(to_json_binary(&RequestRandomWordsResponse { request_id })?)
        .add_attribute("action", "request_random_words")
        .add_attribute("request_id", request_id.to_string())
        .add_attribute("consumer", info.sender.to_string())
        .add_event(
            Event::new(REQUEST_EVENT)
                .add_attribute("request_id", request_id.to_string())
                .add_attribute("consumer", info.sender.to_string())
                .add_attribute("key_hash", key_hash)
                .add_attribute("subscription_id", subscription_id.to_string())
                .add_attribute("num_words", num_words.to_string())
                .add_attribute("target_round", target_round.to_string())
                .add_attribute("timestamp", env.block.time.seconds().to_string()),
        ))
}

/// Fulfill a pending request from a drand beacon. Only operators can call this.
///
/// Only the beacon of the request's `target_round` is accepted; any other
/// round, earlier or later, is rejected before the signature is checked.
///
/// The consumer callback is a plain message: if the consumer rejects it, the
/// whole transaction fails and the request stays pending for a retry.
pub fn fulfill_random_words(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    request_id: u64,
    round: u64,
    signature_hex: String,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;

    if !config.operators.contains(&info.sender) {
        return Err(ContractError::Unauthorized {
            reason: "only operators can fulfill requests".to_string(),
        });
    }

    let mut request = REQUESTS
        .may_load(deps.storage, request_id)?
        .ok_or(ContractError::RequestNotFound { request_id })?;

    if request.status != RequestStatus::Pending {
        return Err(ContractError::RequestAlreadyFulfilled { request_id });
    }

    if round != request.target_round {
        return Err(ContractError::RoundMismatch {
            request_id,
            round,
            target_round: request.target_round,
        });
    }

    let signature = hex::decode(&signature_hex).map_err(|_| ContractError::InvalidHex {
        field: "signature_hex".to_string(),
    })?;

    let randomness = beacon_randomness(&config.drand_pubkey, round, &signature).map_err(|e| {
        ContractError::VerificationFailed {
            reason: e.to_string(),
        }
    })?;

    let random_words = expand_random_words(&randomness, request_id, request.num_words);

    request.status = RequestStatus::Fulfilled;
    request.fulfilled_round = Some(round);
    request.fulfilled_at = Some(env.block.time);
    REQUESTS.save(deps.storage, request_id, &request)?;

    let callback = WasmMsg::Execute {
        contract_addr: request.consumer.to_string(),
        msg: to_json_binary(&ConsumerExecuteMsg::FulfillRandomWords {
            request_id,
            random_words,
        })?,
        funds: vec![],
    };

    Ok(Response::new()
        .add_message(callback)
        .add_attribute("action", "fulfill_random_words")
        .add_attribute("request_id", request_id.to_string())
        .add_attribute("round", round.to_string())
        .add_event(
            Event::new("vrf_randomness_fulfilled")
                .add_attribute("request_id", request_id.to_string())
                .add_attribute("consumer", request.consumer.to_string())
                .add_attribute("round", round.to_string())
                .add_attribute("chain_hash", config.chain_hash)
                .add_attribute("randomness", hex::encode(randomness))
                .add_attribute("fulfilled_by", info.sender.to_string()),
        ))
}

/// Update the operator list. Admin only.
pub fn update_operators(
    deps: DepsMut,
    info: MessageInfo,
    add: Vec<String>,
    remove: Vec<String>,
) -> Result<Response, ContractError> {
    let mut config = CONFIG.load(deps.storage)?;

    if info.sender != config.admin {
        return Err(ContractError::Unauthorized {
            reason: "only admin can update operators".to_string(),
        });
    }

    for addr_str in &remove {
        let addr = deps.api.addr_validate(addr_str)?;
        config.operators.retain(|a| *a != addr);
    }

    for addr_str in &add {
        let addr = deps.api.addr_validate(addr_str)?;
        if !config.operators.contains(&addr) {
            config.operators.push(addr);
        }
    }

    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("action", "update_operators")
        .add_attribute("added", add.join(","))
        .add_attribute("removed", remove.join(",")))
}
