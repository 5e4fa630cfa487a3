use cosmwasm_std::{
    coins, to_json_binary, BankMsg, DepsMut, Env, Event, MessageInfo, QueryRequest, Reply,
    Response, StdError, SubMsg, Uint128, Uint256, WasmMsg, WasmQuery,
};
use raffle_common::randomness::pick_index;
use raffle_common::vrf::{request_id_from_events, CoordinatorExecuteMsg, CoordinatorQueryMsg};

use crate::error::ContractError;
use crate::state::{RaffleStatus, RoundResult, CONFIG, PLAYERS, RAFFLE_STATE, ROUNDS};

pub const REQUEST_RANDOMNESS_REPLY_ID: u64 = 1;

/// Enter the current round. Anyone can call.
///
/// Exactly one coin in the fee denom. Any amount at or above the fee is
/// accepted and added to the pool in full; there is no refund of the excess.
pub fn enter(deps: DepsMut, _env: Env, info: MessageInfo) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;

    // Validate funds: at most one coin, in the fee denom
    if info.funds.len() > 1 {
        return Err(ContractError::InvalidFunds);
    }
    let sent = match info.funds.first() {
        Some(coin) if coin.denom != config.entrance_fee.denom => {
            return Err(ContractError::WrongDenom {
                expected: config.entrance_fee.denom,
                got: coin.denom.clone(),
            });
        }
        Some(coin) => coin.amount,
        None => Uint128::zero(),
    };

    if sent < config.entrance_fee.amount {
        return Err(ContractError::InsufficientPayment {
            sent,
            required: config.entrance_fee.amount,
        });
    }

    let mut state = RAFFLE_STATE.load(deps.storage)?;
    if state.status != RaffleStatus::Open {
        return Err(ContractError::RaffleNotOpen);
    }

    PLAYERS.save(deps.storage, (state.round, state.player_count), &info.sender)?;
    state.player_count += 1;
    state.pool = state.pool.checked_add(sent).map_err(StdError::from)?;
    RAFFLE_STATE.save(deps.storage, &state)?;

    Ok(Response::new()
        .add_attribute("action", "enter")
        .add_attribute("player", info.sender.to_string())
        .add_attribute("amount", sent.to_string())
        .add_event(
            Event::new("raffle_entered")
                .add_attribute("player", info.sender.to_string())
                .add_attribute("round", state.round.to_string())
                .add_attribute("amount", sent.to_string())
                .add_attribute("num_players", state.player_count.to_string()),
        ))
}

/// Start a drawing. Anyone can call, but only while `CheckUpkeep` holds.
///
/// The coordinator hands out request ids sequentially and its
/// `RequestRandomWords` runs right after this call inside the same
/// transaction, so the id it reports as next is the id this request gets.
/// `confirm_randomness_request` checks that on the reply.
pub fn perform_upkeep(
    deps: DepsMut,
    env: Env,
    _info: MessageInfo,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let mut state = RAFFLE_STATE.load(deps.storage)?;

    let eligibility = state.eligibility(env.block.time, config.interval_seconds);
    if !eligibility.upkeep_needed() {
        return Err(ContractError::UpkeepNotNeeded {
            raffle_state: state.status,
            seconds_elapsed: eligibility.seconds_elapsed,
            num_players: state.player_count,
            pool: state.pool,
        });
    }

    let next_id_query = QueryRequest::Wasm(WasmQuery::Smart {
        contract_addr: config.vrf_coordinator.to_string(),
        msg: to_json_binary(&CoordinatorQueryMsg::NextRequestId {})?,
    });
    let request_id: u64 = deps.querier.query(&next_id_query)?;

    state.status = RaffleStatus::Calculating;
    state.pending_request_id = Some(request_id);
    RAFFLE_STATE.save(deps.storage, &state)?;

    let request_msg = WasmMsg::Execute {
        contract_addr: config.vrf_coordinator.to_string(),
        msg: to_json_binary(&CoordinatorExecuteMsg::RequestRandomWords {
            key_hash: config.key_hash,
            subscription_id: config.subscription_id,
            request_confirmations: config.request_confirmations,
            callback_gas_limit: config.callback_gas_limit,
            num_words: config.num_words,
        })?,
        funds: vec![],
    };

    Ok(Response::new()
        .add_submessage(SubMsg::reply_on_success(
            request_msg,
            REQUEST_RANDOMNESS_REPLY_ID,
        ))
        .add_attribute("action", "perform_upkeep")
        .add_attribute("request_id", request_id.to_string())
        .add_event(
            Event::new("raffle_drawing_requested")
                .add_attribute("request_id", request_id.to_string())
                .add_attribute("round", state.round.to_string())
                .add_attribute("num_players", state.player_count.to_string())
                .add_attribute("pool", state.pool.to_string())
                .add_attribute("timestamp", env.block.time.seconds().to_string()),
        ))
}

/// Reply to the `RequestRandomWords` submessage. Fails the whole transaction
/// unless the coordinator assigned the id recorded as pending.
pub fn confirm_randomness_request(deps: DepsMut, msg: Reply) -> Result<Response, ContractError> {
    let response = msg.result.into_result().map_err(StdError::generic_err)?;
    let assigned =
        request_id_from_events(&response.events).ok_or(ContractError::MissingRequestId)?;

    let state = RAFFLE_STATE.load(deps.storage)?;
    let expected = state.pending_request_id.unwrap_or_default();
    if assigned != expected {
        return Err(ContractError::RequestIdMismatch { expected, assigned });
    }

    Ok(Response::new()
        .add_attribute("action", "confirm_randomness_request")
        .add_attribute("request_id", assigned.to_string()))
}

/// Randomness callback. Only the VRF coordinator can call.
///
/// 1. Match `request_id` against the single pending request
/// 2. winner = players[random_words[0] % player_count]
/// 3. Check the contract can cover the pool before any write
/// 4. Record the round, reset to Open and send the pool to the winner
///
/// Everything after step 3 is one transition: a failing bank send reverts
/// the whole transaction, so no reset is ever committed without its payout.
pub fn fulfill_random_words(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    request_id: u64,
    random_words: Vec<Uint256>,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.vrf_coordinator {
        return Err(ContractError::OnlyCoordinatorCanFulfill);
    }

    let mut state = RAFFLE_STATE.load(deps.storage)?;
    if state.pending_request_id != Some(request_id) {
        return Err(ContractError::UnknownRequest { request_id });
    }

    let random_word = *random_words.first().ok_or(ContractError::NoRandomWords)?;
    let winner_index = pick_index(random_word, state.player_count)
        .ok_or_else(|| StdError::generic_err("pending drawing has no players"))?;
    let winner = PLAYERS.load(deps.storage, (state.round, winner_index))?;

    let prize = state.pool;
    let available = deps
        .querier
        .query_balance(&env.contract.address, &config.entrance_fee.denom)?
        .amount;
    if available < prize {
        return Err(ContractError::PayoutFailure {
            needed: prize,
            available,
        });
    }

    let completed_round = state.round;
    let result = RoundResult {
        round: completed_round,
        winner: winner.clone(),
        prize,
        player_count: state.player_count,
        request_id,
        random_word,
        completed_at: env.block.time,
    };
    ROUNDS.save(deps.storage, completed_round, &result)?;

    state.recent_winner = Some(winner.clone());
    state.round += 1;
    state.player_count = 0;
    state.pool = Uint128::zero();
    state.status = RaffleStatus::Open;
    state.last_timestamp = env.block.time;
    state.pending_request_id = None;
    state.total_rounds_completed += 1;
    state.total_prizes_paid += prize;
    RAFFLE_STATE.save(deps.storage, &state)?;

    let payout = BankMsg::Send {
        to_address: winner.to_string(),
        amount: coins(prize.u128(), &config.entrance_fee.denom),
    };

    Ok(Response::new()
        .add_message(payout)
        .add_attribute("action", "fulfill_random_words")
        .add_attribute("request_id", request_id.to_string())
        .add_attribute("winner", winner.to_string())
        .add_attribute("prize", prize.to_string())
        .add_event(
            Event::new("raffle_winner_picked")
                .add_attribute("winner", winner.to_string())
                .add_attribute("round", completed_round.to_string())
                .add_attribute("prize", prize.to_string())
                .add_attribute("denom", config.entrance_fee.denom)
                .add_attribute("request_id", request_id.to_string())
                .add_attribute("winner_index", winner_index.to_string())
                .add_attribute("timestamp", env.block.time.seconds().to_string()),
        ))
}
