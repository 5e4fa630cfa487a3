//! Integration tests for the raffle and its VRF coordinator.
//!
//! Both contracts run against their own `cosmwasm_std::testing` mocks and are
//! driven through their `instantiate` / `execute` / `query` entry points.
//! Messages one contract dispatches to the other are relayed by hand, and the
//! raffle's `NextRequestId` query is answered from the coordinator's real
//! state via `MockQuerier::update_wasm`.
//!
//! Run:
//! ```bash
//! cargo test -p raffle-integration-tests
//! ```

use cosmwasm_std::testing::{
    message_info, mock_dependencies, mock_dependencies_with_balance, mock_env, MockApi,
    MockQuerier, MockStorage,
};
use cosmwasm_std::{
    coin, coins, from_json, to_json_binary, Addr, BankMsg, Binary, ContractResult, CosmosMsg,
    Env, Event, OwnedDeps, Reply, ReplyOn, Response, SubMsgResponse, SubMsgResult, SystemError,
    SystemResult, Timestamp, Uint128, Uint256, WasmMsg, WasmQuery,
};
use raffle_common::randomness::{expand_random_words, pick_index};

type MockDeps = OwnedDeps<MockStorage, MockApi, MockQuerier>;

// ─── Constants ───

/// drand quicknet public key
const QUICKNET_PK_HEX: &str = "83cf0f2896adee7eb8b5f01fcad3912212c437e0073e911fb90022d3e760183c8c4b450b6a0a6c3ac6a5776a2d1064510d1fec758c921cc22b0e17e63aaf4bcb5ed66304de9cf809bd274ca73bab4af5a6e9c76a4bc09e76eae8991ef5ece45a";
const GENESIS_TIME: u64 = 1692803367;
const PERIOD: u64 = 3;

/// Published quicknet beacon: round 1000
const TEST_ROUND: u64 = 1000;
const TEST_SIG_HEX: &str = "b44679b9a59af2ec876b1a6b1ad52ea9b1615fc3982b19576350f93447cb1125e342b73a8dd2bacbe47e4b6b63ed5e39";
const TEST_RANDOMNESS_HEX: &str =
    "fe290beca10872ef2fb164d2aa4442de4566183ec51c56ff3cd603d930e54fdd";

const DENOM: &str = "inj";
/// 0.01 INJ (18 decimals)
const FEE: u128 = 10_000_000_000_000_000;
const INTERVAL: u64 = 30;

// ─── Clock ───

/// Block time at which drand round `round` is the latest published one
fn time_at_round(round: u64) -> Timestamp {
    Timestamp::from_seconds(GENESIS_TIME + (round - 1) * PERIOD)
}

/// Raffle deployment time: quicknet round 987. A drawing triggered one
/// interval later (round 997) with 3 confirmations targets round 1000.
fn start_time() -> Timestamp {
    time_at_round(987)
}

fn env_at(time: Timestamp) -> Env {
    let mut env = mock_env();
    env.block.time = time;
    env
}

/// Address of the raffle contract (the mock env's contract address)
fn raffle_addr() -> Addr {
    mock_env().contract.address
}

// ─── Setup ───

fn setup_coordinator(deps: &mut MockDeps) {
    let admin = deps.api.addr_make("admin");
    let operator = deps.api.addr_make("operator");
    let msg = raffle_vrf_coordinator::msg::InstantiateMsg {
        operators: vec![operator.to_string()],
        drand_pubkey_hex: QUICKNET_PK_HEX.to_string(),
        chain_hash: "52db9ba70e0cc0f6eaf7803dd07447a1f5477735fd3f661792ba94600c84e971".to_string(),
        genesis_time: GENESIS_TIME,
        period_seconds: PERIOD,
        max_num_words: 10,
    };
    let info = message_info(&admin, &[]);
    raffle_vrf_coordinator::contract::instantiate(deps.as_mut(), env_at(start_time()), info, msg)
        .unwrap();
}

fn setup_raffle(deps: &mut MockDeps, coordinator: &Addr) {
    let admin = deps.api.addr_make("admin");
    let msg = raffle::msg::InstantiateMsg {
        vrf_coordinator: coordinator.to_string(),
        entrance_fee: coin(FEE, DENOM),
        interval_seconds: INTERVAL,
        key_hash: "quicknet".to_string(),
        subscription_id: 1,
        request_confirmations: 3,
        callback_gas_limit: 500_000,
        num_words: 1,
    };
    let info = message_info(&admin, &[]);
    raffle::contract::instantiate(deps.as_mut(), env_at(start_time()), info, msg).unwrap();
}

/// Raffle with `balance` held by the contract, plus a fresh coordinator.
fn setup(balance: u128) -> (MockDeps, MockDeps, Addr) {
    let mut coordinator_deps = mock_dependencies();
    setup_coordinator(&mut coordinator_deps);
    // Both mocks use the same address codec, so this is the coordinator's address
    let coordinator = coordinator_deps.api.addr_make("vrf_coordinator");

    let mut raffle_deps = mock_dependencies_with_balance(&coins(balance, DENOM));
    setup_raffle(&mut raffle_deps, &coordinator);
    (raffle_deps, coordinator_deps, coordinator)
}

// ─── Relaying ───

fn enter(raffle_deps: &mut MockDeps, name: &str) -> Addr {
    let player = raffle_deps.api.addr_make(name);
    let info = message_info(&player, &coins(FEE, DENOM));
    raffle::contract::execute(
        raffle_deps.as_mut(),
        env_at(start_time()),
        info,
        raffle::msg::ExecuteMsg::Enter {},
    )
    .unwrap();
    player
}

/// Point the raffle's wasm querier at the coordinator's current `NextRequestId`.
fn sync_coordinator_query(raffle_deps: &mut MockDeps, coordinator_deps: &MockDeps) {
    let res = raffle_vrf_coordinator::contract::query(
        coordinator_deps.as_ref(),
        mock_env(),
        raffle_vrf_coordinator::msg::QueryMsg::NextRequestId {},
    )
    .unwrap();
    let next_request_id: u64 = from_json(res).unwrap();

    raffle_deps.querier.update_wasm(move |query| match query {
        WasmQuery::Smart { .. } => {
            SystemResult::Ok(ContractResult::Ok(to_json_binary(&next_request_id).unwrap()))
        }
        _ => SystemResult::Err(SystemError::UnsupportedRequest {
            kind: "wasm".to_string(),
        }),
    });
}

fn wasm_execute(msg: &CosmosMsg) -> (String, Binary) {
    match msg {
        CosmosMsg::Wasm(WasmMsg::Execute {
            contract_addr, msg, ..
        }) => (contract_addr.clone(), msg.clone()),
        other => panic!("expected wasm execute, got {:?}", other),
    }
}

/// Keeper triggers the drawing; the raffle's request is delivered to the coordinator.
fn perform_upkeep_and_relay(
    raffle_deps: &mut MockDeps,
    coordinator_deps: &mut MockDeps,
    coordinator: &Addr,
    time: Timestamp,
) -> u64 {
    sync_coordinator_query(raffle_deps, coordinator_deps);

    let keeper = raffle_deps.api.addr_make("keeper");
    let res = raffle::contract::execute(
        raffle_deps.as_mut(),
        env_at(time),
        message_info(&keeper, &[]),
        raffle::msg::ExecuteMsg::PerformUpkeep {
            perform_data: Binary::default(),
        },
    )
    .unwrap();

    let (contract_addr, msg) = wasm_execute(&res.messages[0].msg);
    assert_eq!(contract_addr, coordinator.as_str());

    assert_eq!(res.messages[0].reply_on, ReplyOn::Success);
    let reply_id = res.messages[0].id;

    let res = raffle_vrf_coordinator::contract::execute(
        coordinator_deps.as_mut(),
        env_at(time),
        message_info(&raffle_addr(), &[]),
        from_json(msg).unwrap(),
    )
    .unwrap();
    let data: raffle_common::RequestRandomWordsResponse =
        from_json(res.data.clone().unwrap()).unwrap();

    // Submessage succeeded: the raffle checks the id it was assigned
    raffle::contract::reply(
        raffle_deps.as_mut(),
        env_at(time),
        as_reply(reply_id, &res),
    )
    .unwrap();
    data.request_id
}

/// The coordinator's response as the raffle's reply sees it on chain
fn as_reply(id: u64, res: &Response) -> Reply {
    let events = res
        .events
        .iter()
        .map(|e| Event::new(format!("wasm-{}", e.ty)).add_attributes(e.attributes.clone()))
        .collect();
    #[allow(deprecated)]
    let response = SubMsgResponse {
        events,
        data: res.data.clone(),
        msg_responses: vec![],
    };
    Reply {
        id,
        payload: Binary::default(),
        gas_used: 0,
        result: SubMsgResult::Ok(response),
    }
}

/// Operator fulfills with the round-1000 beacon; returns the raffle callback.
fn fulfill_at_coordinator(coordinator_deps: &mut MockDeps, request_id: u64) -> (String, Binary) {
    let operator = coordinator_deps.api.addr_make("operator");
    let res = raffle_vrf_coordinator::contract::execute(
        coordinator_deps.as_mut(),
        env_at(time_at_round(TEST_ROUND)),
        message_info(&operator, &[]),
        raffle_vrf_coordinator::msg::ExecuteMsg::FulfillRandomWords {
            request_id,
            round: TEST_ROUND,
            signature_hex: TEST_SIG_HEX.to_string(),
        },
    )
    .unwrap();
    wasm_execute(&res.messages[0].msg)
}

fn deliver_callback(
    raffle_deps: &mut MockDeps,
    coordinator: &Addr,
    msg: Binary,
) -> Result<Response, raffle::ContractError> {
    raffle::contract::execute(
        raffle_deps.as_mut(),
        env_at(time_at_round(TEST_ROUND)),
        message_info(coordinator, &[]),
        from_json(msg).unwrap(),
    )
}

fn raffle_info(raffle_deps: &MockDeps) -> raffle::state::RaffleStateInfo {
    let res = raffle::contract::query(
        raffle_deps.as_ref(),
        mock_env(),
        raffle::msg::QueryMsg::RaffleInfo {},
    )
    .unwrap();
    from_json(res).unwrap()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[test]
fn test_full_raffle_round_with_drand_beacon() {
    let (mut raffle_deps, mut coordinator_deps, coordinator) = setup(3 * FEE);

    let players = vec![
        enter(&mut raffle_deps, "alice"),
        enter(&mut raffle_deps, "bob"),
        enter(&mut raffle_deps, "carol"),
    ];

    // 1. Upkeep agent polls
    let upkeep_time = start_time().plus_seconds(INTERVAL + 1);
    let res = raffle::contract::query(
        raffle_deps.as_ref(),
        env_at(upkeep_time),
        raffle::msg::QueryMsg::CheckUpkeep {
            check_data: Binary::default(),
        },
    )
    .unwrap();
    let check: raffle::msg::CheckUpkeepResponse = from_json(res).unwrap();
    assert!(check.upkeep_needed);

    // 2. Drawing requested; coordinator stores the request for the raffle
    let request_id = perform_upkeep_and_relay(
        &mut raffle_deps,
        &mut coordinator_deps,
        &coordinator,
        upkeep_time,
    );
    assert_eq!(request_id, 1);
    assert_eq!(raffle_info(&raffle_deps).pending_request_id, Some(request_id));

    let res = raffle_vrf_coordinator::contract::query(
        coordinator_deps.as_ref(),
        mock_env(),
        raffle_vrf_coordinator::msg::QueryMsg::Request { request_id },
    )
    .unwrap();
    let request: Option<raffle_vrf_coordinator::state::RandomnessRequest> =
        from_json(res).unwrap();
    let request = request.unwrap();
    assert_eq!(request.consumer, raffle_addr());
    assert_eq!(request.target_round, TEST_ROUND);

    // 3. Operator submits the beacon; coordinator calls back into the raffle
    let (callback_addr, callback) = fulfill_at_coordinator(&mut coordinator_deps, request_id);
    assert_eq!(callback_addr, raffle_addr().as_str());
    let res = deliver_callback(&mut raffle_deps, &coordinator, callback).unwrap();

    // 4. Winner is the entrant the beacon-derived word points at
    let randomness: [u8; 32] = hex::decode(TEST_RANDOMNESS_HEX)
        .unwrap()
        .try_into()
        .unwrap();
    let word = expand_random_words(&randomness, request_id, 1)[0];
    let expected_winner = players[pick_index(word, 3).unwrap() as usize].clone();

    assert_eq!(
        res.messages[0].msg,
        CosmosMsg::Bank(BankMsg::Send {
            to_address: expected_winner.to_string(),
            amount: coins(3 * FEE, DENOM),
        })
    );

    let info = raffle_info(&raffle_deps);
    assert_eq!(info.recent_winner, Some(expected_winner));
    assert_eq!(info.player_count, 0);
    assert_eq!(info.pool, Uint128::zero());
    assert_eq!(info.status, raffle::state::RaffleStatus::Open);
    assert_eq!(info.last_timestamp, time_at_round(TEST_ROUND));
    assert!(info.pending_request_id.is_none());
}

#[test]
fn test_round_trip_with_fixed_random_word() {
    // fee 0.01, interval 30s, three entrants, +31s, fulfill with [42]
    let (mut raffle_deps, mut coordinator_deps, coordinator) = setup(3 * FEE);
    let alice = enter(&mut raffle_deps, "alice");
    enter(&mut raffle_deps, "bob");
    enter(&mut raffle_deps, "carol");

    let request_id = perform_upkeep_and_relay(
        &mut raffle_deps,
        &mut coordinator_deps,
        &coordinator,
        start_time().plus_seconds(INTERVAL + 1),
    );

    let callback = to_json_binary(&raffle_common::ConsumerExecuteMsg::FulfillRandomWords {
        request_id,
        random_words: vec![Uint256::from(42u128)],
    })
    .unwrap();
    let res = deliver_callback(&mut raffle_deps, &coordinator, callback).unwrap();

    // 42 % 3 == 0
    assert_eq!(
        res.messages[0].msg,
        CosmosMsg::Bank(BankMsg::Send {
            to_address: alice.to_string(),
            amount: coins(30_000_000_000_000_000, DENOM),
        })
    );
    let info = raffle_info(&raffle_deps);
    assert_eq!(info.recent_winner, Some(alice));
    assert_eq!(info.player_count, 0);
    assert_eq!(info.status, raffle::state::RaffleStatus::Open);
}

#[test]
fn test_pending_drawing_rejects_other_calls() {
    let (mut raffle_deps, mut coordinator_deps, coordinator) = setup(2 * FEE);
    enter(&mut raffle_deps, "alice");
    enter(&mut raffle_deps, "bob");

    let upkeep_time = start_time().plus_seconds(INTERVAL + 1);
    let request_id = perform_upkeep_and_relay(
        &mut raffle_deps,
        &mut coordinator_deps,
        &coordinator,
        upkeep_time,
    );

    // Second trigger while the first is pending
    sync_coordinator_query(&mut raffle_deps, &coordinator_deps);
    let keeper = raffle_deps.api.addr_make("keeper");
    let err = raffle::contract::execute(
        raffle_deps.as_mut(),
        env_at(upkeep_time.plus_seconds(60)),
        message_info(&keeper, &[]),
        raffle::msg::ExecuteMsg::PerformUpkeep {
            perform_data: Binary::default(),
        },
    )
    .unwrap_err();
    assert!(matches!(
        err,
        raffle::ContractError::UpkeepNotNeeded {
            raffle_state: raffle::state::RaffleStatus::Calculating,
            ..
        }
    ));

    // Entry while calculating
    let carol = raffle_deps.api.addr_make("carol");
    let err = raffle::contract::execute(
        raffle_deps.as_mut(),
        env_at(upkeep_time),
        message_info(&carol, &coins(FEE, DENOM)),
        raffle::msg::ExecuteMsg::Enter {},
    )
    .unwrap_err();
    assert!(matches!(err, raffle::ContractError::RaffleNotOpen));

    // Another consumer's request is fulfilled and misrouted to the raffle
    let other = coordinator_deps.api.addr_make("other_consumer");
    raffle_vrf_coordinator::contract::execute(
        coordinator_deps.as_mut(),
        env_at(upkeep_time),
        message_info(&other, &[]),
        raffle_vrf_coordinator::msg::ExecuteMsg::RequestRandomWords {
            key_hash: "quicknet".to_string(),
            subscription_id: 2,
            request_confirmations: 3,
            callback_gas_limit: 500_000,
            num_words: 1,
        },
    )
    .unwrap();
    let (callback_addr, callback) = fulfill_at_coordinator(&mut coordinator_deps, request_id + 1);
    assert_eq!(callback_addr, other.as_str());

    let before = raffle_info(&raffle_deps);
    let err = deliver_callback(&mut raffle_deps, &coordinator, callback).unwrap_err();
    assert!(matches!(
        err,
        raffle::ContractError::UnknownRequest { request_id: 2 }
    ));
    assert_eq!(raffle_info(&raffle_deps), before);

    // The raffle's own request still completes
    let (_, callback) = fulfill_at_coordinator(&mut coordinator_deps, request_id);
    deliver_callback(&mut raffle_deps, &coordinator, callback).unwrap();
    let info = raffle_info(&raffle_deps);
    assert_eq!(info.status, raffle::state::RaffleStatus::Open);
    assert_eq!(info.total_rounds_completed, 1);
}

#[test]
fn test_underfunded_payout_leaves_round_pending() {
    // Contract balance cannot cover the recorded pool
    let (mut raffle_deps, mut coordinator_deps, coordinator) = setup(FEE);
    enter(&mut raffle_deps, "alice");
    enter(&mut raffle_deps, "bob");

    let request_id = perform_upkeep_and_relay(
        &mut raffle_deps,
        &mut coordinator_deps,
        &coordinator,
        start_time().plus_seconds(INTERVAL + 1),
    );
    let before = raffle_info(&raffle_deps);

    let (_, callback) = fulfill_at_coordinator(&mut coordinator_deps, request_id);
    let err = deliver_callback(&mut raffle_deps, &coordinator, callback).unwrap_err();
    assert!(matches!(err, raffle::ContractError::PayoutFailure { .. }));

    let after = raffle_info(&raffle_deps);
    assert_eq!(before, after);
    assert_eq!(after.status, raffle::state::RaffleStatus::Calculating);
    assert_eq!(after.player_count, 2);
    assert!(after.recent_winner.is_none());
}

#[test]
fn test_consecutive_rounds() {
    let (mut raffle_deps, mut coordinator_deps, coordinator) = setup(3 * FEE);

    enter(&mut raffle_deps, "alice");
    let first = perform_upkeep_and_relay(
        &mut raffle_deps,
        &mut coordinator_deps,
        &coordinator,
        start_time().plus_seconds(INTERVAL),
    );
    let (_, callback) = fulfill_at_coordinator(&mut coordinator_deps, first);
    deliver_callback(&mut raffle_deps, &coordinator, callback).unwrap();

    // Second round opens at the fulfillment time; request it from there
    let second_start = time_at_round(TEST_ROUND);
    enter(&mut raffle_deps, "bob");
    enter(&mut raffle_deps, "carol");

    // Round 1000 is public by now, so the second request needs a later beacon
    let second = perform_upkeep_and_relay(
        &mut raffle_deps,
        &mut coordinator_deps,
        &coordinator,
        second_start.plus_seconds(INTERVAL),
    );
    assert_eq!(second, first + 1);

    let operator = coordinator_deps.api.addr_make("operator");
    let err = raffle_vrf_coordinator::contract::execute(
        coordinator_deps.as_mut(),
        env_at(second_start.plus_seconds(INTERVAL)),
        message_info(&operator, &[]),
        raffle_vrf_coordinator::msg::ExecuteMsg::FulfillRandomWords {
            request_id: second,
            round: TEST_ROUND,
            signature_hex: TEST_SIG_HEX.to_string(),
        },
    )
    .unwrap_err();
    assert!(matches!(
        err,
        raffle_vrf_coordinator::ContractError::RoundMismatch {
            round: TEST_ROUND,
            target_round: 1013,
            ..
        }
    ));

    let res = raffle::contract::query(
        raffle_deps.as_ref(),
        mock_env(),
        raffle::msg::QueryMsg::RoundHistory {
            start_after: None,
            limit: None,
        },
    )
    .unwrap();
    let history: raffle::msg::RoundHistoryResponse = from_json(res).unwrap();
    assert_eq!(history.rounds.len(), 1);
    assert_eq!(history.rounds[0].player_count, 1);

    let info = raffle_info(&raffle_deps);
    assert_eq!(info.round, 2);
    assert_eq!(info.player_count, 2);
    assert_eq!(info.pending_request_id, Some(second));
}
