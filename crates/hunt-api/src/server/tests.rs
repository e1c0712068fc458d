use super::*;
use contracts::RoundPhase;
use serde_json::json;

const NOW: i64 = 1_730_000_000;

fn test_state() -> AppState {
    AppState::new(HuntApi::in_memory(GameConfig::default(), NOW))
}

#[test]
fn stake_accepts_numbers_and_numeric_strings() {
    assert_eq!(parse_stake(&json!(12.5)).expect("number"), 12.5);
    assert_eq!(parse_stake(&json!(" 7 ")).expect("numeric string"), 7.0);
    // sign is left to the market engine
    assert_eq!(parse_stake(&json!(-5)).expect("negative number"), -5.0);
}

#[test]
fn non_numeric_stake_is_an_invalid_amount() {
    for raw in [json!("ten"), json!(null), json!(true), json!("NaN"), json!({"amount": 1})] {
        let err = parse_stake(&raw).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.error.error_code, ErrorCode::InvalidAmount);
    }
}

#[test]
fn timeframe_defaults_when_missing_or_blank() {
    assert_eq!(parse_timeframe(None).expect("default"), Timeframe::default());
    assert_eq!(parse_timeframe(Some("  ")).expect("default"), Timeframe::default());
    assert_eq!(parse_timeframe(Some("weekly")).expect("weekly"), Timeframe::Weekly);

    let err = parse_timeframe(Some("hourly")).unwrap_err();
    assert_eq!(err.error.error_code, ErrorCode::InvalidQuery);
}

#[test]
fn hunt_errors_map_to_http_statuses() {
    let cases = [
        (HuntError::InvalidState("round over".into()), StatusCode::CONFLICT),
        (HuntError::MarketClosed("antoine-masse".into()), StatusCode::CONFLICT),
        (HuntError::InvalidAmount("zero".into()), StatusCode::BAD_REQUEST),
        (HuntError::not_found("market", "nobody"), StatusCode::NOT_FOUND),
        (
            HuntError::ExternalSyncFailure(hunt_core::SyncError::new("bet ledger", "disk full")),
            StatusCode::BAD_GATEWAY,
        ),
    ];
    for (err, status) in cases {
        let code = err.error_code();
        let mapped = HttpApiError::from_hunt(err);
        assert_eq!(mapped.status, status);
        assert_eq!(mapped.error.error_code, code);
    }

    let missing = HttpApiError::from_hunt(HuntError::not_found("market", "nobody"));
    assert_eq!(missing.error.details.as_deref(), Some("market=nobody"));
}

#[tokio::test]
async fn tracker_round_hides_the_fugitive_over_http() {
    let state = test_state();
    let Json(started) = start_round(
        State(state.clone()),
        Json(StartRoundRequest { role: Role::Tracker }),
    )
    .await;
    assert_eq!(started.round.phase, RoundPhase::InProgress);

    let body = serde_json::to_value(&started).expect("serializable");
    assert_eq!(body["round"]["fugitive_location_id"], Value::Null);

    let err = submit_guess(
        State(state.clone()),
        Json(LocationRequest {
            location_id: "atlantis".to_string(),
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status, StatusCode::NOT_FOUND);

    let Json(current) = current_round(State(state)).await;
    assert!(current.round.guessed_location_ids.is_empty());
}

#[tokio::test]
async fn bet_without_wallet_is_rejected_and_pools_stay_put() {
    let state = test_state();
    let err = place_bet(
        State(state.clone()),
        Path("antoine-masse".to_string()),
        Json(PlaceBetRequest {
            side: BetSide::Yes,
            stake_amount: json!(10),
            currency: None,
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status, StatusCode::CONFLICT);

    let Json(listed) = list_markets(State(state)).await;
    let market = listed
        .markets
        .iter()
        .find(|market| market.id == "antoine-masse")
        .expect("default market");
    assert!((market.yes_pool - 1623.2).abs() < 1e-9);
}

#[tokio::test]
async fn connected_wallet_can_bet() {
    let state = test_state();
    connect_wallet(
        State(state.clone()),
        Json(ConnectWalletRequest {
            address: " wallet-h ".to_string(),
        }),
    )
    .await
    .expect("address accepted");

    let Json(placed) = place_bet(
        State(state.clone()),
        Path("derrick-groves".to_string()),
        Json(PlaceBetRequest {
            side: BetSide::No,
            stake_amount: json!("4"),
            currency: Some(CurrencyKind::PlatformToken),
        }),
    )
    .await
    .expect("open market");
    assert_eq!(placed.bet.bettor_address, "wallet-h");
    assert!((placed.market.no_pool - (564.7 + 4.0)).abs() < 1e-9);

    let Json(bets) = user_bets(State(state), Path("wallet-h".to_string())).await;
    assert_eq!(bets.bets.len(), 1);
}
