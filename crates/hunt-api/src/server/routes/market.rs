#[derive(Debug, Deserialize)]
struct PlaceBetRequest {
    side: BetSide,
    stake_amount: Value,
    currency: Option<CurrencyKind>,
}

#[derive(Debug, Deserialize)]
struct SettleMarketRequest {
    outcome: MarketOutcome,
}

#[derive(Debug, Deserialize)]
struct LeaderboardQuery {
    timeframe: Option<String>,
}

#[derive(Debug, Serialize)]
struct MarketsResponse {
    schema_version: String,
    markets: Vec<MarketView>,
}

#[derive(Debug, Serialize)]
struct PlaceBetResponse {
    schema_version: String,
    bet: Bet,
    market: MarketView,
    sync_warning: Option<String>,
}

#[derive(Debug, Serialize)]
struct SettleMarketResponse {
    schema_version: String,
    market_id: String,
    outcome: MarketOutcome,
    won_bets: usize,
    lost_bets: usize,
}

#[derive(Debug, Serialize)]
struct UserBetsResponse {
    schema_version: String,
    address: String,
    bets: Vec<Bet>,
}

#[derive(Debug, Serialize)]
struct UserStatsResponse {
    schema_version: String,
    address: String,
    stats: UserStats,
}

#[derive(Debug, Serialize)]
struct LeaderboardResponse {
    schema_version: String,
    timeframe: Timeframe,
    entries: Vec<LeaderboardEntry>,
}

async fn list_markets(State(state): State<AppState>) -> Json<MarketsResponse> {
    let inner = state.inner.lock().await;
    Json(MarketsResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        markets: inner.api.markets(unix_now()),
    })
}

async fn market_overview(State(state): State<AppState>) -> Json<MarketOverview> {
    let inner = state.inner.lock().await;
    Json(inner.api.market_overview(unix_now()))
}

async fn place_bet(
    State(state): State<AppState>,
    Path(market_id): Path<String>,
    Json(request): Json<PlaceBetRequest>,
) -> Result<Json<PlaceBetResponse>, HttpApiError> {
    let stake_amount = parse_stake(&request.stake_amount)?;
    let now = unix_now();

    let mut inner = state.inner.lock().await;
    let bet = inner
        .api
        .place_bet(
            &market_id,
            request.side,
            stake_amount,
            request.currency.unwrap_or_default(),
            now,
        )
        .map_err(HttpApiError::from_hunt)?;
    let market = inner
        .api
        .market_book()
        .market(&market_id)
        .map_err(HttpApiError::from_hunt)?
        .view(now);

    Ok(Json(PlaceBetResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        bet,
        market,
        sync_warning: inner.api.last_sync_error(),
    }))
}

async fn settle_market(
    State(state): State<AppState>,
    Path(market_id): Path<String>,
    Json(request): Json<SettleMarketRequest>,
) -> Result<Json<SettleMarketResponse>, HttpApiError> {
    let mut inner = state.inner.lock().await;
    let report = inner
        .api
        .settle_market(&market_id, request.outcome)
        .map_err(HttpApiError::from_hunt)?;

    Ok(Json(SettleMarketResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        market_id: report.market_id,
        outcome: report.outcome,
        won_bets: report.won,
        lost_bets: report.lost,
    }))
}

async fn user_bets(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Json<UserBetsResponse> {
    let inner = state.inner.lock().await;
    Json(UserBetsResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        bets: inner.api.user_bets(&address),
        address,
    })
}

async fn user_stats(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<UserStatsResponse>, HttpApiError> {
    let inner = state.inner.lock().await;
    let stats = inner
        .api
        .user_stats(&address)
        .map_err(HttpApiError::from_hunt)?;
    Ok(Json(UserStatsResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        address,
        stats,
    }))
}

async fn leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<LeaderboardResponse>, HttpApiError> {
    let timeframe = parse_timeframe(query.timeframe.as_deref())?;
    let inner = state.inner.lock().await;
    let entries = inner
        .api
        .leaderboard(timeframe, unix_now())
        .map_err(HttpApiError::from_hunt)?;
    Ok(Json(LeaderboardResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        timeframe,
        entries,
    }))
}
