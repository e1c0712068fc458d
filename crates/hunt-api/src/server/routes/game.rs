#[derive(Debug, Deserialize)]
struct StartRoundRequest {
    role: Role,
}

#[derive(Debug, Deserialize)]
struct LocationRequest {
    location_id: String,
}

#[derive(Debug, Deserialize)]
struct PowerUpRequest {
    kind: PowerUpKind,
}

#[derive(Debug, Deserialize)]
struct ConnectWalletRequest {
    address: String,
}

#[derive(Debug, Serialize)]
struct LocationsResponse {
    schema_version: String,
    locations: Vec<Location>,
}

#[derive(Debug, Serialize)]
struct WalletResponse {
    schema_version: String,
    address: String,
    stats: UserStats,
    sync_warning: Option<String>,
}

async fn list_locations(State(state): State<AppState>) -> Json<LocationsResponse> {
    let inner = state.inner.lock().await;
    Json(LocationsResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        locations: inner.api.registry().locations().to_vec(),
    })
}

async fn start_round(
    State(state): State<AppState>,
    Json(request): Json<StartRoundRequest>,
) -> Json<RoundActionResponse> {
    let mut inner = state.inner.lock().await;
    Json(inner.api.start_round(request.role))
}

async fn current_round(State(state): State<AppState>) -> Json<RoundActionResponse> {
    let inner = state.inner.lock().await;
    Json(inner.api.round())
}

async fn submit_guess(
    State(state): State<AppState>,
    Json(request): Json<LocationRequest>,
) -> Result<Json<RoundActionResponse>, HttpApiError> {
    let mut inner = state.inner.lock().await;
    let response = inner
        .api
        .submit_guess(request.location_id.trim(), unix_now())
        .map_err(HttpApiError::from_hunt)?;
    Ok(Json(response))
}

async fn hide(
    State(state): State<AppState>,
    Json(request): Json<LocationRequest>,
) -> Result<Json<RoundActionResponse>, HttpApiError> {
    let (response, ticket) = {
        let mut inner = state.inner.lock().await;
        inner
            .api
            .hide(request.location_id.trim())
            .map_err(HttpApiError::from_hunt)?
    };
    schedule_opponent(state, ticket);
    Ok(Json(response))
}

async fn use_power_up(
    State(state): State<AppState>,
    Json(request): Json<PowerUpRequest>,
) -> Json<RoundActionResponse> {
    let mut inner = state.inner.lock().await;
    Json(inner.api.use_power_up(request.kind))
}

async fn request_hint(State(state): State<AppState>) -> Json<RoundActionResponse> {
    let mut inner = state.inner.lock().await;
    Json(inner.api.request_hint(unix_now()))
}

async fn surrender(State(state): State<AppState>) -> Json<RoundActionResponse> {
    let mut inner = state.inner.lock().await;
    Json(inner.api.surrender(unix_now()))
}

async fn connect_wallet(
    State(state): State<AppState>,
    Json(request): Json<ConnectWalletRequest>,
) -> Result<Json<WalletResponse>, HttpApiError> {
    let mut inner = state.inner.lock().await;
    let stats = inner
        .api
        .connect_wallet(&request.address)
        .map_err(HttpApiError::from_hunt)?;
    Ok(Json(WalletResponse {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        address: request.address.trim().to_string(),
        stats,
        sync_warning: inner.api.last_sync_error(),
    }))
}
