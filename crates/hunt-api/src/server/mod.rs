use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use axum::extract::{Path, Query, Request, State};
use axum::http::header::{HeaderName, HeaderValue};
use axum::http::Method;
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use contracts::{
    ApiError, Bet, BetSide, CurrencyKind, ErrorCode, GameConfig, LeaderboardEntry, Location,
    MarketOutcome, MarketOverview, MarketView, PowerUpKind, Role, RoundActionResponse, Timeframe,
    UserStats, SCHEMA_VERSION_V1,
};
use hunt_core::{HuntError, OpponentTicket};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::{HuntApi, PersistenceError};

const DEFAULT_SQLITE_PATH: &str = "hunt.sqlite";

include!("error.rs");
include!("state.rs");
include!("routes/game.rs");
include!("routes/market.rs");
include!("util.rs");

/// Serve the HTTP API. `sqlite_path = None` keeps every collaborator in memory.
pub async fn serve(
    addr: SocketAddr,
    config: GameConfig,
    sqlite_path: Option<PathBuf>,
) -> Result<(), ServerError> {
    let now = unix_now();
    let tick_period = Duration::from_secs(config.odds_tick_secs.max(1));
    let api = match sqlite_path {
        Some(path) => HuntApi::open_sqlite(config, path, now)?,
        None => HuntApi::in_memory(config, now),
    };
    let state = AppState::new(api);
    let odds_tick = spawn_odds_tick(state.clone(), tick_period);
    let app = router(state);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "hunt api listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    odds_tick.abort();
    info!("hunt api stopped");
    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/locations", get(list_locations))
        .route("/api/v1/rounds", post(start_round))
        .route("/api/v1/rounds/current", get(current_round))
        .route("/api/v1/rounds/current/guess", post(submit_guess))
        .route("/api/v1/rounds/current/hide", post(hide))
        .route("/api/v1/rounds/current/power-up", post(use_power_up))
        .route("/api/v1/rounds/current/hint", post(request_hint))
        .route("/api/v1/rounds/current/surrender", post(surrender))
        .route("/api/v1/wallet", post(connect_wallet))
        .route("/api/v1/markets", get(list_markets))
        .route("/api/v1/markets/overview", get(market_overview))
        .route("/api/v1/markets/{market_id}/bets", post(place_bet))
        .route("/api/v1/markets/{market_id}/settle", post(settle_market))
        .route("/api/v1/users/{address}/bets", get(user_bets))
        .route("/api/v1/users/{address}/stats", get(user_stats))
        .route("/api/v1/leaderboard", get(leaderboard))
        .layer(middleware::from_fn(cors_middleware))
        .with_state(state)
}

async fn cors_middleware(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        let mut response = Response::new(axum::body::Body::empty());
        *response.status_mut() = StatusCode::NO_CONTENT;
        apply_cors_headers(response.headers_mut());
        return response;
    }

    let mut response = next.run(request).await;
    apply_cors_headers(response.headers_mut());
    response
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests;
