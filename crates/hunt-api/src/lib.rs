//! In-process API facade over one game session and the market book, with SQLite persistence.

mod persistence;
mod server;

use std::path::Path;

use contracts::{
    Bet, BetSide, CurrencyKind, GameConfig, LeaderboardEntry, MarketOutcome, MarketOverview,
    MarketView, PoolStats, PowerUpKind, Role, RoundActionResponse, Timeframe, UserStats,
};
use hunt_core::ports::LeaderboardSource;
use hunt_core::{
    BetRequest, Conclusion, GameSession, HuntError, HuntResult, LocationRegistry, MarketBook,
    MemoryBetLedger, MemoryStatsStore, OpponentTicket, RandomSource, SettlementReport,
};
use persistence::SqliteStore;
pub use persistence::PersistenceError;
pub use server::{default_sqlite_path, serve, ServerError};

pub struct HuntApi {
    session: GameSession,
    markets: MarketBook,
    leaderboard: Box<dyn LeaderboardSource + Send>,
    last_message: Option<String>,
}

impl HuntApi {
    /// Everything in memory; the leaderboard starts empty and stays that way.
    pub fn in_memory(config: GameConfig, now: i64) -> Self {
        Self::from_parts(
            config,
            Box::new(MemoryStatsStore::new()),
            Box::new(MemoryBetLedger::new()),
            Box::new(MemoryStatsStore::new()),
            now,
        )
    }

    /// Stats, bets and leaderboard backed by one SQLite file. Market pools are
    /// reconciled against the ledger so a restart keeps earlier stake.
    pub fn open_sqlite(
        config: GameConfig,
        path: impl AsRef<Path>,
        now: i64,
    ) -> Result<Self, PersistenceError> {
        let path = path.as_ref();
        let stats = SqliteStore::open(path)?;
        let ledger = SqliteStore::open(path)?;
        let leaderboard = SqliteStore::open(path)?;
        Ok(Self::from_parts(
            config,
            Box::new(stats),
            Box::new(ledger),
            Box::new(leaderboard),
            now,
        ))
    }

    fn from_parts(
        config: GameConfig,
        stats: Box<dyn hunt_core::StatsStore + Send>,
        ledger: Box<dyn hunt_core::BetLedger + Send>,
        leaderboard: Box<dyn LeaderboardSource + Send>,
        now: i64,
    ) -> Self {
        let mut markets = MarketBook::with_default_markets(ledger, config.market_window_days, now);
        let market_ids: Vec<String> = markets.markets().map(|market| market.id.clone()).collect();
        for market_id in market_ids {
            // failures are recorded on the book and surface as a sync warning
            let _ = markets.reconcile_pools(&market_id, now);
        }

        Self {
            session: GameSession::new(LocationRegistry::new_orleans(), config, stats),
            markets,
            leaderboard,
            last_message: None,
        }
    }

    pub fn with_random(mut self, rng: Box<dyn RandomSource + Send>) -> Self {
        self.session = self.session.with_random(rng);
        self
    }

    pub fn config(&self) -> &GameConfig {
        self.session.config()
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn market_book(&self) -> &MarketBook {
        &self.markets
    }

    pub fn registry(&self) -> &LocationRegistry {
        self.session.registry()
    }

    // --- rounds ---

    pub fn round(&self) -> RoundActionResponse {
        RoundActionResponse::new(self.last_message.clone(), self.session.view())
    }

    pub fn start_round(&mut self, role: Role) -> RoundActionResponse {
        self.session.start_round(role);
        let guesses = self.session.round().guesses_remaining();
        let message = match role {
            Role::Tracker => format!("Find the fugitive! You have {guesses} guesses."),
            Role::Fugitive => format!(
                "Choose a hiding spot. The AI tracker gets {} attempts to find you.",
                self.config().opponent_attempts
            ),
        };
        self.respond(Some(message))
    }

    pub fn submit_guess(&mut self, location_id: &str, now: i64) -> HuntResult<RoundActionResponse> {
        let outcome = self.session.submit_guess(location_id, now)?;
        let message = outcome.message(self.session.registry());
        Ok(self.respond(Some(message)))
    }

    pub fn hide(&mut self, location_id: &str) -> HuntResult<(RoundActionResponse, OpponentTicket)> {
        let ticket = self.session.hide(location_id)?;
        let message = format!(
            "You are now hiding in {}. The AI tracker will now try to find you!",
            self.registry().name_of(location_id)
        );
        Ok((self.respond(Some(message)), ticket))
    }

    pub fn use_power_up(&mut self, kind: PowerUpKind) -> RoundActionResponse {
        let message = self
            .session
            .use_power_up(kind)
            .map(|effect| effect.message(self.session.registry()));
        self.respond(message)
    }

    pub fn request_hint(&mut self, now: i64) -> RoundActionResponse {
        let message = self
            .session
            .request_hint(now)
            .map(|outcome| outcome.to_string());
        self.respond(message)
    }

    pub fn surrender(&mut self, now: i64) -> RoundActionResponse {
        let message = self.session.surrender(now).map(|conclusion| match conclusion {
            Conclusion::Escaped => format!(
                "You gave up! The fugitive was hiding in {}.",
                self.session
                    .round()
                    .fugitive_location_id()
                    .map(|id| self.session.registry().name_of(id))
                    .unwrap_or("an unknown location")
            ),
            Conclusion::Captured => "You gave up! The AI tracker takes the round.".to_string(),
        });
        self.respond(message)
    }

    /// Apply one scheduled opponent search. Returns the follow-up ticket while
    /// the chain continues.
    pub fn advance_opponent(&mut self, ticket: OpponentTicket, now: i64) -> Option<OpponentTicket> {
        let step = self.session.advance_opponent(ticket, now)?;
        let message = step.turn.message(self.session.registry());
        self.last_message = Some(message);
        step.next
    }

    fn respond(&mut self, message: Option<String>) -> RoundActionResponse {
        if message.is_some() {
            self.last_message = message.clone();
        }
        RoundActionResponse::new(message, self.session.view())
    }

    // --- wallet and stats ---

    /// Bind the wallet, adopt its stored counters and warm the bet cache.
    pub fn connect_wallet(&mut self, address: &str) -> HuntResult<UserStats> {
        let stats = self.session.connect_wallet(address)?;
        if let Some(address) = self.session.wallet_address().map(str::to_string) {
            // a ledger failure is recorded on the book and only degrades the cache
            let _ = self.markets.load_user_bets(&address);
        }
        Ok(stats)
    }

    pub fn user_stats(&self, address: &str) -> HuntResult<UserStats> {
        if self.session.wallet_address() == Some(address) {
            return Ok(self.session.current_stats());
        }
        Ok(self.session.stored_stats(address)?.unwrap_or_default())
    }

    pub fn leaderboard(&self, timeframe: Timeframe, now: i64) -> HuntResult<Vec<LeaderboardEntry>> {
        Ok(self.leaderboard.get_leaderboard(timeframe, now)?)
    }

    /// Most recent collaborator failure from either engine, if any.
    pub fn last_sync_error(&self) -> Option<String> {
        self.session
            .last_sync_error()
            .or_else(|| self.markets.last_sync_error())
            .map(ToString::to_string)
    }

    // --- markets ---

    pub fn markets(&self, now: i64) -> Vec<MarketView> {
        self.markets.views(now)
    }

    pub fn market_overview(&self, now: i64) -> MarketOverview {
        self.markets.overview(now)
    }

    pub fn place_bet(
        &mut self,
        market_id: &str,
        side: BetSide,
        stake_amount: f64,
        currency: CurrencyKind,
        now: i64,
    ) -> HuntResult<Bet> {
        let Some(bettor_address) = self.session.wallet_address().map(str::to_string) else {
            return Err(HuntError::InvalidState(
                "connect a wallet before placing a bet".to_string(),
            ));
        };
        self.markets.place_bet(
            BetRequest {
                market_id: market_id.to_string(),
                bettor_address,
                side,
                stake_amount,
                currency,
            },
            now,
        )
    }

    pub fn settle_market(
        &mut self,
        market_id: &str,
        outcome: MarketOutcome,
    ) -> HuntResult<SettlementReport> {
        self.markets.settle_market(market_id, outcome)
    }

    pub fn reconcile_pools(&mut self, market_id: &str, now: i64) -> HuntResult<PoolStats> {
        self.markets.reconcile_pools(market_id, now)
    }

    pub fn user_bets(&self, address: &str) -> Vec<Bet> {
        self.markets.user_bets(address)
    }

    pub fn tick_markets(&mut self, now: i64) -> usize {
        self.markets.tick(now)
    }
}
