//! Prediction markets on whether a named fugitive is caught before a deadline.
//!
//! Odds move with pool imbalance and with elapsed time inside a fixed window.
//! `compute_odds` is pure; `MarketBook` holds the working copy of every market,
//! the bet cache, and the ledger it syncs to.

use std::collections::BTreeMap;

use contracts::{
    round_cents, Bet, BetSide, BetStatus, CurrencyKind, MarketOutcome, MarketOverview,
    MarketStatus, MarketView, OddsQuote, PoolStats, Urgency, SCHEMA_VERSION_V1, SECONDS_PER_DAY,
};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::error::{HuntError, HuntResult, SyncError};
use crate::ports::BetLedger;

/// Finite stand-in for `yes / 0`.
pub const POOL_RATIO_CEILING: f64 = 1_000.0;
pub const ODDS_FLOOR: f64 = 1.5;
const TIME_MULTIPLIER_SPAN: f64 = 2.0;

// ---------------------------------------------------------------------------
// Pure pricing
// ---------------------------------------------------------------------------

pub fn pool_ratio(yes_pool: f64, no_pool: f64) -> f64 {
    match (yes_pool > 0.0, no_pool > 0.0) {
        (true, true) => (yes_pool / no_pool).clamp(1.0 / POOL_RATIO_CEILING, POOL_RATIO_CEILING),
        (true, false) => POOL_RATIO_CEILING,
        (false, true) => 1.0 / POOL_RATIO_CEILING,
        (false, false) => 1.0,
    }
}

/// Whole days left before `deadline`, never negative.
pub fn days_remaining(deadline: i64, now: i64) -> i64 {
    (deadline - now).max(0) / SECONDS_PER_DAY
}

/// 1x at the start of the window, 3x once it has fully elapsed.
pub fn time_multiplier(days_remaining: i64, window_days: u32) -> f64 {
    let window = window_days.max(1) as i64;
    let elapsed = (window - days_remaining).clamp(0, window);
    1.0 + (elapsed as f64 / window as f64) * TIME_MULTIPLIER_SPAN
}

/// Full-precision odds for both sides. Round with `OddsQuote::rounded` for display.
pub fn compute_odds(
    yes_pool: f64,
    no_pool: f64,
    deadline: i64,
    now: i64,
    window_days: u32,
) -> OddsQuote {
    let multiplier = time_multiplier(days_remaining(deadline, now), window_days);
    let ratio = pool_ratio(yes_pool, no_pool);
    OddsQuote {
        yes_odds: (ODDS_FLOOR + 1.0 / ratio) * multiplier,
        no_odds: (ODDS_FLOOR + ratio) * multiplier,
    }
}

// ---------------------------------------------------------------------------
// Market
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Market {
    pub id: String,
    pub name: String,
    pub description: String,
    pub deadline: i64,
    pub yes_pool: f64,
    pub no_pool: f64,
    pub status: MarketStatus,
    /// Liquidity the market opened with; ledger reconciliation adds recorded stake on top.
    seed_yes: f64,
    seed_no: f64,
    odds: OddsQuote,
}

impl Market {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        deadline: i64,
        yes_pool: f64,
        no_pool: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            deadline,
            yes_pool,
            no_pool,
            status: MarketStatus::Active,
            seed_yes: yes_pool,
            seed_no: no_pool,
            odds: OddsQuote {
                yes_odds: 0.0,
                no_odds: 0.0,
            },
        }
    }

    /// Accepting bets: still active and before the deadline.
    pub fn is_open(&self, now: i64) -> bool {
        self.status == MarketStatus::Active && now < self.deadline
    }

    /// Last computed odds, full precision. Frozen once the market closes.
    pub fn odds(&self) -> OddsQuote {
        self.odds
    }

    pub fn total_pool(&self) -> f64 {
        self.yes_pool + self.no_pool
    }

    pub fn reprice(&mut self, now: i64, window_days: u32) {
        self.odds = compute_odds(self.yes_pool, self.no_pool, self.deadline, now, window_days);
    }

    pub fn view(&self, now: i64) -> MarketView {
        let days = days_remaining(self.deadline, now);
        MarketView {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            deadline: self.deadline,
            yes_pool: self.yes_pool,
            no_pool: self.no_pool,
            total_pool: self.total_pool(),
            odds: self.odds.rounded(),
            status: self.status,
            days_remaining: days,
            urgency: Urgency::from_days_remaining(days),
        }
    }
}

/// The two personas the game launches with.
pub fn default_markets(now: i64) -> Vec<Market> {
    vec![
        Market::new(
            "antoine-masse",
            "Antoine Masse",
            "High-profile fugitive from New Orleans East",
            now + 15 * SECONDS_PER_DAY,
            1623.2,
            1224.3,
        ),
        Market::new(
            "derrick-groves",
            "Derrick Groves",
            "Escaped from custody in French Quarter",
            now + 8 * SECONDS_PER_DAY,
            892.1,
            564.7,
        ),
    ]
}

// ---------------------------------------------------------------------------
// MarketBook
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct BetRequest {
    pub market_id: String,
    pub bettor_address: String,
    pub side: BetSide,
    pub stake_amount: f64,
    pub currency: CurrencyKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementReport {
    pub market_id: String,
    pub outcome: MarketOutcome,
    pub won: usize,
    pub lost: usize,
}

pub struct MarketBook {
    markets: BTreeMap<String, Market>,
    bets: Vec<Bet>,
    ledger: Box<dyn BetLedger + Send>,
    window_days: u32,
    next_bet_seq: u64,
    last_sync_error: Option<SyncError>,
}

impl MarketBook {
    pub fn new(ledger: Box<dyn BetLedger + Send>, window_days: u32) -> Self {
        Self {
            markets: BTreeMap::new(),
            bets: Vec::new(),
            ledger,
            window_days,
            next_bet_seq: 1,
            last_sync_error: None,
        }
    }

    pub fn with_default_markets(
        ledger: Box<dyn BetLedger + Send>,
        window_days: u32,
        now: i64,
    ) -> Self {
        let mut book = Self::new(ledger, window_days);
        for market in default_markets(now) {
            book.markets.insert(market.id.clone(), market);
        }
        book.tick(now);
        book
    }

    pub fn insert_market(&mut self, mut market: Market, now: i64) -> HuntResult<()> {
        if self.markets.contains_key(&market.id) {
            return Err(HuntError::InvalidState(format!(
                "market {} already exists",
                market.id
            )));
        }
        market.reprice(now, self.window_days);
        self.markets.insert(market.id.clone(), market);
        Ok(())
    }

    pub fn market(&self, market_id: &str) -> HuntResult<&Market> {
        self.markets
            .get(market_id)
            .ok_or_else(|| HuntError::not_found("market", market_id))
    }

    pub fn markets(&self) -> impl Iterator<Item = &Market> {
        self.markets.values()
    }

    pub fn views(&self, now: i64) -> Vec<MarketView> {
        self.markets.values().map(|market| market.view(now)).collect()
    }

    pub fn last_sync_error(&self) -> Option<&SyncError> {
        self.last_sync_error.as_ref()
    }

    /// Fresh odds for one market at `now` without touching its cached quote.
    pub fn compute_odds(&self, market_id: &str, now: i64) -> HuntResult<OddsQuote> {
        let market = self.market(market_id)?;
        Ok(compute_odds(
            market.yes_pool,
            market.no_pool,
            market.deadline,
            now,
            self.window_days,
        ))
    }

    /// Validate, snapshot the displayed odds, move the pool, reprice, then record
    /// the bet in the ledger. Nothing is mutated unless validation passes; a
    /// ledger failure is logged and leaves the accepted bet in place.
    pub fn place_bet(&mut self, request: BetRequest, now: i64) -> HuntResult<Bet> {
        if !request.stake_amount.is_finite() || request.stake_amount <= 0.0 {
            return Err(HuntError::InvalidAmount(format!(
                "stake must be a positive number, got {}",
                request.stake_amount
            )));
        }
        if request.bettor_address.trim().is_empty() {
            return Err(HuntError::InvalidState(
                "connect a wallet before placing a bet".to_string(),
            ));
        }

        if !self.market(&request.market_id)?.is_open(now) {
            return Err(HuntError::MarketClosed(request.market_id));
        }
        let bet_id = self.allocate_bet_id(now);

        let window_days = self.window_days;
        let market = self
            .markets
            .get_mut(&request.market_id)
            .ok_or_else(|| HuntError::not_found("market", request.market_id.as_str()))?;
        let odds_at_placement = market.odds.rounded().for_side(request.side);
        match request.side {
            BetSide::Yes => market.yes_pool += request.stake_amount,
            BetSide::No => market.no_pool += request.stake_amount,
        }
        market.reprice(now, window_days);

        let bet = Bet {
            id: bet_id,
            bettor_address: request.bettor_address,
            market_id: request.market_id,
            side: request.side,
            stake_amount: request.stake_amount,
            currency: request.currency,
            odds_at_placement,
            potential_payout: request.stake_amount * odds_at_placement,
            status: BetStatus::Active,
            placed_at: now,
        };
        self.bets.push(bet.clone());

        info!(
            bet = %bet.id,
            market = %bet.market_id,
            side = %bet.side,
            stake = bet.stake_amount,
            odds = bet.odds_at_placement,
            "bet placed"
        );

        if let Err(err) = self.ledger.save_bet(&bet) {
            self.record_sync_failure(err);
        }
        Ok(bet)
    }

    /// Resolve a market. Every active bet on it becomes won or lost, including
    /// ledger rows this process never cached; the ledger is told about each
    /// transition.
    pub fn settle_market(
        &mut self,
        market_id: &str,
        outcome: MarketOutcome,
    ) -> HuntResult<SettlementReport> {
        if self.market(market_id)?.status.is_terminal() {
            return Err(HuntError::InvalidState(format!(
                "market {market_id} is already settled"
            )));
        }

        match self.ledger.get_market_bets(market_id) {
            Ok(recorded) => {
                for bet in recorded {
                    if !self.bets.iter().any(|cached| cached.id == bet.id) {
                        self.bets.push(bet);
                    }
                }
            }
            // settle what the cache holds; the ledger keeps the rest active
            Err(err) => self.record_sync_failure(err),
        }

        let market = self
            .markets
            .get_mut(market_id)
            .ok_or_else(|| HuntError::not_found("market", market_id))?;
        market.status = outcome.status();

        let winning_side = outcome.winning_side();
        let mut report = SettlementReport {
            market_id: market_id.to_string(),
            outcome,
            won: 0,
            lost: 0,
        };
        let mut updates = Vec::new();
        for bet in self
            .bets
            .iter_mut()
            .filter(|bet| bet.market_id == market_id && bet.status == BetStatus::Active)
        {
            bet.status = if bet.side == winning_side {
                report.won += 1;
                BetStatus::Won
            } else {
                report.lost += 1;
                BetStatus::Lost
            };
            updates.push((bet.id.clone(), bet.status));
        }

        for (bet_id, status) in updates {
            if let Err(err) = self.ledger.update_bet_status(&bet_id, status) {
                self.record_sync_failure(err);
            }
        }

        info!(
            market = market_id,
            ?outcome,
            won = report.won,
            lost = report.lost,
            "market settled"
        );
        Ok(report)
    }

    /// Next `bet-{now}-{seq}` id not already held by the cache or the ledger.
    /// The sequence restarts with the process, so earlier runs may own low ids.
    fn allocate_bet_id(&mut self, now: i64) -> String {
        loop {
            let candidate = format!("bet-{now}-{:04}", self.next_bet_seq);
            self.next_bet_seq += 1;
            if self.bets.iter().any(|bet| bet.id == candidate) {
                continue;
            }
            match self.ledger.contains_bet(&candidate) {
                Ok(true) => continue,
                Ok(false) => return candidate,
                Err(err) => {
                    self.record_sync_failure(err);
                    return candidate;
                }
            }
        }
    }

    /// Periodic repricing. Closed markets keep their frozen quote. Returns how
    /// many markets were repriced.
    pub fn tick(&mut self, now: i64) -> usize {
        let window_days = self.window_days;
        let repriced = self
            .markets
            .par_iter_mut()
            .filter(|(_, market)| market.is_open(now))
            .map(|(_, market)| {
                market.reprice(now, window_days);
                1usize
            })
            .sum();
        debug!(repriced, now, "odds tick");
        repriced
    }

    /// Adopt the ledger's recorded stake on top of the market's opening liquidity.
    pub fn reconcile_pools(&mut self, market_id: &str, now: i64) -> HuntResult<PoolStats> {
        if !self.markets.contains_key(market_id) {
            return Err(HuntError::not_found("market", market_id));
        }
        let recorded = match self.ledger.get_pool_stats(market_id) {
            Ok(recorded) => recorded,
            Err(err) => {
                self.record_sync_failure(err.clone());
                return Err(err.into());
            }
        };

        let window_days = self.window_days;
        let market = self
            .markets
            .get_mut(market_id)
            .ok_or_else(|| HuntError::not_found("market", market_id))?;
        if let Some(recorded) = recorded {
            market.yes_pool = market.seed_yes + recorded.yes_pool;
            market.no_pool = market.seed_no + recorded.no_pool;
        }
        if market.is_open(now) {
            market.reprice(now, window_days);
        }
        Ok(PoolStats {
            total_pool: market.total_pool(),
            yes_pool: market.yes_pool,
            no_pool: market.no_pool,
        })
    }

    /// Cached bets for `address`, newest first.
    pub fn user_bets(&self, address: &str) -> Vec<Bet> {
        let mut bets: Vec<Bet> = self
            .bets
            .iter()
            .filter(|bet| bet.bettor_address == address)
            .cloned()
            .collect();
        bets.sort_by(|a, b| b.placed_at.cmp(&a.placed_at).then_with(|| b.id.cmp(&a.id)));
        bets
    }

    /// Refresh the cache for `address` from the ledger; ledger rows win.
    pub fn load_user_bets(&mut self, address: &str) -> HuntResult<Vec<Bet>> {
        let loaded = match self.ledger.get_user_bets(address) {
            Ok(loaded) => loaded,
            Err(err) => {
                self.record_sync_failure(err.clone());
                return Err(err.into());
            }
        };
        for bet in loaded {
            match self.bets.iter_mut().find(|cached| cached.id == bet.id) {
                Some(cached) => *cached = bet,
                None => self.bets.push(bet),
            }
        }
        Ok(self.user_bets(address))
    }

    pub fn overview(&self, now: i64) -> MarketOverview {
        let open: Vec<&Market> = self
            .markets
            .values()
            .filter(|market| market.is_open(now))
            .collect();
        let best_odds = open
            .iter()
            .map(|market| {
                let odds = market.odds.rounded();
                odds.yes_odds.max(odds.no_odds)
            })
            .fold(0.0, f64::max);
        MarketOverview {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            total_pool: round_cents(self.markets.values().map(Market::total_pool).sum()),
            active_markets: open.len(),
            best_odds,
            sync_warning: self.last_sync_error.as_ref().map(ToString::to_string),
        }
    }

    fn record_sync_failure(&mut self, err: SyncError) {
        warn!(error = %err, "bet ledger sync failed; keeping in-memory market state");
        self.last_sync_error = Some(err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::MemoryBetLedger;

    const NOW: i64 = 1_700_000_000;

    fn book_with(market: Market) -> MarketBook {
        let mut book = MarketBook::new(Box::new(MemoryBetLedger::new()), 30);
        book.insert_market(market, NOW).expect("fresh id");
        book
    }

    fn request(market_id: &str, side: BetSide, stake: f64) -> BetRequest {
        BetRequest {
            market_id: market_id.to_string(),
            bettor_address: "wallet-a".to_string(),
            side,
            stake_amount: stake,
            currency: CurrencyKind::Native,
        }
    }

    #[test]
    fn odds_follow_pool_ratio_and_elapsed_window() {
        let quote = compute_odds(100.0, 50.0, NOW + 20 * SECONDS_PER_DAY, NOW, 30).rounded();
        assert_eq!(quote.yes_odds, 3.33);
        assert_eq!(quote.no_odds, 5.83);

        let fresh = compute_odds(50.0, 50.0, NOW + 30 * SECONDS_PER_DAY, NOW, 30);
        assert_eq!(fresh.yes_odds, 2.5);
        assert_eq!(fresh.no_odds, 2.5);

        let expired = compute_odds(50.0, 50.0, NOW - 5, NOW, 30);
        assert_eq!(expired.yes_odds, 7.5);
    }

    #[test]
    fn empty_pools_never_divide_by_zero() {
        for (yes, no) in [(10.0, 0.0), (0.0, 10.0), (0.0, 0.0)] {
            let quote = compute_odds(yes, no, NOW + SECONDS_PER_DAY, NOW, 30);
            assert!(quote.yes_odds.is_finite() && quote.no_odds.is_finite());
            assert!(quote.yes_odds >= ODDS_FLOOR && quote.no_odds >= ODDS_FLOOR);
        }
        assert_eq!(pool_ratio(10.0, 0.0), POOL_RATIO_CEILING);
        assert_eq!(pool_ratio(0.0, 0.0), 1.0);
    }

    #[test]
    fn lopsided_positive_pools_share_the_zero_pool_bounds() {
        assert_eq!(pool_ratio(5_000_000.0, 1.0), POOL_RATIO_CEILING);
        assert_eq!(pool_ratio(1.0, 5_000_000.0), 1.0 / POOL_RATIO_CEILING);
        assert_eq!(pool_ratio(30.0, 10.0), 3.0);
        assert_eq!(
            compute_odds(5_000_000.0, 1.0, NOW + SECONDS_PER_DAY, NOW, 30),
            compute_odds(5.0, 0.0, NOW + SECONDS_PER_DAY, NOW, 30)
        );
    }

    #[test]
    fn partial_days_round_down() {
        assert_eq!(days_remaining(NOW + SECONDS_PER_DAY - 1, NOW), 0);
        assert_eq!(days_remaining(NOW + 3 * SECONDS_PER_DAY, NOW), 3);
        assert_eq!(days_remaining(NOW - 100, NOW), 0);
        assert_eq!(time_multiplier(45, 30), 1.0);
    }

    #[test]
    fn bet_snapshots_displayed_odds_and_moves_the_pool() {
        let mut book = book_with(Market::new("m", "M", "", NOW + 20 * SECONDS_PER_DAY, 100.0, 50.0));
        let bet = book.place_bet(request("m", BetSide::No, 10.0), NOW).expect("open market");

        assert_eq!(bet.odds_at_placement, 5.83);
        assert!((bet.potential_payout - 58.3).abs() < 1e-9);
        assert_eq!(bet.status, BetStatus::Active);

        let market = book.market("m").expect("exists");
        assert_eq!(market.no_pool, 60.0);
        assert_eq!(market.odds(), compute_odds(100.0, 60.0, market.deadline, NOW, 30));
        assert_eq!(book.user_bets("wallet-a").len(), 1);
        assert!(book.last_sync_error().is_none());
    }

    #[test]
    fn rejected_bets_leave_pools_alone() {
        let mut book = book_with(Market::new("m", "M", "", NOW + SECONDS_PER_DAY, 10.0, 10.0));
        for stake in [-5.0, 0.0, f64::NAN, f64::INFINITY] {
            let err = book.place_bet(request("m", BetSide::Yes, stake), NOW).unwrap_err();
            assert!(matches!(err, HuntError::InvalidAmount(_)));
        }
        let err = book
            .place_bet(request("m", BetSide::Yes, 1.0), NOW + SECONDS_PER_DAY)
            .unwrap_err();
        assert!(matches!(err, HuntError::MarketClosed(_)));
        let err = book.place_bet(request("nope", BetSide::Yes, 1.0), NOW).unwrap_err();
        assert!(matches!(err, HuntError::NotFound { kind: "market", .. }));

        let market = book.market("m").expect("exists");
        assert_eq!((market.yes_pool, market.no_pool), (10.0, 10.0));
        assert!(book.user_bets("wallet-a").is_empty());
    }

    #[test]
    fn ledger_failure_keeps_the_bet() {
        let mut book = MarketBook::new(Box::new(MemoryBetLedger::failing()), 30);
        book.insert_market(Market::new("m", "M", "", NOW + SECONDS_PER_DAY, 1.0, 1.0), NOW)
            .expect("fresh id");
        let bet = book.place_bet(request("m", BetSide::Yes, 2.0), NOW).expect("accepted locally");
        assert_eq!(book.market("m").expect("exists").yes_pool, 3.0);
        assert_eq!(book.user_bets("wallet-a"), vec![bet]);
        assert!(book.overview(NOW).sync_warning.is_some());
    }

    #[test]
    fn settlement_resolves_bets_once() {
        let mut book = book_with(Market::new("m", "M", "", NOW + SECONDS_PER_DAY, 1.0, 1.0));
        book.place_bet(request("m", BetSide::Yes, 2.0), NOW).expect("open");
        book.place_bet(request("m", BetSide::No, 3.0), NOW).expect("open");
        book.place_bet(request("m", BetSide::Yes, 1.0), NOW).expect("open");

        let report = book.settle_market("m", MarketOutcome::Caught).expect("active market");
        assert_eq!((report.won, report.lost), (2, 1));
        assert_eq!(book.market("m").expect("exists").status, MarketStatus::Caught);
        let statuses: Vec<BetStatus> = book.user_bets("wallet-a").iter().map(|bet| bet.status).collect();
        assert!(!statuses.contains(&BetStatus::Active));

        assert!(matches!(
            book.settle_market("m", MarketOutcome::Escaped),
            Err(HuntError::InvalidState(_))
        ));
        assert!(matches!(
            book.place_bet(request("m", BetSide::Yes, 1.0), NOW),
            Err(HuntError::MarketClosed(_))
        ));
    }

    fn recorded_bet(id: &str, address: &str, side: BetSide, stake: f64) -> Bet {
        Bet {
            id: id.to_string(),
            bettor_address: address.to_string(),
            market_id: "m".to_string(),
            side,
            stake_amount: stake,
            currency: CurrencyKind::PlatformToken,
            odds_at_placement: 2.0,
            potential_payout: stake * 2.0,
            status: BetStatus::Active,
            placed_at: NOW,
        }
    }

    #[test]
    fn settlement_reaches_ledger_bets_outside_the_cache() {
        let mut ledger = MemoryBetLedger::new();
        ledger
            .save_bet(&recorded_bet("bet-old-1", "wallet-b", BetSide::Yes, 4.0))
            .expect("saved");
        ledger
            .save_bet(&recorded_bet("bet-old-2", "wallet-c", BetSide::No, 6.0))
            .expect("saved");
        let mut book = MarketBook::new(Box::new(ledger), 30);
        book.insert_market(Market::new("m", "M", "", NOW + SECONDS_PER_DAY, 1.0, 1.0), NOW)
            .expect("fresh id");
        book.place_bet(request("m", BetSide::No, 1.0), NOW).expect("open");

        let report = book.settle_market("m", MarketOutcome::Caught).expect("active market");
        assert_eq!((report.won, report.lost), (1, 2));
        assert_eq!(book.user_bets("wallet-b")[0].status, BetStatus::Won);
        assert_eq!(book.user_bets("wallet-c")[0].status, BetStatus::Lost);
        assert_eq!(book.user_bets("wallet-a")[0].status, BetStatus::Lost);
        assert!(book.last_sync_error().is_none());
    }

    #[test]
    fn bet_ids_skip_ids_the_ledger_already_holds() {
        let mut ledger = MemoryBetLedger::new();
        let earlier_run = recorded_bet(&format!("bet-{NOW}-0001"), "wallet-b", BetSide::Yes, 5.0);
        ledger.save_bet(&earlier_run).expect("saved");
        let mut book = MarketBook::new(Box::new(ledger), 30);
        book.insert_market(Market::new("m", "M", "", NOW + SECONDS_PER_DAY, 10.0, 10.0), NOW)
            .expect("fresh id");

        let bet = book.place_bet(request("m", BetSide::Yes, 2.0), NOW).expect("open");
        assert_eq!(bet.id, format!("bet-{NOW}-0002"));
        assert!(book.last_sync_error().is_none());

        let next = book.place_bet(request("m", BetSide::No, 1.0), NOW).expect("open");
        assert_eq!(next.id, format!("bet-{NOW}-0003"));
    }

    #[test]
    fn tick_freezes_closed_markets() {
        let mut book = book_with(Market::new("soon", "Soon", "", NOW + SECONDS_PER_DAY, 5.0, 5.0));
        book.insert_market(Market::new("later", "Later", "", NOW + 30 * SECONDS_PER_DAY, 5.0, 5.0), NOW)
            .expect("fresh id");
        let frozen = book.market("soon").expect("exists").odds();

        let later = NOW + 2 * SECONDS_PER_DAY;
        assert_eq!(book.tick(later), 1);
        assert_eq!(book.market("soon").expect("exists").odds(), frozen);
        assert!(book.market("later").expect("exists").odds().yes_odds > 2.5);
    }

    #[test]
    fn reconciliation_adds_ledger_stake_to_opening_liquidity() {
        let mut ledger = MemoryBetLedger::new();
        let recorded = recorded_bet("bet-ext", "wallet-b", BetSide::Yes, 7.0);
        ledger.save_bet(&recorded).expect("saved");
        let mut book = MarketBook::new(Box::new(ledger), 30);
        book.insert_market(Market::new("m", "M", "", NOW + SECONDS_PER_DAY, 10.0, 10.0), NOW)
            .expect("fresh id");

        let stats = book.reconcile_pools("m", NOW).expect("ledger readable");
        assert_eq!(stats.yes_pool, 17.0);
        assert_eq!(stats.total_pool, 27.0);
        // idempotent: the ledger total replaces, not accumulates
        assert_eq!(book.reconcile_pools("m", NOW).expect("ledger readable").yes_pool, 17.0);

        let loaded = book.load_user_bets("wallet-b").expect("ledger readable");
        assert_eq!(loaded, vec![recorded]);
    }

    #[test]
    fn default_markets_open_with_seeded_pools() {
        let book = MarketBook::with_default_markets(Box::new(MemoryBetLedger::new()), 30, NOW);
        let views = book.views(NOW);
        assert_eq!(views.len(), 2);
        let masse = book.market("antoine-masse").expect("seeded");
        assert_eq!(masse.yes_pool, 1623.2);
        assert_eq!(book.market("derrick-groves").expect("seeded").view(NOW).urgency, Urgency::Elevated);

        let overview = book.overview(NOW);
        assert_eq!(overview.active_markets, 2);
        assert_eq!(overview.total_pool, 4304.3);
        assert!(overview.best_odds >= ODDS_FLOOR);
        assert!(overview.sync_warning.is_none());
    }
}
