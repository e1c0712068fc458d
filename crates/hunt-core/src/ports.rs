//! Collaborator seams. The core owns the authoritative in-memory state; these
//! traits are the durable side it syncs to. Every failure comes back as a
//! `SyncError` and is logged by the caller, never propagated into gameplay.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use contracts::{Bet, BetSide, BetStatus, LeaderboardEntry, PoolStats, Timeframe, UserStats};

use crate::error::SyncError;

pub trait StatsStore {
    /// `Ok(None)` for an address that has never finished a round.
    fn get_user_stats(&self, address: &str) -> Result<Option<UserStats>, SyncError>;
    fn save_user_stats(
        &mut self,
        address: &str,
        stats: UserStats,
        now: i64,
    ) -> Result<(), SyncError>;
}

pub trait BetLedger {
    fn save_bet(&mut self, bet: &Bet) -> Result<(), SyncError>;
    fn get_user_bets(&self, address: &str) -> Result<Vec<Bet>, SyncError>;
    /// Bets on `market_id` that are still `active`, whoever placed them.
    fn get_market_bets(&self, market_id: &str) -> Result<Vec<Bet>, SyncError>;
    fn contains_bet(&self, bet_id: &str) -> Result<bool, SyncError>;
    fn update_bet_status(&mut self, bet_id: &str, status: BetStatus) -> Result<(), SyncError>;
    /// Stake recorded against a market. `Ok(None)` when the ledger has no bets for it.
    fn get_pool_stats(&self, market_id: &str) -> Result<Option<PoolStats>, SyncError>;
}

pub trait LeaderboardSource {
    fn get_leaderboard(
        &self,
        timeframe: Timeframe,
        now: i64,
    ) -> Result<Vec<LeaderboardEntry>, SyncError>;
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

pub fn win_rate(stats: UserStats) -> f64 {
    let games = stats.captures + stats.escapes;
    if games == 0 {
        return 0.0;
    }
    stats.captures as f64 / games as f64 * 100.0
}

/// Rank `(address, stats, rewards)` rows: captures desc, then win rate desc, then address.
pub fn rank_leaderboard(rows: Vec<(String, UserStats, f64)>) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = rows
        .into_iter()
        .map(|(address, stats, rewards)| LeaderboardEntry {
            rank: 0,
            address,
            captures: stats.captures,
            escapes: stats.escapes,
            win_rate: win_rate(stats),
            total_games: stats.captures + stats.escapes,
            rewards,
        })
        .collect();

    entries.sort_by(|a, b| {
        b.captures
            .cmp(&a.captures)
            .then_with(|| {
                b.win_rate
                    .partial_cmp(&a.win_rate)
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| a.address.cmp(&b.address))
    });
    for (idx, entry) in entries.iter_mut().enumerate() {
        entry.rank = idx as u32 + 1;
    }
    entries
}

// ---------------------------------------------------------------------------
// In-memory implementations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct MemoryStatsStore {
    rows: BTreeMap<String, (UserStats, i64)>,
    fail_writes: bool,
}

impl MemoryStatsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose writes always fail, for exercising the sync-failure path.
    pub fn failing() -> Self {
        Self {
            rows: BTreeMap::new(),
            fail_writes: true,
        }
    }

    pub fn with_stats(mut self, address: &str, stats: UserStats) -> Self {
        self.rows.insert(address.to_string(), (stats, 0));
        self
    }

    pub fn rows(&self) -> impl Iterator<Item = (&str, UserStats, i64)> {
        self.rows
            .iter()
            .map(|(address, (stats, updated_at))| (address.as_str(), *stats, *updated_at))
    }
}

impl StatsStore for MemoryStatsStore {
    fn get_user_stats(&self, address: &str) -> Result<Option<UserStats>, SyncError> {
        Ok(self.rows.get(address).map(|(stats, _)| *stats))
    }

    fn save_user_stats(
        &mut self,
        address: &str,
        stats: UserStats,
        now: i64,
    ) -> Result<(), SyncError> {
        if self.fail_writes {
            return Err(SyncError::new("stats", "store rejected the write"));
        }
        self.rows.insert(address.to_string(), (stats, now));
        Ok(())
    }
}

impl LeaderboardSource for MemoryStatsStore {
    fn get_leaderboard(
        &self,
        timeframe: Timeframe,
        now: i64,
    ) -> Result<Vec<LeaderboardEntry>, SyncError> {
        let cutoff = timeframe.window_secs().map(|window| now - window);
        let rows = self
            .rows()
            .filter(|(_, _, updated_at)| cutoff.map_or(true, |cutoff| *updated_at >= cutoff))
            .map(|(address, stats, _)| (address.to_string(), stats, 0.0))
            .collect();
        Ok(rank_leaderboard(rows))
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryBetLedger {
    bets: Vec<Bet>,
    fail_writes: bool,
}

impl MemoryBetLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            bets: Vec::new(),
            fail_writes: true,
        }
    }

    pub fn bets(&self) -> &[Bet] {
        &self.bets
    }
}

impl BetLedger for MemoryBetLedger {
    fn save_bet(&mut self, bet: &Bet) -> Result<(), SyncError> {
        if self.fail_writes {
            return Err(SyncError::new("bet ledger", "ledger rejected the bet"));
        }
        if self.bets.iter().any(|existing| existing.id == bet.id) {
            return Err(SyncError::new(
                "bet ledger",
                format!("bet {} already recorded", bet.id),
            ));
        }
        self.bets.push(bet.clone());
        Ok(())
    }

    fn get_user_bets(&self, address: &str) -> Result<Vec<Bet>, SyncError> {
        let mut bets: Vec<Bet> = self
            .bets
            .iter()
            .filter(|bet| bet.bettor_address == address)
            .cloned()
            .collect();
        bets.sort_by(|a, b| b.placed_at.cmp(&a.placed_at).then_with(|| a.id.cmp(&b.id)));
        Ok(bets)
    }

    fn get_market_bets(&self, market_id: &str) -> Result<Vec<Bet>, SyncError> {
        Ok(self
            .bets
            .iter()
            .filter(|bet| bet.market_id == market_id && bet.status == BetStatus::Active)
            .cloned()
            .collect())
    }

    fn contains_bet(&self, bet_id: &str) -> Result<bool, SyncError> {
        Ok(self.bets.iter().any(|bet| bet.id == bet_id))
    }

    fn update_bet_status(&mut self, bet_id: &str, status: BetStatus) -> Result<(), SyncError> {
        if self.fail_writes {
            return Err(SyncError::new("bet ledger", "ledger rejected the update"));
        }
        let bet = self
            .bets
            .iter_mut()
            .find(|bet| bet.id == bet_id)
            .ok_or_else(|| SyncError::new("bet ledger", format!("unknown bet {bet_id}")))?;
        bet.status = status;
        Ok(())
    }

    fn get_pool_stats(&self, market_id: &str) -> Result<Option<PoolStats>, SyncError> {
        let mut stats = PoolStats::default();
        let mut seen = false;
        for bet in self.bets.iter().filter(|bet| bet.market_id == market_id) {
            seen = true;
            match bet.side {
                BetSide::Yes => stats.yes_pool += bet.stake_amount,
                BetSide::No => stats.no_pool += bet.stake_amount,
            }
        }
        stats.total_pool = stats.yes_pool + stats.no_pool;
        Ok(seen.then_some(stats))
    }
}
