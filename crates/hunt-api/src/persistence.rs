use std::fmt;
use std::path::Path;

use contracts::{Bet, BetSide, BetStatus, LeaderboardEntry, PoolStats, Timeframe, UserStats};
use hunt_core::ports::{rank_leaderboard, BetLedger, LeaderboardSource, StatsStore};
use hunt_core::SyncError;
use rusqlite::{params, Connection, OptionalExtension};

#[derive(Debug)]
pub enum PersistenceError {
    Sqlite(rusqlite::Error),
    Serde(serde_json::Error),
    UnknownBet(String),
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite error: {err}"),
            Self::Serde(err) => write!(f, "serde error: {err}"),
            Self::UnknownBet(bet_id) => write!(f, "bet {bet_id} is not in the ledger"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<rusqlite::Error> for PersistenceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde(value)
    }
}

/// SQLite-backed stats store, bet ledger and leaderboard. One connection per
/// instance; the facade opens one per collaborator role on the same file.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let conn = Connection::open(path)?;
        let mut store = Self { conn };
        store.configure()?;
        store.migrate()?;
        Ok(store)
    }

    pub fn load_stats(&self, address: &str) -> Result<Option<UserStats>, PersistenceError> {
        let row = self
            .conn
            .query_row(
                "SELECT captures, escapes FROM user_stats WHERE address = ?1",
                params![address],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
            )
            .optional()?;

        Ok(row.map(|(captures, escapes)| UserStats {
            captures: u32::try_from(captures).unwrap_or(0),
            escapes: u32::try_from(escapes).unwrap_or(0),
        }))
    }

    pub fn upsert_stats(
        &mut self,
        address: &str,
        stats: UserStats,
        now: i64,
    ) -> Result<(), PersistenceError> {
        self.conn.execute(
            "INSERT INTO user_stats (address, captures, escapes, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)
             ON CONFLICT(address) DO UPDATE SET
                captures = excluded.captures,
                escapes = excluded.escapes,
                updated_at = excluded.updated_at",
            params![
                address,
                i64::from(stats.captures),
                i64::from(stats.escapes),
                now
            ],
        )?;
        Ok(())
    }

    pub fn insert_bet(&mut self, bet: &Bet) -> Result<(), PersistenceError> {
        let payload_json = serde_json::to_string(bet)?;
        self.conn.execute(
            "INSERT INTO bets (
                bet_id,
                bettor_address,
                market_id,
                side,
                stake_amount,
                status,
                potential_payout,
                placed_at,
                payload_json
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                bet.id.as_str(),
                bet.bettor_address.as_str(),
                bet.market_id.as_str(),
                bet.side.to_string(),
                bet.stake_amount,
                bet.status.to_string(),
                bet.potential_payout,
                bet.placed_at,
                payload_json,
            ],
        )?;
        Ok(())
    }

    pub fn load_bets_for(&self, address: &str) -> Result<Vec<Bet>, PersistenceError> {
        let mut stmt = self.conn.prepare(
            "SELECT payload_json
             FROM bets
             WHERE bettor_address = ?1
             ORDER BY placed_at DESC, bet_id DESC",
        )?;
        let rows = stmt.query_map(params![address], |row| row.get::<_, String>(0))?;

        let mut bets = Vec::new();
        for row in rows {
            let payload = row?;
            bets.push(serde_json::from_str::<Bet>(&payload)?);
        }
        Ok(bets)
    }

    pub fn load_active_bets_on(&self, market_id: &str) -> Result<Vec<Bet>, PersistenceError> {
        let mut stmt = self.conn.prepare(
            "SELECT payload_json
             FROM bets
             WHERE market_id = ?1 AND status = 'active'
             ORDER BY placed_at, bet_id",
        )?;
        let rows = stmt.query_map(params![market_id], |row| row.get::<_, String>(0))?;

        let mut bets = Vec::new();
        for row in rows {
            let payload = row?;
            bets.push(serde_json::from_str::<Bet>(&payload)?);
        }
        Ok(bets)
    }

    pub fn has_bet(&self, bet_id: &str) -> Result<bool, PersistenceError> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM bets WHERE bet_id = ?1",
                params![bet_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    pub fn set_bet_status(&mut self, bet_id: &str, status: BetStatus) -> Result<(), PersistenceError> {
        let tx = self.conn.transaction()?;
        let payload: Option<String> = tx
            .query_row(
                "SELECT payload_json FROM bets WHERE bet_id = ?1",
                params![bet_id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(payload) = payload else {
            return Err(PersistenceError::UnknownBet(bet_id.to_string()));
        };

        let mut bet = serde_json::from_str::<Bet>(&payload)?;
        bet.status = status;
        tx.execute(
            "UPDATE bets SET status = ?2, payload_json = ?3 WHERE bet_id = ?1",
            params![bet_id, status.to_string(), serde_json::to_string(&bet)?],
        )?;
        tx.commit()?;
        Ok(())
    }

    pub fn pool_totals(&self, market_id: &str) -> Result<Option<PoolStats>, PersistenceError> {
        let mut stmt = self.conn.prepare(
            "SELECT side, COALESCE(SUM(stake_amount), 0.0), COUNT(*)
             FROM bets
             WHERE market_id = ?1
             GROUP BY side",
        )?;
        let rows = stmt.query_map(params![market_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, f64>(1)?,
                row.get::<_, i64>(2)?,
            ))
        })?;

        let mut stats = PoolStats::default();
        let mut seen = false;
        for row in rows {
            let (side, total, count) = row?;
            seen |= count > 0;
            match side.parse::<BetSide>() {
                Ok(BetSide::Yes) => stats.yes_pool += total,
                Ok(BetSide::No) => stats.no_pool += total,
                Err(_) => continue,
            }
        }
        stats.total_pool = stats.yes_pool + stats.no_pool;
        Ok(seen.then_some(stats))
    }

    /// Rows updated since `since` (all rows when `None`), with won-bet payouts as rewards.
    pub fn leaderboard_rows(
        &self,
        since: Option<i64>,
    ) -> Result<Vec<(String, UserStats, f64)>, PersistenceError> {
        let mut stmt = self.conn.prepare(
            "SELECT s.address,
                    s.captures,
                    s.escapes,
                    COALESCE(SUM(CASE WHEN b.status = 'won' THEN b.potential_payout END), 0.0)
             FROM user_stats s
             LEFT JOIN bets b ON b.bettor_address = s.address
             WHERE ?1 IS NULL OR s.updated_at >= ?1
             GROUP BY s.address, s.captures, s.escapes",
        )?;
        let rows = stmt.query_map(params![since], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, f64>(3)?,
            ))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (address, captures, escapes, rewards) = row?;
            let stats = UserStats {
                captures: u32::try_from(captures).unwrap_or(0),
                escapes: u32::try_from(escapes).unwrap_or(0),
            };
            out.push((address, stats, rewards));
        }
        Ok(out)
    }

    fn configure(&mut self) -> Result<(), PersistenceError> {
        self.conn.pragma_update(None, "journal_mode", "WAL")?;
        self.conn.pragma_update(None, "busy_timeout", 5_000)?;
        Ok(())
    }

    fn migrate(&mut self) -> Result<(), PersistenceError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS user_stats (
                address TEXT PRIMARY KEY,
                captures INTEGER NOT NULL,
                escapes INTEGER NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS bets (
                bet_id TEXT PRIMARY KEY,
                bettor_address TEXT NOT NULL,
                market_id TEXT NOT NULL,
                side TEXT NOT NULL,
                stake_amount REAL NOT NULL,
                status TEXT NOT NULL,
                potential_payout REAL NOT NULL,
                placed_at INTEGER NOT NULL,
                payload_json TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_bets_bettor ON bets(bettor_address, placed_at);
            CREATE INDEX IF NOT EXISTS idx_bets_market_side ON bets(market_id, side);
            CREATE INDEX IF NOT EXISTS idx_user_stats_updated ON user_stats(updated_at);
            ",
        )?;

        self.conn.execute(
            "INSERT OR IGNORE INTO schema_migrations(version, name) VALUES(1, 'initial_v1')",
            [],
        )?;
        Ok(())
    }
}

fn stats_failure(err: PersistenceError) -> SyncError {
    SyncError::new("stats", err.to_string())
}

fn ledger_failure(err: PersistenceError) -> SyncError {
    SyncError::new("bet ledger", err.to_string())
}

impl StatsStore for SqliteStore {
    fn get_user_stats(&self, address: &str) -> Result<Option<UserStats>, SyncError> {
        self.load_stats(address).map_err(stats_failure)
    }

    fn save_user_stats(
        &mut self,
        address: &str,
        stats: UserStats,
        now: i64,
    ) -> Result<(), SyncError> {
        self.upsert_stats(address, stats, now).map_err(stats_failure)
    }
}

impl BetLedger for SqliteStore {
    fn save_bet(&mut self, bet: &Bet) -> Result<(), SyncError> {
        self.insert_bet(bet).map_err(ledger_failure)
    }

    fn get_user_bets(&self, address: &str) -> Result<Vec<Bet>, SyncError> {
        self.load_bets_for(address).map_err(ledger_failure)
    }

    fn get_market_bets(&self, market_id: &str) -> Result<Vec<Bet>, SyncError> {
        self.load_active_bets_on(market_id).map_err(ledger_failure)
    }

    fn contains_bet(&self, bet_id: &str) -> Result<bool, SyncError> {
        self.has_bet(bet_id).map_err(ledger_failure)
    }

    fn update_bet_status(&mut self, bet_id: &str, status: BetStatus) -> Result<(), SyncError> {
        self.set_bet_status(bet_id, status).map_err(ledger_failure)
    }

    fn get_pool_stats(&self, market_id: &str) -> Result<Option<PoolStats>, SyncError> {
        self.pool_totals(market_id).map_err(ledger_failure)
    }
}

impl LeaderboardSource for SqliteStore {
    fn get_leaderboard(
        &self,
        timeframe: Timeframe,
        now: i64,
    ) -> Result<Vec<LeaderboardEntry>, SyncError> {
        let since = timeframe.window_secs().map(|window| now - window);
        let rows = self
            .leaderboard_rows(since)
            .map_err(|err| SyncError::new("leaderboard", err.to_string()))?;
        Ok(rank_leaderboard(rows))
    }
}
