//! Hide-and-seek round engine, adaptive AI opponent, and fugitive prediction markets.

pub mod error;
pub mod hint;
pub mod locations;
pub mod market;
pub mod opponent;
pub mod ports;
pub mod random;
pub mod round;
pub mod session;

pub use error::{HuntError, HuntResult, SyncError};
pub use locations::LocationRegistry;
pub use market::{compute_odds, BetRequest, Market, MarketBook, SettlementReport};
pub use opponent::OpponentTicket;
pub use ports::{BetLedger, LeaderboardSource, MemoryBetLedger, MemoryStatsStore, StatsStore};
pub use random::{RandomSource, ScriptedRandom, SeededRandom};
pub use round::{Conclusion, GuessOutcome, HintOutcome, OpponentTurn, PowerUpEffect, RoundState};
pub use session::{GameSession, OpponentStep};
