//! v1 boundary contracts for the hunt engine, HTTP API, persistence and CLI.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

mod serde_u64_string;

pub const SCHEMA_VERSION_V1: &str = "1.0";
pub const SECONDS_PER_DAY: i64 = 86_400;

// ---------------------------------------------------------------------------
// Map
// ---------------------------------------------------------------------------

/// A named spot on the map. `x`/`y` are percentages of the map plane.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub id: String,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub description: String,
}

impl Location {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        x: f64,
        y: f64,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            x,
            y,
            description: description.into(),
        }
    }

    /// Euclidean distance on the percentage plane.
    pub fn distance_to(&self, other: &Location) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

// ---------------------------------------------------------------------------
// Rounds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Tracker,
    Fugitive,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tracker => write!(f, "tracker"),
            Self::Fugitive => write!(f, "fugitive"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RoundPhase {
    NotStarted,
    InProgress,
    Concluded,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PowerUpKind {
    Scanner,
    Shield,
    Speed,
}

impl FromStr for PowerUpKind {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().as_str() {
            "scanner" => Ok(Self::Scanner),
            "shield" => Ok(Self::Shield),
            "speed" => Ok(Self::Speed),
            other => Err(format!("unknown power-up: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PowerUpCounts {
    pub scanner: u32,
    pub shield: u32,
    pub speed: u32,
}

impl PowerUpCounts {
    pub fn count(&self, kind: PowerUpKind) -> u32 {
        match kind {
            PowerUpKind::Scanner => self.scanner,
            PowerUpKind::Shield => self.shield,
            PowerUpKind::Speed => self.speed,
        }
    }

    /// Spend one charge of `kind`. Returns false when none are left.
    pub fn take(&mut self, kind: PowerUpKind) -> bool {
        let slot = match kind {
            PowerUpKind::Scanner => &mut self.scanner,
            PowerUpKind::Shield => &mut self.shield,
            PowerUpKind::Speed => &mut self.speed,
        };
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }
}

impl Default for PowerUpCounts {
    fn default() -> Self {
        Self {
            scanner: 2,
            shield: 1,
            speed: 3,
        }
    }
}

/// Serializable view of the active round. The fugitive location is withheld
/// while a tracker round is still in progress.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoundView {
    pub schema_version: String,
    pub role: Role,
    pub phase: RoundPhase,
    pub fugitive_location_id: Option<String>,
    pub guessed_location_ids: Vec<String>,
    pub guesses_remaining: u32,
    pub max_guesses: u32,
    pub won: bool,
    pub hint_used: bool,
    pub shield_active: bool,
    pub power_ups: PowerUpCounts,
    pub capture_score: u32,
    pub escape_score: u32,
    pub opponent_attempts_used: u32,
    pub sync_warning: Option<String>,
}

/// Round state plus the player-facing line produced by the latest transition.
/// `message` is `None` when the action was ignored (spent power-up, hint already used).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoundActionResponse {
    pub schema_version: String,
    pub message: Option<String>,
    pub round: RoundView,
}

impl RoundActionResponse {
    pub fn new(message: Option<String>, round: RoundView) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            message,
            round,
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameConfig {
    pub schema_version: String,
    #[serde(with = "serde_u64_string")]
    pub seed: u64,
    pub tracker_guesses: u32,
    pub fugitive_guesses: u32,
    pub opponent_attempts: u32,
    pub opponent_start_delay_ms: u64,
    pub opponent_think_delay_ms: u64,
    pub starting_power_ups: PowerUpCounts,
    pub hint_cost: u32,
    pub odds_tick_secs: u64,
    pub market_window_days: u32,
}

impl GameConfig {
    pub fn guesses_for(&self, role: Role) -> u32 {
        match role {
            Role::Tracker => self.tracker_guesses,
            Role::Fugitive => self.fugitive_guesses,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            seed: 1337,
            tracker_guesses: 5,
            fugitive_guesses: 3,
            opponent_attempts: 3,
            opponent_start_delay_ms: 3_500,
            opponent_think_delay_ms: 2_000,
            starting_power_ups: PowerUpCounts::default(),
            hint_cost: 1,
            odds_tick_secs: 60,
            market_window_days: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// Markets and bets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MarketStatus {
    Active,
    Caught,
    Escaped,
}

impl MarketStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Active)
    }
}

/// Authoritative resolution of a market's question.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MarketOutcome {
    Caught,
    Escaped,
}

impl MarketOutcome {
    pub fn status(self) -> MarketStatus {
        match self {
            Self::Caught => MarketStatus::Caught,
            Self::Escaped => MarketStatus::Escaped,
        }
    }

    pub fn winning_side(self) -> BetSide {
        match self {
            Self::Caught => BetSide::Yes,
            Self::Escaped => BetSide::No,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BetSide {
    Yes,
    No,
}

impl fmt::Display for BetSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yes => write!(f, "yes"),
            Self::No => write!(f, "no"),
        }
    }
}

impl FromStr for BetSide {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().as_str() {
            "yes" => Ok(Self::Yes),
            "no" => Ok(Self::No),
            other => Err(format!("unknown bet side: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CurrencyKind {
    #[default]
    Native,
    PlatformToken,
}

impl fmt::Display for CurrencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => write!(f, "native"),
            Self::PlatformToken => write!(f, "platform_token"),
        }
    }
}

impl FromStr for CurrencyKind {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().as_str() {
            "native" | "sol" => Ok(Self::Native),
            "platform_token" | "fbt" => Ok(Self::PlatformToken),
            other => Err(format!("unknown currency: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BetStatus {
    Active,
    Won,
    Lost,
}

impl fmt::Display for BetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Won => write!(f, "won"),
            Self::Lost => write!(f, "lost"),
        }
    }
}

impl FromStr for BetStatus {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "active" => Ok(Self::Active),
            "won" => Ok(Self::Won),
            "lost" => Ok(Self::Lost),
            other => Err(format!("unknown bet status: {other}")),
        }
    }
}

/// A wager. `odds_at_placement` is frozen when the bet is created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bet {
    pub id: String,
    pub bettor_address: String,
    pub market_id: String,
    pub side: BetSide,
    pub stake_amount: f64,
    pub currency: CurrencyKind,
    pub odds_at_placement: f64,
    pub potential_payout: f64,
    pub status: BetStatus,
    pub placed_at: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct OddsQuote {
    pub yes_odds: f64,
    pub no_odds: f64,
}

impl OddsQuote {
    pub fn for_side(&self, side: BetSide) -> f64 {
        match side {
            BetSide::Yes => self.yes_odds,
            BetSide::No => self.no_odds,
        }
    }

    /// Both sides rounded to two decimals for display.
    pub fn rounded(&self) -> Self {
        Self {
            yes_odds: round_cents(self.yes_odds),
            no_odds: round_cents(self.no_odds),
        }
    }
}

pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Critical,
    High,
    Elevated,
    Calm,
}

impl Urgency {
    pub fn from_days_remaining(days: i64) -> Self {
        match days {
            d if d <= 3 => Self::Critical,
            d if d <= 7 => Self::High,
            d if d <= 14 => Self::Elevated,
            _ => Self::Calm,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarketView {
    pub schema_version: String,
    pub id: String,
    pub name: String,
    pub description: String,
    pub deadline: i64,
    pub yes_pool: f64,
    pub no_pool: f64,
    pub total_pool: f64,
    pub odds: OddsQuote,
    pub status: MarketStatus,
    pub days_remaining: i64,
    pub urgency: Urgency,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarketOverview {
    pub schema_version: String,
    pub total_pool: f64,
    pub active_markets: usize,
    pub best_odds: f64,
    pub sync_warning: Option<String>,
}

/// Pool totals as reported by the bet ledger.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct PoolStats {
    pub total_pool: f64,
    pub yes_pool: f64,
    pub no_pool: f64,
}

// ---------------------------------------------------------------------------
// Players
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct UserStats {
    pub captures: u32,
    pub escapes: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub address: String,
    pub captures: u32,
    pub escapes: u32,
    pub win_rate: f64,
    pub total_games: u32,
    pub rewards: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Timeframe {
    Daily,
    Weekly,
    #[default]
    AllTime,
}

impl Timeframe {
    /// Look-back window in seconds; `None` means unbounded.
    pub fn window_secs(self) -> Option<i64> {
        match self {
            Self::Daily => Some(SECONDS_PER_DAY),
            Self::Weekly => Some(7 * SECONDS_PER_DAY),
            Self::AllTime => None,
        }
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "all-time" | "all_time" | "alltime" => Ok(Self::AllTime),
            other => Err(format!("unknown timeframe: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidState,
    InvalidAmount,
    MarketClosed,
    NotFound,
    ExternalSyncFailure,
    InvalidQuery,
    InternalError,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiError {
    pub schema_version: String,
    pub error_code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(error_code: ErrorCode, message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            error_code,
            message: message.into(),
            details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_seed_serializes_as_string() {
        let config = GameConfig::default();
        let json = serde_json::to_value(&config).expect("serialize config");
        assert_eq!(json["seed"], serde_json::json!("1337"));

        let decoded: GameConfig = serde_json::from_value(json).expect("deserialize config");
        assert_eq!(decoded, config);
    }

    #[test]
    fn power_up_take_stops_at_zero() {
        let mut counts = PowerUpCounts {
            scanner: 1,
            shield: 0,
            speed: 0,
        };
        assert!(counts.take(PowerUpKind::Scanner));
        assert!(!counts.take(PowerUpKind::Scanner));
        assert!(!counts.take(PowerUpKind::Shield));
        assert_eq!(counts.count(PowerUpKind::Scanner), 0);
    }

    #[test]
    fn timeframe_accepts_dashed_and_underscored_names() {
        assert_eq!("all-time".parse::<Timeframe>(), Ok(Timeframe::AllTime));
        assert_eq!("all_time".parse::<Timeframe>(), Ok(Timeframe::AllTime));
        assert_eq!("Weekly".parse::<Timeframe>(), Ok(Timeframe::Weekly));
        assert!("monthly".parse::<Timeframe>().is_err());
        assert_eq!(
            serde_json::to_string(&Timeframe::AllTime).expect("serialize"),
            "\"all-time\""
        );
    }

    #[test]
    fn urgency_bands_follow_days_remaining() {
        assert_eq!(Urgency::from_days_remaining(0), Urgency::Critical);
        assert_eq!(Urgency::from_days_remaining(3), Urgency::Critical);
        assert_eq!(Urgency::from_days_remaining(7), Urgency::High);
        assert_eq!(Urgency::from_days_remaining(14), Urgency::Elevated);
        assert_eq!(Urgency::from_days_remaining(15), Urgency::Calm);
    }

    #[test]
    fn outcome_maps_to_status_and_winning_side() {
        assert_eq!(MarketOutcome::Caught.status(), MarketStatus::Caught);
        assert_eq!(MarketOutcome::Caught.winning_side(), BetSide::Yes);
        assert_eq!(MarketOutcome::Escaped.winning_side(), BetSide::No);
        assert!(MarketStatus::Escaped.is_terminal());
        assert!(!MarketStatus::Active.is_terminal());
    }

    #[test]
    fn rounded_quote_keeps_two_decimals() {
        let quote = OddsQuote {
            yes_odds: 3.333_333,
            no_odds: 5.833_333,
        };
        let rounded = quote.rounded();
        assert_eq!(rounded.yes_odds, 3.33);
        assert_eq!(rounded.no_odds, 5.83);
    }
}
