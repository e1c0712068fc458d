use contracts::{GameConfig, PowerUpKind, Role, RoundView, UserStats};
use tracing::{debug, info, warn};

use crate::error::{HuntError, HuntResult, SyncError};
use crate::locations::LocationRegistry;
use crate::opponent::OpponentTicket;
use crate::ports::StatsStore;
use crate::random::{RandomSource, SeededRandom};
use crate::round::{Conclusion, GuessOutcome, HintOutcome, OpponentTurn, PowerUpEffect, RoundState};

/// One resolved opponent continuation and, when the chain goes on, the next ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpponentStep {
    pub turn: OpponentTurn,
    pub next: Option<OpponentTicket>,
}

/// A player's session: the current round, the wallet it belongs to, and the
/// stats store every conclusion is synced to. Operations that can end a round
/// take `now` so the store can stamp the write.
pub struct GameSession {
    registry: LocationRegistry,
    config: GameConfig,
    round: RoundState,
    generation: u64,
    wallet_address: Option<String>,
    stats: Box<dyn StatsStore + Send>,
    rng: Box<dyn RandomSource + Send>,
    last_sync_error: Option<SyncError>,
}

impl GameSession {
    pub fn new(
        registry: LocationRegistry,
        config: GameConfig,
        stats: Box<dyn StatsStore + Send>,
    ) -> Self {
        let rng = Box::new(SeededRandom::new(config.seed));
        Self {
            round: RoundState::new(config.starting_power_ups),
            registry,
            config,
            generation: 0,
            wallet_address: None,
            stats,
            rng,
            last_sync_error: None,
        }
    }

    pub fn with_random(mut self, rng: Box<dyn RandomSource + Send>) -> Self {
        self.rng = rng;
        self
    }

    pub fn registry(&self) -> &LocationRegistry {
        &self.registry
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn round(&self) -> &RoundState {
        &self.round
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn wallet_address(&self) -> Option<&str> {
        self.wallet_address.as_deref()
    }

    pub fn last_sync_error(&self) -> Option<&SyncError> {
        self.last_sync_error.as_ref()
    }

    pub fn view(&self) -> RoundView {
        let mut view = self.round.view();
        view.sync_warning = self.last_sync_error.as_ref().map(ToString::to_string);
        view
    }

    /// Bind the session to a wallet and adopt its stored counters. A failed
    /// read keeps the local counters.
    pub fn connect_wallet(&mut self, address: &str) -> HuntResult<UserStats> {
        let address = address.trim();
        if address.is_empty() {
            return Err(HuntError::InvalidState(
                "wallet address must not be empty".to_string(),
            ));
        }
        self.wallet_address = Some(address.to_string());

        match self.stats.get_user_stats(address) {
            Ok(Some(stored)) => {
                self.round.set_scores(stored.captures, stored.escapes);
                info!(wallet = address, captures = stored.captures, escapes = stored.escapes, "stats loaded");
            }
            Ok(None) => debug!(wallet = address, "no stored stats"),
            Err(err) => self.record_sync_failure(err),
        }
        Ok(self.current_stats())
    }

    /// Stored counters for any address, read straight from the stats store.
    pub fn stored_stats(&self, address: &str) -> HuntResult<Option<UserStats>> {
        Ok(self.stats.get_user_stats(address)?)
    }

    pub fn disconnect_wallet(&mut self) {
        self.wallet_address = None;
    }

    pub fn current_stats(&self) -> UserStats {
        UserStats {
            captures: self.round.capture_score(),
            escapes: self.round.escape_score(),
        }
    }

    /// Start a round and invalidate any opponent continuation still in flight.
    pub fn start_round(&mut self, role: Role) -> RoundView {
        self.generation += 1;
        let max_guesses = self.config.guesses_for(role);
        self.round.start_round(
            role,
            max_guesses,
            self.config.opponent_attempts,
            &self.registry,
            self.rng.as_mut(),
        );
        self.view()
    }

    pub fn submit_guess(&mut self, location_id: &str, now: i64) -> HuntResult<GuessOutcome> {
        let outcome = self.round.submit_guess(location_id, &self.registry)?;
        if outcome.conclusion().is_some() {
            self.sync_stats(now);
        }
        Ok(outcome)
    }

    /// Hide as the fugitive. Returns the ticket for the opponent's first search.
    pub fn hide(&mut self, location_id: &str) -> HuntResult<OpponentTicket> {
        self.round.hide(location_id, &self.registry)?;
        Ok(OpponentTicket {
            generation: self.generation,
            delay_ms: self.config.opponent_start_delay_ms,
        })
    }

    pub fn use_power_up(&mut self, kind: PowerUpKind) -> Option<PowerUpEffect> {
        self.round
            .use_power_up(kind, &self.registry, self.rng.as_mut())
    }

    pub fn request_hint(&mut self, now: i64) -> Option<HintOutcome> {
        let outcome = self.round.request_hint(&self.registry, self.config.hint_cost)?;
        if outcome.conclusion.is_some() {
            self.sync_stats(now);
        }
        Some(outcome)
    }

    pub fn surrender(&mut self, now: i64) -> Option<Conclusion> {
        let conclusion = self.round.surrender()?;
        self.sync_stats(now);
        Some(conclusion)
    }

    /// Fire a scheduled opponent continuation. Stale tickets and rounds that
    /// ended in the meantime are no-ops.
    pub fn advance_opponent(&mut self, ticket: OpponentTicket, now: i64) -> Option<OpponentStep> {
        if ticket.generation != self.generation || !self.round.awaiting_opponent() {
            debug!(
                ticket = ticket.generation,
                current = self.generation,
                "dropping stale opponent continuation"
            );
            return None;
        }

        let turn = self
            .round
            .apply_opponent_search(&self.registry, self.rng.as_mut())
            .ok()?;
        let next = match turn.conclusion() {
            Some(_) => {
                self.sync_stats(now);
                None
            }
            None => Some(OpponentTicket {
                generation: self.generation,
                delay_ms: self.config.opponent_think_delay_ms,
            }),
        };
        Some(OpponentStep { turn, next })
    }

    /// Drive the opponent chain to its end without waiting out the delays.
    pub fn play_out_opponent(&mut self, ticket: OpponentTicket, now: i64) -> Vec<OpponentTurn> {
        let mut turns = Vec::new();
        let mut pending = Some(ticket);
        while let Some(ticket) = pending {
            let Some(step) = self.advance_opponent(ticket, now) else {
                break;
            };
            turns.push(step.turn);
            pending = step.next;
        }
        turns
    }

    fn sync_stats(&mut self, now: i64) {
        let Some(address) = self.wallet_address.clone() else {
            return;
        };
        let stats = self.current_stats();
        match self.stats.save_user_stats(&address, stats, now) {
            Ok(()) => self.last_sync_error = None,
            Err(err) => self.record_sync_failure(err),
        }
    }

    fn record_sync_failure(&mut self, err: SyncError) {
        warn!(error = %err, "stats sync failed; stats may not be saved");
        self.last_sync_error = Some(err);
    }
}
