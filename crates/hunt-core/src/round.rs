//! Round state machine: one guessing round from role selection to capture or escape.
//!
//! `NotStarted -> InProgress -> Concluded`. Starting a new round from any phase
//! discards the previous round but keeps the session counters (scores and the
//! power-up stock). Rejected operations leave every field untouched.

use std::fmt;

use contracts::{PowerUpCounts, PowerUpKind, Role, RoundPhase, RoundView, SCHEMA_VERSION_V1};
use tracing::{debug, info};

use crate::error::{HuntError, HuntResult};
use crate::hint::{area_hint, proximity_hint, AreaHint, ProximityHint};
use crate::locations::LocationRegistry;
use crate::opponent::choose_search;
use crate::random::{sample_without_replacement, RandomSource};

const SCANNER_REVEALS: usize = 2;

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conclusion {
    /// The tracker side found the fugitive.
    Captured,
    /// The fugitive side got away.
    Escaped,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GuessOutcome {
    /// Already searched; nothing was consumed.
    AlreadySearched { location_id: String },
    Miss {
        location_id: String,
        hint: ProximityHint,
        shield_absorbed: bool,
        guesses_remaining: u32,
    },
    Captured {
        location_id: String,
        shield_absorbed: bool,
    },
    Escaped {
        location_id: String,
        fugitive_location_id: String,
        shield_absorbed: bool,
    },
}

impl GuessOutcome {
    pub fn conclusion(&self) -> Option<Conclusion> {
        match self {
            Self::Captured { .. } => Some(Conclusion::Captured),
            Self::Escaped { .. } => Some(Conclusion::Escaped),
            Self::AlreadySearched { .. } | Self::Miss { .. } => None,
        }
    }

    pub fn message(&self, registry: &LocationRegistry) -> String {
        match self {
            Self::AlreadySearched { .. } => {
                "You already searched there! Try a different location.".to_string()
            }
            Self::Miss {
                location_id,
                hint,
                shield_absorbed,
                ..
            } => {
                let shield = if *shield_absorbed {
                    "Shield protected you from losing a guess! "
                } else {
                    ""
                };
                format!("{shield}Not in {}. {hint}", registry.name_of(location_id))
            }
            Self::Captured { location_id, .. } => format!(
                "CAPTURED! You found the fugitive hiding in {}!",
                registry.name_of(location_id)
            ),
            Self::Escaped {
                fugitive_location_id,
                ..
            } => format!(
                "GAME OVER! The fugitive escaped! They were hiding in {}.",
                registry.name_of(fugitive_location_id)
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PowerUpEffect {
    Scanned { revealed: Vec<String> },
    ShieldRaised,
    ExtraGuess { guesses_remaining: u32 },
}

impl PowerUpEffect {
    pub fn message(&self, registry: &LocationRegistry) -> String {
        match self {
            Self::Scanned { revealed } if revealed.is_empty() => {
                "Scanner found no unsearched locations left to clear.".to_string()
            }
            Self::Scanned { revealed } => {
                let names: Vec<&str> = revealed.iter().map(|id| registry.name_of(id)).collect();
                format!("Scanner revealed {} are empty!", names.join(" and "))
            }
            Self::ShieldRaised => {
                "Shield activated! Your next guess won't cost you if wrong.".to_string()
            }
            Self::ExtraGuess { .. } => "Speed boost! You gained an extra guess!".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HintOutcome {
    pub hint: AreaHint,
    pub guesses_remaining: u32,
    /// Set when paying for the hint used the last guess.
    pub conclusion: Option<Conclusion>,
}

impl fmt::Display for HintOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HINT: {} (Hint cost 1 guess)", self.hint)?;
        if self.conclusion == Some(Conclusion::Escaped) {
            write!(f, " That was your last guess. The fugitive escaped!")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeReason {
    AttemptsExhausted,
    NothingLeftToSearch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpponentTurn {
    Searched {
        location_id: String,
        attempts_left: u32,
    },
    Captured {
        location_id: String,
    },
    Escaped {
        last_search: Option<String>,
        reason: EscapeReason,
    },
}

impl OpponentTurn {
    pub fn conclusion(&self) -> Option<Conclusion> {
        match self {
            Self::Searched { .. } => None,
            Self::Captured { .. } => Some(Conclusion::Captured),
            Self::Escaped { .. } => Some(Conclusion::Escaped),
        }
    }

    pub fn message(&self, registry: &LocationRegistry) -> String {
        match self {
            Self::Searched {
                location_id,
                attempts_left,
            } => format!(
                "AI searched {} but missed! {attempts_left} AI attempts left...",
                registry.name_of(location_id)
            ),
            Self::Captured { location_id } => {
                format!("CAUGHT! The AI found you in {}!", registry.name_of(location_id))
            }
            Self::Escaped {
                reason: EscapeReason::NothingLeftToSearch,
                ..
            } => "ESCAPED! The AI is stumped!".to_string(),
            Self::Escaped {
                last_search: Some(location_id),
                ..
            } => format!(
                "AI searched {} but missed! ESCAPED! The AI tracker failed to find you!",
                registry.name_of(location_id)
            ),
            Self::Escaped { .. } => "ESCAPED! The AI tracker failed to find you!".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// RoundState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RoundState {
    role: Role,
    phase: RoundPhase,
    fugitive_location_id: Option<String>,
    guessed_location_ids: Vec<String>,
    guesses_remaining: u32,
    max_guesses: u32,
    won: bool,
    hint_used: bool,
    shield_active: bool,
    power_ups: PowerUpCounts,
    capture_score: u32,
    escape_score: u32,
    opponent_attempts: u32,
    opponent_attempts_used: u32,
    last_opponent_search: Option<String>,
    scanner_reveals: u32,
    shield_absorbs: u32,
}

impl RoundState {
    pub fn new(power_ups: PowerUpCounts) -> Self {
        Self {
            role: Role::Tracker,
            phase: RoundPhase::NotStarted,
            fugitive_location_id: None,
            guessed_location_ids: Vec::new(),
            guesses_remaining: 0,
            max_guesses: 0,
            won: false,
            hint_used: false,
            shield_active: false,
            power_ups,
            capture_score: 0,
            escape_score: 0,
            opponent_attempts: 0,
            opponent_attempts_used: 0,
            last_opponent_search: None,
            scanner_reveals: 0,
            shield_absorbs: 0,
        }
    }

    // --- accessors ---

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == RoundPhase::InProgress
    }

    pub fn fugitive_location_id(&self) -> Option<&str> {
        self.fugitive_location_id.as_deref()
    }

    pub fn guessed_location_ids(&self) -> &[String] {
        &self.guessed_location_ids
    }

    pub fn guesses_remaining(&self) -> u32 {
        self.guesses_remaining
    }

    pub fn max_guesses(&self) -> u32 {
        self.max_guesses
    }

    pub fn won(&self) -> bool {
        self.won
    }

    pub fn hint_used(&self) -> bool {
        self.hint_used
    }

    pub fn shield_active(&self) -> bool {
        self.shield_active
    }

    pub fn power_ups(&self) -> PowerUpCounts {
        self.power_ups
    }

    pub fn capture_score(&self) -> u32 {
        self.capture_score
    }

    pub fn escape_score(&self) -> u32 {
        self.escape_score
    }

    pub fn opponent_attempts_used(&self) -> u32 {
        self.opponent_attempts_used
    }

    /// Upper bound on `guessed_location_ids.len()`: the guess budget plus entries
    /// added for free by the scanner or a shielded miss.
    pub fn search_allowance(&self) -> usize {
        (self.max_guesses + self.scanner_reveals + self.shield_absorbs) as usize
    }

    /// True while the AI tracker still owes a search.
    pub fn awaiting_opponent(&self) -> bool {
        self.is_active() && self.role == Role::Fugitive && self.fugitive_location_id.is_some()
    }

    pub fn set_scores(&mut self, capture_score: u32, escape_score: u32) {
        self.capture_score = capture_score;
        self.escape_score = escape_score;
    }

    pub fn view(&self) -> RoundView {
        let reveal_target = !(self.role == Role::Tracker && self.is_active());
        RoundView {
            schema_version: SCHEMA_VERSION_V1.to_string(),
            role: self.role,
            phase: self.phase,
            fugitive_location_id: if reveal_target {
                self.fugitive_location_id.clone()
            } else {
                None
            },
            guessed_location_ids: self.guessed_location_ids.clone(),
            guesses_remaining: self.guesses_remaining,
            max_guesses: self.max_guesses,
            won: self.won,
            hint_used: self.hint_used,
            shield_active: self.shield_active,
            power_ups: self.power_ups,
            capture_score: self.capture_score,
            escape_score: self.escape_score,
            opponent_attempts_used: self.opponent_attempts_used,
            sync_warning: None,
        }
    }

    // --- transitions ---

    /// Begin a fresh round. A tracker round hides the fugitive immediately; a
    /// fugitive round waits for `hide`.
    pub fn start_round(
        &mut self,
        role: Role,
        max_guesses: u32,
        opponent_attempts: u32,
        registry: &LocationRegistry,
        rng: &mut dyn RandomSource,
    ) {
        let max_guesses = max_guesses.max(1);
        self.role = role;
        self.phase = RoundPhase::InProgress;
        self.won = false;
        self.guessed_location_ids.clear();
        self.hint_used = false;
        self.shield_active = false;
        self.max_guesses = max_guesses;
        self.guesses_remaining = max_guesses;
        self.opponent_attempts = opponent_attempts.max(1);
        self.opponent_attempts_used = 0;
        self.last_opponent_search = None;
        self.scanner_reveals = 0;
        self.shield_absorbs = 0;
        self.fugitive_location_id = match role {
            Role::Tracker => Some(registry.random_location(rng).id.clone()),
            Role::Fugitive => None,
        };
        debug!(%role, max_guesses, "round started");
    }

    /// Fugitive picks a hiding spot. Allowed once per round.
    pub fn hide(&mut self, location_id: &str, registry: &LocationRegistry) -> HuntResult<()> {
        if !self.is_active() || self.role != Role::Fugitive {
            return Err(HuntError::InvalidState(
                "hiding requires an active fugitive round".to_string(),
            ));
        }
        if self.fugitive_location_id.is_some() {
            return Err(HuntError::InvalidState(
                "a hiding spot was already chosen this round".to_string(),
            ));
        }
        registry.require(location_id)?;
        if self.guessed_location_ids.iter().any(|id| id == location_id) {
            return Err(HuntError::InvalidState(format!(
                "{location_id} has already been searched"
            )));
        }
        self.fugitive_location_id = Some(location_id.to_string());
        Ok(())
    }

    pub fn submit_guess(
        &mut self,
        location_id: &str,
        registry: &LocationRegistry,
    ) -> HuntResult<GuessOutcome> {
        if !self.is_active() || self.role != Role::Tracker {
            return Err(HuntError::InvalidState(
                "guessing requires an active tracker round".to_string(),
            ));
        }
        let guessed = registry.require(location_id)?;
        let Some(fugitive_id) = self.fugitive_location_id.clone() else {
            return Err(HuntError::InvalidState(
                "tracker round has no hidden fugitive".to_string(),
            ));
        };
        let fugitive = registry.require(&fugitive_id)?;

        if self.guessed_location_ids.iter().any(|id| id == location_id) {
            return Ok(GuessOutcome::AlreadySearched {
                location_id: location_id.to_string(),
            });
        }

        self.guessed_location_ids.push(location_id.to_string());
        let shield_absorbed = self.shield_active;
        if shield_absorbed {
            self.shield_active = false;
            self.shield_absorbs += 1;
        } else {
            self.guesses_remaining = self.guesses_remaining.saturating_sub(1);
        }

        if location_id == fugitive_id {
            self.conclude(Conclusion::Captured);
            return Ok(GuessOutcome::Captured {
                location_id: location_id.to_string(),
                shield_absorbed,
            });
        }

        if self.guesses_remaining == 0 {
            self.conclude(Conclusion::Escaped);
            return Ok(GuessOutcome::Escaped {
                location_id: location_id.to_string(),
                fugitive_location_id: fugitive_id,
                shield_absorbed,
            });
        }

        Ok(GuessOutcome::Miss {
            location_id: location_id.to_string(),
            hint: proximity_hint(guessed, fugitive),
            shield_absorbed,
            guesses_remaining: self.guesses_remaining,
        })
    }

    /// Spend a power-up. `None` means the request was ignored: round over, none
    /// left, or a scanner outside a tracker round.
    pub fn use_power_up(
        &mut self,
        kind: PowerUpKind,
        registry: &LocationRegistry,
        rng: &mut dyn RandomSource,
    ) -> Option<PowerUpEffect> {
        if !self.is_active() {
            return None;
        }
        if kind == PowerUpKind::Scanner && self.role != Role::Tracker {
            return None;
        }
        if !self.power_ups.take(kind) {
            return None;
        }

        let effect = match kind {
            PowerUpKind::Scanner => {
                let empty: Vec<String> = registry
                    .iter()
                    .filter(|location| {
                        self.fugitive_location_id.as_deref() != Some(location.id.as_str())
                            && !self.guessed_location_ids.contains(&location.id)
                    })
                    .map(|location| location.id.clone())
                    .collect();
                let revealed = sample_without_replacement(rng, &empty, SCANNER_REVEALS);
                debug_assert!(
                    self.fugitive_location_id
                        .as_ref()
                        .map_or(true, |target| !revealed.contains(target)),
                    "scanner must never reveal the fugitive"
                );
                self.scanner_reveals += revealed.len() as u32;
                self.guessed_location_ids.extend(revealed.iter().cloned());
                PowerUpEffect::Scanned { revealed }
            }
            PowerUpKind::Shield => {
                self.shield_active = true;
                PowerUpEffect::ShieldRaised
            }
            PowerUpKind::Speed => {
                self.guesses_remaining += 1;
                self.max_guesses += 1;
                PowerUpEffect::ExtraGuess {
                    guesses_remaining: self.guesses_remaining,
                }
            }
        };
        Some(effect)
    }

    /// Buy the area hint with `cost` guesses. Ignored once used, outside an active
    /// tracker round, or before a target exists. Using up the last guess this way
    /// ends the round as an escape.
    pub fn request_hint(&mut self, registry: &LocationRegistry, cost: u32) -> Option<HintOutcome> {
        if !self.is_active() || self.hint_used || self.role != Role::Tracker {
            return None;
        }
        let target = registry.get(self.fugitive_location_id.as_deref()?)?;
        let hint = area_hint(target);

        self.hint_used = true;
        self.guesses_remaining = self.guesses_remaining.saturating_sub(cost);

        let conclusion = if self.guesses_remaining == 0 {
            self.conclude(Conclusion::Escaped);
            Some(Conclusion::Escaped)
        } else {
            None
        };

        Some(HintOutcome {
            hint,
            guesses_remaining: self.guesses_remaining,
            conclusion,
        })
    }

    /// Concede the round. A tracker concession is an escape; a fugitive
    /// concession is a capture.
    pub fn surrender(&mut self) -> Option<Conclusion> {
        if !self.is_active() {
            return None;
        }
        let conclusion = match self.role {
            Role::Tracker => Conclusion::Escaped,
            Role::Fugitive => Conclusion::Captured,
        };
        self.conclude(conclusion);
        Some(conclusion)
    }

    /// One AI search against the hidden human. Fails with `InvalidState` when no
    /// search is owed; callers holding a stale continuation treat that as a no-op.
    pub fn apply_opponent_search(
        &mut self,
        registry: &LocationRegistry,
        rng: &mut dyn RandomSource,
    ) -> HuntResult<OpponentTurn> {
        if !self.awaiting_opponent() {
            return Err(HuntError::InvalidState(
                "no opponent search is pending".to_string(),
            ));
        }
        let fugitive_id = self.fugitive_location_id.clone().unwrap_or_default();

        if self.opponent_attempts_used >= self.opponent_attempts {
            self.conclude(Conclusion::Escaped);
            return Ok(OpponentTurn::Escaped {
                last_search: None,
                reason: EscapeReason::AttemptsExhausted,
            });
        }

        let candidates: Vec<_> = registry
            .iter()
            .filter(|location| !self.guessed_location_ids.contains(&location.id))
            .collect();
        let anchor = self
            .last_opponent_search
            .as_deref()
            .and_then(|id| registry.get(id));

        let Some(search) = choose_search(&candidates, anchor, rng) else {
            self.conclude(Conclusion::Escaped);
            return Ok(OpponentTurn::Escaped {
                last_search: None,
                reason: EscapeReason::NothingLeftToSearch,
            });
        };
        let search_id = search.id.clone();

        self.guessed_location_ids.push(search_id.clone());
        self.last_opponent_search = Some(search_id.clone());
        self.opponent_attempts_used += 1;
        debug!(search = %search_id, attempt = self.opponent_attempts_used, "opponent searched");

        if search_id == fugitive_id {
            self.conclude(Conclusion::Captured);
            return Ok(OpponentTurn::Captured {
                location_id: search_id,
            });
        }

        let attempts_left = self.opponent_attempts - self.opponent_attempts_used;
        if attempts_left == 0 {
            self.conclude(Conclusion::Escaped);
            return Ok(OpponentTurn::Escaped {
                last_search: Some(search_id),
                reason: EscapeReason::AttemptsExhausted,
            });
        }

        Ok(OpponentTurn::Searched {
            location_id: search_id,
            attempts_left,
        })
    }

    fn conclude(&mut self, conclusion: Conclusion) {
        self.phase = RoundPhase::Concluded;
        match conclusion {
            Conclusion::Captured => {
                self.won = true;
                self.capture_score += 1;
            }
            Conclusion::Escaped => {
                self.won = false;
                self.escape_score += 1;
            }
        }
        info!(
            role = %self.role,
            ?conclusion,
            captures = self.capture_score,
            escapes = self.escape_score,
            "round concluded"
        );
    }
}
