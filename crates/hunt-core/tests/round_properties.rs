use std::collections::BTreeSet;

use contracts::{BetSide, CurrencyKind, Location, PowerUpCounts, PowerUpKind, Role, RoundPhase};
use hunt_core::market::{
    compute_odds, days_remaining, time_multiplier, Market, MarketBook, ODDS_FLOOR,
};
use hunt_core::opponent::selection_probabilities;
use hunt_core::ports::MemoryBetLedger;
use hunt_core::round::{GuessOutcome, RoundState};
use hunt_core::{BetRequest, LocationRegistry, SeededRandom};
use proptest::prelude::*;

const NOW: i64 = 1_720_000_000;

#[derive(Debug, Clone)]
enum Action {
    Guess(usize),
    PowerUp(PowerUpKind),
    Hint,
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        4 => (0_usize..12).prop_map(Action::Guess),
        1 => prop_oneof![
            Just(PowerUpKind::Scanner),
            Just(PowerUpKind::Shield),
            Just(PowerUpKind::Speed),
        ]
        .prop_map(Action::PowerUp),
        1 => Just(Action::Hint),
    ]
}

fn assert_search_log_is_sound(round: &RoundState) -> Result<(), TestCaseError> {
    let ids = round.guessed_location_ids();
    let unique: BTreeSet<&String> = ids.iter().collect();
    prop_assert_eq!(unique.len(), ids.len());
    prop_assert!(ids.len() <= round.search_allowance());
    Ok(())
}

proptest! {
    #[test]
    fn tracker_rounds_keep_a_clean_search_log(
        seed in any::<u64>(),
        actions in prop::collection::vec(action(), 1..24),
    ) {
        let registry = LocationRegistry::new_orleans();
        let mut rng = SeededRandom::new(seed);
        let mut round = RoundState::new(PowerUpCounts::default());
        round.start_round(Role::Tracker, 5, 3, &registry, &mut rng);

        for action in actions {
            let capture_before = round.capture_score();
            let escape_before = round.escape_score();
            let was_active = round.is_active();

            match action {
                Action::Guess(idx) => {
                    let id = registry.locations()[idx].id.clone();
                    let shielded = round.shield_active();
                    let remaining = round.guesses_remaining();
                    let repeat = round.guessed_location_ids().contains(&id);
                    match round.submit_guess(&id, &registry) {
                        Ok(GuessOutcome::AlreadySearched { .. }) => {
                            prop_assert!(repeat);
                            prop_assert_eq!(round.guesses_remaining(), remaining);
                            prop_assert_eq!(round.capture_score(), capture_before);
                            prop_assert_eq!(round.escape_score(), escape_before);
                        }
                        Ok(outcome) => {
                            prop_assert!(!repeat);
                            prop_assert!(!round.shield_active());
                            if shielded {
                                prop_assert_eq!(round.guesses_remaining(), remaining);
                            } else {
                                prop_assert_eq!(round.guesses_remaining(), remaining - 1);
                            }
                            if outcome.conclusion().is_some() {
                                prop_assert_eq!(round.phase(), RoundPhase::Concluded);
                            }
                        }
                        Err(_) => prop_assert!(!was_active),
                    }
                }
                Action::PowerUp(kind) => {
                    let effect = round.use_power_up(kind, &registry, &mut rng);
                    if effect.is_some() {
                        prop_assert!(was_active);
                    }
                }
                Action::Hint => {
                    round.request_hint(&registry, 1);
                }
            }

            assert_search_log_is_sound(&round)?;
            if let Some(target) = round.fugitive_location_id() {
                if round.is_active() {
                    prop_assert!(!round.guessed_location_ids().iter().any(|id| id == target));
                }
            }

            let captured = round.capture_score() - capture_before;
            let escaped = round.escape_score() - escape_before;
            if was_active && !round.is_active() {
                prop_assert_eq!(captured + escaped, 1);
                prop_assert_eq!(round.won(), captured == 1);
            } else {
                prop_assert_eq!(captured + escaped, 0);
            }
        }
    }

    #[test]
    fn ai_searches_always_resolve_within_budget(seed in any::<u64>(), hide_idx in 0_usize..12) {
        let registry = LocationRegistry::new_orleans();
        let mut rng = SeededRandom::new(seed);
        let mut round = RoundState::new(PowerUpCounts::default());
        round.start_round(Role::Fugitive, 3, 3, &registry, &mut rng);
        round.hide(&registry.locations()[hide_idx].id, &registry).expect("valid hide");

        let mut turns = 0;
        while round.awaiting_opponent() {
            let turn = round.apply_opponent_search(&registry, &mut rng).expect("pending search");
            turns += 1;
            if turn.conclusion().is_some() {
                break;
            }
        }
        prop_assert!(turns <= 3);
        prop_assert_eq!(round.phase(), RoundPhase::Concluded);
        prop_assert_eq!(round.capture_score() + round.escape_score(), 1);
        assert_search_log_is_sound(&round)?;
    }

    #[test]
    fn closer_candidates_are_never_less_likely(anchor_idx in 0_usize..12) {
        let registry = LocationRegistry::new_orleans();
        let anchor = &registry.locations()[anchor_idx];
        let candidates: Vec<&Location> = registry
            .iter()
            .filter(|location| location.id != anchor.id)
            .collect();
        let probabilities = selection_probabilities(&candidates, anchor);

        for (i, a) in candidates.iter().enumerate() {
            for (j, b) in candidates.iter().enumerate() {
                if anchor.distance_to(a) < anchor.distance_to(b) {
                    prop_assert!(probabilities[i] >= probabilities[j]);
                }
            }
        }
        prop_assert!(probabilities.iter().all(|p| *p > 0.0));
    }

    #[test]
    fn odds_are_pure_and_floored(
        yes in 0.0_f64..1.0e6,
        no in 0.0_f64..1.0e6,
        days_out in -40_i64..60,
        offset in 0_i64..86_400,
    ) {
        let deadline = NOW + days_out * 86_400 + offset;
        let first = compute_odds(yes, no, deadline, NOW, 30);
        let second = compute_odds(yes, no, deadline, NOW, 30);
        prop_assert_eq!(first, second);

        let floor = ODDS_FLOOR * time_multiplier(days_remaining(deadline, NOW), 30);
        prop_assert!(first.yes_odds.is_finite() && first.no_odds.is_finite());
        prop_assert!(first.yes_odds >= floor);
        prop_assert!(first.no_odds >= floor);
    }

    #[test]
    fn place_bet_is_all_or_nothing(
        stakes in prop::collection::vec(-50.0_f64..50.0, 1..12),
        sides in prop::collection::vec(any::<bool>(), 12),
    ) {
        let mut book = MarketBook::new(Box::new(MemoryBetLedger::new()), 30);
        book.insert_market(Market::new("m", "M", "", NOW + 86_400 * 5, 10.0, 10.0), NOW)
            .expect("fresh id");

        for (stake, yes) in stakes.into_iter().zip(sides) {
            let side = if yes { BetSide::Yes } else { BetSide::No };
            let before = book.market("m").expect("exists").clone();
            let bets_before = book.user_bets("wallet").len();
            let result = book.place_bet(
                BetRequest {
                    market_id: "m".to_string(),
                    bettor_address: "wallet".to_string(),
                    side,
                    stake_amount: stake,
                    currency: CurrencyKind::Native,
                },
                NOW,
            );
            let after = book.market("m").expect("exists");
            match result {
                Ok(bet) => {
                    prop_assert!(stake > 0.0);
                    prop_assert_eq!(book.user_bets("wallet").len(), bets_before + 1);
                    prop_assert!((after.total_pool() - before.total_pool() - bet.stake_amount).abs() < 1e-6);
                }
                Err(_) => {
                    prop_assert!(stake <= 0.0);
                    prop_assert_eq!(after, &before);
                    prop_assert_eq!(book.user_bets("wallet").len(), bets_before);
                }
            }
        }
    }
}
