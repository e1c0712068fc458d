mod config;
mod logging;

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use contracts::{Role, SECONDS_PER_DAY};
use hunt_api::serve;
use hunt_core::{compute_odds, GameSession, LocationRegistry, MarketBook, MemoryBetLedger, MemoryStatsStore};
use tracing::info;

use crate::config::RuntimeConfig;

const IN_MEMORY: &str = "memory";

fn print_usage() {
    println!("hunt-cli <command>");
    println!("commands:");
    println!("  serve [addr] [sqlite_path|memory]");
    println!("    default addr: HUNT_BIND_ADDR or 127.0.0.1:8080");
    println!("    default sqlite_path: HUNT_SQLITE_PATH or hunt.sqlite");
    println!("  odds <yes_pool> <no_pool> <days_to_deadline>");
    println!("    prints the yes/no odds for the given pools");
    println!("  demo [tracker|fugitive]");
    println!("    plays one round against the seeded AI and prints every step");
    println!("  markets");
    println!("    lists the default fugitive markets with current odds");
}

fn parse_f64(value: Option<&String>, label: &str) -> Result<f64> {
    let raw = value.with_context(|| format!("missing {label}"))?;
    raw.parse::<f64>()
        .with_context(|| format!("invalid {label}: {raw}"))
}

fn parse_socket_addr(value: Option<&String>, fallback: SocketAddr) -> Result<SocketAddr> {
    match value {
        Some(raw) => raw
            .parse::<SocketAddr>()
            .with_context(|| format!("invalid addr: {raw}")),
        None => Ok(fallback),
    }
}

fn parse_sqlite_path(value: Option<&String>, fallback: &str) -> Option<PathBuf> {
    let path = value
        .map(String::as_str)
        .filter(|path| !path.trim().is_empty())
        .unwrap_or(fallback);
    if path == IN_MEMORY {
        None
    } else {
        Some(PathBuf::from(path))
    }
}

fn parse_role(value: Option<&String>) -> Result<Role> {
    match value.map(String::as_str) {
        None | Some("tracker") => Ok(Role::Tracker),
        Some("fugitive") => Ok(Role::Fugitive),
        Some(other) => bail!("invalid role: {other}"),
    }
}

fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

async fn run_serve(args: &[String], runtime: &RuntimeConfig) -> Result<()> {
    let addr = parse_socket_addr(args.get(2), runtime.bind_addr)?;
    let sqlite_path = parse_sqlite_path(args.get(3), &runtime.sqlite_path);
    info!(
        %addr,
        sqlite = sqlite_path.as_ref().map(|path| path.display().to_string()).unwrap_or_else(|| IN_MEMORY.to_string()),
        seed = runtime.seed,
        "starting hunt api"
    );
    println!("serving api on http://{addr}");
    serve(addr, runtime.game_config(), sqlite_path)
        .await
        .context("server error")
}

fn run_odds(args: &[String], runtime: &RuntimeConfig) -> Result<()> {
    let yes_pool = parse_f64(args.get(2), "yes_pool")?;
    let no_pool = parse_f64(args.get(3), "no_pool")?;
    let days = parse_f64(args.get(4), "days_to_deadline")?;
    if !(yes_pool.is_finite() && no_pool.is_finite() && yes_pool >= 0.0 && no_pool >= 0.0) {
        bail!("pools must be finite and non-negative");
    }

    let now = unix_now();
    let deadline = now + (days * SECONDS_PER_DAY as f64).round() as i64;
    let odds = compute_odds(
        yes_pool,
        no_pool,
        deadline,
        now,
        runtime.game_config().market_window_days,
    )
    .rounded();
    println!("yes={:.2} no={:.2}", odds.yes_odds, odds.no_odds);
    Ok(())
}

fn run_demo(args: &[String], runtime: &RuntimeConfig) -> Result<()> {
    let role = parse_role(args.get(2))?;
    let now = unix_now();
    let mut session = GameSession::new(
        LocationRegistry::new_orleans(),
        runtime.game_config(),
        Box::new(MemoryStatsStore::new()),
    );
    session.start_round(role);
    println!("seed={} role={role:?}", runtime.seed);

    match role {
        Role::Tracker => {
            let order: Vec<String> = session
                .registry()
                .locations()
                .iter()
                .map(|location| location.id.clone())
                .collect();
            for location_id in order {
                if !session.round().is_active() {
                    break;
                }
                let outcome = session.submit_guess(&location_id, now)?;
                println!("{}", outcome.message(session.registry()));
            }
        }
        Role::Fugitive => {
            let hiding = session
                .registry()
                .locations()
                .last()
                .map(|location| location.id.clone())
                .context("location catalog is empty")?;
            let ticket = session.hide(&hiding)?;
            println!("hiding in {}", session.registry().name_of(&hiding));
            for turn in session.play_out_opponent(ticket, now) {
                println!("{}", turn.message(session.registry()));
            }
        }
    }

    let stats = session.current_stats();
    println!("captures={} escapes={}", stats.captures, stats.escapes);
    Ok(())
}

fn run_markets(runtime: &RuntimeConfig) -> Result<()> {
    let now = unix_now();
    let book = MarketBook::with_default_markets(
        Box::new(MemoryBetLedger::new()),
        runtime.game_config().market_window_days,
        now,
    );
    for market in book.views(now) {
        println!(
            "{} status={:?} days_left={} pool={:.1} yes={:.2} no={:.2} urgency={:?}",
            market.id,
            market.status,
            market.days_remaining,
            market.total_pool,
            market.odds.yes_odds,
            market.odds.no_odds,
            market.urgency
        );
    }
    let overview = book.overview(now);
    println!(
        "total_pool={:.1} active_markets={} best_odds={:.2}",
        overview.total_pool, overview.active_markets, overview.best_odds
    );
    Ok(())
}

#[tokio::main]
async fn main() {
    let runtime = match config::load() {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("config error: {err:#}");
            std::process::exit(2);
        }
    };
    logging::init_tracing(&runtime);

    let args: Vec<String> = env::args().collect();
    let result = match args.get(1).map(String::as_str) {
        Some("serve") => run_serve(&args, &runtime).await,
        Some("odds") => run_odds(&args, &runtime),
        Some("demo") => run_demo(&args, &runtime),
        Some("markets") => run_markets(&runtime),
        _ => {
            print_usage();
            Ok(())
        }
    };

    if let Err(err) = result {
        eprintln!("error: {err:#}");
        print_usage();
        std::process::exit(2);
    }
}
