#[derive(Clone)]
struct AppState {
    inner: std::sync::Arc<Mutex<ServerInner>>,
}

impl AppState {
    fn new(api: HuntApi) -> Self {
        Self {
            inner: std::sync::Arc::new(Mutex::new(ServerInner { api })),
        }
    }
}

struct ServerInner {
    api: HuntApi,
}

/// Reprice open markets on a fixed cadence. The lock is held for the whole
/// pass, so a tick never interleaves with a bet on the same market.
fn spawn_odds_tick(state: AppState, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let mut inner = state.inner.lock().await;
            let repriced = inner.api.tick_markets(unix_now());
            debug!(repriced, "scheduled odds tick");
        }
    })
}

/// Run the opponent's think-delay chain. Each hop re-checks the ticket under
/// the lock; a superseded or finished round ends the chain quietly.
fn schedule_opponent(state: AppState, ticket: OpponentTicket) {
    tokio::spawn(async move {
        let mut pending = Some(ticket);
        while let Some(ticket) = pending {
            tokio::time::sleep(Duration::from_millis(ticket.delay_ms)).await;
            let mut inner = state.inner.lock().await;
            pending = inner.api.advance_opponent(ticket, unix_now());
        }
    });
}
