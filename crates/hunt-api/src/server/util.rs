fn apply_cors_headers(headers: &mut axum::http::HeaderMap) {
    headers.insert(
        HeaderName::from_static("access-control-allow-origin"),
        HeaderValue::from_static("*"),
    );
    headers.insert(
        HeaderName::from_static("access-control-allow-methods"),
        HeaderValue::from_static("GET,POST,OPTIONS"),
    );
    headers.insert(
        HeaderName::from_static("access-control-allow-headers"),
        HeaderValue::from_static("*"),
    );
    headers.insert(
        HeaderName::from_static("access-control-max-age"),
        HeaderValue::from_static("3600"),
    );
}

/// Path the binary uses when `HUNT_SQLITE_PATH` is unset or blank.
pub fn default_sqlite_path() -> String {
    std::env::var("HUNT_SQLITE_PATH")
        .ok()
        .filter(|path| !path.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SQLITE_PATH.to_string())
}

fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Stakes arrive as JSON numbers or numeric strings. Anything else, or a
/// non-finite value, is an invalid amount; the sign is checked by the engine.
fn parse_stake(raw: &Value) -> Result<f64, HttpApiError> {
    let parsed = match raw {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(stake) if stake.is_finite() => Ok(stake),
        _ => Err(HttpApiError::invalid_amount(
            "stake_amount must be a number",
            Some(format!("stake_amount={raw}")),
        )),
    }
}

fn parse_timeframe(raw: Option<&str>) -> Result<Timeframe, HttpApiError> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        None => Ok(Timeframe::default()),
        Some(value) => value
            .parse::<Timeframe>()
            .map_err(|err| HttpApiError::invalid_query("unsupported timeframe", Some(err))),
    }
}
