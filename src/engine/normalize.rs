//! Record normalization: defensive extraction of numbers, timestamps, token
//! amounts and finish placements from loosely shaped API payloads.
//!
//! Every parser is a pure function. Expected absence is expressed as `None` or
//! an `ExtractError`; callers skip the offending record and keep going.

use crate::domain::{
    Decimal, Finish, RewardCategory, RewardEntry, TimeMs, TokenAmount, TokenSymbol,
    TournamentResult, Username,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("expected a JSON object")]
    NotAnObject,
    #[error("missing field: {0}")]
    MissingField(&'static str),
    #[error("invalid {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
    #[error("negative amount: {0}")]
    NegativeAmount(String),
}

const NAIVE_DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Parse an int, float or numeric string into a Decimal.
pub fn parse_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => Decimal::from_str_lenient(&n.to_string()),
        Value::String(s) => {
            let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
            if cleaned.is_empty() {
                None
            } else {
                Decimal::from_str_lenient(&cleaned)
            }
        }
        _ => None,
    }
}

/// Parse an integer-valued int, float or string. Fractional values are rejected.
pub fn parse_i64(value: &Value) -> Option<i64> {
    if let Some(i) = value.as_i64() {
        return Some(i);
    }
    let d = parse_decimal(value)?;
    if d.inner().fract().is_zero() {
        d.inner().to_i64()
    } else {
        None
    }
}

pub fn coerce_decimal(value: Option<&Value>, default: Decimal) -> Decimal {
    value.and_then(parse_decimal).unwrap_or(default)
}

pub fn coerce_i64(value: Option<&Value>, default: i64) -> i64 {
    value.and_then(parse_i64).unwrap_or(default)
}

/// Parse RFC 3339, naive ISO date-times/dates (taken as UTC) or epoch milliseconds.
pub fn parse_timestamp(value: &Value) -> Option<TimeMs> {
    match value {
        Value::Number(n) => n.as_i64().map(TimeMs::new),
        Value::String(s) => parse_timestamp_str(s.trim()),
        _ => None,
    }
}

fn parse_timestamp_str(s: &str) -> Option<TimeMs> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(TimeMs::new(dt.timestamp_millis()));
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(TimeMs::new(dt.and_utc().timestamp_millis()));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|dt| TimeMs::new(dt.and_utc().timestamp_millis()));
    }
    s.parse::<i64>().ok().map(TimeMs::new)
}

/// Parse `"<amount> <TOKEN>"`, e.g. `"1,000 DEC"` or `"12.5 sps"`.
pub fn parse_token_amount_str(s: &str) -> Option<TokenAmount> {
    let mut parts: Vec<&str> = s.split_whitespace().collect();
    if parts.len() < 2 {
        return None;
    }
    let token = parts.pop()?;
    if token.chars().any(|c| c.is_ascii_digit()) && !token.chars().any(|c| c.is_alphabetic()) {
        return None;
    }
    let amount = parse_decimal(&Value::String(parts.join("")))?;
    Some(TokenAmount::new(TokenSymbol::new(token), amount))
}

fn first_field<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| value.get(*k))
        .find(|v| !v.is_null())
}

/// Extract a token/amount pair from a `"<amount> <TOKEN>"` string or an object.
pub fn parse_token_amount(value: &Value) -> Result<TokenAmount, ExtractError> {
    if let Value::String(s) = value {
        return parse_token_amount_str(s).ok_or_else(|| ExtractError::InvalidValue {
            field: "token_amount",
            value: s.clone(),
        });
    }
    if !value.is_object() {
        return Err(ExtractError::NotAnObject);
    }

    let token = first_field(value, &["token", "token_type", "currency", "symbol"])
        .and_then(Value::as_str)
        .map(TokenSymbol::new)
        .filter(|t| !t.is_empty())
        .ok_or(ExtractError::MissingField("token"))?;

    let raw_amount = first_field(value, &["amount", "qty", "quantity", "value"])
        .ok_or(ExtractError::MissingField("amount"))?;
    let amount = parse_decimal(raw_amount).ok_or_else(|| ExtractError::InvalidValue {
        field: "amount",
        value: raw_amount.to_string(),
    })?;

    Ok(TokenAmount::new(token, amount))
}

/// Build a reward entry from an unclaimed balance history record.
///
/// Negative amounts are claims/withdrawals, not rewards, and are rejected.
/// A missing or unparseable timestamp falls back to the epoch.
pub fn parse_reward_entry(value: &Value) -> Result<RewardEntry, ExtractError> {
    let TokenAmount { token, amount } = parse_token_amount(value)?;
    if amount.is_negative() {
        return Err(ExtractError::NegativeAmount(amount.to_canonical_string()));
    }

    let category = value
        .get("type")
        .and_then(Value::as_str)
        .map(RewardCategory::from_tag)
        .unwrap_or(RewardCategory::Other);

    let timestamp = first_field(value, &["created_date", "timestamp"])
        .and_then(parse_timestamp)
        .unwrap_or(TimeMs::new(0));

    Ok(RewardEntry::new(token, amount, category, timestamp))
}

fn finish_from_block(block: &Value, username: &Username) -> Option<i64> {
    let name = first_field(block, &["player", "name"]).and_then(Value::as_str)?;
    if !username.matches(name) {
        return None;
    }
    block.get("finish").and_then(parse_i64)
}

/// Resolve the player's finish placement.
///
/// Order: the tournament's own `finish`, then the matching entry in
/// `detail.players`, then `detail.current_player`. Names match
/// case-insensitively and non-numeric finishes fall through.
pub fn resolve_finish(own: Option<&Value>, raw: &Value, username: &Username) -> Finish {
    if let Some(place) = own.and_then(parse_i64) {
        return Finish::Placed(place);
    }

    let detail = raw.get("detail");

    let from_players = detail
        .and_then(|d| d.get("players"))
        .and_then(Value::as_array)
        .and_then(|players| {
            players
                .iter()
                .find_map(|p| finish_from_block(p, username))
        });
    if let Some(place) = from_players {
        return Finish::Placed(place);
    }

    detail
        .and_then(|d| d.get("current_player"))
        .and_then(|cp| finish_from_block(cp, username))
        .map(Finish::Placed)
        .unwrap_or(Finish::Unknown)
}

fn parse_entry_fee(value: &Value) -> Option<TokenAmount> {
    let fee = match value.get("entry_fee") {
        Some(v @ (Value::String(_) | Value::Object(_))) => parse_token_amount(v).ok(),
        _ => None,
    }
    .or_else(|| {
        let token = value.get("entry_fee_token").and_then(Value::as_str)?;
        let amount = value.get("entry_fee_amount").and_then(parse_decimal)?;
        Some(TokenAmount::new(TokenSymbol::new(token), amount))
    })?;

    fee.amount.is_positive().then_some(fee)
}

/// Split a prize list such as `"25 SPS, 1,000 DEC"` into `<amount> <TOKEN>` items.
///
/// Items end at a token word, so commas inside amounts stay with the amount.
fn split_prize_items(text: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut amount: Vec<&str> = Vec::new();
    for word in text.split_whitespace() {
        let word = word.trim_matches(',');
        if word.is_empty() {
            continue;
        }
        amount.push(word);
        if parse_decimal(&Value::String(word.to_string())).is_none() {
            items.push(amount.join(" "));
            amount.clear();
        }
    }
    if !amount.is_empty() {
        items.push(amount.join(" "));
    }
    items
}

fn parse_prizes(value: &Value, tournament_id: &str) -> Vec<TokenAmount> {
    let mut rewards = Vec::new();

    if let Some(items) = first_field(value, &["rewards", "prizes"]).and_then(Value::as_array) {
        for item in items {
            match parse_token_amount(item) {
                Ok(prize) => rewards.push(prize),
                Err(e) => warn!(tournament_id, error = %e, "Skipping unparseable tournament prize"),
            }
        }
    } else if let Some(text) = first_field(value, &["player_prize", "prize"]).and_then(Value::as_str) {
        for part in split_prize_items(text) {
            match parse_token_amount_str(&part) {
                Some(prize) => rewards.push(prize),
                None => warn!(tournament_id, prize = %part, "Skipping unparseable tournament prize"),
            }
        }
    }

    rewards.retain(|r| r.amount.is_positive());
    rewards
}

/// Build a tournament result from a completed-tournament record.
pub fn parse_tournament(value: &Value, username: &Username) -> Result<TournamentResult, ExtractError> {
    if !value.is_object() {
        return Err(ExtractError::NotAnObject);
    }

    let id = match first_field(value, &["id", "tournament_id"]) {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return Err(ExtractError::MissingField("id")),
    };

    let name = value
        .get("name")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| id.clone());

    Ok(TournamentResult {
        start_date: value.get("start_date").and_then(parse_timestamp),
        finish: resolve_finish(value.get("finish"), value, username),
        entry_fee: parse_entry_fee(value),
        rewards: parse_prizes(value, &id),
        raw: value.clone(),
        id,
        name,
    })
}

/// Parse a persisted token map.
///
/// Accepts a native JSON object or a string holding a JSON object. Anything
/// else yields an empty map. Keys are case-normalized and duplicates summed;
/// entries with unparseable amounts are dropped.
pub fn parse_token_map(value: &Value) -> BTreeMap<TokenSymbol, Decimal> {
    let decoded;
    let object = match value {
        Value::Object(map) => map,
        Value::String(s) => {
            decoded = serde_json::from_str::<Value>(s).unwrap_or(Value::Null);
            match &decoded {
                Value::Object(map) => map,
                _ => return BTreeMap::new(),
            }
        }
        _ => return BTreeMap::new(),
    };

    let mut out = BTreeMap::new();
    for (key, raw) in object {
        let token = TokenSymbol::new(key);
        if token.is_empty() {
            continue;
        }
        if let Some(amount) = parse_decimal(raw) {
            *out.entry(token).or_insert_with(Decimal::zero) += amount;
        }
    }
    out
}
