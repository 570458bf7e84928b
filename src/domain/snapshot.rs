//! Persisted season snapshot and tournament log rows.

use crate::domain::{
    AggregatedTotals, Category, Decimal, SeasonWindow, TokenAmount, TokenSymbol, TournamentResult,
    Username,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Typed season snapshot, as written on an explicit sync.
///
/// Field names are the persisted column names. The optional payout override is
/// deliberately absent: a full upsert never touches it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonSnapshot {
    pub season_id: i64,
    pub season_start: String,
    pub season_end: String,
    pub username: String,
    pub scholar_pct: Decimal,
    pub payout_currency: String,
    pub ranked_tokens: BTreeMap<TokenSymbol, Decimal>,
    pub brawl_tokens: BTreeMap<TokenSymbol, Decimal>,
    pub tournament_tokens: BTreeMap<TokenSymbol, Decimal>,
    pub entry_fees_tokens: BTreeMap<TokenSymbol, Decimal>,
    pub ranked_usd: Decimal,
    pub brawl_usd: Decimal,
    pub tournament_usd: Decimal,
    pub entry_fees_usd: Decimal,
    pub overall_usd: Decimal,
}

impl SeasonSnapshot {
    /// Flatten an aggregate into a snapshot row.
    pub fn from_totals(
        season: &SeasonWindow,
        username: &Username,
        totals: &AggregatedTotals,
        scholar_pct: Decimal,
        payout_currency: &str,
    ) -> Self {
        Self {
            season_id: season.id,
            season_start: season.start.to_rfc3339(),
            season_end: season.end.to_rfc3339(),
            username: username.as_str().to_string(),
            scholar_pct,
            payout_currency: payout_currency.trim().to_uppercase(),
            ranked_tokens: totals.ranked.token_amounts.clone(),
            brawl_tokens: totals.brawl.token_amounts.clone(),
            tournament_tokens: totals.tournament.token_amounts.clone(),
            entry_fees_tokens: totals.entry_fees.token_amounts.clone(),
            ranked_usd: totals.ranked.usd,
            brawl_usd: totals.brawl.usd,
            tournament_usd: totals.tournament.usd,
            entry_fees_usd: totals.entry_fees.usd,
            overall_usd: totals.overall.usd,
        }
    }

    pub fn tokens(&self, category: Category) -> &BTreeMap<TokenSymbol, Decimal> {
        match category {
            Category::Ranked => &self.ranked_tokens,
            Category::Brawl => &self.brawl_tokens,
            Category::Tournament => &self.tournament_tokens,
            Category::EntryFees => &self.entry_fees_tokens,
        }
    }

    pub fn usd(&self, category: Category) -> Decimal {
        match category {
            Category::Ranked => self.ranked_usd,
            Category::Brawl => self.brawl_usd,
            Category::Tournament => self.tournament_usd,
            Category::EntryFees => self.entry_fees_usd,
        }
    }

    /// Row payload with every decimal as a canonical string, so amounts
    /// survive stores that would otherwise go through floating point.
    pub fn to_row(&self) -> Value {
        let mut row = json!({
            "season_id": self.season_id,
            "season_start": self.season_start,
            "season_end": self.season_end,
            "username": self.username,
            "scholar_pct": self.scholar_pct.to_canonical_string(),
            "payout_currency": self.payout_currency,
            "overall_usd": self.overall_usd.to_canonical_string(),
        });
        for category in Category::ALL {
            row[format!("{}_tokens", category.as_str())] = token_map_json(self.tokens(category));
            row[format!("{}_usd", category.as_str())] = Value::String(self.usd(category).to_canonical_string());
        }
        row
    }

    /// Loosely typed view of this row, as a store would hand it back.
    pub fn to_record(&self) -> SnapshotRecord {
        serde_json::from_value(self.to_row()).unwrap_or_default()
    }
}

/// Token map as a JSON object of canonical decimal strings.
pub fn token_map_json(map: &BTreeMap<TokenSymbol, Decimal>) -> Value {
    Value::Object(
        map.iter()
            .map(|(token, amount)| (token.as_str().to_string(), Value::String(amount.to_canonical_string())))
            .collect(),
    )
}

/// Token amounts as `[{"token": .., "amount": ".."}]` with canonical decimal strings.
pub fn token_amounts_json(amounts: &[TokenAmount]) -> Value {
    Value::Array(
        amounts
            .iter()
            .map(|a| json!({"token": a.token.as_str(), "amount": a.amount.to_canonical_string()}))
            .collect(),
    )
}

/// A stored snapshot row as read back from a store.
///
/// Every field is kept as raw JSON: token maps may arrive as JSON text or as a
/// native object, numbers as numbers or strings, and any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotRecord {
    pub season_id: serde_json::Value,
    pub season_start: serde_json::Value,
    pub season_end: serde_json::Value,
    pub username: serde_json::Value,
    pub scholar_pct: serde_json::Value,
    pub payout_currency: serde_json::Value,
    pub ranked_tokens: serde_json::Value,
    pub brawl_tokens: serde_json::Value,
    pub tournament_tokens: serde_json::Value,
    pub entry_fees_tokens: serde_json::Value,
    pub ranked_usd: serde_json::Value,
    pub brawl_usd: serde_json::Value,
    pub tournament_usd: serde_json::Value,
    pub entry_fees_usd: serde_json::Value,
    pub overall_usd: serde_json::Value,
    pub scholar_payout: serde_json::Value,
}

impl SnapshotRecord {
    pub fn tokens_field(&self, category: Category) -> &serde_json::Value {
        match category {
            Category::Ranked => &self.ranked_tokens,
            Category::Brawl => &self.brawl_tokens,
            Category::Tournament => &self.tournament_tokens,
            Category::EntryFees => &self.entry_fees_tokens,
        }
    }

    pub fn usd_field(&self, category: Category) -> &serde_json::Value {
        match category {
            Category::Ranked => &self.ranked_usd,
            Category::Brawl => &self.brawl_usd,
            Category::Tournament => &self.tournament_usd,
            Category::EntryFees => &self.entry_fees_usd,
        }
    }
}

/// One persisted tournament row per (username, tournament_id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentLog {
    pub username: String,
    pub tournament_id: String,
    pub name: String,
    pub start_date: Option<String>,
    pub finish: Option<i64>,
    pub entry_fee_token: Option<TokenSymbol>,
    pub entry_fee_amount: Option<Decimal>,
    pub rewards: Vec<TokenAmount>,
    pub raw: serde_json::Value,
}

impl TournamentLog {
    /// Row payload with decimals as canonical strings.
    pub fn to_row(&self) -> Value {
        json!({
            "username": self.username,
            "tournament_id": self.tournament_id,
            "name": self.name,
            "start_date": self.start_date,
            "finish": self.finish,
            "entry_fee_token": self.entry_fee_token.as_ref().map(TokenSymbol::as_str),
            "entry_fee_amount": self.entry_fee_amount.map(|a| a.to_canonical_string()),
            "rewards": token_amounts_json(&self.rewards),
            "raw": self.raw,
        })
    }

    pub fn from_result(username: &Username, t: &TournamentResult) -> Self {
        Self {
            username: username.as_str().to_string(),
            tournament_id: t.id.clone(),
            name: t.name.clone(),
            start_date: t.start_date.map(|s| s.to_rfc3339()),
            finish: t.finish.place(),
            entry_fee_token: t.entry_fee.as_ref().map(|f| f.token.clone()),
            entry_fee_amount: t.entry_fee.as_ref().map(|f| f.amount),
            rewards: t.rewards.clone(),
            raw: t.raw.clone(),
        }
    }
}
