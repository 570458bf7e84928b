//! Guild brawl history flattening and per-player statistics.

use crate::domain::{BrawlPlayerRow, BrawlRecord, Decimal, PlayerBrawlStats};
use crate::engine::normalize::{coerce_i64, parse_decimal, parse_timestamp, ExtractError};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Parse one entry of a guild's brawl history.
pub fn parse_brawl_record(value: &Value) -> Result<BrawlRecord, ExtractError> {
    if !value.is_object() {
        return Err(ExtractError::NotAnObject);
    }
    let tournament_id = match value.get("tournament_id") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return Err(ExtractError::MissingField("tournament_id")),
    };

    Ok(BrawlRecord {
        cycle: coerce_i64(value.get("cycle"), 0),
        tournament_id,
        created_date: value.get("created_date").and_then(parse_timestamp),
        wins: coerce_i64(value.get("wins"), 0),
        losses: coerce_i64(value.get("losses"), 0),
        draws: coerce_i64(value.get("draws"), 0),
        pts: coerce_i64(value.get("pts"), 0),
        brawl_rank: coerce_i64(value.get("brawl_rank"), 0),
        total_sps_payout: value.get("total_sps_payout").and_then(parse_decimal),
    })
}

/// Records belonging to the `max_brawls` most recent cycles, newest first.
pub fn recent_brawls(history: &[BrawlRecord], max_brawls: usize) -> Vec<&BrawlRecord> {
    let cycles: HashSet<i64> = history
        .iter()
        .map(|r| r.cycle)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .rev()
        .take(max_brawls)
        .collect();

    let mut recent: Vec<&BrawlRecord> = history.iter().filter(|r| cycles.contains(&r.cycle)).collect();
    recent.sort_by(|a, b| b.cycle.cmp(&a.cycle));
    recent
}

/// Flatten a brawl details payload into per-player rows.
///
/// Players without a name are skipped; per-player counts may sit directly on
/// the player object or under its `record` block.
pub fn parse_brawl_players(brawl: &BrawlRecord, details: &Value) -> Vec<BrawlPlayerRow> {
    let Some(players) = details.get("players").and_then(Value::as_array) else {
        return Vec::new();
    };

    players
        .iter()
        .filter_map(|player| {
            let name = ["player", "name"]
                .iter()
                .filter_map(|k| player.get(*k).and_then(Value::as_str))
                .find(|s| !s.is_empty())?;
            let record = player.get("record").filter(|r| r.is_object()).unwrap_or(player);
            Some(BrawlPlayerRow {
                cycle: brawl.cycle,
                tournament_id: brawl.tournament_id.clone(),
                player: name.to_string(),
                wins: coerce_i64(record.get("wins"), 0),
                losses: coerce_i64(record.get("losses"), 0),
                draws: coerce_i64(record.get("draws"), 0),
            })
        })
        .collect()
}

#[derive(Default)]
struct PlayerAccumulator<'a> {
    wins: i64,
    losses: i64,
    draws: i64,
    brawls: HashSet<&'a str>,
}

/// Per-player totals over the `window` most recent cycles, ordered by player name.
pub fn compute_player_stats(rows: &[BrawlPlayerRow], window: usize) -> Vec<PlayerBrawlStats> {
    let window_cycles: HashSet<i64> = rows
        .iter()
        .map(|r| r.cycle)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .rev()
        .take(window)
        .collect();

    let mut by_player: BTreeMap<&str, PlayerAccumulator> = BTreeMap::new();
    for row in rows.iter().filter(|r| window_cycles.contains(&r.cycle)) {
        let acc = by_player.entry(row.player.as_str()).or_default();
        acc.wins += row.wins;
        acc.losses += row.losses;
        acc.draws += row.draws;
        acc.brawls.insert(row.tournament_id.as_str());
    }

    by_player
        .into_iter()
        .map(|(player, acc)| {
            let matches = acc.wins + acc.losses + acc.draws;
            let win_rate = Decimal::from(acc.wins)
                .checked_div(Decimal::from(matches.max(1)))
                .unwrap_or_default();
            PlayerBrawlStats {
                player: player.to_string(),
                wins: acc.wins,
                losses: acc.losses,
                draws: acc.draws,
                matches,
                win_rate,
                brawls_played: acc.brawls.len(),
            }
        })
        .collect()
}
