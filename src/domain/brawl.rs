//! Guild brawl records and per-player brawl statistics.

use crate::domain::{Decimal, TimeMs};
use serde::{Deserialize, Serialize};

/// One brawl cycle in a guild's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrawlRecord {
    pub cycle: i64,
    pub tournament_id: String,
    pub created_date: Option<TimeMs>,
    pub wins: i64,
    pub losses: i64,
    pub draws: i64,
    pub pts: i64,
    pub brawl_rank: i64,
    pub total_sps_payout: Option<Decimal>,
}

/// A single player's record in one brawl.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrawlPlayerRow {
    pub cycle: i64,
    pub tournament_id: String,
    pub player: String,
    pub wins: i64,
    pub losses: i64,
    pub draws: i64,
}

/// Per-player statistics over a window of recent brawls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerBrawlStats {
    pub player: String,
    pub wins: i64,
    pub losses: i64,
    pub draws: i64,
    pub matches: i64,
    pub win_rate: Decimal,
    pub brawls_played: usize,
}
