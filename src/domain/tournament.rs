//! Completed tournament results.

use crate::domain::{TimeMs, TokenAmount};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Finish placement of the tracked player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "place")]
pub enum Finish {
    Placed(i64),
    Unknown,
}

impl Finish {
    pub fn place(&self) -> Option<i64> {
        match self {
            Finish::Placed(p) => Some(*p),
            Finish::Unknown => None,
        }
    }
}

impl fmt::Display for Finish {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finish::Placed(p) => write!(f, "{}", p),
            Finish::Unknown => write!(f, "-"),
        }
    }
}

/// A tournament the player took part in, with its prizes and entry fee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentResult {
    pub id: String,
    pub name: String,
    pub start_date: Option<TimeMs>,
    pub finish: Finish,
    pub entry_fee: Option<TokenAmount>,
    pub rewards: Vec<TokenAmount>,
    /// Source payload, kept for fallback extraction and tournament logs.
    pub raw: serde_json::Value,
}
