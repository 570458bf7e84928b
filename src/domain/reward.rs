//! Reward records as reported by the game's unclaimed balance history.

use crate::domain::{Decimal, TimeMs, TokenSymbol};
use serde::{Deserialize, Serialize};

/// Category tag attached to a reward entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewardCategory {
    Ranked,
    Brawl,
    Other,
}

impl RewardCategory {
    /// Map a raw API `type` tag to a category.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "ranked" | "modern" | "wild" | "survival" | "foundation" => RewardCategory::Ranked,
            "brawl" => RewardCategory::Brawl,
            _ => RewardCategory::Other,
        }
    }
}

/// A token/amount pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAmount {
    pub token: TokenSymbol,
    pub amount: Decimal,
}

impl TokenAmount {
    pub fn new(token: TokenSymbol, amount: Decimal) -> Self {
        Self { token, amount }
    }
}

/// A single reward credited to a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardEntry {
    pub token: TokenSymbol,
    /// Non-negative amount.
    pub amount: Decimal,
    pub category: RewardCategory,
    pub timestamp: TimeMs,
}

impl RewardEntry {
    pub fn new(token: TokenSymbol, amount: Decimal, category: RewardCategory, timestamp: TimeMs) -> Self {
        Self {
            token,
            amount,
            category,
            timestamp,
        }
    }
}
