//! Per-category and aggregated reward totals.

use crate::domain::{Decimal, TokenSymbol};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Reward buckets. Entry fees are a cost tracked alongside the earnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Ranked,
    Brawl,
    Tournament,
    EntryFees,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Ranked,
        Category::Brawl,
        Category::Tournament,
        Category::EntryFees,
    ];

    /// Column prefix used by persisted snapshots (`<prefix>_tokens`, `<prefix>_usd`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Ranked => "ranked",
            Category::Brawl => "brawl",
            Category::Tournament => "tournament",
            Category::EntryFees => "entry_fees",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Ranked => "Ranked",
            Category::Brawl => "Brawl",
            Category::Tournament => "Tournament",
            Category::EntryFees => "Entry fees (tracking)",
        }
    }
}

/// Summed token amounts for one bucket plus its independently tracked USD value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotals {
    pub token_amounts: BTreeMap<TokenSymbol, Decimal>,
    pub usd: Decimal,
}

impl CategoryTotals {
    pub fn new(token_amounts: BTreeMap<TokenSymbol, Decimal>, usd: Decimal) -> Self {
        Self { token_amounts, usd }
    }

    pub fn amount(&self, token: &str) -> Decimal {
        self.token_amounts
            .get(&TokenSymbol::new(token))
            .copied()
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.token_amounts.is_empty() && self.usd.is_zero()
    }
}

/// All category totals plus the derived overall bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedTotals {
    pub ranked: CategoryTotals,
    pub brawl: CategoryTotals,
    pub tournament: CategoryTotals,
    pub entry_fees: CategoryTotals,
    pub overall: CategoryTotals,
}

impl AggregatedTotals {
    pub fn category(&self, category: Category) -> &CategoryTotals {
        match category {
            Category::Ranked => &self.ranked,
            Category::Brawl => &self.brawl,
            Category::Tournament => &self.tournament,
            Category::EntryFees => &self.entry_fees,
        }
    }

    /// Sum of the four category USD values.
    pub fn categories_usd(&self) -> Decimal {
        Category::ALL.iter().map(|c| self.category(*c).usd).sum()
    }

    /// Ranked + brawl + tournament, i.e. rewards without the fee bucket.
    pub fn earnings_usd(&self) -> Decimal {
        self.ranked.usd + self.brawl.usd + self.tournament.usd
    }

    /// Earnings with entry fees subtracted. Only used when a caller asks for it.
    pub fn net_usd(&self) -> Decimal {
        self.earnings_usd() - self.entry_fees.usd
    }

    pub fn scholar_share_usd(&self, scholar_pct: Decimal) -> Decimal {
        clamp_pct(scholar_pct).percent_of(self.overall.usd)
    }

    pub fn owner_share_usd(&self, scholar_pct: Decimal) -> Decimal {
        self.overall.usd - self.scholar_share_usd(scholar_pct)
    }

    pub fn scholar_share_tokens(&self, token: &str, scholar_pct: Decimal) -> Decimal {
        clamp_pct(scholar_pct).percent_of(self.overall.amount(token))
    }
}

fn clamp_pct(pct: Decimal) -> Decimal {
    pct.clamp_to(Decimal::zero(), Decimal::hundred())
}
