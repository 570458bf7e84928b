//! Domain types for season reward tracking.
//!
//! This module provides:
//! - Lossless numeric handling via Decimal wrapper
//! - Domain primitives: TimeMs, Username, TokenSymbol
//! - Input records: SeasonWindow, RewardEntry, TournamentResult, PriceQuotes
//! - Output aggregates and their persisted snapshot forms

pub mod brawl;
pub mod decimal;
pub mod prices;
pub mod primitives;
pub mod reward;
pub mod season;
pub mod snapshot;
pub mod totals;
pub mod tournament;

pub use brawl::{BrawlPlayerRow, BrawlRecord, PlayerBrawlStats};
pub use decimal::Decimal;
pub use prices::PriceQuotes;
pub use primitives::{TimeMs, TokenSymbol, Username};
pub use reward::{RewardCategory, RewardEntry, TokenAmount};
pub use season::SeasonWindow;
pub use snapshot::{SeasonSnapshot, SnapshotRecord, TournamentLog};
pub use totals::{AggregatedTotals, Category, CategoryTotals};
pub use tournament::{Finish, TournamentResult};
