//! Pure computation engine: normalization, aggregation, reconciliation and
//! payout formatting. Nothing here performs I/O.

pub mod aggregate;
pub mod brawl;
pub mod normalize;
pub mod payout;
pub mod reconcile;

pub use aggregate::{aggregate_season, aggregate_totals, category_usd, filter_season_tournaments};
pub use normalize::ExtractError;
pub use payout::{
    format_payout, format_price, format_token_amounts, format_usd, BASE_TOKEN, MISSING_DISPLAY,
    PAYOUT_UNAVAILABLE,
};
pub use reconcile::{reconcile_overall, reconstruct};
