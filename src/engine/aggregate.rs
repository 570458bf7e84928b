//! Category aggregation of rewards, tournament prizes and entry fees.

use crate::domain::{
    AggregatedTotals, CategoryTotals, Decimal, PriceQuotes, RewardCategory, RewardEntry,
    SeasonWindow, TokenSymbol, TournamentResult,
};
use crate::engine::reconcile::reconcile_overall;
use std::collections::BTreeMap;
use tracing::warn;

/// Accumulates token amounts for one bucket.
#[derive(Debug, Default)]
struct Bucket {
    amounts: BTreeMap<TokenSymbol, Decimal>,
}

impl Bucket {
    /// Add one record's amount. A sum that would overflow skips the record.
    fn add(&mut self, token: &TokenSymbol, amount: Decimal) {
        let current = self.amounts.entry(token.clone()).or_insert_with(Decimal::zero);
        match current.checked_add(amount) {
            Some(sum) => *current = sum,
            None => warn!(token = %token, amount = %amount, "Skipping record: token total overflows"),
        }
    }

    fn finish(self, prices: &PriceQuotes) -> CategoryTotals {
        let usd = category_usd(&self.amounts, prices);
        CategoryTotals::new(self.amounts, usd)
    }
}

/// Σ(amount × price); tokens without a price contribute zero.
pub fn category_usd(amounts: &BTreeMap<TokenSymbol, Decimal>, prices: &PriceQuotes) -> Decimal {
    amounts
        .iter()
        .map(|(token, amount)| prices.usd_value(token.as_str(), *amount))
        .fold(Decimal::zero(), |total, usd| {
            total.checked_add(usd).unwrap_or_else(|| {
                warn!(usd = %usd, "Skipping USD contribution: category total overflows");
                total
            })
        })
}

/// Keep tournaments whose start date falls in `[season.start, season.end)`.
///
/// Tournaments without a start date are dropped.
pub fn filter_season_tournaments<'a>(
    season: &SeasonWindow,
    tournaments: &'a [TournamentResult],
) -> Vec<&'a TournamentResult> {
    tournaments
        .iter()
        .filter(|t| t.start_date.is_some_and(|start| season.contains(start)))
        .collect()
}

/// Aggregate rewards and tournaments without any window filtering.
///
/// Reward entries tagged neither ranked nor brawl are ignored. Entry fees are
/// collected as positive amounts in their own bucket.
pub fn aggregate_totals<'a, I>(
    rewards: &[RewardEntry],
    tournaments: I,
    prices: &PriceQuotes,
) -> AggregatedTotals
where
    I: IntoIterator<Item = &'a TournamentResult>,
{
    let mut ranked = Bucket::default();
    let mut brawl = Bucket::default();
    let mut tournament = Bucket::default();
    let mut entry_fees = Bucket::default();

    for entry in rewards {
        match entry.category {
            RewardCategory::Ranked => ranked.add(&entry.token, entry.amount),
            RewardCategory::Brawl => brawl.add(&entry.token, entry.amount),
            RewardCategory::Other => {}
        }
    }

    for t in tournaments {
        for prize in &t.rewards {
            tournament.add(&prize.token, prize.amount);
        }
        if let Some(fee) = &t.entry_fee {
            entry_fees.add(&fee.token, fee.amount);
        }
    }

    reconcile_overall(
        ranked.finish(prices),
        brawl.finish(prices),
        tournament.finish(prices),
        entry_fees.finish(prices),
        None,
    )
}

/// Season-scoped aggregation: filter tournaments to the season, then aggregate.
pub fn aggregate_season(
    season: &SeasonWindow,
    rewards: &[RewardEntry],
    tournaments: &[TournamentResult],
    prices: &PriceQuotes,
) -> AggregatedTotals {
    aggregate_totals(rewards, filter_season_tournaments(season, tournaments), prices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Finish, TimeMs, TokenAmount};
    use std::str::FromStr;

    const JAN_1: i64 = 1_704_067_200_000;
    const FEB_1: i64 = 1_706_745_600_000;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn season() -> SeasonWindow {
        SeasonWindow::new(205, TimeMs::new(JAN_1), TimeMs::new(FEB_1))
    }

    fn reward(token: &str, amount: &str, category: RewardCategory) -> RewardEntry {
        RewardEntry::new(TokenSymbol::new(token), d(amount), category, TimeMs::new(JAN_1))
    }

    fn tournament(id: &str, start: Option<i64>, prizes: &[(&str, &str)], fee: Option<(&str, &str)>) -> TournamentResult {
        TournamentResult {
            id: id.to_string(),
            name: id.to_string(),
            start_date: start.map(TimeMs::new),
            finish: Finish::Unknown,
            entry_fee: fee.map(|(t, a)| TokenAmount::new(TokenSymbol::new(t), d(a))),
            rewards: prizes
                .iter()
                .map(|(t, a)| TokenAmount::new(TokenSymbol::new(t), d(a)))
                .collect(),
            raw: serde_json::Value::Null,
        }
    }

    #[test]
    fn test_single_ranked_reward_scenario() {
        let prices = PriceQuotes::new().with("sps", d("0.05"));
        let rewards = vec![reward("SPS", "100", RewardCategory::Ranked)];

        let totals = aggregate_season(&season(), &rewards, &[], &prices);

        assert_eq!(totals.ranked.token_amounts.get(&TokenSymbol::new("SPS")), Some(&d("100")));
        assert_eq!(totals.ranked.token_amounts.len(), 1);
        assert_eq!(totals.ranked.usd, d("5.00"));
        assert_eq!(totals.overall.usd, d("5.00"));
    }

    #[test]
    fn test_buckets_and_case_normalized_keys() {
        let prices = PriceQuotes::new().with("sps", d("0.05")).with("dec", d("0.001"));
        let rewards = vec![
            reward("sps", "10", RewardCategory::Ranked),
            reward("SPS", "5", RewardCategory::Ranked),
            reward("DEC", "1000", RewardCategory::Brawl),
            reward("SPS", "999", RewardCategory::Other),
        ];
        let tournaments = vec![tournament("t1", Some(JAN_1), &[("SPS", "20")], Some(("DEC", "500")))];

        let totals = aggregate_season(&season(), &rewards, &tournaments, &prices);

        assert_eq!(totals.ranked.amount("SPS"), d("15"));
        assert_eq!(totals.ranked.usd, d("0.75"));
        assert_eq!(totals.brawl.amount("DEC"), d("1000"));
        assert_eq!(totals.brawl.usd, d("1"));
        assert_eq!(totals.tournament.amount("SPS"), d("20"));
        assert_eq!(totals.entry_fees.amount("DEC"), d("500"));
        assert_eq!(totals.entry_fees.usd, d("0.5"));
        assert_eq!(totals.overall.amount("SPS"), d("35"));
        assert_eq!(totals.overall.amount("DEC"), d("1500"));
        assert_eq!(totals.overall.usd, totals.categories_usd());
    }

    #[test]
    fn test_missing_price_contributes_zero() {
        let prices = PriceQuotes::new().with("sps", d("0.05"));
        let rewards = vec![
            reward("SPS", "100", RewardCategory::Ranked),
            reward("UNKNOWN", "50", RewardCategory::Ranked),
        ];

        let totals = aggregate_totals(&rewards, std::iter::empty::<&TournamentResult>(), &prices);

        assert_eq!(totals.ranked.amount("UNKNOWN"), d("50"));
        assert_eq!(totals.ranked.usd, d("5"));
    }

    #[test]
    fn test_empty_price_table_still_aggregates() {
        let rewards = vec![reward("SPS", "100", RewardCategory::Brawl)];
        let totals = aggregate_totals(&rewards, std::iter::empty::<&TournamentResult>(), &PriceQuotes::new());
        assert_eq!(totals.brawl.amount("SPS"), d("100"));
        assert_eq!(totals.overall.usd, Decimal::zero());
    }

    #[test]
    fn test_season_filter_is_half_open() {
        let tournaments = vec![
            tournament("at-start", Some(JAN_1), &[("SPS", "1")], None),
            tournament("inside", Some(JAN_1 + 1), &[("SPS", "2")], None),
            tournament("at-end", Some(FEB_1), &[("SPS", "4")], None),
            tournament("undated", None, &[("SPS", "8")], None),
        ];

        let kept: Vec<_> = filter_season_tournaments(&season(), &tournaments)
            .into_iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(kept, vec!["at-start", "inside"]);

        let scoped = aggregate_season(&season(), &[], &tournaments, &PriceQuotes::new());
        assert_eq!(scoped.tournament.amount("SPS"), d("3"));

        let lifetime = aggregate_totals(&[], &tournaments, &PriceQuotes::new());
        assert_eq!(lifetime.tournament.amount("SPS"), d("15"));
    }

    #[test]
    fn test_input_order_does_not_change_totals() {
        let prices = PriceQuotes::new().with("sps", d("0.0513")).with("dec", d("0.00071"));
        let mut rewards = vec![
            reward("SPS", "0.1", RewardCategory::Ranked),
            reward("DEC", "33.333", RewardCategory::Brawl),
            reward("sps", "0.2", RewardCategory::Brawl),
            reward("SPS", "1234.5678", RewardCategory::Ranked),
        ];
        let forward = aggregate_totals(&rewards, std::iter::empty::<&TournamentResult>(), &prices);
        rewards.reverse();
        let backward = aggregate_totals(&rewards, std::iter::empty::<&TournamentResult>(), &prices);
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_inputs_are_not_consumed() {
        let rewards = vec![reward("SPS", "1", RewardCategory::Ranked)];
        let tournaments = vec![tournament("t", Some(JAN_1), &[("SPS", "1")], None)];
        let a = aggregate_season(&season(), &rewards, &tournaments, &PriceQuotes::new());
        let b = aggregate_season(&season(), &rewards, &tournaments, &PriceQuotes::new());
        assert_eq!(a, b);
        assert_eq!(rewards.len(), 1);
    }

    #[test]
    fn test_overflowing_amounts_skip_the_record() {
        use crate::engine::normalize::parse_reward_entry;
        use serde_json::json;

        let entry = json!({"token": "SPS", "amount": "60000000000000000000000000000", "type": "ranked"});
        let rewards = vec![
            parse_reward_entry(&entry).unwrap(),
            parse_reward_entry(&entry).unwrap(),
            reward("DEC", "5", RewardCategory::Ranked),
        ];

        let totals = aggregate_totals(&rewards, std::iter::empty::<&TournamentResult>(), &PriceQuotes::new());

        assert_eq!(totals.ranked.amount("SPS"), d("60000000000000000000000000000"));
        assert_eq!(totals.ranked.amount("DEC"), d("5"));
    }

    #[test]
    fn test_overflowing_usd_value_counts_as_zero() {
        let prices = PriceQuotes::new().with("sps", d("100000000")).with("dec", d("0.5"));
        let rewards = vec![
            reward("SPS", "1000000000000000000000", RewardCategory::Brawl),
            reward("DEC", "10", RewardCategory::Brawl),
        ];

        let totals = aggregate_totals(&rewards, std::iter::empty::<&TournamentResult>(), &prices);

        assert_eq!(totals.brawl.usd, d("5"));
        assert_eq!(totals.brawl.amount("SPS"), d("1000000000000000000000"));
    }
}
