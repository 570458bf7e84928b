//! USD price quotes keyed by token symbol.

use crate::domain::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// Token symbol (lowercase) to USD unit price. May be incomplete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PriceQuotes(HashMap<String, Decimal>);

impl<'de> Deserialize<'de> for PriceQuotes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = HashMap::<String, Decimal>::deserialize(deserializer)?;
        let mut quotes = PriceQuotes::new();
        for (token, price) in raw {
            quotes.insert(&token, price);
        }
        Ok(quotes)
    }
}

impl PriceQuotes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert; the key is stored lowercase.
    pub fn with(mut self, token: &str, price: Decimal) -> Self {
        self.insert(token, price);
        self
    }

    pub fn insert(&mut self, token: &str, price: Decimal) {
        self.0.insert(token.trim().to_lowercase(), price);
    }

    /// Look up a price trying the exact symbol first, then lowercase.
    pub fn get(&self, token: &str) -> Option<Decimal> {
        self.0
            .get(token)
            .or_else(|| self.0.get(&token.to_lowercase()))
            .copied()
    }

    /// USD value of `amount` units of `token`.
    ///
    /// A missing price, or a product outside the representable range,
    /// contributes zero.
    pub fn usd_value(&self, token: &str, amount: Decimal) -> Decimal {
        let Some(price) = self.get(token) else {
            return Decimal::zero();
        };
        price.checked_mul(amount).unwrap_or_else(|| {
            warn!(token, amount = %amount, price = %price, "USD value overflows, counting as zero");
            Decimal::zero()
        })
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_get_is_case_insensitive() {
        let prices = PriceQuotes::new().with("SPS", Decimal::from_str("0.05").unwrap());
        assert_eq!(prices.get("sps"), Some(Decimal::from_str("0.05").unwrap()));
        assert_eq!(prices.get("SPS"), Some(Decimal::from_str("0.05").unwrap()));
        assert_eq!(prices.get("dec"), None);
    }

    #[test]
    fn test_usd_value_missing_price_is_zero() {
        let prices = PriceQuotes::new();
        assert_eq!(prices.usd_value("GLD", Decimal::from(10)), Decimal::zero());
    }

    #[test]
    fn test_usd_value_overflow_is_zero() {
        let prices = PriceQuotes::new().with("sps", Decimal::from_str("100000000").unwrap());
        let huge = Decimal::from_str("1000000000000000000000").unwrap();
        assert_eq!(prices.usd_value("SPS", huge), Decimal::zero());
        assert_eq!(prices.usd_value("SPS", Decimal::from(2)), Decimal::from(200000000));
        assert_eq!(prices.usd_value("DEC", Decimal::from(2)), Decimal::zero());
    }

    #[test]
    fn test_deserialize_normalizes_keys() {
        let prices: PriceQuotes = serde_json::from_str(r#"{"SPS": 2, " Dec ": 3}"#).unwrap();
        assert_eq!(prices.get("sps"), Some(Decimal::from(2)));
        assert_eq!(prices.get("dec"), Some(Decimal::from(3)));
        assert_eq!(prices.len(), 2);
    }
}
