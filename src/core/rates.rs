//! Exchange rate query and provider abstractions

use super::error::Result;
use super::invoice::LineItem;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};

/// Currency code to the multiplier that converts an amount in that currency
/// into the invoice's base currency.
pub type RateMap = BTreeMap<String, f64>;

/// Request descriptor for a rate lookup.
///
/// `currencies` keeps line-item order and duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RateQuery {
    pub date: String,
    pub base_currency: String,
    pub currencies: Vec<String>,
}

impl RateQuery {
    pub fn new(base_currency: &str, date: &str, lines: &[LineItem]) -> Self {
        RateQuery {
            date: date.to_string(),
            base_currency: base_currency.to_string(),
            currencies: lines.iter().map(|line| line.currency.clone()).collect(),
        }
    }

    /// Comma-joined currency codes for the `symbols` parameter.
    pub fn symbols(&self) -> String {
        self.currencies.join(",")
    }

    pub fn to_url(&self, base_url: &str) -> String {
        format!(
            "{}/{}?base={}&symbols={}",
            base_url.trim_end_matches('/'),
            self.date,
            self.base_currency,
            self.symbols()
        )
    }
}

#[async_trait]
pub trait ExchangeRateProvider: Send + Sync {
    /// Returns, per requested currency, the units of that currency worth one
    /// unit of the query's base currency.
    async fn fetch_rates(&self, query: &RateQuery) -> Result<HashMap<String, f64>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(currency: &str) -> LineItem {
        LineItem {
            description: format!("item in {currency}"),
            currency: currency.to_string(),
            amount: 1.0,
        }
    }

    #[test]
    fn test_query_keeps_order_and_duplicates() {
        let lines = vec![line("USD"), line("EUR"), line("USD")];
        let query = RateQuery::new("AUD", "2020/08/05", &lines);
        assert_eq!(query.currencies, vec!["USD", "EUR", "USD"]);
        assert_eq!(
            query.to_url("https://api.exchangeratesapi.io"),
            "https://api.exchangeratesapi.io/2020/08/05?base=AUD&symbols=USD,EUR,USD"
        );
    }

    #[test]
    fn test_query_from_no_lines() {
        let query = RateQuery::new("AUD", "2020/08/05", &[]);
        assert!(query.currencies.is_empty());
        assert_eq!(
            query.to_url("http://localhost:8080/"),
            "http://localhost:8080/2020/08/05?base=AUD&symbols="
        );
    }

    #[test]
    fn test_query_is_deterministic() {
        let lines = vec![line("GBP"), line("JPY")];
        assert_eq!(
            RateQuery::new("NZD", "2020-07-07", &lines),
            RateQuery::new("NZD", "2020-07-07", &lines)
        );
    }
}
