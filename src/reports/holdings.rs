use itertools::Itertools;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{info, warn};

use crate::models::{PriceQuote, TickerMetadata, Transaction};

/// Position in one ticker, valued at its last price
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Holding {
    pub name: String,
    pub loc_quantity: Decimal,
    pub shares: Decimal,
    pub last: Decimal,
    pub market_value: Decimal,
    pub market_value_pct: Decimal,
    pub metadata: TickerMetadata,
}

/// Ticker-level table plus the tickers the price join dropped
#[derive(Debug, Clone, Serialize)]
pub struct HoldingsReport {
    pub holdings: Vec<Holding>,
    pub total_market_value: Decimal,
    /// Traded tickers with no row in the price sheet
    pub unpriced: Vec<String>,
    /// Priced tickers that never appear in the transactions
    pub unheld: Vec<String>,
}

/// Per-ticker sums of shares and invested amount
#[derive(Debug, Default)]
struct TickerTotals {
    shares: Decimal,
    loc_quantity: Decimal,
}

/// Deduplicated ticker → metadata table. The first transaction of each ticker wins.
pub fn ticker_metadata(transactions: &[Transaction]) -> HashMap<String, TickerMetadata> {
    let mut metadata: HashMap<String, TickerMetadata> = HashMap::new();
    for tx in transactions.iter().filter(|tx| !tx.name.is_empty()) {
        match metadata.get(&tx.name) {
            None => {
                metadata.insert(tx.name.clone(), tx.metadata());
            }
            Some(existing) if *existing != tx.metadata() => {
                warn!(
                    "{}: conflicting metadata on {} (keeping {:?})",
                    tx.name, tx.date, existing
                );
            }
            Some(_) => {}
        }
    }
    metadata
}

/// Aggregate transactions per ticker and join them with the last prices.
/// Transactions without a ticker name belong to no holding.
pub fn calculate_holdings(transactions: &[Transaction], prices: &[PriceQuote]) -> HoldingsReport {
    let mut totals: BTreeMap<&str, TickerTotals> = BTreeMap::new();
    for tx in transactions.iter().filter(|tx| !tx.name.is_empty()) {
        let entry = totals.entry(tx.name.as_str()).or_default();
        entry.shares += tx.shares;
        entry.loc_quantity += tx.loc_quantity;
    }

    let last_prices: HashMap<&str, Decimal> =
        prices.iter().map(|p| (p.name.as_str(), p.last)).collect();
    let metadata = ticker_metadata(transactions);

    let mut holdings = Vec::with_capacity(totals.len());
    let mut unpriced = Vec::new();

    for (name, sums) in &totals {
        let Some(&last) = last_prices.get(name) else {
            unpriced.push(name.to_string());
            continue;
        };

        holdings.push(Holding {
            name: name.to_string(),
            loc_quantity: sums.loc_quantity,
            shares: sums.shares,
            last,
            market_value: sums.shares * last,
            market_value_pct: Decimal::ZERO,
            metadata: metadata.get(*name).cloned().unwrap_or_default(),
        });
    }

    let total_market_value: Decimal = holdings.iter().map(|h| h.market_value).sum();
    if !total_market_value.is_zero() {
        for holding in &mut holdings {
            holding.market_value_pct = holding.market_value / total_market_value;
        }
    }

    let unheld: Vec<String> = prices
        .iter()
        .filter(|p| !totals.contains_key(p.name.as_str()))
        .map(|p| p.name.clone())
        .sorted()
        .dedup()
        .collect();

    if !unpriced.is_empty() {
        warn!("No last price for {}, dropped from holdings", unpriced.join(", "));
    }
    if !unheld.is_empty() {
        warn!("Prices without transactions: {}", unheld.join(", "));
    }
    info!(
        "Valued {} holdings, total market value {}",
        holdings.len(),
        total_market_value
    );

    HoldingsReport {
        holdings,
        total_market_value,
        unpriced,
        unheld,
    }
}
