use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

use crate::models::TickerMetadata;
use crate::reports::holdings::HoldingsReport;

/// Descriptive attribute a portfolio can be broken down by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Dimension {
    Sector,
    Country,
    Instrument,
    Exchange,
    AssetAllocation,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::Sector,
        Dimension::Country,
        Dimension::Instrument,
        Dimension::Exchange,
        Dimension::AssetAllocation,
    ];

    /// Column of the account sheet this dimension comes from
    pub fn column(&self) -> &'static str {
        match self {
            Dimension::Sector => "Sector",
            Dimension::Country => "Country",
            Dimension::Instrument => "Category1",
            Dimension::Exchange => "Category2",
            Dimension::AssetAllocation => "Category3",
        }
    }

    pub fn key<'a>(&self, metadata: &'a TickerMetadata) -> &'a str {
        match self {
            Dimension::Sector => &metadata.sector,
            Dimension::Country => &metadata.country,
            Dimension::Instrument => &metadata.category1,
            Dimension::Exchange => &metadata.category2,
            Dimension::AssetAllocation => &metadata.category3,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Dimension::Sector => "Sector",
            Dimension::Country => "Country",
            Dimension::Instrument => "Instrument",
            Dimension::Exchange => "Exchange",
            Dimension::AssetAllocation => "Asset Allocation",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownRow {
    pub key: String,
    pub market_value: Decimal,
    pub market_value_pct: Decimal,
}

/// Market value grouped by one dimension
#[derive(Debug, Clone, Serialize)]
pub struct Breakdown {
    pub dimension: Dimension,
    pub rows: Vec<BreakdownRow>,
}

impl Breakdown {
    pub fn total(&self) -> Decimal {
        self.rows.iter().map(|r| r.market_value).sum()
    }
}

/// Group holdings by `dimension`, summing market value.
///
/// Holdings with a blank tag are left out, and percentages are relative to
/// the breakdown's own total, so they sum to one whenever it is non-zero.
pub fn breakdown(report: &HoldingsReport, dimension: Dimension) -> Breakdown {
    let mut totals: BTreeMap<&str, Decimal> = BTreeMap::new();
    for holding in &report.holdings {
        let key = dimension.key(&holding.metadata);
        if key.is_empty() {
            debug!("{} has no {}, left out of breakdown", holding.name, dimension.column());
            continue;
        }
        *totals.entry(key).or_default() += holding.market_value;
    }

    let total: Decimal = totals.values().copied().sum();
    let rows = totals
        .into_iter()
        .map(|(key, market_value)| BreakdownRow {
            key: key.to_string(),
            market_value,
            market_value_pct: if total.is_zero() {
                Decimal::ZERO
            } else {
                market_value / total
            },
        })
        .collect();

    Breakdown { dimension, rows }
}

/// All five breakdowns, in display order
pub fn all_breakdowns(report: &HoldingsReport) -> Vec<Breakdown> {
    Dimension::ALL
        .iter()
        .map(|dimension| breakdown(report, *dimension))
        .collect()
}
