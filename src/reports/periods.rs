use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::Transaction;

/// Amount invested in one calendar month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodTotal {
    pub year: i32,
    pub month: u32,
    pub loc_quantity: Decimal,
}

/// Amount invested in one year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearTotal {
    pub year: i32,
    pub loc_quantity: Decimal,
}

/// Sum invested amounts per (year, month), oldest first
pub fn invested_by_month(transactions: &[Transaction]) -> Vec<PeriodTotal> {
    let mut totals: BTreeMap<(i32, u32), Decimal> = BTreeMap::new();
    for tx in transactions {
        *totals.entry((tx.year, tx.month)).or_default() += tx.loc_quantity;
    }

    totals
        .into_iter()
        .map(|((year, month), loc_quantity)| PeriodTotal {
            year,
            month,
            loc_quantity,
        })
        .collect()
}

/// Sum invested amounts per year, oldest first
pub fn invested_by_year(transactions: &[Transaction]) -> Vec<YearTotal> {
    let mut totals: BTreeMap<i32, Decimal> = BTreeMap::new();
    for tx in transactions {
        *totals.entry(tx.year).or_default() += tx.loc_quantity;
    }

    totals
        .into_iter()
        .map(|(year, loc_quantity)| YearTotal { year, loc_quantity })
        .collect()
}

/// First and last year with transactions
pub fn year_span(transactions: &[Transaction]) -> Option<(i32, i32)> {
    let min = transactions.iter().map(|tx| tx.year).min()?;
    let max = transactions.iter().map(|tx| tx.year).max()?;
    Some((min, max))
}

/// Total invested across all years
pub fn total_invested(years: &[YearTotal]) -> Decimal {
    years.iter().map(|y| y.loc_quantity).sum()
}
