use anyhow::Result;
use rust_decimal::{Decimal, MathematicalOps};
use serde::Serialize;

use crate::error::ReportError;
use crate::reports::holdings::HoldingsReport;
use crate::reports::periods::{total_invested, YearTotal};

/// Simple and annualized return of the whole portfolio
#[derive(Debug, Clone, Serialize)]
pub struct ReturnSummary {
    pub total_invested: Decimal,
    pub total_market_value: Decimal,
    pub simple: Decimal,
    pub first_year: Option<i32>,
    pub last_year: Option<i32>,
    /// `Err` holds the reason the annualized return is undefined
    #[serde(serialize_with = "serialize_annualized")]
    pub annualized: std::result::Result<Decimal, String>,
}

fn serialize_annualized<S>(
    value: &std::result::Result<Decimal, String>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match value {
        Ok(v) => serializer.serialize_some(v),
        Err(_) => serializer.serialize_none(),
    }
}

/// Market value over invested amount, minus one
pub fn simple_return(total_market_value: Decimal, total_invested: Decimal) -> Result<Decimal> {
    if total_invested.is_zero() {
        return Err(ReportError::NoInvestedCapital.into());
    }
    Ok(total_market_value / total_invested - Decimal::ONE)
}

/// Compound `simple` down to a one-year rate over `last_year - first_year` years
pub fn annualized_return(simple: Decimal, first_year: i32, last_year: i32) -> Result<Decimal> {
    let span = last_year - first_year;
    if span == 0 {
        return Err(ReportError::DegenerateYearSpan(first_year).into());
    }

    let base = Decimal::ONE + simple;
    // A total loss (or worse) has no real root; cap at -100%
    if base <= Decimal::ZERO {
        return Ok(Decimal::NEGATIVE_ONE);
    }

    let exponent = Decimal::ONE / Decimal::from(span);
    Ok(base.powd(exponent) - Decimal::ONE)
}

/// Compute both returns for a valued portfolio
pub fn calculate_returns(
    holdings: &HoldingsReport,
    years: &[YearTotal],
) -> Result<ReturnSummary> {
    let invested = total_invested(years);
    let simple = simple_return(holdings.total_market_value, invested)?;

    let first_year = years.first().map(|y| y.year);
    let last_year = years.last().map(|y| y.year);

    let annualized = match (first_year, last_year) {
        (Some(first), Some(last)) => {
            annualized_return(simple, first, last).map_err(|e| e.to_string())
        }
        _ => Err("no transactions".to_string()),
    };

    Ok(ReturnSummary {
        total_invested: invested,
        total_market_value: holdings.total_market_value,
        simple,
        first_year,
        last_year,
        annualized,
    })
}
