// Reports module - aggregations, valuations, returns and the chart

pub mod breakdown;
pub mod chart;
pub mod holdings;
pub mod periods;
pub mod returns;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::importers::AccountWorkbook;

pub use breakdown::{all_breakdowns, breakdown, Breakdown, BreakdownRow, Dimension};
pub use chart::{accumulation_series, render_accumulation_chart, ChartOptions};
pub use holdings::{calculate_holdings, Holding, HoldingsReport};
pub use periods::{invested_by_month, invested_by_year, year_span, PeriodTotal, YearTotal};
pub use returns::{annualized_return, calculate_returns, simple_return, ReturnSummary};

/// Every table the report prints, in display order
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioReport {
    pub monthly: Vec<PeriodTotal>,
    pub yearly: Vec<YearTotal>,
    pub holdings: HoldingsReport,
    pub breakdowns: Vec<Breakdown>,
    pub returns: ReturnSummary,
}

/// Run every aggregation over a loaded workbook
pub fn build_report(workbook: &AccountWorkbook) -> Result<PortfolioReport> {
    let transactions = &workbook.transactions;

    let monthly = invested_by_month(transactions);
    let yearly = invested_by_year(transactions);
    info!("Aggregated {} months over {} years", monthly.len(), yearly.len());
    if let Some((first, last)) = year_span(transactions) {
        info!("Transactions span {}..={}", first, last);
    }

    let holdings = calculate_holdings(transactions, &workbook.prices);
    let breakdowns = all_breakdowns(&holdings);
    let returns = calculate_returns(&holdings, &yearly).context("Failed to compute returns")?;

    Ok(PortfolioReport {
        monthly,
        yearly,
        holdings,
        breakdowns,
        returns,
    })
}


#[cfg(test)]
mod tests {
    use super::test_support::{price, tx};
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_build_report_runs_every_stage() {
        let workbook = AccountWorkbook {
            transactions: vec![
                tx("2020-01-10", "QQQ", dec!(2), dec!(500)),
                tx("2021-05-10", "IWDA", dec!(5), dec!(300)),
                tx("2022-05-10", "QQQ", dec!(1), dec!(200)),
            ],
            prices: vec![price("QQQ", dec!(300)), price("IWDA", dec!(40))],
        };

        let report = build_report(&workbook).unwrap();
        assert_eq!(report.monthly.len(), 3);
        assert_eq!(report.yearly.len(), 3);
        assert_eq!(report.holdings.holdings.len(), 2);
        assert_eq!(report.breakdowns.len(), 5);
        assert_eq!(report.returns.total_invested, dec!(1000));
        assert_eq!(report.returns.total_market_value, dec!(1100));
        assert_eq!(report.returns.simple, dec!(0.1));
    }

    #[test]
    fn test_nameless_rows_count_as_invested_but_not_held() {
        let workbook = AccountWorkbook {
            transactions: vec![
                tx("2020-03-10", "QQQ", dec!(2), dec!(500)),
                tx("2020-03-10", "", dec!(0), dec!(100)),
                tx("2022-05-10", "QQQ", dec!(1), dec!(500)),
            ],
            prices: vec![price("QQQ", dec!(400))],
        };

        let report = build_report(&workbook).unwrap();
        assert_eq!(report.yearly[0].loc_quantity, dec!(600));
        assert_eq!(periods::total_invested(&report.yearly), dec!(1100));
        assert_eq!(report.holdings.holdings.len(), 1);
        assert_eq!(report.holdings.holdings[0].loc_quantity, dec!(1000));
        // 1200 market value over 1100 invested
        assert_eq!(report.returns.total_invested, dec!(1100));
        assert_eq!(report.returns.simple.round_dp(6), dec!(0.090909));
    }

    #[test]
    fn test_build_report_without_transactions_fails() {
        let workbook = AccountWorkbook {
            transactions: vec![],
            prices: vec![price("QQQ", dec!(300))],
        };
        assert!(build_report(&workbook).is_err());
    }
}
