//! Output formatting module for CLI display
//!
//! This module handles all terminal output formatting, separating
//! the concerns of data calculation from presentation.

use colored::Colorize;
use rust_decimal::Decimal;
use tabled::{
    builder::Builder,
    settings::{object::Columns, Alignment, Style},
    Table, Tabled,
};

use crate::importers::WorkbookInspection;
use crate::reports::{
    Breakdown, HoldingsReport, PeriodTotal, PortfolioReport, ReturnSummary, YearTotal,
};
use crate::utils::{format_amount, format_pct, format_return_pct, format_shares};

fn section(title: &str) -> String {
    format!("\n{} {}\n", "▸".cyan().bold(), title.bold())
}

/// Invested money per month
pub fn format_monthly_table(periods: &[PeriodTotal]) -> String {
    #[derive(Tabled)]
    struct MonthRow {
        #[tabled(rename = "m")]
        month: u32,
        #[tabled(rename = "y")]
        year: i32,
        #[tabled(rename = "loc_quantity")]
        invested: String,
    }

    let rows: Vec<MonthRow> = periods
        .iter()
        .map(|p| MonthRow {
            month: p.month,
            year: p.year,
            invested: format_amount(p.loc_quantity),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    table.modify(Columns::new(2..), Alignment::right());

    format!("{}{}\n", section("Invested by month"), table)
}

/// Invested money per year
pub fn format_yearly_table(years: &[YearTotal]) -> String {
    #[derive(Tabled)]
    struct YearRow {
        #[tabled(rename = "y")]
        year: i32,
        #[tabled(rename = "loc_quantity")]
        invested: String,
    }

    let rows: Vec<YearRow> = years
        .iter()
        .map(|y| YearRow {
            year: y.year,
            invested: format_amount(y.loc_quantity),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    table.modify(Columns::new(1..), Alignment::right());

    format!("{}{}\n", section("Invested by year"), table)
}

/// Ticker-level table, with a note on tickers the price join dropped
pub fn format_holdings_table(report: &HoldingsReport) -> String {
    #[derive(Tabled)]
    struct HoldingRow {
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "loc_quantity")]
        invested: String,
        #[tabled(rename = "shares")]
        shares: String,
        #[tabled(rename = "Last")]
        last: String,
        #[tabled(rename = "Market_Value")]
        market_value: String,
        #[tabled(rename = "Market_Value_%")]
        market_value_pct: String,
        #[tabled(rename = "Sector")]
        sector: String,
        #[tabled(rename = "Country")]
        country: String,
        #[tabled(rename = "Category1")]
        category1: String,
        #[tabled(rename = "Category2")]
        category2: String,
        #[tabled(rename = "Category3")]
        category3: String,
    }

    let rows: Vec<HoldingRow> = report
        .holdings
        .iter()
        .map(|h| HoldingRow {
            name: h.name.clone(),
            invested: format_amount(h.loc_quantity),
            shares: format_shares(h.shares),
            last: format_amount(h.last),
            market_value: format_amount(h.market_value),
            market_value_pct: format_pct(h.market_value_pct),
            sector: h.metadata.sector.clone(),
            country: h.metadata.country.clone(),
            category1: h.metadata.category1.clone(),
            category2: h.metadata.category2.clone(),
            category3: h.metadata.category3.clone(),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    table.modify(Columns::new(1..6), Alignment::right());

    let mut output = format!("{}{}\n", section("By ticker"), table);
    output.push_str(&format!(
        "{:<20} {}\n",
        "Total Market Value:".bold(),
        format_amount(report.total_market_value)
    ));

    if !report.unpriced.is_empty() {
        output.push_str(&format!(
            "{} No last price, not valued: {}\n",
            "⚠".yellow().bold(),
            report.unpriced.join(", ")
        ));
    }
    if !report.unheld.is_empty() {
        output.push_str(&format!(
            "{} Priced but never traded: {}\n",
            "ℹ".blue().bold(),
            report.unheld.join(", ")
        ));
    }

    output
}

/// Market value per key of one dimension
pub fn format_breakdown_table(breakdown: &Breakdown) -> String {
    // Key column is headed by the sheet column it comes from
    let mut builder = Builder::default();
    builder.push_record([
        breakdown.dimension.column(),
        "Market_Value",
        "Market_Value_%",
    ]);
    for row in &breakdown.rows {
        builder.push_record([
            row.key.clone(),
            format_amount(row.market_value),
            format_pct(row.market_value_pct),
        ]);
    }

    let mut table = builder.build();
    table.with(Style::modern());
    table.modify(Columns::new(1..), Alignment::right());

    let title = format!("By {}", breakdown.dimension.to_string().to_lowercase());
    format!("{}{}\n", section(&title), table)
}

fn colored_return(value: Decimal) -> String {
    let text = format_return_pct(value);
    if value >= Decimal::ZERO {
        text.green().to_string()
    } else {
        text.red().to_string()
    }
}

/// The two return statements
pub fn format_returns(returns: &ReturnSummary) -> String {
    let mut output = section("Returns");
    output.push_str(&format!(
        "The simple return is {}\n",
        colored_return(returns.simple)
    ));
    match &returns.annualized {
        Ok(value) => output.push_str(&format!(
            "The annualized return is {}\n",
            colored_return(*value)
        )),
        Err(reason) => output.push_str(&format!(
            "The annualized return is {} ({})\n",
            "n/a".yellow(),
            reason
        )),
    }
    output
}

/// Whole report in display order
pub fn format_report(report: &PortfolioReport) -> String {
    let mut output = String::new();
    output.push_str(&format_monthly_table(&report.monthly));
    output.push_str(&format_yearly_table(&report.yearly));
    output.push_str(&format_holdings_table(&report.holdings));
    for breakdown in &report.breakdowns {
        output.push_str(&format_breakdown_table(breakdown));
    }
    output.push_str(&format_returns(&report.returns));
    output
}

/// Whole report as JSON
pub fn format_report_json(report: &PortfolioReport) -> String {
    serde_json::to_string_pretty(report)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

/// Workbook structure for the inspect command
pub fn format_inspection(inspection: &WorkbookInspection) -> String {
    let mut output = section("Sheets");
    for sheet in &inspection.sheets {
        output.push_str(&format!(
            "  • {} ({} rows × {} columns)\n",
            sheet.name.yellow(),
            sheet.rows,
            sheet.columns
        ));
    }

    output.push_str(&section(&format!(
        "Columns of '{}' ({} data rows)",
        inspection.sheet, inspection.data_rows
    )));

    #[derive(Tabled)]
    struct ColumnLine {
        #[tabled(rename = "#")]
        index: usize,
        #[tabled(rename = "Column")]
        header: String,
        #[tabled(rename = "Non-empty")]
        non_empty: usize,
        #[tabled(rename = "Type")]
        kind: &'static str,
    }

    let columns: Vec<ColumnLine> = inspection
        .columns
        .iter()
        .enumerate()
        .map(|(index, c)| ColumnLine {
            index,
            header: c.header.clone(),
            non_empty: c.non_empty,
            kind: c.kind.as_str(),
        })
        .collect();
    let mut table = Table::new(&columns);
    table.with(Style::modern());
    output.push_str(&table.to_string());
    output.push('\n');

    if !inspection.head.is_empty() {
        output.push_str(&section(&format!("First {} rows", inspection.head.len())));
        let mut builder = Builder::default();
        builder.push_record(inspection.columns.iter().map(|c| c.header.clone()));
        for row in &inspection.head {
            builder.push_record(row.iter().cloned());
        }
        let mut head = builder.build();
        head.with(Style::modern());
        output.push_str(&head.to_string());
        output.push('\n');
    }

    output
}

/// Inspection as JSON
pub fn format_inspection_json(inspection: &WorkbookInspection) -> String {
    serde_json::to_string_pretty(inspection)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::test_support::{price, tx};
    use crate::reports::{
        breakdown, calculate_holdings, calculate_returns, invested_by_year, Dimension,
    };
    use rust_decimal_macros::dec;

    #[test]
    fn test_returns_lines() {
        let txs = vec![
            tx("2020-03-01", "QQQ", dec!(2), dec!(600)),
            tx("2022-03-01", "QQQ", dec!(2), dec!(400)),
        ];
        let holdings = calculate_holdings(&txs, &[price("QQQ", dec!(275))]);
        let returns = calculate_returns(&holdings, &invested_by_year(&txs)).unwrap();

        let text = format_returns(&returns);
        assert!(text.contains("The simple return is"));
        assert!(text.contains("10.00%"));
        assert!(text.contains("The annualized return is"));
        assert!(text.contains("4.88%"));
    }

    #[test]
    fn test_single_year_annualized_is_not_available() {
        let txs = vec![tx("2022-03-01", "QQQ", dec!(2), dec!(500))];
        let holdings = calculate_holdings(&txs, &[price("QQQ", dec!(300))]);
        let returns = calculate_returns(&holdings, &invested_by_year(&txs)).unwrap();

        let text = format_returns(&returns);
        assert!(text.contains("20.00%"));
        assert!(text.contains("n/a"));
    }

    #[test]
    fn test_holdings_table_lists_unpriced_tickers() {
        let txs = vec![
            tx("2021-01-05", "QQQ", dec!(1), dec!(300)),
            tx("2021-01-05", "GONE", dec!(1), dec!(10)),
        ];
        let report = calculate_holdings(&txs, &[price("QQQ", dec!(310))]);
        let text = format_holdings_table(&report);
        assert!(text.contains("Market_Value_%"));
        assert!(text.contains("QQQ"));
        assert!(text.contains("100.00%"));
        assert!(text.contains("GONE"));
    }

    #[test]
    fn test_breakdown_table_uses_sheet_column_header() {
        let txs = vec![tx("2021-01-05", "QQQ", dec!(1), dec!(300))];
        let report = calculate_holdings(&txs, &[price("QQQ", dec!(310))]);
        let text = format_breakdown_table(&breakdown(&report, Dimension::Instrument));
        assert!(text.contains("Category1"));
        assert!(text.contains("ETF"));
        assert!(text.contains("310.00"));
    }
}
