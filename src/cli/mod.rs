use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::CliOverrides;

pub mod formatters;

#[derive(Parser)]
#[command(name = "portfolio-report")]
#[command(
    version,
    about = "Descriptive report over an investment-account spreadsheet"
)]
#[command(
    long_about = "Reads the transaction sheet and the last-price sheet of an investment-account workbook, then prints invested money per month and year, portfolio breakdowns by ticker, sector, country, instrument, exchange and asset allocation, simple and annualized returns, and draws the accumulated invested money chart."
)]
pub struct Cli {
    /// TOML config file (default: ./portfolio-report.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the full portfolio report and draw the chart (default)
    Report(ReportArgs),

    /// Inspect workbook structure: sheets, first rows, column info
    Inspect {
        /// Path to the workbook
        workbook: Option<PathBuf>,

        /// Sheet to preview (default: the transaction sheet)
        #[arg(long)]
        sheet: Option<String>,

        /// Number of rows to preview
        #[arg(long, default_value_t = 5)]
        rows: usize,
    },
}

#[derive(Args, Debug, Default, Clone)]
pub struct ReportArgs {
    /// Path to the workbook (default: Account.xlsx)
    pub workbook: Option<PathBuf>,

    /// Name of the transaction sheet (default: Account)
    #[arg(long)]
    pub account_sheet: Option<String>,

    /// Name of the last-price sheet (default: Last)
    #[arg(long)]
    pub prices_sheet: Option<String>,

    /// Chart output file, .png or .svg (default: Accum_Invested_Money.png)
    #[arg(long)]
    pub chart: Option<PathBuf>,

    /// Skip drawing the chart
    #[arg(long)]
    pub no_chart: bool,
}

impl ReportArgs {
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            workbook: self.workbook.clone(),
            account_sheet: self.account_sheet.clone(),
            prices_sheet: self.prices_sheet.clone(),
            chart_path: self.chart.clone(),
        }
    }
}
