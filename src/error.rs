//! Error handling for the portfolio report
//!
//! Defines the typed failures a report run can hit and establishes a unified
//! Result type using anyhow for context chaining and error propagation.

use std::path::PathBuf;
use thiserror::Error;

/// Core error types for report generation
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("workbook not found: {}", .0.display())]
    WorkbookNotFound(PathBuf),

    #[error("workbook error: {0}")]
    Workbook(String),

    #[error("sheet '{sheet}' not found (available: {available})")]
    SheetNotFound { sheet: String, available: String },

    #[error("sheet '{sheet}' is missing required column '{column}'")]
    MissingColumn { sheet: String, column: String },

    #[error("sheet '{sheet}', row {row}, column '{column}': {reason}")]
    InvalidCell {
        sheet: String,
        row: usize,
        column: String,
        reason: String,
    },

    #[error("total invested is zero, return is undefined")]
    NoInvestedCapital,

    #[error("all transactions fall in {0}, annualized return needs at least two distinct years")]
    DegenerateYearSpan(i32),

    #[error("chart error: {0}")]
    Chart(String),

    #[error("config error: {0}")]
    Config(String),
}

/// Result type alias for report operations
pub type Result<T> = anyhow::Result<T>;
