//! Portfolio Report - descriptive analysis of an investment-account spreadsheet
//!
//! This library loads transactions and last prices from a workbook and
//! derives invested-money totals, portfolio breakdowns, returns and the
//! accumulated invested money chart.

pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod importers;
pub mod models;
pub mod reports;
pub mod utils;
