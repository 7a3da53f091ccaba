//! Report configuration
//!
//! Settings come from three layers, highest priority first: command-line
//! flags, an optional TOML file, built-in defaults. The defaults read
//! `Account.xlsx` (sheets "Account" and "Last") and write
//! `Accum_Invested_Money.png`.

use anyhow::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::ReportError;
use crate::importers::{SheetNames, DEFAULT_ACCOUNT_SHEET, DEFAULT_PRICES_SHEET};
use crate::reports::chart::{ChartOptions, DEFAULT_CHART_PATH};

pub const DEFAULT_WORKBOOK: &str = "Account.xlsx";
pub const DEFAULT_CONFIG_FILE: &str = "portfolio-report.toml";

/// Contents of the TOML config file. Every key is optional.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub workbook: Option<PathBuf>,
    pub account_sheet: Option<String>,
    pub prices_sheet: Option<String>,
    pub chart_path: Option<PathBuf>,
    pub font_path: Option<PathBuf>,
    pub chart_width: Option<u32>,
    pub chart_height: Option<u32>,
}

impl FileConfig {
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| ReportError::Config(e.to_string()).into())
    }

    /// Read an explicit config file (must exist), or the default one in the
    /// working directory if present.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    return Ok(Self::default());
                }
                default
            }
        };

        let text = std::fs::read_to_string(&path)
            .map_err(|e| ReportError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        info!("Loaded config from {:?}", path);
        Self::parse(&text)
    }
}

/// Overrides given on the command line
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub workbook: Option<PathBuf>,
    pub account_sheet: Option<String>,
    pub prices_sheet: Option<String>,
    pub chart_path: Option<PathBuf>,
}

/// Fully resolved settings for one run
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub workbook: PathBuf,
    pub sheets: SheetNames,
    pub chart_path: PathBuf,
    pub chart: ChartOptions,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self::resolve(FileConfig::default(), CliOverrides::default())
    }
}

impl ReportConfig {
    pub fn resolve(file: FileConfig, cli: CliOverrides) -> Self {
        let chart_defaults = ChartOptions::default();
        Self {
            workbook: cli
                .workbook
                .or(file.workbook)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_WORKBOOK)),
            sheets: SheetNames {
                account: cli
                    .account_sheet
                    .or(file.account_sheet)
                    .unwrap_or_else(|| DEFAULT_ACCOUNT_SHEET.to_string()),
                prices: cli
                    .prices_sheet
                    .or(file.prices_sheet)
                    .unwrap_or_else(|| DEFAULT_PRICES_SHEET.to_string()),
            },
            chart_path: cli
                .chart_path
                .or(file.chart_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CHART_PATH)),
            chart: ChartOptions {
                width: file.chart_width.unwrap_or(chart_defaults.width),
                height: file.chart_height.unwrap_or(chart_defaults.height),
                font_path: file.font_path,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_the_fixed_file_names() {
        let config = ReportConfig::default();
        assert_eq!(config.workbook, PathBuf::from("Account.xlsx"));
        assert_eq!(config.sheets.account, "Account");
        assert_eq!(config.sheets.prices, "Last");
        assert_eq!(config.chart_path, PathBuf::from("Accum_Invested_Money.png"));
        assert_eq!(config.chart.width, 1000);
    }

    #[test]
    fn test_cli_overrides_file_overrides_defaults() {
        let file = FileConfig::parse(
            r#"
            workbook = "from_file.xlsx"
            prices_sheet = "Prices"
            chart_width = 640
            "#,
        )
        .unwrap();
        let cli = CliOverrides {
            workbook: Some(PathBuf::from("from_cli.xlsx")),
            ..Default::default()
        };

        let config = ReportConfig::resolve(file, cli);
        assert_eq!(config.workbook, PathBuf::from("from_cli.xlsx"));
        assert_eq!(config.sheets.prices, "Prices");
        assert_eq!(config.sheets.account, "Account");
        assert_eq!(config.chart.width, 640);
        assert_eq!(config.chart.height, 1000);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = FileConfig::parse("worbook = \"typo.xlsx\"").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ReportError>(),
            Some(ReportError::Config(_))
        ));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.toml");
        std::fs::write(&path, "account_sheet = \"Trades\"\n").unwrap();

        let file = FileConfig::load(Some(&path)).unwrap();
        assert_eq!(file.account_sheet.as_deref(), Some("Trades"));

        let missing = FileConfig::load(Some(&dir.path().join("nope.toml")));
        assert!(missing.is_err());
    }
}
