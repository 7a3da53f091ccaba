use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::cli::{formatters, Cli, Commands, ReportArgs};
use crate::config::{CliOverrides, FileConfig, ReportConfig};
use crate::importers;
use crate::reports;

/// Route a parsed command line to its handler
pub fn dispatch(cli: Cli) -> Result<()> {
    if cli.no_color {
        colored::control::set_override(false);
    }

    let file_config = FileConfig::load(cli.config.as_deref())?;

    match cli.command {
        None => dispatch_report(file_config, &ReportArgs::default(), cli.json),
        Some(Commands::Report(args)) => dispatch_report(file_config, &args, cli.json),
        Some(Commands::Inspect {
            workbook,
            sheet,
            rows,
        }) => dispatch_inspect(file_config, workbook, sheet, rows, cli.json),
    }
}

fn dispatch_report(file_config: FileConfig, args: &ReportArgs, json_output: bool) -> Result<()> {
    let config = ReportConfig::resolve(file_config, args.overrides());
    info!("Generating portfolio report from {:?}", config.workbook);

    let workbook = importers::load_account_workbook(&config.workbook, &config.sheets)
        .with_context(|| format!("Failed to load {}", config.workbook.display()))?;

    if !args.no_chart {
        let series = reports::accumulation_series(&workbook.transactions);
        reports::render_accumulation_chart(&config.chart_path, &series, &config.chart)
            .with_context(|| format!("Failed to write {}", config.chart_path.display()))?;
    }

    let report = reports::build_report(&workbook)?;

    if let Err(reason) = &report.returns.annualized {
        warn!("Annualized return undefined: {}", reason);
    }

    if json_output {
        println!("{}", formatters::format_report_json(&report));
    } else {
        print!("{}", formatters::format_report(&report));
        if !args.no_chart {
            println!(
                "\n{} Chart saved to {}",
                "✓".green().bold(),
                config.chart_path.display()
            );
        }
    }

    Ok(())
}

fn dispatch_inspect(
    file_config: FileConfig,
    workbook: Option<PathBuf>,
    sheet: Option<String>,
    rows: usize,
    json_output: bool,
) -> Result<()> {
    let config = ReportConfig::resolve(
        file_config,
        CliOverrides {
            workbook,
            ..Default::default()
        },
    );
    let sheet = sheet.unwrap_or(config.sheets.account);

    let inspection = importers::inspect_workbook(&config.workbook, &sheet, rows)
        .with_context(|| format!("Failed to inspect {}", config.workbook.display()))?;

    if json_output {
        println!("{}", formatters::format_inspection_json(&inspection));
    } else {
        println!(
            "{} Inspecting file: {}",
            "📊".cyan().bold(),
            config.workbook.display().to_string().green()
        );
        print!("{}", formatters::format_inspection(&inspection));
    }

    Ok(())
}
