//! Accumulated invested money chart
//!
//! Draws the running total of invested money against transaction date and
//! writes it as PNG, or as SVG when the output path ends in `.svg`.
//!
//! Text (title, axis descriptions, tick labels) needs a TTF font. The
//! configured font is tried first, then a few common system locations. When
//! none can be loaded the line is still drawn, without any text.

use anyhow::Result;
use chrono::{Duration, NaiveDate};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::{register_font, FontStyle, FontTransform};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{info, warn};

use crate::error::ReportError;
use crate::models::Transaction;

pub const DEFAULT_CHART_PATH: &str = "Accum_Invested_Money.png";
pub const CHART_TITLE: &str = "Accumulative Money Invested";

const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static FONT_READY: OnceLock<bool> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct ChartOptions {
    pub width: u32,
    pub height: u32,
    pub font_path: Option<PathBuf>,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 1000,
            font_path: None,
        }
    }
}

/// (date, accumulated invested) points, in sheet order
pub fn accumulation_series(transactions: &[Transaction]) -> Vec<(NaiveDate, Decimal)> {
    transactions
        .iter()
        .map(|tx| (tx.date, tx.accumulated))
        .collect()
}

/// Render the accumulated invested money chart to `path`
pub fn render_accumulation_chart(
    path: &Path,
    series: &[(NaiveDate, Decimal)],
    options: &ChartOptions,
) -> Result<()> {
    if series.is_empty() {
        return Err(ReportError::Chart("no transactions to plot".to_string()).into());
    }

    let with_text = *FONT_READY.get_or_init(|| register_sans_serif(options.font_path.as_deref()));
    let size = (options.width, options.height);

    if is_svg(path) {
        draw(SVGBackend::new(path, size).into_drawing_area(), series, with_text)?;
    } else {
        draw(BitMapBackend::new(path, size).into_drawing_area(), series, with_text)?;
    }

    info!("Chart written to {:?}", path);
    Ok(())
}

fn is_svg(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("svg"))
        .unwrap_or(false)
}

fn register_sans_serif(configured: Option<&Path>) -> bool {
    if let Some(path) = configured {
        if !path.exists() {
            warn!("Configured font {:?} does not exist", path);
        }
    }

    let candidates = configured
        .map(Path::to_path_buf)
        .into_iter()
        .chain(FONT_CANDIDATES.iter().map(PathBuf::from));

    for candidate in candidates {
        let Ok(bytes) = std::fs::read(&candidate) else {
            continue;
        };
        // plotters keeps registered fonts for the life of the process
        let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
        match register_font("sans-serif", FontStyle::Normal, bytes) {
            Ok(()) => {
                info!("Using chart font {:?}", candidate);
                return true;
            }
            Err(_) => warn!("{:?} is not a usable TTF font", candidate),
        }
    }

    warn!("No TTF font found, drawing chart without text");
    false
}

fn chart_error<E: std::fmt::Display>(err: E) -> anyhow::Error {
    ReportError::Chart(err.to_string()).into()
}

fn draw<DB>(
    root: DrawingArea<DB, Shift>,
    series: &[(NaiveDate, Decimal)],
    with_text: bool,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let Some(start) = series.iter().map(|(date, _)| *date).min() else {
        return Err(ReportError::Chart("no transactions to plot".to_string()).into());
    };

    // x is days since the first transaction
    let points: Vec<(f64, f64)> = series
        .iter()
        .map(|(date, value)| {
            (
                (*date - start).num_days() as f64,
                value.to_f64().unwrap_or(0.0),
            )
        })
        .collect();

    let x_max = points.iter().map(|(x, _)| *x).fold(1.0, f64::max);
    let y_min = points.iter().map(|(_, y)| *y).fold(0.0, f64::min);
    let mut y_max = points.iter().map(|(_, y)| *y).fold(0.0, f64::max) * 1.05;
    if y_max <= y_min {
        y_max = y_min + 1.0;
    }

    root.fill(&WHITE).map_err(chart_error)?;

    let mut builder = ChartBuilder::on(&root);
    builder.margin(20);
    if with_text {
        builder
            .caption(CHART_TITLE, ("sans-serif", 28))
            .x_label_area_size(110)
            .y_label_area_size(90);
    }

    let mut chart = builder
        .build_cartesian_2d(0f64..x_max, y_min..y_max)
        .map_err(chart_error)?;

    if with_text {
        let date_label = |offset: &f64| {
            (start + Duration::days(offset.round() as i64))
                .format("%Y-%m-%d")
                .to_string()
        };
        let amount_label = |value: &f64| format!("{:.0}", value);

        chart
            .configure_mesh()
            .x_desc("Date")
            .y_desc("Money Invested")
            .x_labels(12)
            .x_label_formatter(&date_label)
            .y_label_formatter(&amount_label)
            .x_label_style(("sans-serif", 14).into_font().transform(FontTransform::Rotate90))
            .draw()
            .map_err(chart_error)?;
    }

    chart
        .draw_series(LineSeries::new(points, BLUE.stroke_width(2)))
        .map_err(chart_error)?;

    root.present().map_err(chart_error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::test_support::tx;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn series() -> Vec<(NaiveDate, Decimal)> {
        let mut txs = vec![
            tx("2021-01-05", "QQQ", dec!(1), dec!(300)),
            tx("2021-06-05", "QQQ", dec!(1), dec!(320)),
            tx("2022-02-01", "IWDA", dec!(5), dec!(400)),
        ];
        let mut running = Decimal::ZERO;
        for t in &mut txs {
            running += t.loc_quantity;
            t.accumulated = running;
        }
        accumulation_series(&txs)
    }

    #[test]
    fn test_accumulation_series_keeps_sheet_order() {
        let points = series();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].1, dec!(300));
        assert_eq!(points[2].1, dec!(1020));
        assert_eq!(points[2].0, NaiveDate::from_ymd_opt(2022, 2, 1).unwrap());
    }

    #[test]
    fn test_empty_series_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = render_accumulation_chart(
            &dir.path().join("chart.png"),
            &[],
            &ChartOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ReportError>(),
            Some(ReportError::Chart(_))
        ));
    }

    #[test]
    fn test_draw_png_and_svg_without_text() {
        let dir = TempDir::new().unwrap();
        let points = series();

        let png = dir.path().join("chart.png");
        draw(
            BitMapBackend::new(&png, (320, 240)).into_drawing_area(),
            &points,
            false,
        )
        .unwrap();
        assert!(std::fs::metadata(&png).unwrap().len() > 0);

        let svg = dir.path().join("chart.svg");
        draw(
            SVGBackend::new(&svg, (320, 240)).into_drawing_area(),
            &points,
            false,
        )
        .unwrap();
        let content = std::fs::read_to_string(&svg).unwrap();
        assert!(content.contains("<svg"));
    }

    #[test]
    fn test_svg_detection() {
        assert!(is_svg(Path::new("out/Chart.SVG")));
        assert!(!is_svg(Path::new("Accum_Invested_Money.png")));
        assert!(!is_svg(Path::new("chart")));
    }
}
