//! Account workbook importer
//!
//! Reads the two sheets the report is built from:
//! - the transaction sheet (default "Account"): one row per investment event
//! - the price sheet (default "Last"): latest price per ticker
//!
//! Columns are located by header name, so their order in the sheet does not
//! matter. `m`, `y` and `Acum_loc_quantity` are optional and derived from the
//! other columns when absent.

use anyhow::Result;
use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::error::ReportError;
use crate::models::{PriceQuote, Transaction};

pub const DEFAULT_ACCOUNT_SHEET: &str = "Account";
pub const DEFAULT_PRICES_SHEET: &str = "Last";

/// Names of the sheets to read from the workbook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetNames {
    pub account: String,
    pub prices: String,
}

impl Default for SheetNames {
    fn default() -> Self {
        Self {
            account: DEFAULT_ACCOUNT_SHEET.to_string(),
            prices: DEFAULT_PRICES_SHEET.to_string(),
        }
    }
}

/// Everything loaded from the workbook
#[derive(Debug, Clone)]
pub struct AccountWorkbook {
    pub transactions: Vec<Transaction>,
    pub prices: Vec<PriceQuote>,
}

/// Load transactions and prices from an account workbook
pub fn load_account_workbook<P: AsRef<Path>>(
    path: P,
    sheets: &SheetNames,
) -> Result<AccountWorkbook> {
    let path = path.as_ref();
    info!("Loading account workbook: {:?}", path);

    let mut workbook = open_xlsx(path)?;

    let account_range = read_sheet(&mut workbook, &sheets.account)?;
    let transactions = parse_transactions(
        &sheets.account,
        first_row(&account_range),
        account_range.rows(),
    )?;

    let prices_range = read_sheet(&mut workbook, &sheets.prices)?;
    let prices = parse_prices(&sheets.prices, first_row(&prices_range), prices_range.rows())?;

    info!(
        "Loaded {} transactions and {} prices",
        transactions.len(),
        prices.len()
    );

    Ok(AccountWorkbook {
        transactions,
        prices,
    })
}

/// List the sheet names of a workbook
pub fn list_sheets<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let workbook = open_xlsx(path.as_ref())?;
    Ok(workbook.sheet_names())
}

pub(crate) fn open_xlsx(path: &Path) -> Result<Xlsx<BufReader<File>>> {
    if !path.exists() {
        return Err(ReportError::WorkbookNotFound(path.to_path_buf()).into());
    }

    let workbook = open_workbook::<Xlsx<_>, _>(path)
        .map_err(|e| ReportError::Workbook(e.to_string()))?;
    Ok(workbook)
}

pub(crate) fn read_sheet(workbook: &mut Xlsx<BufReader<File>>, sheet: &str) -> Result<Range<Data>> {
    let names = workbook.sheet_names();
    if !names.iter().any(|name| name == sheet) {
        return Err(ReportError::SheetNotFound {
            sheet: sheet.to_string(),
            available: names.join(", "),
        }
        .into());
    }

    let range = workbook.worksheet_range(sheet).map_err(|e| {
        ReportError::Workbook(format!("failed to read sheet '{}': {}", sheet, e))
    })?;
    Ok(range)
}

/// 0-based sheet row of the first row in `range`. Calamine ranges start at
/// the first used cell, not at A1.
pub(crate) fn first_row(range: &Range<Data>) -> usize {
    range.start().map(|(row, _)| row as usize).unwrap_or(0)
}

/// Header name → column index for one sheet
#[derive(Debug)]
struct ColumnIndex {
    sheet: String,
    columns: HashMap<String, usize>,
}

impl ColumnIndex {
    fn from_header(sheet: &str, header: &[Data]) -> Self {
        let mut columns = HashMap::new();
        for (idx, cell) in header.iter().enumerate() {
            let name = cell.to_string().trim().to_lowercase();
            if !name.is_empty() {
                // First occurrence wins on duplicated headers
                columns.entry(name).or_insert(idx);
            }
        }
        Self {
            sheet: sheet.to_string(),
            columns,
        }
    }

    fn require(&self, column: &str) -> Result<usize, ReportError> {
        self.optional(column).ok_or_else(|| ReportError::MissingColumn {
            sheet: self.sheet.clone(),
            column: column.to_string(),
        })
    }

    fn optional(&self, column: &str) -> Option<usize> {
        self.columns.get(&column.to_lowercase()).copied()
    }
}

/// Cell accessor for one data row, producing errors that point at the cell
struct RowReader<'a> {
    sheet: &'a str,
    row_number: usize, // 1-indexed, as shown by spreadsheet software
    cells: &'a [Data],
}

impl<'a> RowReader<'a> {
    fn cell(&self, idx: usize) -> &'a Data {
        self.cells.get(idx).unwrap_or(&Data::Empty)
    }

    fn invalid(&self, column: &str, reason: impl Into<String>) -> ReportError {
        ReportError::InvalidCell {
            sheet: self.sheet.to_string(),
            row: self.row_number,
            column: column.to_string(),
            reason: reason.into(),
        }
    }

    fn text(&self, idx: usize) -> String {
        match self.cell(idx) {
            Data::String(s) => s.trim().to_string(),
            Data::Empty => String::new(),
            other => other.to_string().trim().to_string(),
        }
    }

    fn decimal(&self, idx: usize, column: &str) -> Result<Option<Decimal>, ReportError> {
        parse_decimal(self.cell(idx)).map_err(|reason| self.invalid(column, reason))
    }

    fn date(&self, idx: usize, column: &str) -> Result<NaiveDate, ReportError> {
        parse_date(self.cell(idx)).map_err(|reason| self.invalid(column, reason))
    }

    fn integer(&self, idx: usize, column: &str) -> Result<Option<i64>, ReportError> {
        match self.decimal(idx, column)? {
            None => Ok(None),
            Some(value) if value.fract().is_zero() => value
                .to_i64()
                .map(Some)
                .ok_or_else(|| self.invalid(column, format!("{} is out of range", value))),
            Some(value) => Err(self.invalid(column, format!("{} is not a whole number", value))),
        }
    }
}

fn is_blank(row: &[Data]) -> bool {
    row.iter().all(|cell| match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    })
}

/// Split rows into the header (first non-blank row) and the data rows after it.
/// Returns the 0-based index of the header row.
fn split_header<'a, I>(rows: I) -> Option<(usize, &'a [Data], Vec<(usize, &'a [Data])>)>
where
    I: IntoIterator<Item = &'a [Data]>,
{
    let mut iter = rows.into_iter().enumerate().skip_while(|(_, row)| is_blank(row));
    let (header_idx, header) = iter.next()?;
    let data = iter.filter(|(_, row)| !is_blank(row)).collect();
    Some((header_idx, header, data))
}

/// Parse the transaction sheet. `first_row` is the 0-based sheet row of the
/// first item in `rows`, so cell errors report the row the user sees.
///
/// Rows without a `Name` are kept: their amounts still count in the period
/// totals, they are only left out of the per-ticker tables.
pub fn parse_transactions<'a, I>(
    sheet: &str,
    first_row: usize,
    rows: I,
) -> Result<Vec<Transaction>>
where
    I: IntoIterator<Item = &'a [Data]>,
{
    let (_, header, data) = split_header(rows).ok_or_else(|| ReportError::MissingColumn {
        sheet: sheet.to_string(),
        column: "Date".to_string(),
    })?;

    let index = ColumnIndex::from_header(sheet, header);
    let date_col = index.require("Date")?;
    let name_col = index.require("Name")?;
    let sector_col = index.require("Sector")?;
    let country_col = index.require("Country")?;
    let cat1_col = index.require("Category1")?;
    let cat2_col = index.require("Category2")?;
    let cat3_col = index.require("Category3")?;
    let shares_col = index.require("shares")?;
    let quantity_col = index.require("loc_quantity")?;
    let month_col = index.optional("m");
    let year_col = index.optional("y");
    let accum_col = index.optional("Acum_loc_quantity");

    debug!("Column mapping for '{}': {:?}", sheet, index.columns);
    if accum_col.is_none() {
        info!("No Acum_loc_quantity column in '{}', computing running total", sheet);
    }

    let mut transactions = Vec::with_capacity(data.len());
    let mut running_total = Decimal::ZERO;

    for (idx, cells) in data {
        let row = RowReader {
            sheet,
            row_number: first_row + idx + 1,
            cells,
        };

        let name = row.text(name_col);
        if name.is_empty() {
            warn!(
                "Row {} of '{}' has no Name, counted in invested totals only",
                row.row_number, sheet
            );
        }

        let date = row.date(date_col, "Date")?;
        // Empty amounts count as zero, the way a spreadsheet SUM treats them
        let shares = row.decimal(shares_col, "shares")?.unwrap_or(Decimal::ZERO);
        let loc_quantity = row
            .decimal(quantity_col, "loc_quantity")?
            .unwrap_or(Decimal::ZERO);
        running_total += loc_quantity;

        let month = match month_col {
            Some(col) => match row.integer(col, "m")? {
                Some(m) if (1..=12).contains(&m) => m as u32,
                Some(m) => {
                    return Err(row.invalid("m", format!("{} is not a month", m)).into());
                }
                None => date.month(),
            },
            None => date.month(),
        };

        let year = match year_col {
            Some(col) => match row.integer(col, "y")? {
                Some(y) => i32::try_from(y)
                    .map_err(|_| row.invalid("y", format!("{} is not a year", y)))?,
                None => date.year(),
            },
            None => date.year(),
        };

        let accumulated = match accum_col {
            Some(col) => row
                .decimal(col, "Acum_loc_quantity")?
                .unwrap_or(running_total),
            None => running_total,
        };

        transactions.push(Transaction {
            date,
            name,
            sector: row.text(sector_col),
            country: row.text(country_col),
            category1: row.text(cat1_col),
            category2: row.text(cat2_col),
            category3: row.text(cat3_col),
            shares,
            loc_quantity,
            month,
            year,
            accumulated,
        });
    }

    info!("Parsed {} transactions from '{}'", transactions.len(), sheet);
    Ok(transactions)
}

/// Parse the price sheet. `first_row` as for [`parse_transactions`].
pub fn parse_prices<'a, I>(sheet: &str, first_row: usize, rows: I) -> Result<Vec<PriceQuote>>
where
    I: IntoIterator<Item = &'a [Data]>,
{
    let (_, header, data) = split_header(rows).ok_or_else(|| ReportError::MissingColumn {
        sheet: sheet.to_string(),
        column: "Name".to_string(),
    })?;

    let index = ColumnIndex::from_header(sheet, header);
    let name_col = index.require("Name")?;
    let last_col = index.require("Last")?;

    let mut prices = Vec::with_capacity(data.len());
    let mut seen = HashSet::new();

    for (idx, cells) in data {
        let row = RowReader {
            sheet,
            row_number: first_row + idx + 1,
            cells,
        };

        let name = row.text(name_col);
        if name.is_empty() {
            warn!("Skipping row {} of '{}': empty Name", row.row_number, sheet);
            continue;
        }

        let Some(last) = row.decimal(last_col, "Last")? else {
            warn!("Skipping price for {}: empty Last", name);
            continue;
        };

        if !seen.insert(name.clone()) {
            warn!("Duplicate price for {} in '{}', keeping the first", name, sheet);
            continue;
        }

        prices.push(PriceQuote { name, last });
    }

    info!("Parsed {} prices from '{}'", prices.len(), sheet);
    Ok(prices)
}

/// Parse a numeric cell. Empty cells yield `None`.
fn parse_decimal(cell: &Data) -> std::result::Result<Option<Decimal>, String> {
    match cell {
        Data::Empty => Ok(None),
        Data::Int(i) => Ok(Some(Decimal::from(*i))),
        Data::Float(f) => Decimal::from_f64(*f)
            .map(Some)
            .ok_or_else(|| format!("{} is not a finite number", f)),
        Data::Bool(_) => Err("expected a number, found a boolean".to_string()),
        Data::Error(e) => Err(format!("cell contains an error: {:?}", e)),
        _ => {
            let text = cell.to_string();
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            Decimal::from_str(text)
                .or_else(|_| Decimal::from_scientific(text))
                .map(Some)
                .map_err(|_| format!("'{}' is not a number", text))
        }
    }
}

/// Parse a date cell (Excel date, serial number or text)
fn parse_date(cell: &Data) -> std::result::Result<NaiveDate, String> {
    match cell {
        Data::DateTime(dt) => excel_serial_to_date(dt.as_f64()),
        Data::Float(f) => excel_serial_to_date(*f),
        Data::Int(i) => excel_serial_to_date(*i as f64),
        Data::DateTimeIso(s) | Data::String(s) => parse_date_str(s.trim()),
        Data::Empty => Err("date is empty".to_string()),
        other => Err(format!("'{}' is not a date", other)),
    }
}

fn excel_serial_to_date(serial: f64) -> std::result::Result<NaiveDate, String> {
    if !serial.is_finite() || serial < 0.0 {
        return Err(format!("{} is not a valid Excel date", serial));
    }
    let excel_epoch =
        NaiveDate::from_ymd_opt(1899, 12, 30).ok_or_else(|| "invalid Excel epoch".to_string())?;
    excel_epoch
        .checked_add_signed(chrono::Duration::days(serial.floor() as i64))
        .ok_or_else(|| format!("{} overflows the date range", serial))
}

fn parse_date_str(text: &str) -> std::result::Result<NaiveDate, String> {
    for format in ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Ok(date);
        }
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(dt.date());
        }
    }
    Err(format!("could not parse date '{}'", text))
}
