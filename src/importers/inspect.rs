//! Workbook inspection: sheet list, sheet sizes, a preview of the first rows
//! and per-column statistics of one sheet.

use anyhow::Result;
use calamine::{Data, Reader};
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

use super::account_excel::{open_xlsx, read_sheet};

/// Rows × columns of one sheet
#[derive(Debug, Clone, Serialize)]
pub struct SheetSize {
    pub name: String,
    pub rows: usize,
    pub columns: usize,
}

/// Kind of values found in a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    Number,
    Text,
    Date,
    Bool,
    Mixed,
    Empty,
}

impl CellKind {
    fn of(cell: &Data) -> Option<Self> {
        match cell {
            Data::Int(_) | Data::Float(_) => Some(CellKind::Number),
            Data::String(s) if s.trim().is_empty() => None,
            Data::String(_) => Some(CellKind::Text),
            Data::DateTime(_) | Data::DateTimeIso(_) | Data::DurationIso(_) => {
                Some(CellKind::Date)
            }
            Data::Bool(_) => Some(CellKind::Bool),
            _ => None,
        }
    }

    fn merge(self, other: CellKind) -> CellKind {
        match (self, other) {
            (CellKind::Empty, k) => k,
            (k, o) if k == o => k,
            _ => CellKind::Mixed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CellKind::Number => "number",
            CellKind::Text => "text",
            CellKind::Date => "date",
            CellKind::Bool => "bool",
            CellKind::Mixed => "mixed",
            CellKind::Empty => "empty",
        }
    }
}

/// Statistics of one column (below the header row)
#[derive(Debug, Clone, Serialize)]
pub struct ColumnInfo {
    pub header: String,
    pub non_empty: usize,
    pub kind: CellKind,
}

/// Result of inspecting a workbook
#[derive(Debug, Clone, Serialize)]
pub struct WorkbookInspection {
    pub sheets: Vec<SheetSize>,
    pub sheet: String,
    pub data_rows: usize,
    pub columns: Vec<ColumnInfo>,
    pub head: Vec<Vec<String>>,
}

/// Inspect a workbook, previewing `head_rows` data rows of `sheet`
pub fn inspect_workbook<P: AsRef<Path>>(
    path: P,
    sheet: &str,
    head_rows: usize,
) -> Result<WorkbookInspection> {
    let path = path.as_ref();
    info!("Inspecting workbook: {:?}", path);

    let mut workbook = open_xlsx(path)?;

    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        match workbook.worksheet_range(&name) {
            Ok(range) => sheets.push(SheetSize {
                name,
                rows: range.height(),
                columns: range.width(),
            }),
            Err(err) => warn!("Failed to read sheet {}: {}", name, err),
        }
    }

    let range = read_sheet(&mut workbook, sheet)?;
    let rows: Vec<&[Data]> = range.rows().collect();
    let (columns, data_rows, head) = describe_rows(&rows, head_rows);

    Ok(WorkbookInspection {
        sheets,
        sheet: sheet.to_string(),
        data_rows,
        columns,
        head,
    })
}

/// Column statistics, data row count and head preview for a sheet's rows.
/// The first row is taken as the header.
fn describe_rows(rows: &[&[Data]], head_rows: usize) -> (Vec<ColumnInfo>, usize, Vec<Vec<String>>) {
    let Some((header, data)) = rows.split_first() else {
        return (Vec::new(), 0, Vec::new());
    };

    let width = rows.iter().map(|row| row.len()).max().unwrap_or(0);

    let columns = (0..width)
        .map(|col| {
            let header = header
                .get(col)
                .map(|cell| cell.to_string().trim().to_string())
                .unwrap_or_default();
            let mut non_empty = 0;
            let mut kind = CellKind::Empty;
            for row in data {
                if let Some(cell_kind) = row.get(col).and_then(CellKind::of) {
                    non_empty += 1;
                    kind = kind.merge(cell_kind);
                }
            }
            ColumnInfo {
                header,
                non_empty,
                kind,
            }
        })
        .collect();

    let head = data
        .iter()
        .take(head_rows)
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect();

    (columns, data.len(), head)
}
