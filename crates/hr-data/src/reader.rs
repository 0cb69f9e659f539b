//! Spreadsheet loading for the HR dashboard.
//!
//! Reads the active- and departed-employee worksheets with `calamine`, checks
//! that the required columns are present and merges both into the unified
//! [`EmployeeEvent`] table. Individual cells are read leniently: a date that
//! cannot be parsed becomes `None` instead of failing the run.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use chrono::NaiveDate;
use hr_core::error::{HrError, Result};
use hr_core::models::{
    EmployeeEvent, COL_AREA, COL_BIRTH_DATE, COL_COST_CENTER, COL_COUNTRY, COL_EMPLOYEE,
    COL_EXIT_TYPE, COL_FUNCTION, COL_GENDER, COL_HIRE_DATE, COL_JOB_CATEGORY, COL_JOB_LEVEL,
    COL_LAST_DAY, COL_LOCATION, CORE_COLUMNS, DEPARTED_COLUMNS,
};
use hr_core::time_utils::{excel_serial_to_date, parse_date_str};
use tracing::{debug, info};

// ── Raw tables ────────────────────────────────────────────────────────────────

/// A single worksheet cell, independent of the spreadsheet library.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
}

impl CellValue {
    /// Text form of the cell for categorical columns.
    ///
    /// Integral numbers lose their trailing `.0`; empty and blank cells are `None`.
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(s) if s.trim().is_empty() => None,
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                Some(format!("{}", *n as i64))
            }
            CellValue::Number(n) => Some(n.to_string()),
            CellValue::Bool(b) => Some(b.to_string()),
            CellValue::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
        }
    }

    /// Date form of the cell; anything unparseable is `None`.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            CellValue::Date(d) => Some(*d),
            CellValue::Number(n) => excel_serial_to_date(*n),
            CellValue::Text(s) => parse_date_str(s),
            CellValue::Empty | CellValue::Bool(_) => None,
        }
    }

    /// Numeric form of the cell.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl From<&Data> for CellValue {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty | Data::Error(_) => CellValue::Empty,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Float(f) => CellValue::Number(*f),
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::DateTime(dt) => match excel_serial_to_date(dt.as_f64()) {
                Some(d) => CellValue::Date(d),
                None => CellValue::Number(dt.as_f64()),
            },
            Data::DateTimeIso(s) => match parse_date_str(s) {
                Some(d) => CellValue::Date(d),
                None => CellValue::Text(s.clone()),
            },
            Data::DurationIso(s) => CellValue::Text(s.clone()),
        }
    }
}

/// A worksheet reduced to a header row and data rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    /// Sheet name, used in error messages.
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows,
        }
    }

    /// Position of the column whose header is exactly `header`.
    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// Resolve every header in `columns`, failing on the first one missing.
    fn require_columns(&self, columns: &[&str]) -> Result<Vec<usize>> {
        columns
            .iter()
            .map(|col| {
                self.column_index(col)
                    .ok_or_else(|| HrError::MissingColumn {
                        sheet: self.name.clone(),
                        column: (*col).to_string(),
                    })
            })
            .collect()
    }

    /// Build a table from a header row followed by data rows.
    ///
    /// Leading blank rows are skipped; the first non-blank row is the header.
    /// Fully blank data rows are dropped.
    pub fn from_rows(name: impl Into<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let mut iter = rows
            .into_iter()
            .skip_while(|row| row.iter().all(CellValue::is_empty));

        let headers: Vec<String> = iter
            .next()
            .map(|row| {
                row.iter()
                    .map(|c| c.as_text().unwrap_or_default())
                    .collect()
            })
            .unwrap_or_default();

        let rows = iter
            .filter(|row| !row.iter().all(CellValue::is_empty))
            .collect();

        Self::new(name, headers, rows)
    }

    fn cell(&self, row: &[CellValue], idx: usize) -> CellValue {
        row.get(idx).cloned().unwrap_or(CellValue::Empty)
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Read one worksheet from an Excel-family workbook.
pub fn read_sheet(path: &Path, sheet: &str) -> Result<RawTable> {
    if !path.exists() {
        return Err(HrError::FileRead {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "file does not exist"),
        });
    }

    let mut workbook = open_workbook_auto(path).map_err(|e| HrError::Workbook {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    if !workbook.sheet_names().iter().any(|name| name == sheet) {
        return Err(HrError::SheetNotFound {
            path: path.to_path_buf(),
            sheet: sheet.to_string(),
        });
    }

    let range = workbook
        .worksheet_range(sheet)
        .map_err(|e| HrError::Workbook {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let rows: Vec<Vec<CellValue>> = range
        .rows()
        .map(|row| row.iter().map(CellValue::from).collect())
        .collect();

    let table = RawTable::from_rows(sheet, rows);
    info!(
        "Read sheet '{}' from {}: {} columns, {} rows",
        sheet,
        path.display(),
        table.headers.len(),
        table.rows.len()
    );
    Ok(table)
}

/// Read the active and departed sheets.
pub fn load_inputs(
    active_path: &Path,
    active_sheet: &str,
    departed_path: &Path,
    departed_sheet: &str,
) -> Result<(RawTable, RawTable)> {
    let active = read_sheet(active_path, active_sheet)?;
    let departed = read_sheet(departed_path, departed_sheet)?;
    Ok((active, departed))
}

/// Merge the active and departed tables into the unified employee table.
///
/// Active rows come first, then departed rows, each in sheet order. Active
/// rows never carry a last day of work or exit type, even when the sheet
/// happens to have those columns.
pub fn unify(active: &RawTable, departed: &RawTable) -> Result<Vec<EmployeeEvent>> {
    let active_idx = active.require_columns(&CORE_COLUMNS)?;
    let mut departed_cols: Vec<&str> = CORE_COLUMNS.to_vec();
    departed_cols.extend(DEPARTED_COLUMNS);
    let departed_idx = departed.require_columns(&departed_cols)?;

    let mut stats = ParseStats::default();
    let mut events = Vec::with_capacity(active.rows.len() + departed.rows.len());

    for row in &active.rows {
        events.push(core_event(active, row, &active_idx, &mut stats));
    }

    let last_day_idx = departed_idx[CORE_COLUMNS.len()];
    let exit_type_idx = departed_idx[CORE_COLUMNS.len() + 1];
    for row in &departed.rows {
        let mut event = core_event(departed, row, &departed_idx, &mut stats);
        event.last_day_of_work = stats.date(departed.cell(row, last_day_idx), COL_LAST_DAY);
        event.exit_type = departed.cell(row, exit_type_idx).as_text();
        events.push(event);
    }

    if stats.unparsed_dates > 0 {
        info!(
            "{} date cells could not be parsed and were left empty",
            stats.unparsed_dates
        );
    }
    debug!(
        "Unified {} active and {} departed rows",
        active.rows.len(),
        departed.rows.len()
    );

    Ok(events)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

#[derive(Default)]
struct ParseStats {
    unparsed_dates: usize,
}

impl ParseStats {
    /// Lenient date read; counts non-empty cells that fail to parse.
    fn date(&mut self, cell: CellValue, column: &str) -> Option<NaiveDate> {
        let parsed = cell.as_date();
        if parsed.is_none() && !cell.is_empty() {
            self.unparsed_dates += 1;
            debug!("Unparseable {} value {:?}, treating as empty", column, cell);
        }
        parsed
    }
}

/// Build an event from the core columns; `idx` is ordered like [`CORE_COLUMNS`].
fn core_event(
    table: &RawTable,
    row: &[CellValue],
    idx: &[usize],
    stats: &mut ParseStats,
) -> EmployeeEvent {
    let text = |col: &str| {
        let pos = CORE_COLUMNS.iter().position(|c| *c == col).unwrap_or(0);
        table.cell(row, idx[pos]).as_text()
    };
    let raw = |col: &str| {
        let pos = CORE_COLUMNS.iter().position(|c| *c == col).unwrap_or(0);
        table.cell(row, idx[pos])
    };

    EmployeeEvent {
        employee_id: text(COL_EMPLOYEE),
        birth_date: stats.date(raw(COL_BIRTH_DATE), COL_BIRTH_DATE),
        gender: text(COL_GENDER),
        hire_date: stats.date(raw(COL_HIRE_DATE), COL_HIRE_DATE),
        function: text(COL_FUNCTION),
        country: text(COL_COUNTRY),
        job_category: text(COL_JOB_CATEGORY),
        area: text(COL_AREA),
        cost_center: text(COL_COST_CENTER),
        location: text(COL_LOCATION),
        job_level: text(COL_JOB_LEVEL),
        last_day_of_work: None,
        exit_type: None,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
