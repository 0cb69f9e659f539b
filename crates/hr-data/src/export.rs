//! Monthly summary export to `.xlsx`, and reading it back.

use std::path::Path;

use hr_core::error::{HrError, Result};
use hr_core::models::MonthlySummary;
use hr_core::time_utils::date_to_excel_serial;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use tracing::info;

use crate::reader::{read_sheet, CellValue, RawTable};

/// Worksheet holding the exported summary.
pub const SUMMARY_SHEET: &str = "Summary";

/// Header row, in [`MonthlySummary`] field order.
pub const SUMMARY_HEADERS: [&str; 7] = [
    "Month",
    "Headcount End",
    "Hires",
    "Terminations",
    "Turnover Rate",
    "Hire Rate",
    "Early Turnover Rate",
];

fn export_err(e: XlsxError) -> HrError {
    HrError::Export(e.to_string())
}

/// Write `summaries` to a single-sheet workbook at `path`.
///
/// Months are date cells; rates are fractions with a percentage format.
pub fn write_summary_workbook(path: &Path, summaries: &[MonthlySummary]) -> Result<()> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let rate_format = Format::new().set_num_format("0.0%");

    let sheet = workbook.add_worksheet();
    sheet.set_name(SUMMARY_SHEET).map_err(export_err)?;

    for (col, header) in SUMMARY_HEADERS.iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, *header, &header_format)
            .map_err(export_err)?;
        sheet
            .set_column_width(col as u16, header.len().max(12) as f64 + 2.0)
            .map_err(export_err)?;
    }

    for (i, s) in summaries.iter().enumerate() {
        let row = i as u32 + 1;
        sheet
            .write_number_with_format(row, 0, date_to_excel_serial(s.month), &date_format)
            .map_err(export_err)?;
        sheet
            .write_number(row, 1, f64::from(s.headcount_end))
            .map_err(export_err)?;
        sheet
            .write_number(row, 2, f64::from(s.hires))
            .map_err(export_err)?;
        sheet
            .write_number(row, 3, f64::from(s.terminations))
            .map_err(export_err)?;
        for (col, rate) in [(4, s.turnover_rate), (5, s.hire_rate), (6, s.early_turnover_rate)] {
            sheet
                .write_number_with_format(row, col, rate, &rate_format)
                .map_err(export_err)?;
        }
    }

    workbook.save(path).map_err(export_err)?;
    info!("Exported {} months to {}", summaries.len(), path.display());
    Ok(())
}

/// Read a workbook written by [`write_summary_workbook`].
pub fn read_summary_workbook(path: &Path) -> Result<Vec<MonthlySummary>> {
    let table = read_sheet(path, SUMMARY_SHEET)?;
    let idx: Vec<usize> = SUMMARY_HEADERS
        .iter()
        .map(|h| {
            table.column_index(h).ok_or_else(|| HrError::MissingColumn {
                sheet: SUMMARY_SHEET.to_string(),
                column: (*h).to_string(),
            })
        })
        .collect::<Result<_>>()?;

    table
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| parse_summary_row(&table, row, &idx, i + 2))
        .collect()
}

fn parse_summary_row(
    table: &RawTable,
    row: &[CellValue],
    idx: &[usize],
    line: usize,
) -> Result<MonthlySummary> {
    let cell = |n: usize| row.get(idx[n]).cloned().unwrap_or(CellValue::Empty);
    let bad = |what: &str| {
        HrError::Export(format!(
            "sheet '{}' row {}: invalid {}",
            table.name, line, what
        ))
    };
    let count = |n: usize| {
        cell(n)
            .as_number()
            .filter(|v| *v >= 0.0)
            .map(|v| v.round() as u32)
            .ok_or_else(|| bad(SUMMARY_HEADERS[n]))
    };
    let rate = |n: usize| cell(n).as_number().ok_or_else(|| bad(SUMMARY_HEADERS[n]));

    Ok(MonthlySummary {
        month: cell(0).as_date().ok_or_else(|| bad(SUMMARY_HEADERS[0]))?,
        headcount_end: count(1)?,
        hires: count(2)?,
        terminations: count(3)?,
        turnover_rate: rate(4)?,
        hire_rate: rate(5)?,
        early_turnover_rate: rate(6)?,
    })
}
