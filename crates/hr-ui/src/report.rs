//! Plain-text report for `--view report`.
//!
//! Produces the monthly summary as a fixed-width table followed by the
//! latest segment breakdowns, for printing to stdout without taking over the
//! terminal.

use hr_core::formatting::{format_count, format_percent};
use hr_core::time_utils::month_label;
use hr_data::analysis::DashboardData;

use crate::table_view::SummaryTotals;

const SUMMARY_HEADER: [&str; 7] = [
    "Month",
    "Headcount",
    "Hires",
    "Terms",
    "Turnover",
    "Hire Rate",
    "Early Turnover",
];
const SUMMARY_WIDTHS: [usize; 7] = [10, 10, 7, 7, 9, 10, 15];

/// Render the whole report as one string ending in a newline.
pub fn render_report(data: &DashboardData) -> String {
    let meta = &data.metadata;
    let mut out = format!("HR Workforce Report ({})\n", meta.source);

    out.push_str(&match meta.as_of {
        Some(as_of) => format!(
            "As of {} · {} employees · {} months\n",
            as_of.format("%Y-%m-%d"),
            format_count(u32::try_from(meta.rows_loaded).unwrap_or(u32::MAX)),
            meta.months_covered
        ),
        None => "No months tracked\n".to_string(),
    });
    out.push_str(&format!(
        "Active {} · Men {} · Women {}\n\n",
        format_count(data.snapshot.active),
        format_count(data.snapshot.gender_count("Male")),
        format_count(data.snapshot.gender_count("Female"))
    ));

    let rule_width = SUMMARY_WIDTHS.iter().sum::<usize>() + SUMMARY_WIDTHS.len() - 1;
    let rule = format!("{}\n", "-".repeat(rule_width));

    out.push_str(&table_row(SUMMARY_HEADER.iter().map(|s| s.to_string())));
    out.push_str(&rule);

    for s in &data.summaries {
        out.push_str(&table_row([
            month_label(s.month),
            format_count(s.headcount_end),
            format_count(s.hires),
            format_count(s.terminations),
            format_percent(s.turnover_rate, 1),
            format_percent(s.hire_rate, 1),
            format_percent(s.early_turnover_rate, 2),
        ]));
    }

    if !data.summaries.is_empty() {
        let totals = SummaryTotals::from_summaries(&data.summaries);
        out.push_str(&rule);
        out.push_str(&table_row([
            "TOTAL".to_string(),
            String::new(),
            format_count(totals.hires),
            format_count(totals.terminations),
            format_percent(totals.avg_turnover_rate, 1),
            format_percent(totals.avg_hire_rate, 1),
            String::new(),
        ]));
    }

    if let Some(latest) = data.latest() {
        for (dimension, rows) in &data.segments {
            out.push_str(&format!(
                "\nTerminations by {} ({})\n",
                dimension.label(),
                month_label(latest.month)
            ));
            for r in rows.iter().filter(|r| r.month == latest.month) {
                out.push_str(&format!(
                    "  {:<24} {:>5} {:>7}\n",
                    r.value,
                    format_count(r.term_count),
                    format_percent(r.rate, 1)
                ));
            }
        }
    }

    out
}

/// One fixed-width table line: first cell left-aligned, the rest right-aligned.
fn table_row(cells: impl IntoIterator<Item = String>) -> String {
    let line: Vec<String> = cells
        .into_iter()
        .zip(SUMMARY_WIDTHS)
        .enumerate()
        .map(|(i, (cell, width))| {
            if i == 0 {
                format!("{:<width$}", cell)
            } else {
                format!("{:>width$}", cell)
            }
        })
        .collect();
    format!("{}\n", line.join(" ").trim_end())
}
