//! Monthly summary and segment tables for the HR dashboard.
//!
//! Renders bordered [`ratatui::widgets::Table`]s: one row per month (or per
//! month and segment value), the summary table closing with a highlighted
//! totals row.

use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use hr_core::calculations::RateCalculator;
use hr_core::formatting::{format_count, format_delta, format_percent};
use hr_core::models::{MonthlySummary, SegmentBreakdown};
use hr_core::time_utils::month_label;

use crate::themes::Theme;

/// Totals across every month of the summary table.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryTotals {
    pub hires: u32,
    pub terminations: u32,
    /// Mean of the monthly turnover rates.
    pub avg_turnover_rate: f64,
    /// Mean of the monthly hire rates.
    pub avg_hire_rate: f64,
    pub months: u32,
}

impl SummaryTotals {
    pub fn from_summaries(summaries: &[MonthlySummary]) -> Self {
        let months = summaries.len() as u32;
        let n = f64::from(months);
        Self {
            hires: summaries.iter().map(|s| s.hires).sum(),
            terminations: summaries.iter().map(|s| s.terminations).sum(),
            avg_turnover_rate: RateCalculator::ratio(
                summaries.iter().map(|s| s.turnover_rate).sum(),
                n,
            ),
            avg_hire_rate: RateCalculator::ratio(summaries.iter().map(|s| s.hire_rate).sum(), n),
            months,
        }
    }
}

/// Render the monthly summary table into `area`.
///
/// One data row per month, newest last, followed by a totals row.
pub fn render_summary_table(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    summaries: &[MonthlySummary],
    theme: &Theme,
) {
    let header_cells = [
        "Month",
        "Headcount",
        "Δ",
        "Hires",
        "Terms",
        "Turnover",
        "Hire Rate",
        "Early Turnover",
    ]
    .iter()
    .map(|h| Cell::from(*h).style(theme.table_header));
    let header = Row::new(header_cells).height(1);

    let mut previous: Option<u32> = None;
    let mut all_rows: Vec<Row> = summaries
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let delta =
                i64::from(s.headcount_end) - i64::from(previous.unwrap_or(s.headcount_end));
            previous = Some(s.headcount_end);
            Row::new(vec![
                Cell::from(month_label(s.month)),
                Cell::from(format_count(s.headcount_end)),
                Cell::from(format_delta(delta)).style(theme.delta_style(delta)),
                Cell::from(format_count(s.hires)),
                Cell::from(format_count(s.terminations)),
                Cell::from(format_percent(s.turnover_rate, 1))
                    .style(theme.turnover_style(s.turnover_rate)),
                Cell::from(format_percent(s.hire_rate, 1)),
                Cell::from(format_percent(s.early_turnover_rate, 2)),
            ])
            .style(theme.row_style(i))
        })
        .collect();

    let totals = SummaryTotals::from_summaries(summaries);
    all_rows.push(
        Row::new(vec![
            Cell::from("TOTAL"),
            Cell::from(format!("{} months", totals.months)),
            Cell::from(""),
            Cell::from(format_count(totals.hires)),
            Cell::from(format_count(totals.terminations)),
            Cell::from(format!("avg {}", format_percent(totals.avg_turnover_rate, 1))),
            Cell::from(format!("avg {}", format_percent(totals.avg_hire_rate, 1))),
            Cell::from(""),
        ])
        .style(theme.table_total),
    );

    let widths = [
        Constraint::Length(10),
        Constraint::Length(11),
        Constraint::Length(6),
        Constraint::Length(7),
        Constraint::Length(7),
        Constraint::Length(11),
        Constraint::Length(11),
        Constraint::Length(14),
    ];

    let table = Table::new(all_rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(format!(" {} ", title)),
        )
        .style(theme.text);

    frame.render_widget(table, area);
}

/// Render a segment breakdown as `Month | Value | Term Count | Rate`.
pub fn render_segment_table(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    rows: &[SegmentBreakdown],
    theme: &Theme,
) {
    let header = Row::new(
        ["Month", "Value", "Term Count", "Rate"]
            .iter()
            .map(|h| Cell::from(*h).style(theme.table_header)),
    );

    let data_rows: Vec<Row> = rows
        .iter()
        .enumerate()
        .map(|(i, r)| {
            Row::new(vec![
                Cell::from(month_label(r.month)),
                Cell::from(r.value.clone()),
                Cell::from(format_count(r.term_count)),
                Cell::from(format_percent(r.rate, 1)),
            ])
            .style(theme.row_style(i))
        })
        .collect();

    let widths = [
        Constraint::Length(10),
        Constraint::Min(16),
        Constraint::Length(11),
        Constraint::Length(8),
    ];

    let table = Table::new(data_rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(format!(" {} ", title)),
        )
        .style(theme.text);

    frame.render_widget(table, area);
}

/// Render a "no data" placeholder when no month is tracked.
pub fn render_no_data(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No months to show", theme.warning)),
        Line::from(""),
        Line::from(Span::styled(
            "Check --start-month and the hire dates in the workbook.",
            theme.dim,
        )),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(ratatui::text::Text::from(text)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" HR Dashboard "),
        ),
        area,
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, m, day).unwrap()
    }

    fn make_summaries() -> Vec<MonthlySummary> {
        vec![
            MonthlySummary {
                month: d(1, 31),
                headcount_end: 100,
                hires: 10,
                terminations: 5,
                turnover_rate: 0.05,
                hire_rate: 0.10,
                early_turnover_rate: 0.005,
            },
            MonthlySummary {
                month: d(2, 28),
                headcount_end: 104,
                hires: 7,
                terminations: 3,
                turnover_rate: 0.03,
                hire_rate: 0.07,
                early_turnover_rate: 0.003,
            },
        ]
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    // ── Totals ────────────────────────────────────────────────────────────────

    #[test]
    fn test_summary_totals() {
        let totals = SummaryTotals::from_summaries(&make_summaries());
        assert_eq!(totals.hires, 17);
        assert_eq!(totals.terminations, 8);
        assert_eq!(totals.months, 2);
        assert!((totals.avg_turnover_rate - 0.04).abs() < 1e-12);
        assert!((totals.avg_hire_rate - 0.085).abs() < 1e-12);
    }

    #[test]
    fn test_summary_totals_empty() {
        let totals = SummaryTotals::from_summaries(&[]);
        assert_eq!(totals.months, 0);
        assert_eq!(totals.avg_turnover_rate, 0.0);
    }

    // ── Render ────────────────────────────────────────────────────────────────

    #[test]
    fn test_render_summary_table_shows_months_and_totals() {
        let backend = TestBackend::new(100, 10);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();
        let summaries = make_summaries();

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_summary_table(frame, area, "Headcount", &summaries, &theme);
            })
            .unwrap();

        let content = buffer_text(&terminal);
        assert!(content.contains("Jan 2023"));
        assert!(content.contains("Feb 2023"));
        assert!(content.contains("+4"));
        assert!(content.contains("TOTAL"));
        assert!(content.contains("5.0%"));
    }

    #[test]
    fn test_render_summary_table_empty_does_not_panic() {
        let backend = TestBackend::new(100, 10);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::light();

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_summary_table(frame, area, "Headcount", &[], &theme);
            })
            .unwrap();
    }

    #[test]
    fn test_render_segment_table() {
        let backend = TestBackend::new(60, 8);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();
        let rows = vec![
            SegmentBreakdown {
                month: d(3, 31),
                value: "Male".to_string(),
                term_count: 1,
                rate: 1.0 / 4.0,
            },
            SegmentBreakdown {
                month: d(3, 31),
                value: "Female".to_string(),
                term_count: 0,
                rate: 0.0,
            },
        ];

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_segment_table(frame, area, "Gender", &rows, &theme);
            })
            .unwrap();

        let content = buffer_text(&terminal);
        assert!(content.contains("Term Count"));
        assert!(content.contains("Female"));
        assert!(content.contains("25.0%"));
    }

    #[test]
    fn test_render_no_data_does_not_panic() {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_no_data(frame, area, &theme);
            })
            .unwrap();
        assert!(buffer_text(&terminal).contains("No months to show"));
    }
}
