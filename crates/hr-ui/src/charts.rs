//! Bar and line charts over the monthly summaries and segment breakdowns.
//!
//! Chart data is prepared by plain functions so it can be tested without a
//! terminal; the `render_*` functions only lay the widgets out.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    text::Line,
    widgets::{Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

use hr_core::models::{MonthlySummary, SegmentBreakdown};

use crate::themes::Theme;

/// Line colours for segment series, cycled in value order.
pub const SEGMENT_PALETTE: [Color; 8] = [
    Color::Cyan,
    Color::Magenta,
    Color::Yellow,
    Color::Green,
    Color::Blue,
    Color::Red,
    Color::LightCyan,
    Color::LightMagenta,
];

/// A named line in percent units, x = month index.
#[derive(Debug, Clone, PartialEq)]
pub struct RateSeries {
    pub name: String,
    pub points: Vec<(f64, f64)>,
    pub style: Style,
}

// ── Data preparation ──────────────────────────────────────────────────────────

/// `(label, value)` for every bar of a count chart, labels as `MM/YY`.
pub fn count_values(
    summaries: &[MonthlySummary],
    value: impl Fn(&MonthlySummary) -> u32,
) -> Vec<(String, u64)> {
    summaries
        .iter()
        .map(|s| (s.month.format("%m/%y").to_string(), u64::from(value(s))))
        .collect()
}

/// A monthly rate as percent points against the month index.
pub fn rate_points(
    summaries: &[MonthlySummary],
    rate: impl Fn(&MonthlySummary) -> f64,
) -> Vec<(f64, f64)> {
    summaries
        .iter()
        .enumerate()
        .map(|(i, s)| (i as f64, rate(s) * 100.0))
        .collect()
}

/// One series per segment value, in breakdown order.
///
/// Rows are month-major, so the month index advances whenever the month
/// changes.
pub fn segment_series(rows: &[SegmentBreakdown]) -> Vec<RateSeries> {
    let mut series: Vec<RateSeries> = Vec::new();
    let mut month_index = 0usize;
    let mut current_month = rows.first().map(|r| r.month);

    for row in rows {
        if Some(row.month) != current_month {
            month_index += 1;
            current_month = Some(row.month);
        }
        let point = (month_index as f64, row.rate * 100.0);
        match series.iter_mut().find(|s| s.name == row.value) {
            Some(s) => s.points.push(point),
            None => {
                let color = SEGMENT_PALETTE[series.len() % SEGMENT_PALETTE.len()];
                series.push(RateSeries {
                    name: row.value.clone(),
                    points: vec![point],
                    style: Style::default().fg(color),
                });
            }
        }
    }
    series
}

/// Upper y bound leaving headroom over the largest value; `1.0` when flat.
pub fn y_upper_bound(series: &[RateSeries]) -> f64 {
    let max = series
        .iter()
        .flat_map(|s| s.points.iter().map(|p| p.1))
        .fold(0.0_f64, f64::max);
    if max <= 0.0 {
        1.0
    } else {
        (max + max / 10.0).ceil()
    }
}

/// First, middle and last month labels for an x axis.
pub fn x_labels(summaries: &[MonthlySummary]) -> Vec<String> {
    let label = |s: &MonthlySummary| s.month.format("%b %y").to_string();
    match summaries.len() {
        0 => Vec::new(),
        1 => vec![label(&summaries[0])],
        n => vec![
            label(&summaries[0]),
            label(&summaries[n / 2]),
            label(&summaries[n - 1]),
        ],
    }
}

// ── Rendering ─────────────────────────────────────────────────────────────────

/// Vertical bar chart of one count per month.
pub fn render_count_bars(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    values: &[(String, u64)],
    style: Style,
    theme: &Theme,
) {
    let bars: Vec<Bar> = values
        .iter()
        .map(|(label, v)| {
            Bar::default()
                .value(*v)
                .label(Line::from(label.clone()))
                .style(style)
        })
        .collect();

    let inner_width = area.width.saturating_sub(2);
    let n = values.len().max(1) as u16;
    let bar_width = (inner_width / n).saturating_sub(1).clamp(1, 6);

    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.card_border)
                .title(format!(" {} ", title)),
        )
        .bar_width(bar_width)
        .bar_gap(1)
        .bar_style(style)
        .value_style(theme.bold)
        .label_style(theme.dim)
        .data(BarGroup::default().bars(&bars));

    frame.render_widget(chart, area);
}

/// Line chart of one or more percent series over the month index.
pub fn render_rate_chart(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    series: &[RateSeries],
    labels: Vec<String>,
    theme: &Theme,
) {
    let months = series
        .iter()
        .map(|s| s.points.len())
        .max()
        .unwrap_or(0);
    let x_max = months.saturating_sub(1).max(1) as f64;
    let y_max = y_upper_bound(series);

    let datasets: Vec<Dataset> = series
        .iter()
        .map(|s| {
            Dataset::default()
                .name(s.name.clone())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(s.style)
                .data(&s.points)
        })
        .collect();

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.card_border)
                .title(format!(" {} ", title)),
        )
        .x_axis(
            Axis::default()
                .style(theme.axis)
                .bounds([0.0, x_max])
                .labels(labels),
        )
        .y_axis(
            Axis::default()
                .style(theme.axis)
                .bounds([0.0, y_max])
                .labels(vec![
                    "0%".to_string(),
                    format!("{:.0}%", y_max / 2.0),
                    format!("{:.0}%", y_max),
                ]),
        );

    frame.render_widget(chart, area);
}

// ── Tests ─────────────────────────────────────────────────────────────────────
