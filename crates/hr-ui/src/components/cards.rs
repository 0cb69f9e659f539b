use crate::themes::Theme;
use hr_core::formatting::{format_count, format_delta, format_percent};
use hr_core::models::MonthlySummary;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

// ── KpiCard ──────────────────────────────────────────────────────────────────

/// A bordered metric card: title in the border, big value, optional detail.
pub struct KpiCard<'a> {
    pub title: String,
    pub value: String,
    pub detail: Option<Line<'a>>,
    pub value_style: Style,
    pub theme: &'a Theme,
}

impl<'a> KpiCard<'a> {
    pub fn new(title: impl Into<String>, value: impl Into<String>, theme: &'a Theme) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
            detail: None,
            value_style: theme.card_value,
            theme,
        }
    }

    pub fn with_detail(mut self, detail: Line<'a>) -> Self {
        self.detail = Some(detail);
        self
    }

    pub fn with_value_style(mut self, style: Style) -> Self {
        self.value_style = style;
        self
    }

    /// Card body lines, the value centred in `inner_width` columns.
    pub fn to_lines(&self, inner_width: u16) -> Vec<Line<'a>> {
        let mut lines = vec![Line::from(Span::styled(
            center(&self.value, inner_width),
            self.value_style,
        ))];
        if let Some(detail) = &self.detail {
            lines.push(detail.clone().centered());
        }
        lines
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.card_border)
            .title(Span::styled(format!(" {} ", self.title), self.theme.card_title));
        let inner = block.inner(area);
        frame.render_widget(Paragraph::new(self.to_lines(inner.width)).block(block), area);
    }
}

/// Render `cards` side by side in equal-width columns.
pub fn render_card_row(frame: &mut Frame, area: Rect, cards: &[KpiCard]) {
    if cards.is_empty() {
        return;
    }
    let constraints = vec![Constraint::Ratio(1, cards.len() as u32); cards.len()];
    let columns = Layout::horizontal(constraints).split(area);
    for (card, column) in cards.iter().zip(columns.iter()) {
        card.render(frame, *column);
    }
}

/// Pad `text` with spaces so it sits in the middle of `width` columns.
pub fn center(text: &str, width: u16) -> String {
    let text_width = UnicodeWidthStr::width(text);
    let width = width as usize;
    if text_width >= width {
        return text.to_string();
    }
    let left = (width - text_width) / 2;
    format!("{}{}", " ".repeat(left), text)
}

// ── TurnoverIndicator ─────────────────────────────────────────────────────────

/// One-line turnover readout for a month, coloured by severity.
///
/// Format: `"Turnover Mar 2023: 2.4%  hires 3.1%  Δ headcount +2"`
pub struct TurnoverIndicator<'a> {
    pub current: &'a MonthlySummary,
    pub previous: Option<&'a MonthlySummary>,
    pub theme: &'a Theme,
}

impl<'a> TurnoverIndicator<'a> {
    pub fn new(
        current: &'a MonthlySummary,
        previous: Option<&'a MonthlySummary>,
        theme: &'a Theme,
    ) -> Self {
        Self {
            current,
            previous,
            theme,
        }
    }

    /// Headcount change against the previous month, `0` for the first month.
    pub fn headcount_delta(&self) -> i64 {
        let prev = self
            .previous
            .map(|p| p.headcount_end)
            .unwrap_or(self.current.headcount_end);
        i64::from(self.current.headcount_end) - i64::from(prev)
    }

    pub fn to_line(&self) -> Line<'a> {
        let delta = self.headcount_delta();
        Line::from(vec![
            Span::styled(
                format!("Turnover {}: ", self.current.month.format("%b %Y")),
                self.theme.label,
            ),
            Span::styled(
                format_percent(self.current.turnover_rate, 1),
                self.theme.turnover_style(self.current.turnover_rate),
            ),
            Span::styled("  hires ", self.theme.label),
            Span::styled(format_percent(self.current.hire_rate, 1), self.theme.series_hire_rate),
            Span::styled("  Δ headcount ", self.theme.label),
            Span::styled(format_delta(delta), self.theme.delta_style(delta)),
        ])
    }
}

// ── ShareBar ──────────────────────────────────────────────────────────────────

/// Columns reserved after the bar for the `" 12,345 (100.0%)"` suffix.
const SHARE_SUFFIX_WIDTH: u16 = 16;

/// Bar width that fits a row of `area_width` columns after a label column of
/// `label_width`, kept within `4..=40`.
pub fn share_bar_width(area_width: u16, label_width: usize) -> u16 {
    let label = u16::try_from(label_width).unwrap_or(u16::MAX).saturating_add(1);
    area_width
        .saturating_sub(label)
        .saturating_sub(SHARE_SUFFIX_WIDTH)
        .clamp(4, 40)
}

/// Horizontal bar showing a group's share of the active workforce.
///
/// Renders as `label ████░░░░ 12 (30.0%)`.
pub struct ShareBar<'a> {
    pub label: &'a str,
    pub count: u32,
    pub total: u32,
    /// Width in columns of the bar portion.
    pub width: u16,
    pub theme: &'a Theme,
}

impl<'a> ShareBar<'a> {
    pub fn new(label: &'a str, count: u32, total: u32, theme: &'a Theme) -> Self {
        Self {
            label,
            count,
            total,
            width: 20,
            theme,
        }
    }

    pub fn with_width(mut self, width: u16) -> Self {
        self.width = width;
        self
    }

    /// Share as a fraction clamped to `[0, 1]`; `0` when there is no total.
    pub fn share(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (f64::from(self.count) / f64::from(self.total)).min(1.0)
        }
    }

    /// `label_width` pads the label column so stacked bars line up.
    pub fn to_line(&self, label_width: usize) -> Line<'a> {
        let filled = (self.share() * f64::from(self.width)).round() as usize;
        let empty = (self.width as usize).saturating_sub(filled);
        let pad = label_width.saturating_sub(UnicodeWidthStr::width(self.label));

        Line::from(vec![
            Span::styled(format!("{}{} ", self.label, " ".repeat(pad)), self.theme.label),
            Span::styled("█".repeat(filled), self.theme.series_headcount),
            Span::styled("░".repeat(empty), self.theme.dim),
            Span::styled(
                format!(
                    " {} ({})",
                    format_count(self.count),
                    format_percent(self.share(), 1)
                ),
                self.theme.value,
            ),
        ])
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
