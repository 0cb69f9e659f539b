use crate::themes::Theme;
use chrono::NaiveDate;
use ratatui::text::{Line, Span};

/// Decoration placed either side of the dashboard title.
pub const ACCENT: &str = "■ □ ■";

/// Dashboard header rendering four lines:
///
/// 1. Title with accent decorations.
/// 2. A 60-column `=` separator.
/// 3. `[ mode | as of YYYY-MM-DD | N employees ]`.
/// 4. An empty line.
pub struct Header<'a> {
    /// `"live"` or `"demo"`.
    pub mode: &'a str,
    /// Last tracked month-end, if any month was tracked.
    pub as_of: Option<NaiveDate>,
    /// Rows in the unified employee table.
    pub employees: usize,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(mode: &'a str, as_of: Option<NaiveDate>, employees: usize, theme: &'a Theme) -> Self {
        Self {
            mode,
            as_of,
            employees,
            theme,
        }
    }

    /// Render the header as exactly four lines.
    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let mode_style = if self.mode.eq_ignore_ascii_case("demo") {
            self.theme.warning
        } else {
            self.theme.success
        };
        let as_of = self
            .as_of
            .map(|d| format!("as of {}", d.format("%Y-%m-%d")))
            .unwrap_or_else(|| "no months tracked".to_string());

        vec![
            Line::from(vec![
                Span::styled(ACCENT, self.theme.header_accent),
                Span::styled(" HR WORKFORCE DASHBOARD ", self.theme.header),
                Span::styled(ACCENT, self.theme.header_accent),
            ]),
            Line::from(Span::styled("=".repeat(60), self.theme.separator)),
            Line::from(vec![
                Span::styled("[ ", self.theme.label),
                Span::styled(self.mode.to_lowercase(), mode_style),
                Span::styled(" | ", self.theme.label),
                Span::styled(as_of, self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(format!("{} employees", self.employees), self.theme.value),
                Span::styled(" ]", self.theme.label),
            ]),
            Line::from(""),
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
