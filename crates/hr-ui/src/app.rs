//! Main application state and TUI event loop for the HR dashboard.
//!
//! [`App`] owns the theme, the selected tab and the precomputed
//! [`DashboardData`]. The event loop only redraws and reacts to keys; nothing
//! is recomputed while the dashboard runs.

use std::io::{self, Stdout};
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Paragraph, Tabs},
    Frame, Terminal,
};
use tracing::{error, info};

use hr_core::error::{HrError, Result};
use hr_core::formatting::{format_count, format_percent};
use hr_core::models::Dimension;
use hr_data::analysis::DashboardData;
use hr_data::export::write_summary_workbook;

use crate::charts::{self, RateSeries};
use crate::components::cards::{
    render_card_row, share_bar_width, KpiCard, ShareBar, TurnoverIndicator,
};
use crate::components::header::Header;
use crate::table_view;
use crate::themes::Theme;

// ── Tab ───────────────────────────────────────────────────────────────────────

/// Which dashboard page is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Overview,
    Flows,
    Segments,
    Headcount,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Overview, Tab::Flows, Tab::Segments, Tab::Headcount];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Overview => "1 Overview",
            Tab::Flows => "2 Flows",
            Tab::Segments => "3 Segments",
            Tab::Headcount => "4 Headcount",
        }
    }

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|t| t == self).unwrap_or(0)
    }

    pub fn next(&self) -> Tab {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(&self) -> Tab {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Message shown on the bottom line after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    pub is_error: bool,
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the dashboard TUI.
pub struct App {
    pub theme: Theme,
    pub tab: Tab,
    /// Index into `data.segments` shown on the Segments tab.
    pub segment_index: usize,
    /// Where `e` writes the summary workbook.
    pub export_path: PathBuf,
    pub status: Option<StatusLine>,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
    pub data: DashboardData,
}

impl App {
    pub fn new(theme_name: &str, data: DashboardData, export_path: PathBuf) -> Self {
        Self {
            theme: Theme::from_name(theme_name),
            tab: Tab::Overview,
            segment_index: 0,
            export_path,
            status: None,
            should_quit: false,
            data,
        }
    }

    // ── Event loop ────────────────────────────────────────────────────────────

    /// Run the dashboard until `q`, `Q` or `Ctrl+C`.
    ///
    /// Uses `crossterm::event::poll` with a 250 ms timeout; the terminal is
    /// restored even when setup or drawing fails. Terminal failures surface
    /// as [`HrError::Terminal`].
    pub fn run(mut self) -> Result<()> {
        enable_raw_mode().map_err(terminal_error)?;
        let mut terminal = match enter_terminal() {
            Ok(terminal) => terminal,
            Err(e) => {
                let _ = execute!(io::stdout(), LeaveAlternateScreen);
                let _ = disable_raw_mode();
                return Err(terminal_error(e));
            }
        };

        let result = self.event_loop(&mut terminal);
        let restored = restore_terminal(&mut terminal);

        result.and(restored).map_err(terminal_error)
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> io::Result<()> {
        let tick_rate = Duration::from_millis(250);

        loop {
            if let Err(e) = terminal.draw(|frame| self.render(frame)) {
                break Err(e);
            }

            match event::poll(tick_rate) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => self.handle_key(key),
                    Ok(_) => {}
                    Err(e) => break Err(e),
                },
                Ok(false) => {}
                Err(e) => break Err(e),
            }

            if self.should_quit {
                break Ok(());
            }
        }
    }

    /// Apply one key press to the application state.
    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            KeyCode::Tab => self.tab = self.tab.next(),
            KeyCode::BackTab => self.tab = self.tab.previous(),
            KeyCode::Char(c @ '1'..='4') => {
                let idx = c as usize - '1' as usize;
                self.tab = Tab::ALL[idx];
            }
            KeyCode::Right if self.tab == Tab::Segments => self.cycle_segment(1),
            KeyCode::Left if self.tab == Tab::Segments => self.cycle_segment(-1),
            KeyCode::Char('e') | KeyCode::Char('E') => self.export(),
            _ => {}
        }
    }

    fn cycle_segment(&mut self, step: isize) {
        let n = self.data.segments.len();
        if n == 0 {
            return;
        }
        self.segment_index = (self.segment_index as isize + step).rem_euclid(n as isize) as usize;
    }

    /// Dimension currently selected on the Segments tab.
    pub fn selected_dimension(&self) -> Option<Dimension> {
        self.data.segments.get(self.segment_index).map(|(d, _)| *d)
    }

    /// Write the summary workbook and report the outcome on the status line.
    pub fn export(&mut self) {
        match write_summary_workbook(&self.export_path, &self.data.summaries) {
            Ok(()) => {
                info!("Dashboard export written to {}", self.export_path.display());
                self.status = Some(StatusLine {
                    text: format!(
                        "Exported {} months to {}",
                        self.data.summaries.len(),
                        self.export_path.display()
                    ),
                    is_error: false,
                });
            }
            Err(e) => {
                error!("Dashboard export failed: {}", e);
                self.status = Some(StatusLine {
                    text: e.to_string(),
                    is_error: true,
                });
            }
        }
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    /// Render the whole dashboard into `frame`.
    pub fn render(&self, frame: &mut Frame) {
        let [header_area, tabs_area, body_area, status_area] = Layout::vertical([
            Constraint::Length(4),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        let header = Header::new(
            &self.data.metadata.source,
            self.data.metadata.as_of,
            self.data.events.len(),
            &self.theme,
        );
        frame.render_widget(Paragraph::new(header.to_lines()), header_area);

        let tabs = Tabs::new(Tab::ALL.iter().map(|t| t.title()))
            .select(self.tab.index())
            .style(self.theme.tab_inactive)
            .highlight_style(self.theme.tab_active)
            .divider(Span::styled("|", self.theme.separator));
        frame.render_widget(tabs, tabs_area);

        if self.tab != Tab::Overview && self.data.summaries.is_empty() {
            table_view::render_no_data(frame, body_area, &self.theme);
        } else {
            match self.tab {
                Tab::Overview => self.render_overview(frame, body_area),
                Tab::Flows => self.render_flows(frame, body_area),
                Tab::Segments => self.render_segments(frame, body_area),
                Tab::Headcount => self.render_headcount(frame, body_area),
            }
        }

        frame.render_widget(Paragraph::new(self.status_line()), status_area);
    }

    fn status_line(&self) -> Line<'_> {
        match &self.status {
            Some(s) => {
                let style = if s.is_error {
                    self.theme.error
                } else {
                    self.theme.success
                };
                Line::from(Span::styled(s.text.clone(), style))
            }
            None => Line::from(Span::styled(
                "Tab/1-4 switch view · ←/→ segment · e export · q quit",
                self.theme.dim,
            )),
        }
    }

    fn render_overview(&self, frame: &mut Frame, area: Rect) {
        let snapshot = &self.data.snapshot;
        let [cards_area, indicator_area, locations_area] = Layout::vertical([
            Constraint::Length(4),
            Constraint::Length(2),
            Constraint::Min(0),
        ])
        .areas(area);

        let mut cards = vec![
            KpiCard::new("Headcount", format_count(snapshot.active), &self.theme),
            KpiCard::new("Men", format_count(snapshot.gender_count("Male")), &self.theme),
            KpiCard::new("Women", format_count(snapshot.gender_count("Female")), &self.theme),
        ];
        if let Some(latest) = self.data.latest() {
            cards.push(
                KpiCard::new("Turnover", format_percent(latest.turnover_rate, 1), &self.theme)
                    .with_value_style(self.theme.turnover_style(latest.turnover_rate))
                    .with_detail(Line::from(Span::styled(
                        latest.month.format("%b %Y").to_string(),
                        self.theme.dim,
                    ))),
            );
        }
        render_card_row(frame, cards_area, &cards);

        let n = self.data.summaries.len();
        if let Some(latest) = self.data.latest() {
            let previous = n.checked_sub(2).map(|i| &self.data.summaries[i]);
            let line = TurnoverIndicator::new(latest, previous, &self.theme).to_line();
            frame.render_widget(Paragraph::new(line), indicator_area);
        }

        let label_width = snapshot
            .by_location
            .iter()
            .map(|(l, _)| unicode_width::UnicodeWidthStr::width(l.as_str()))
            .max()
            .unwrap_or(0);
        let bar_width = share_bar_width(locations_area.width, label_width);
        let mut lines = vec![Line::from(Span::styled("Location", self.theme.bold))];
        lines.extend(snapshot.by_location.iter().map(|(loc, count)| {
            ShareBar::new(loc, *count, snapshot.active, &self.theme)
                .with_width(bar_width)
                .to_line(label_width)
        }));
        frame.render_widget(Paragraph::new(lines), locations_area);
    }

    fn render_flows(&self, frame: &mut Frame, area: Rect) {
        let summaries = &self.data.summaries;
        let [top, bottom] =
            Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(area);
        let [hires_area, terms_area] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(top);
        let [turnover_area, hire_rate_area] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .areas(bottom);

        charts::render_count_bars(
            frame,
            hires_area,
            "Hires per Month",
            &charts::count_values(summaries, |s| s.hires),
            self.theme.series_hires,
            &self.theme,
        );
        charts::render_count_bars(
            frame,
            terms_area,
            "Terminations per Month",
            &charts::count_values(summaries, |s| s.terminations),
            self.theme.series_terminations,
            &self.theme,
        );

        let turnover = [RateSeries {
            name: "Turnover Rate".to_string(),
            points: charts::rate_points(summaries, |s| s.turnover_rate),
            style: self.theme.series_turnover,
        }];
        charts::render_rate_chart(
            frame,
            turnover_area,
            "Turnover Rate",
            &turnover,
            charts::x_labels(summaries),
            &self.theme,
        );
        let hire_rate = [RateSeries {
            name: "Hire Rate".to_string(),
            points: charts::rate_points(summaries, |s| s.hire_rate),
            style: self.theme.series_hire_rate,
        }];
        charts::render_rate_chart(
            frame,
            hire_rate_area,
            "Hire Rate",
            &hire_rate,
            charts::x_labels(summaries),
            &self.theme,
        );
    }

    fn render_segments(&self, frame: &mut Frame, area: Rect) {
        let Some((dimension, rows)) = self.data.segments.get(self.segment_index) else {
            table_view::render_no_data(frame, area, &self.theme);
            return;
        };
        let [chart_area, table_area] =
            Layout::vertical([Constraint::Percentage(55), Constraint::Percentage(45)]).areas(area);

        let title = format!("← By {} →", dimension.label());
        charts::render_rate_chart(
            frame,
            chart_area,
            &title,
            &charts::segment_series(rows),
            charts::x_labels(&self.data.summaries),
            &self.theme,
        );
        table_view::render_segment_table(
            frame,
            table_area,
            &format!("{} breakdown", dimension.label()),
            rows,
            &self.theme,
        );
    }

    fn render_headcount(&self, frame: &mut Frame, area: Rect) {
        let [chart_area, table_area] =
            Layout::vertical([Constraint::Percentage(45), Constraint::Percentage(55)]).areas(area);
        charts::render_count_bars(
            frame,
            chart_area,
            "Headcount End per Month",
            &charts::count_values(&self.data.summaries, |s| s.headcount_end),
            self.theme.series_headcount,
            &self.theme,
        );
        table_view::render_summary_table(
            frame,
            table_area,
            "Headcount History",
            &self.data.summaries,
            &self.theme,
        );
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

// ── Terminal setup ────────────────────────────────────────────────────────────

fn enter_terminal() -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Terminal::new(CrosstermBackend::new(stdout))
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}

fn terminal_error(e: io::Error) -> HrError {
    HrError::Terminal(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use hr_core::models::{
        EmployeeEvent, MonthlySummary, SegmentBreakdown, WorkforceSnapshot,
    };
    use hr_data::analysis::AnalysisMetadata;
    use ratatui::backend::TestBackend;
    use tempfile::TempDir;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, m, day).unwrap()
    }

    fn summary(month: NaiveDate, hc: u32) -> MonthlySummary {
        MonthlySummary {
            month,
            headcount_end: hc,
            hires: 2,
            terminations: 1,
            turnover_rate: 0.01,
            hire_rate: 0.02,
            early_turnover_rate: 0.001,
        }
    }

    fn segment(month: NaiveDate, value: &str) -> SegmentBreakdown {
        SegmentBreakdown {
            month,
            value: value.to_string(),
            term_count: 1,
            rate: 0.01,
        }
    }

    fn data(summaries: Vec<MonthlySummary>) -> DashboardData {
        let months: Vec<NaiveDate> = summaries.iter().map(|s| s.month).collect();
        let seg = |values: &[&str]| -> Vec<SegmentBreakdown> {
            months
                .iter()
                .flat_map(|m| values.iter().map(move |v| segment(*m, v)))
                .collect()
        };
        DashboardData {
            events: vec![EmployeeEvent::default(); 3],
            segments: vec![
                (Dimension::Gender, seg(&["Male", "Female"])),
                (Dimension::CostCenter, seg(&["CC-1"])),
                (Dimension::ExitType, seg(&["Resignation"])),
            ],
            snapshot: WorkforceSnapshot {
                active: 120,
                by_gender: vec![("Male".to_string(), 70), ("Female".to_string(), 50)],
                by_location: vec![("Madrid".to_string(), 80), ("Lisbon".to_string(), 40)],
            },
            metadata: AnalysisMetadata {
                generated_at: "2023-03-31T00:00:00Z".to_string(),
                as_of: months.last().copied(),
                rows_loaded: 3,
                active_rows: 3,
                departed_rows: 0,
                months_covered: months.len(),
                source: "live".to_string(),
                demo: false,
                anonymization: None,
                load_time_seconds: 0.0,
                transform_time_seconds: 0.0,
            },
            summaries,
        }
    }

    fn app() -> App {
        App::new(
            "dark",
            data(vec![summary(d(1, 31), 100), summary(d(2, 28), 104), summary(d(3, 31), 103)]),
            PathBuf::from("Resumen_HR.xlsx"),
        )
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn rendered(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    // ── Keys ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_tab_cycles_forward_and_back() {
        let mut app = app();
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.tab, Tab::Flows);
        app.handle_key(key(KeyCode::BackTab));
        app.handle_key(key(KeyCode::BackTab));
        assert_eq!(app.tab, Tab::Headcount);
    }

    #[test]
    fn test_number_keys_select_tab() {
        let mut app = app();
        app.handle_key(key(KeyCode::Char('3')));
        assert_eq!(app.tab, Tab::Segments);
        app.handle_key(key(KeyCode::Char('1')));
        assert_eq!(app.tab, Tab::Overview);
    }

    #[test]
    fn test_arrows_cycle_segments_only_on_segments_tab() {
        let mut app = app();
        app.handle_key(key(KeyCode::Right));
        assert_eq!(app.segment_index, 0);

        app.handle_key(key(KeyCode::Char('3')));
        app.handle_key(key(KeyCode::Right));
        assert_eq!(app.selected_dimension(), Some(Dimension::CostCenter));
        app.handle_key(key(KeyCode::Left));
        app.handle_key(key(KeyCode::Left));
        assert_eq!(app.selected_dimension(), Some(Dimension::ExitType));
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app();
        app.handle_key(key(KeyCode::Char('q')));
        assert!(app.should_quit);

        let mut app = self::app();
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);

        let mut app = self::app();
        app.handle_key(key(KeyCode::Char('c')));
        assert!(!app.should_quit);
    }

    // ── Export ────────────────────────────────────────────────────────────────

    #[test]
    fn test_export_key_writes_workbook_and_reports() {
        let dir = TempDir::new().unwrap();
        let mut app = app();
        app.export_path = dir.path().join("Resumen_HR.xlsx");
        app.handle_key(key(KeyCode::Char('e')));

        assert!(app.export_path.exists());
        let status = app.status.clone().unwrap();
        assert!(!status.is_error);
        assert!(status.text.starts_with("Exported 3 months"));
    }

    #[test]
    fn test_export_failure_is_reported() {
        let dir = TempDir::new().unwrap();
        let mut app = app();
        app.export_path = dir.path().join("missing").join("out.xlsx");
        app.export();
        assert!(app.status.unwrap().is_error);
    }

    // ── Render ────────────────────────────────────────────────────────────────

    #[test]
    fn test_render_overview() {
        let content = rendered(&app());
        assert!(content.contains("HR WORKFORCE DASHBOARD"));
        assert!(content.contains("Headcount"));
        assert!(content.contains("Women"));
        assert!(content.contains("Madrid"));
        assert!(content.contains("q quit"));
    }

    #[test]
    fn test_render_every_tab() {
        let mut app = app();
        for tab in Tab::ALL {
            app.tab = tab;
            let content = rendered(&app);
            assert!(content.contains("Overview"), "tab bar missing on {tab:?}");
        }
        app.tab = Tab::Segments;
        assert!(rendered(&app).contains("By Gender"));
        app.tab = Tab::Headcount;
        assert!(rendered(&app).contains("Mar 2023"));
    }

    #[test]
    fn test_render_without_months_shows_placeholder() {
        let mut app = App::new("classic", data(Vec::new()), PathBuf::from("x.xlsx"));
        app.tab = Tab::Flows;
        assert!(rendered(&app).contains("No months to show"));
        app.tab = Tab::Overview;
        assert!(rendered(&app).contains("no months tracked"));
    }

    #[test]
    fn test_terminal_failures_map_to_terminal_error() {
        let err = terminal_error(io::Error::new(io::ErrorKind::BrokenPipe, "tty closed"));
        assert!(matches!(err, HrError::Terminal(ref msg) if msg == "tty closed"));
        assert_eq!(err.to_string(), "Terminal error: tty closed");
    }
}
