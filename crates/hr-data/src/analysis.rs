//! Main analysis pipeline for the HR dashboard.
//!
//! Orchestrates unification, optional anonymization, the monthly fold and the
//! segment breakdowns, returning a [`DashboardData`] bundle ready for the UI
//! layer and the exporter.

use std::path::Path;
use std::time::Instant;

use chrono::{Local, NaiveDate, Utc};
use hr_core::error::Result;
use hr_core::models::{Dimension, EmployeeEvent, MonthlySummary, SegmentBreakdown, WorkforceSnapshot};
use hr_core::time_utils::month_ends;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::aggregator::WorkforceAggregator;
use crate::anonymizer::{anonymize, AnonymizationReport};
use crate::reader::{load_inputs, unify, RawTable};
use crate::source::{LiveSource, SyntheticSource, WorkforceSource};

// ── Public types ──────────────────────────────────────────────────────────────

/// Knobs for [`analyze_workforce`].
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// Anonymize the table and synthesize the monthly figures.
    pub demo: bool,
    pub seed: u64,
    /// Any day in the first tracked month.
    pub start: NaiveDate,
    /// Any day in the last tracked month.
    pub today: NaiveDate,
    /// Dimensions to break terminations down by.
    pub dimensions: Vec<Dimension>,
}

impl AnalysisOptions {
    pub fn new(start: NaiveDate) -> Self {
        Self {
            demo: false,
            seed: 42,
            start,
            today: Local::now().date_naive(),
            dimensions: Dimension::DASHBOARD.to_vec(),
        }
    }

    pub fn demo(mut self, demo: bool) -> Self {
        self.demo = demo;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn dimensions(mut self, dimensions: Vec<Dimension>) -> Self {
        self.dimensions = dimensions;
        self
    }
}

/// Metadata produced alongside the dashboard data.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AnalysisMetadata {
    /// ISO-8601 timestamp when this result was generated.
    pub generated_at: String,
    /// Last tracked month-end.
    pub as_of: Option<NaiveDate>,
    pub rows_loaded: usize,
    pub active_rows: usize,
    pub departed_rows: usize,
    pub months_covered: usize,
    /// `"live"` or `"demo"`.
    pub source: String,
    pub demo: bool,
    /// Present when the table was anonymized.
    pub anonymization: Option<AnonymizationReport>,
    /// Wall-clock seconds spent merging the input tables.
    pub load_time_seconds: f64,
    /// Wall-clock seconds spent aggregating.
    pub transform_time_seconds: f64,
}

/// The complete output of [`analyze_workforce`].
#[derive(Debug, Clone)]
pub struct DashboardData {
    /// Unified (possibly anonymized) employee table.
    pub events: Vec<EmployeeEvent>,
    pub summaries: Vec<MonthlySummary>,
    /// One breakdown per requested dimension, in request order.
    pub segments: Vec<(Dimension, Vec<SegmentBreakdown>)>,
    pub snapshot: WorkforceSnapshot,
    pub metadata: AnalysisMetadata,
}

impl DashboardData {
    /// Breakdown for `dimension`, empty if it was not requested.
    pub fn segment(&self, dimension: Dimension) -> &[SegmentBreakdown] {
        self.segments
            .iter()
            .find(|(d, _)| *d == dimension)
            .map(|(_, rows)| rows.as_slice())
            .unwrap_or(&[])
    }

    /// Most recent monthly summary.
    pub fn latest(&self) -> Option<&MonthlySummary> {
        self.summaries.last()
    }

    /// Distinct segment values of `dimension`, in breakdown order.
    pub fn segment_values(&self, dimension: Dimension) -> Vec<&str> {
        let rows = self.segment(dimension);
        match rows.first() {
            Some(first) => rows
                .iter()
                .take_while(|r| r.month == first.month)
                .map(|r| r.value.as_str())
                .collect(),
            None => Vec::new(),
        }
    }
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Run the full analysis pipeline over two raw tables.
///
/// 1. Unify the active and departed tables.
/// 2. In demo mode, anonymize the table with a seeded RNG.
/// 3. Pick the live or synthetic source once.
/// 4. Fold the monthly summaries.
/// 5. Break terminations down per dimension.
/// 6. Take the active-workforce snapshot.
pub fn analyze_workforce(
    active: &RawTable,
    departed: &RawTable,
    options: &AnalysisOptions,
) -> Result<DashboardData> {
    // ── Step 1: Unify ─────────────────────────────────────────────────────────
    let load_start = Instant::now();
    let mut events = unify(active, departed)?;
    let load_time = load_start.elapsed().as_secs_f64();

    // ── Step 2-3: Anonymize and pick source ───────────────────────────────────
    let transform_start = Instant::now();
    let mut anonymization = None;
    let mut synthetic = if options.demo {
        let mut rng = StdRng::seed_from_u64(options.seed);
        anonymization = Some(anonymize(&mut events, &mut rng));
        Some(SyntheticSource::new(rng))
    } else {
        None
    };
    let mut live = LiveSource::new(&events);
    let source: &mut dyn WorkforceSource = match synthetic.as_mut() {
        Some(s) => s,
        None => &mut live,
    };

    // ── Step 4: Monthly fold ──────────────────────────────────────────────────
    let months = month_ends(options.start, options.today);
    let summaries = WorkforceAggregator::monthly_summaries(source, &months);

    // ── Step 5: Segments ──────────────────────────────────────────────────────
    let segments: Vec<(Dimension, Vec<SegmentBreakdown>)> = options
        .dimensions
        .iter()
        .map(|&dim| {
            let rows = WorkforceAggregator::segment_breakdown(source, &events, dim, &summaries);
            (dim, rows)
        })
        .collect();
    let source_name = source.name().to_string();

    // ── Step 6: Snapshot ──────────────────────────────────────────────────────
    let snapshot = WorkforceAggregator::snapshot(&events);
    let transform_time = transform_start.elapsed().as_secs_f64();

    let metadata = AnalysisMetadata {
        generated_at: Utc::now().to_rfc3339(),
        as_of: summaries.last().map(|s| s.month),
        rows_loaded: events.len(),
        active_rows: active.rows.len(),
        departed_rows: departed.rows.len(),
        months_covered: summaries.len(),
        source: source_name,
        demo: options.demo,
        anonymization,
        load_time_seconds: load_time,
        transform_time_seconds: transform_time,
    };

    info!(
        "Analysis complete: {} rows, {} months, {} source",
        metadata.rows_loaded, metadata.months_covered, metadata.source
    );

    Ok(DashboardData {
        events,
        summaries,
        segments,
        snapshot,
        metadata,
    })
}

/// Read both sheets from disk, then run [`analyze_workforce`].
pub fn analyze_workbooks(
    active_path: &Path,
    active_sheet: &str,
    departed_path: &Path,
    departed_sheet: &str,
    options: &AnalysisOptions,
) -> Result<DashboardData> {
    let (active, departed) = load_inputs(active_path, active_sheet, departed_path, departed_sheet)?;
    analyze_workforce(&active, &departed, options)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::CellValue;
    use hr_core::models::{CORE_COLUMNS, DEPARTED_COLUMNS};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn row(id: &str, gender: &str, hire: &str, cc: &str, loc: &str) -> Vec<CellValue> {
        vec![
            text(id),
            CellValue::Empty,
            text(gender),
            text(hire),
            text("Ops"),
            text("ES"),
            text("ALMACEN"),
            text("North"),
            text(cc),
            text(loc),
            text("L1"),
        ]
    }

    fn inputs() -> (RawTable, RawTable) {
        let active = RawTable::new(
            "HC",
            CORE_COLUMNS.iter().map(|s| s.to_string()).collect(),
            vec![
                row("1", "Male", "2023-03-02", "CC-1", "Madrid"),
                row("2", "Male", "2021-06-01", "CC-2", "Lisbon"),
                row("3", "Female", "2022-01-10", "CC-1", "Madrid"),
            ],
        );
        let mut leaver = row("4", "Male", "2020-01-15", "CC-3", "Porto");
        leaver.push(text("2023-03-15"));
        leaver.push(text("Resignation"));
        let departed = RawTable::new(
            "Bajas",
            CORE_COLUMNS
                .iter()
                .chain(DEPARTED_COLUMNS.iter())
                .map(|s| s.to_string())
                .collect(),
            vec![leaver],
        );
        (active, departed)
    }

    fn options() -> AnalysisOptions {
        AnalysisOptions::new(d(2022, 1, 1)).today(d(2023, 6, 10))
    }

    #[test]
    fn test_end_to_end_live() {
        let (active, departed) = inputs();
        let data = analyze_workforce(&active, &departed, &options()).unwrap();

        assert_eq!(data.events.len(), 4);
        assert_eq!(data.summaries.len(), 18);
        assert_eq!(data.metadata.months_covered, 18);
        assert_eq!(data.metadata.as_of, Some(d(2023, 6, 30)));
        assert_eq!(data.metadata.source, "live");
        assert!(data.metadata.anonymization.is_none());

        let march = data
            .summaries
            .iter()
            .find(|s| s.month == d(2023, 3, 31))
            .unwrap();
        assert_eq!(march.terminations, 1);
        assert_eq!(march.hires, 1);

        let gender_march: Vec<_> = data
            .segment(Dimension::Gender)
            .iter()
            .filter(|r| r.month == d(2023, 3, 31))
            .map(|r| (r.value.as_str(), r.term_count))
            .collect();
        assert_eq!(gender_march, vec![("Male", 1), ("Female", 0)]);
    }

    #[test]
    fn test_snapshot_and_segments_present() {
        let (active, departed) = inputs();
        let data = analyze_workforce(&active, &departed, &options()).unwrap();

        assert_eq!(data.snapshot.active, 3);
        assert_eq!(data.snapshot.gender_count("Male"), 2);
        assert_eq!(data.snapshot.gender_count("Female"), 1);
        assert_eq!(data.segments.len(), 3);
        assert_eq!(data.segment_values(Dimension::CostCenter), vec!["CC-1", "CC-2", "CC-3"]);
        assert_eq!(data.segment_values(Dimension::ExitType), vec!["Resignation"]);
        assert!(data.segment(Dimension::Area).is_empty());
    }

    #[test]
    fn test_demo_mode_is_seeded_and_anonymized() {
        let (active, departed) = inputs();
        let opts = options().demo(true).seed(42);
        let a = analyze_workforce(&active, &departed, &opts).unwrap();
        let b = analyze_workforce(&active, &departed, &opts).unwrap();

        assert_eq!(a.summaries, b.summaries);
        assert_eq!(a.events, b.events);
        assert_eq!(a.metadata.source, "demo");
        assert_eq!(a.segment_values(Dimension::CostCenter), vec!["CC_1", "CC_2", "CC_3"]);
        assert!(a.summaries.iter().all(|s| (80..200).contains(&s.headcount_end)));

        let report = a.metadata.anonymization.unwrap();
        assert_eq!(report.location_labels, 3);
        assert_eq!(a.events.iter().filter(|e| e.is_active()).count(), 3);
    }

    #[test]
    fn test_demo_mode_different_seed_differs() {
        let (active, departed) = inputs();
        let a = analyze_workforce(&active, &departed, &options().demo(true).seed(1)).unwrap();
        let b = analyze_workforce(&active, &departed, &options().demo(true).seed(2)).unwrap();
        assert_ne!(a.summaries, b.summaries);
    }

    #[test]
    fn test_start_after_today_yields_no_months() {
        let (active, departed) = inputs();
        let opts = AnalysisOptions::new(d(2024, 1, 1)).today(d(2023, 1, 1));
        let data = analyze_workforce(&active, &departed, &opts).unwrap();
        assert!(data.summaries.is_empty());
        assert!(data.latest().is_none());
        assert!(data.segment(Dimension::Gender).is_empty());
    }

    #[test]
    fn test_schema_error_aborts() {
        let (mut active, departed) = inputs();
        active.headers.retain(|h| h != "COST CENTER");
        assert!(analyze_workforce(&active, &departed, &options()).is_err());
    }

    #[test]
    fn test_custom_dimensions() {
        let (active, departed) = inputs();
        let opts = options().dimensions(vec![Dimension::Location]);
        let data = analyze_workforce(&active, &departed, &opts).unwrap();
        assert_eq!(data.segments.len(), 1);
        assert_eq!(data.segment_values(Dimension::Location), vec!["Madrid", "Lisbon", "Porto"]);
    }
}
