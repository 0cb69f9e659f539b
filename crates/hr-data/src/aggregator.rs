//! Monthly and per-segment workforce aggregation.

use std::collections::HashMap;

use chrono::NaiveDate;
use hr_core::calculations::{MonthCounts, RateCalculator};
use hr_core::models::{Dimension, EmployeeEvent, MonthlySummary, SegmentBreakdown, WorkforceSnapshot};
use tracing::debug;

use crate::source::WorkforceSource;

/// Stateless helper that turns a [`WorkforceSource`] into summary records.
pub struct WorkforceAggregator;

impl WorkforceAggregator {
    /// One [`MonthlySummary`] per entry of `month_ends`, in the same order.
    ///
    /// Each month queries headcount, hires and terminations in that order,
    /// then the rates are folded over the previous month's headcount.
    pub fn monthly_summaries(
        source: &mut dyn WorkforceSource,
        month_ends: &[NaiveDate],
    ) -> Vec<MonthlySummary> {
        let counts: Vec<MonthCounts> = month_ends
            .iter()
            .map(|&month| {
                let headcount_end = source.headcount_at(month);
                let hires = source.hires_in(month);
                let terminations = source.terminations_in(month);
                MonthCounts {
                    month,
                    headcount_end,
                    hires,
                    terminations,
                }
            })
            .collect();

        debug!(
            "Counted {} months from the {} source",
            counts.len(),
            source.name()
        );
        RateCalculator::summarize(counts)
    }

    /// Termination breakdown of `dimension`, month-major.
    ///
    /// Segment values are the distinct non-null values of `dimension` in
    /// `events`; rates divide by the matching summary's ending headcount.
    pub fn segment_breakdown(
        source: &mut dyn WorkforceSource,
        events: &[EmployeeEvent],
        dimension: Dimension,
        summaries: &[MonthlySummary],
    ) -> Vec<SegmentBreakdown> {
        let values = Self::distinct_values(events, dimension);
        let mut out = Vec::with_capacity(values.len() * summaries.len());

        for summary in summaries {
            for value in &values {
                let term_count = source.segment_terminations(dimension, value, summary.month);
                out.push(SegmentBreakdown {
                    month: summary.month,
                    value: value.clone(),
                    term_count,
                    rate: RateCalculator::segment_rate(term_count, summary.headcount_end),
                });
            }
        }
        out
    }

    /// Distinct non-null values of `dimension`, in first-seen order.
    pub fn distinct_values(events: &[EmployeeEvent], dimension: Dimension) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        events
            .iter()
            .filter_map(|e| e.value(dimension))
            .filter(|v| seen.insert(*v))
            .map(str::to_string)
            .collect()
    }

    /// Current active employees, overall and by gender and location.
    pub fn snapshot(events: &[EmployeeEvent]) -> WorkforceSnapshot {
        let active: Vec<&EmployeeEvent> = events.iter().filter(|e| e.is_active()).collect();
        WorkforceSnapshot {
            active: u32::try_from(active.len()).unwrap_or(u32::MAX),
            by_gender: count_by(&active, Dimension::Gender),
            by_location: count_by(&active, Dimension::Location),
        }
    }
}

/// Group counts for `dimension`, largest first; ties keep first-seen order.
fn count_by(events: &[&EmployeeEvent], dimension: Dimension) -> Vec<(String, u32)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(String, u32)> = Vec::new();
    for value in events.iter().filter_map(|e| e.value(dimension)) {
        match index.get(value) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(value, counts.len());
                counts.push((value.to_string(), 1));
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}
