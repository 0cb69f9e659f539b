use chrono::NaiveDate;

use crate::models::MonthlySummary;

/// Share of terminations counted as early turnover.
pub const EARLY_TURNOVER_SHARE: f64 = 0.1;

/// Raw counts for one month before any rate is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthCounts {
    pub month: NaiveDate,
    pub headcount_end: u32,
    pub hires: u32,
    pub terminations: u32,
}

/// State carried from one month to the next while folding summaries.
///
/// Holds the previous month's ending headcount; `None` before the first month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FoldState {
    pub previous_headcount: Option<u32>,
}

// ── RateCalculator ────────────────────────────────────────────────────────────

/// Stateless collection of workforce rate calculations.
pub struct RateCalculator;

impl RateCalculator {
    /// `numerator / denominator`, or `0.0` when the denominator is zero.
    pub fn ratio(numerator: f64, denominator: f64) -> f64 {
        if denominator == 0.0 {
            0.0
        } else {
            numerator / denominator
        }
    }

    /// Mean of this month's and the previous month's ending headcount.
    ///
    /// The first month has no predecessor and is averaged with itself.
    pub fn average_headcount(current: u32, previous: Option<u32>) -> f64 {
        let previous = previous.unwrap_or(current);
        (f64::from(current) + f64::from(previous)) / 2.0
    }

    /// Termination rate of a segment against the month's total ending headcount.
    pub fn segment_rate(term_count: u32, headcount_end: u32) -> f64 {
        Self::ratio(f64::from(term_count), f64::from(headcount_end))
    }

    /// Fold one month into a [`MonthlySummary`].
    ///
    /// Takes the accumulator from the previous month and returns the summary
    /// together with the accumulator for the next one.
    pub fn summarize_month(state: FoldState, counts: MonthCounts) -> (MonthlySummary, FoldState) {
        let avg = Self::average_headcount(counts.headcount_end, state.previous_headcount);
        let hires = f64::from(counts.hires);
        let terms = f64::from(counts.terminations);

        let summary = MonthlySummary {
            month: counts.month,
            headcount_end: counts.headcount_end,
            hires: counts.hires,
            terminations: counts.terminations,
            turnover_rate: Self::ratio(terms, avg),
            hire_rate: Self::ratio(hires, avg),
            early_turnover_rate: Self::ratio(terms * EARLY_TURNOVER_SHARE, avg),
        };
        let next = FoldState {
            previous_headcount: Some(counts.headcount_end),
        };
        (summary, next)
    }

    /// Fold an ordered sequence of month counts into summaries.
    pub fn summarize(counts: impl IntoIterator<Item = MonthCounts>) -> Vec<MonthlySummary> {
        let mut state = FoldState::default();
        let mut out = Vec::new();
        for c in counts {
            let (summary, next) = Self::summarize_month(state, c);
            out.push(summary);
            state = next;
        }
        out
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
