//! Where monthly workforce figures come from.
//!
//! [`LiveSource`] counts events in the unified employee table;
//! [`SyntheticSource`] draws plausible figures from a seeded RNG for demos.
//! The analysis pipeline picks one of them once and aggregates through the
//! [`WorkforceSource`] trait.

use chrono::NaiveDate;
use hr_core::models::{Dimension, EmployeeEvent};
use hr_core::time_utils::in_month;
use rand::rngs::StdRng;
use rand::Rng;

/// Synthetic month-end headcount range.
pub const DEMO_HEADCOUNT: std::ops::Range<u32> = 80..200;
/// Synthetic monthly hires and terminations range.
pub const DEMO_FLOW: std::ops::Range<u32> = 0..30;
/// Synthetic per-segment termination range.
pub const DEMO_SEGMENT: std::ops::Range<u32> = 0..10;

/// Monthly workforce figures keyed by month-end date.
///
/// Methods take `&mut self` so synthetic sources can advance their RNG.
pub trait WorkforceSource {
    /// Short name for logs and the dashboard header.
    fn name(&self) -> &'static str;

    /// Employees on payroll at the end of the month.
    fn headcount_at(&mut self, month_end: NaiveDate) -> u32;

    /// Employees hired during the calendar month.
    fn hires_in(&mut self, month_end: NaiveDate) -> u32;

    /// Employees whose last day of work falls in the calendar month.
    fn terminations_in(&mut self, month_end: NaiveDate) -> u32;

    /// Terminations during the month whose `dimension` equals `value`.
    fn segment_terminations(&mut self, dimension: Dimension, value: &str, month_end: NaiveDate)
        -> u32;
}

// ── LiveSource ────────────────────────────────────────────────────────────────

/// Answers from the unified employee table.
#[derive(Debug, Clone, Copy)]
pub struct LiveSource<'a> {
    events: &'a [EmployeeEvent],
}

impl<'a> LiveSource<'a> {
    pub fn new(events: &'a [EmployeeEvent]) -> Self {
        Self { events }
    }

    fn count(&self, pred: impl Fn(&EmployeeEvent) -> bool) -> u32 {
        u32::try_from(self.events.iter().filter(|e| pred(e)).count()).unwrap_or(u32::MAX)
    }
}

impl WorkforceSource for LiveSource<'_> {
    fn name(&self) -> &'static str {
        "live"
    }

    fn headcount_at(&mut self, month_end: NaiveDate) -> u32 {
        self.count(|e| {
            e.hire_date.is_some_and(|h| h <= month_end)
                && e.last_day_of_work.map_or(true, |l| l > month_end)
        })
    }

    fn hires_in(&mut self, month_end: NaiveDate) -> u32 {
        self.count(|e| e.hire_date.is_some_and(|h| in_month(h, month_end)))
    }

    fn terminations_in(&mut self, month_end: NaiveDate) -> u32 {
        self.count(|e| e.last_day_of_work.is_some_and(|l| in_month(l, month_end)))
    }

    fn segment_terminations(
        &mut self,
        dimension: Dimension,
        value: &str,
        month_end: NaiveDate,
    ) -> u32 {
        self.count(|e| {
            e.last_day_of_work.is_some_and(|l| in_month(l, month_end))
                && e.value(dimension) == Some(value)
        })
    }
}

// ── SyntheticSource ───────────────────────────────────────────────────────────

/// Draws every figure independently from an owned RNG.
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    rng: StdRng,
}

impl SyntheticSource {
    pub fn new(rng: StdRng) -> Self {
        Self { rng }
    }
}

impl WorkforceSource for SyntheticSource {
    fn name(&self) -> &'static str {
        "demo"
    }

    fn headcount_at(&mut self, _month_end: NaiveDate) -> u32 {
        self.rng.gen_range(DEMO_HEADCOUNT)
    }

    fn hires_in(&mut self, _month_end: NaiveDate) -> u32 {
        self.rng.gen_range(DEMO_FLOW)
    }

    fn terminations_in(&mut self, _month_end: NaiveDate) -> u32 {
        self.rng.gen_range(DEMO_FLOW)
    }

    fn segment_terminations(
        &mut self,
        _dimension: Dimension,
        _value: &str,
        _month_end: NaiveDate,
    ) -> u32 {
        self.rng.gen_range(DEMO_SEGMENT)
    }
}
