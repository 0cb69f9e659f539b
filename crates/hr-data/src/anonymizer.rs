//! Demo-mode anonymization of the unified employee table.
//!
//! Cost centers and locations are replaced by sequential pseudonyms, and hire
//! and exit dates are jittered by a bounded random number of days. The table
//! keeps its row count, its columns and its active/departed partition.

use std::collections::HashMap;

use chrono::Duration;
use hr_core::models::EmployeeEvent;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Largest absolute date shift, in days.
pub const MAX_DATE_SHIFT_DAYS: i64 = 180;

/// What [`anonymize`] changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnonymizationReport {
    /// Distinct cost-center pseudonyms issued, excluding the unknown label.
    pub cost_center_labels: usize,
    /// Distinct location pseudonyms issued, excluding the unknown label.
    pub location_labels: usize,
    pub hire_dates_shifted: usize,
    pub exit_dates_shifted: usize,
}

/// First-seen mapping from real values to `<prefix>_<n>` labels.
#[derive(Debug)]
struct Pseudonymizer {
    prefix: &'static str,
    labels: HashMap<String, String>,
}

impl Pseudonymizer {
    fn new(prefix: &'static str) -> Self {
        Self {
            prefix,
            labels: HashMap::new(),
        }
    }

    fn label(&mut self, value: Option<&str>) -> String {
        let Some(value) = value else {
            return format!("{}_Unknown", self.prefix);
        };
        let next = self.labels.len() + 1;
        let prefix = self.prefix;
        self.labels
            .entry(value.to_string())
            .or_insert_with(|| format!("{}_{}", prefix, next))
            .clone()
    }

    fn issued(&self) -> usize {
        self.labels.len()
    }
}

/// Anonymize `events` in place using `rng`.
///
/// Every row gets a hire-date offset drawn first, then every row with a last
/// day of work gets its own exit offset. Offsets are uniform over
/// `[-MAX_DATE_SHIFT_DAYS, MAX_DATE_SHIFT_DAYS]`; null dates stay null.
pub fn anonymize<R: Rng + ?Sized>(
    events: &mut [EmployeeEvent],
    rng: &mut R,
) -> AnonymizationReport {
    let mut cost_centers = Pseudonymizer::new("CC");
    let mut locations = Pseudonymizer::new("LOC");

    for event in events.iter_mut() {
        event.cost_center = Some(cost_centers.label(event.cost_center.as_deref()));
        event.location = Some(locations.label(event.location.as_deref()));
    }

    let mut report = AnonymizationReport {
        cost_center_labels: cost_centers.issued(),
        location_labels: locations.issued(),
        ..Default::default()
    };

    for event in events.iter_mut() {
        let offset = draw_offset(rng);
        if let Some(hire) = event.hire_date {
            event.hire_date = hire.checked_add_signed(offset).or(Some(hire));
            report.hire_dates_shifted += 1;
        }
    }

    for event in events.iter_mut() {
        if let Some(last) = event.last_day_of_work {
            let offset = draw_offset(rng);
            event.last_day_of_work = last.checked_add_signed(offset).or(Some(last));
            report.exit_dates_shifted += 1;
        }
    }

    info!(
        "Anonymized {} rows: {} cost centers, {} locations, {} hire and {} exit dates shifted",
        events.len(),
        report.cost_center_labels,
        report.location_labels,
        report.hire_dates_shifted,
        report.exit_dates_shifted
    );
    report
}

fn draw_offset<R: Rng + ?Sized>(rng: &mut R) -> Duration {
    Duration::days(rng.gen_range(-MAX_DATE_SHIFT_DAYS..=MAX_DATE_SHIFT_DAYS))
}
