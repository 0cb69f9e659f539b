use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ── Source columns ────────────────────────────────────────────────────────────

/// Employee identifier column.
pub const COL_EMPLOYEE: &str = "N. EMPLOYEE";
/// Birth date column.
pub const COL_BIRTH_DATE: &str = "DATE OF BIRTH";
/// Gender column.
pub const COL_GENDER: &str = "GENDER";
/// Hire date column.
pub const COL_HIRE_DATE: &str = "HIRE DATE";
/// Function column.
pub const COL_FUNCTION: &str = "FUNCTION";
/// Country (P&L) column.
pub const COL_COUNTRY: &str = "COUNTRY P&L";
/// Job category column (administrative / warehouse / trainee).
pub const COL_JOB_CATEGORY: &str = "ADMINISTRATIVO - ALMACEN - TRAINEE";
/// Area column.
pub const COL_AREA: &str = "AREA";
/// Cost center column.
pub const COL_COST_CENTER: &str = "COST CENTER";
/// Location column.
pub const COL_LOCATION: &str = "LOCATION";
/// Job level column.
pub const COL_JOB_LEVEL: &str = "JOB LEVEL";
/// Last day of work column (departed sheet only).
pub const COL_LAST_DAY: &str = "LAST DAY OF WORK";
/// Exit type column (departed sheet only).
pub const COL_EXIT_TYPE: &str = "EXIT TYPE";

/// Columns both input sheets must carry, in output order.
pub const CORE_COLUMNS: [&str; 11] = [
    COL_EMPLOYEE,
    COL_BIRTH_DATE,
    COL_GENDER,
    COL_HIRE_DATE,
    COL_FUNCTION,
    COL_COUNTRY,
    COL_JOB_CATEGORY,
    COL_AREA,
    COL_COST_CENTER,
    COL_LOCATION,
    COL_JOB_LEVEL,
];

/// Extra columns only the departed-employee sheet carries.
pub const DEPARTED_COLUMNS: [&str; 2] = [COL_LAST_DAY, COL_EXIT_TYPE];

// ── EmployeeEvent ─────────────────────────────────────────────────────────────

/// One row of the unified employee table.
///
/// Active employees have `last_day_of_work == None` and `exit_type == None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmployeeEvent {
    pub employee_id: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub function: Option<String>,
    pub country: Option<String>,
    pub job_category: Option<String>,
    pub area: Option<String>,
    pub cost_center: Option<String>,
    pub location: Option<String>,
    pub job_level: Option<String>,
    pub last_day_of_work: Option<NaiveDate>,
    pub exit_type: Option<String>,
}

impl EmployeeEvent {
    /// `true` while the employee has no recorded last day of work.
    pub fn is_active(&self) -> bool {
        self.last_day_of_work.is_none()
    }

    /// Categorical value of this row for `dimension`.
    pub fn value(&self, dimension: Dimension) -> Option<&str> {
        let field = match dimension {
            Dimension::Gender => &self.gender,
            Dimension::Function => &self.function,
            Dimension::Country => &self.country,
            Dimension::JobCategory => &self.job_category,
            Dimension::Area => &self.area,
            Dimension::CostCenter => &self.cost_center,
            Dimension::Location => &self.location,
            Dimension::JobLevel => &self.job_level,
            Dimension::ExitType => &self.exit_type,
        };
        field.as_deref()
    }
}

// ── Dimension ─────────────────────────────────────────────────────────────────

/// A categorical column that terminations can be broken down by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Gender,
    Function,
    Country,
    JobCategory,
    Area,
    CostCenter,
    Location,
    JobLevel,
    ExitType,
}

impl Dimension {
    /// Every categorical dimension of the unified table.
    pub const ALL: [Dimension; 9] = [
        Dimension::Gender,
        Dimension::Function,
        Dimension::Country,
        Dimension::JobCategory,
        Dimension::Area,
        Dimension::CostCenter,
        Dimension::Location,
        Dimension::JobLevel,
        Dimension::ExitType,
    ];

    /// The dimensions the dashboard breaks terminations down by.
    pub const DASHBOARD: [Dimension; 3] =
        [Dimension::Gender, Dimension::CostCenter, Dimension::ExitType];

    /// Source column header for this dimension.
    pub fn column(&self) -> &'static str {
        match self {
            Dimension::Gender => COL_GENDER,
            Dimension::Function => COL_FUNCTION,
            Dimension::Country => COL_COUNTRY,
            Dimension::JobCategory => COL_JOB_CATEGORY,
            Dimension::Area => COL_AREA,
            Dimension::CostCenter => COL_COST_CENTER,
            Dimension::Location => COL_LOCATION,
            Dimension::JobLevel => COL_JOB_LEVEL,
            Dimension::ExitType => COL_EXIT_TYPE,
        }
    }

    /// Short human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Dimension::Gender => "Gender",
            Dimension::Function => "Function",
            Dimension::Country => "Country",
            Dimension::JobCategory => "Job Category",
            Dimension::Area => "Area",
            Dimension::CostCenter => "Cost Center",
            Dimension::Location => "Location",
            Dimension::JobLevel => "Job Level",
            Dimension::ExitType => "Exit Type",
        }
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ── Derived records ───────────────────────────────────────────────────────────

/// Workforce KPIs for a single month-end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummary {
    /// Last calendar day of the month.
    pub month: NaiveDate,
    pub headcount_end: u32,
    pub hires: u32,
    pub terminations: u32,
    pub turnover_rate: f64,
    pub hire_rate: f64,
    pub early_turnover_rate: f64,
}

/// Termination count for one segment value in one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentBreakdown {
    pub month: NaiveDate,
    pub value: String,
    pub term_count: u32,
    /// `term_count / headcount_end` of the same month, `0.0` on empty months.
    pub rate: f64,
}

/// Live KPI card figures taken from the unified table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkforceSnapshot {
    /// Employees without a last day of work.
    pub active: u32,
    /// Active employees per gender, largest group first.
    pub by_gender: Vec<(String, u32)>,
    /// Active employees per location, largest group first.
    pub by_location: Vec<(String, u32)>,
}

impl WorkforceSnapshot {
    /// Active count for one gender label, `0` when absent.
    pub fn gender_count(&self, gender: &str) -> u32 {
        self.by_gender
            .iter()
            .find(|(g, _)| g == gender)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_employee_is_active_without_last_day() {
        let e = EmployeeEvent::default();
        assert!(e.is_active());

        let departed = EmployeeEvent {
            last_day_of_work: NaiveDate::from_ymd_opt(2023, 3, 15),
            exit_type: Some("Resignation".to_string()),
            ..Default::default()
        };
        assert!(!departed.is_active());
    }

    #[test]
    fn test_employee_value_by_dimension() {
        let e = EmployeeEvent {
            gender: Some("Female".to_string()),
            cost_center: Some("CC-100".to_string()),
            exit_type: None,
            ..Default::default()
        };
        assert_eq!(e.value(Dimension::Gender), Some("Female"));
        assert_eq!(e.value(Dimension::CostCenter), Some("CC-100"));
        assert_eq!(e.value(Dimension::ExitType), None);
    }

    #[test]
    fn test_dashboard_dimensions() {
        assert_eq!(
            Dimension::DASHBOARD,
            [Dimension::Gender, Dimension::CostCenter, Dimension::ExitType]
        );
    }

    #[test]
    fn test_dimension_display() {
        assert_eq!(Dimension::CostCenter.to_string(), "Cost Center");
        assert_eq!(Dimension::ExitType.to_string(), "Exit Type");
    }

    #[test]
    fn test_core_columns_are_distinct() {
        let mut cols: Vec<&str> = CORE_COLUMNS.to_vec();
        cols.extend(DEPARTED_COLUMNS);
        let before = cols.len();
        cols.sort();
        cols.dedup();
        assert_eq!(cols.len(), before);
    }

    #[test]
    fn test_snapshot_gender_count() {
        let snap = WorkforceSnapshot {
            active: 3,
            by_gender: vec![("Male".to_string(), 2), ("Female".to_string(), 1)],
            by_location: vec![],
        };
        assert_eq!(snap.gender_count("Male"), 2);
        assert_eq!(snap.gender_count("Female"), 1);
        assert_eq!(snap.gender_count("Other"), 0);
    }
}
