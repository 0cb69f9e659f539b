use chrono::NaiveDate;
use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::time_utils::parse_month;

/// Default name of the exported summary workbook.
pub const DEFAULT_EXPORT_FILE: &str = "Resumen_HR.xlsx";

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Monthly headcount, hiring and turnover dashboard for HR spreadsheets
#[derive(Parser, Debug, Clone)]
#[command(
    name = "hr-dashboard",
    about = "Monthly headcount, hiring and turnover dashboard for HR spreadsheets",
    version
)]
pub struct Settings {
    /// Workbook holding the active-employee sheet
    #[arg(long, default_value = "Data.xlsx")]
    pub workbook: PathBuf,

    /// Sheet with currently active employees
    #[arg(long, default_value = "HC")]
    pub active_sheet: String,

    /// Sheet with departed employees
    #[arg(long, default_value = "Bajas")]
    pub departed_sheet: String,

    /// Separate workbook for the departed sheet (defaults to --workbook)
    #[arg(long)]
    pub departed_workbook: Option<PathBuf>,

    /// Anonymize labels, jitter dates and synthesize monthly figures
    #[arg(long, env = "HR_DASHBOARD_DEMO")]
    pub demo: bool,

    /// Seed for the demo random source
    #[arg(long, default_value = "42", env = "HR_DASHBOARD_SEED")]
    pub seed: u64,

    /// First tracked month (YYYY-MM)
    #[arg(long, default_value = "2022-01")]
    pub start_month: String,

    /// Output mode
    #[arg(long, default_value = "dashboard", value_parser = ["dashboard", "report"])]
    pub view: String,

    /// Write the monthly summary workbook to this path
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Display theme
    #[arg(long, default_value = "auto", value_parser = ["light", "dark", "classic", "auto"])]
    pub theme: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.hr-dashboard/last_used.json`.
///
/// Demo mode and seed are deliberately absent: they are read from the command
/// line or environment on every run.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workbook: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_sheet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departed_sheet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departed_workbook: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &Path) -> PathBuf {
        base_dir.join(".hr-dashboard").join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to an explicit path, creating parent
    /// directories if needed.
    pub fn save_to(&self, path: &Path) -> std::result::Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &Path) -> std::result::Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Full implementation – accepts args and an explicit config path so that
    /// tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(args: Vec<std::ffi::OsString>, config_path: &Path) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            let _ = LastUsedParams::clear_at(config_path);
            return Self::apply_debug(settings);
        }

        let last = LastUsedParams::load_from(config_path);

        // CLI always wins over persisted values.
        if !is_arg_explicitly_set(&matches, "theme") {
            if let Some(v) = last.theme {
                settings.theme = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "workbook") {
            if let Some(v) = last.workbook {
                settings.workbook = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "active_sheet") {
            if let Some(v) = last.active_sheet {
                settings.active_sheet = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "departed_sheet") {
            if let Some(v) = last.departed_sheet {
                settings.departed_sheet = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "departed_workbook")
            && settings.departed_workbook.is_none()
        {
            settings.departed_workbook = last.departed_workbook;
        }
        if !is_arg_explicitly_set(&matches, "view") {
            if let Some(v) = last.view {
                settings.view = v;
            }
        }

        settings = Self::apply_debug(settings);

        let params = LastUsedParams::from(&settings);
        let _ = params.save_to(config_path);

        settings
    }

    /// `--debug` overrides the log level.
    fn apply_debug(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }

    /// First day of the first tracked month.
    pub fn start_date(&self) -> Result<NaiveDate> {
        parse_month(&self.start_month)
    }

    /// Workbook the departed sheet is read from.
    pub fn departed_workbook_path(&self) -> &Path {
        self.departed_workbook
            .as_deref()
            .unwrap_or(self.workbook.as_path())
    }

    /// Where the `e` key in the dashboard writes the summary workbook.
    pub fn export_path(&self) -> PathBuf {
        self.export
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_FILE))
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            theme: Some(s.theme.clone()),
            workbook: Some(s.workbook.clone()),
            active_sheet: Some(s.active_sheet.clone()),
            departed_sheet: Some(s.departed_sheet.clone()),
            departed_workbook: s.departed_workbook.clone(),
            view: Some(s.view.clone()),
        }
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tmp_config_path(tmp: &TempDir) -> PathBuf {
        LastUsedParams::config_path_in(tmp.path())
    }

    #[test]
    fn test_last_used_params_save_load() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        let params = LastUsedParams {
            theme: Some("dark".to_string()),
            workbook: Some(PathBuf::from("/data/hr.xlsx")),
            active_sheet: Some("Active".to_string()),
            departed_sheet: Some("Leavers".to_string()),
            departed_workbook: Some(PathBuf::from("/data/leavers.xlsx")),
            view: Some("report".to_string()),
        };
        params.save_to(&path).expect("save");

        let loaded = LastUsedParams::load_from(&path);
        assert_eq!(loaded.theme, Some("dark".to_string()));
        assert_eq!(loaded.workbook, Some(PathBuf::from("/data/hr.xlsx")));
        assert_eq!(loaded.active_sheet, Some("Active".to_string()));
        assert_eq!(loaded.departed_sheet, Some("Leavers".to_string()));
        assert_eq!(
            loaded.departed_workbook,
            Some(PathBuf::from("/data/leavers.xlsx"))
        );
        assert_eq!(loaded.view, Some("report".to_string()));
    }

    #[test]
    fn test_last_used_params_clear() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        LastUsedParams {
            theme: Some("light".to_string()),
            ..Default::default()
        }
        .save_to(&path)
        .expect("save");
        assert!(path.exists());

        LastUsedParams::clear_at(&path).expect("clear");
        assert!(!path.exists());
    }

    #[test]
    fn test_last_used_params_default_when_missing_or_corrupt() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        assert!(LastUsedParams::load_from(&path).theme.is_none());

        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{not json").unwrap();
        assert!(LastUsedParams::load_from(&path).workbook.is_none());
    }

    #[test]
    fn test_settings_default_values() {
        let settings = Settings::parse_from(["hr-dashboard"]);

        assert_eq!(settings.workbook, PathBuf::from("Data.xlsx"));
        assert_eq!(settings.active_sheet, "HC");
        assert_eq!(settings.departed_sheet, "Bajas");
        assert!(settings.departed_workbook.is_none());
        assert_eq!(settings.seed, 42);
        assert_eq!(settings.start_month, "2022-01");
        assert_eq!(settings.view, "dashboard");
        assert!(settings.export.is_none());
        assert_eq!(settings.theme, "auto");
        assert_eq!(settings.log_level, "INFO");
        assert!(!settings.debug);
        assert!(!settings.clear);
    }

    #[test]
    fn test_settings_cli_demo_and_seed() {
        let settings = Settings::parse_from(["hr-dashboard", "--demo", "--seed", "7"]);
        assert!(settings.demo);
        assert_eq!(settings.seed, 7);
    }

    #[test]
    fn test_settings_start_date() {
        let settings = Settings::parse_from(["hr-dashboard", "--start-month", "2023-04"]);
        assert_eq!(
            settings.start_date().unwrap(),
            NaiveDate::from_ymd_opt(2023, 4, 1).unwrap()
        );

        let bad = Settings::parse_from(["hr-dashboard", "--start-month", "April"]);
        assert!(bad.start_date().is_err());
    }

    #[test]
    fn test_departed_workbook_defaults_to_workbook() {
        let settings = Settings::parse_from(["hr-dashboard", "--workbook", "a.xlsx"]);
        assert_eq!(settings.departed_workbook_path(), Path::new("a.xlsx"));

        let split = Settings::parse_from([
            "hr-dashboard",
            "--workbook",
            "a.xlsx",
            "--departed-workbook",
            "b.xlsx",
        ]);
        assert_eq!(split.departed_workbook_path(), Path::new("b.xlsx"));
    }

    #[test]
    fn test_export_path_default() {
        let settings = Settings::parse_from(["hr-dashboard"]);
        assert_eq!(settings.export_path(), PathBuf::from(DEFAULT_EXPORT_FILE));

        let explicit = Settings::parse_from(["hr-dashboard", "--export", "/tmp/out.xlsx"]);
        assert_eq!(explicit.export_path(), PathBuf::from("/tmp/out.xlsx"));
    }

    #[test]
    fn test_load_with_last_used_merges_persisted_values() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            theme: Some("dark".to_string()),
            workbook: Some(PathBuf::from("saved.xlsx")),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings =
            Settings::load_with_last_used_impl(vec!["hr-dashboard".into()], &config_path);
        assert_eq!(settings.theme, "dark");
        assert_eq!(settings.workbook, PathBuf::from("saved.xlsx"));
    }

    #[test]
    fn test_load_with_last_used_cli_overrides_persisted() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            theme: Some("dark".to_string()),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings = Settings::load_with_last_used_impl(
            vec!["hr-dashboard".into(), "--theme".into(), "light".into()],
            &config_path,
        );
        assert_eq!(settings.theme, "light");
    }

    #[test]
    fn test_load_with_last_used_clear_removes_file() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            theme: Some("classic".to_string()),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        Settings::load_with_last_used_impl(
            vec!["hr-dashboard".into(), "--clear".into()],
            &config_path,
        );
        assert!(!config_path.exists());
    }

    #[test]
    fn test_load_with_last_used_debug_overrides_log_level() {
        let tmp = TempDir::new().expect("tempdir");
        let settings = Settings::load_with_last_used_impl(
            vec!["hr-dashboard".into(), "--debug".into()],
            &tmp_config_path(&tmp),
        );
        assert_eq!(settings.log_level, "DEBUG");
    }

    #[test]
    fn test_load_with_last_used_persists_after_run() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        Settings::load_with_last_used_impl(
            vec![
                "hr-dashboard".into(),
                "--active-sheet".into(),
                "Active".into(),
            ],
            &config_path,
        );

        assert!(config_path.exists());
        let loaded = LastUsedParams::load_from(&config_path);
        assert_eq!(loaded.active_sheet, Some("Active".to_string()));
    }

    #[test]
    fn test_last_used_never_stores_demo_or_seed() {
        let settings = Settings::parse_from(["hr-dashboard", "--demo", "--seed", "9"]);
        let json = serde_json::to_string(&LastUsedParams::from(&settings)).unwrap();
        assert!(!json.contains("demo"));
        assert!(!json.contains("seed"));
    }
}
