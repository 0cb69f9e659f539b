use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Name of the per-user application directory under `$HOME`.
pub const APP_DIR: &str = ".hr-dashboard";

// ── Directory bootstrap ────────────────────────────────────────────────────────

fn home() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// Ensure `~/.hr-dashboard/` and `~/.hr-dashboard/logs/` exist.
pub fn ensure_directories() -> anyhow::Result<PathBuf> {
    ensure_directories_in(&home())
}

/// Create the application directories under `home`, returning the app dir.
pub fn ensure_directories_in(home: &Path) -> anyhow::Result<PathBuf> {
    let app_dir = home.join(APP_DIR);
    std::fs::create_dir_all(&app_dir)?;
    std::fs::create_dir_all(app_dir.join("logs"))?;
    Ok(app_dir)
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Where log records are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

/// Pick the log destination for a run.
///
/// An explicit `--log-file` always wins. Otherwise the dashboard logs to
/// `<app_dir>/logs/hr-dashboard.log` because it owns the terminal, and the
/// plain report logs to stderr.
pub fn log_target(view: &str, log_file: Option<&Path>, app_dir: &Path) -> LogTarget {
    match (log_file, view) {
        (Some(path), _) => LogTarget::File(path.to_path_buf()),
        (None, "dashboard") => LogTarget::File(app_dir.join("logs").join("hr-dashboard.log")),
        (None, _) => LogTarget::Stderr,
    }
}

/// Map a `DEBUG`/`INFO`/`WARNING`/`ERROR`/`CRITICAL` level name to an
/// `EnvFilter` directive.
///
/// Unrecognised names are passed through unchanged.
pub fn level_directive(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" => "warn".to_string(),
        "ERROR" | "CRITICAL" => "error".to_string(),
        _ => log_level.to_string(),
    }
}

/// Initialise the global `tracing` subscriber.
///
/// Falls back to `"info"` if the level string is not a valid filter.
pub fn setup_logging(log_level: &str, target: &LogTarget) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_new(level_directive(log_level)).unwrap_or_else(|_| EnvFilter::new("info"));

    let (stderr_layer, file_layer) = match target {
        LogTarget::Stderr => (Some(fmt::layer().with_target(false)), None),
        LogTarget::File(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let layer = fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file));
            (None, Some(layer))
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()?;

    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_directories_in() {
        let tmp = TempDir::new().expect("tempdir");
        let app_dir = ensure_directories_in(tmp.path()).expect("create dirs");

        assert_eq!(app_dir, tmp.path().join(".hr-dashboard"));
        assert!(app_dir.is_dir());
        assert!(app_dir.join("logs").is_dir());

        // Idempotent.
        ensure_directories_in(tmp.path()).expect("second run");
    }

    #[test]
    fn test_log_target_dashboard_uses_file() {
        let app_dir = Path::new("/home/u/.hr-dashboard");
        assert_eq!(
            log_target("dashboard", None, app_dir),
            LogTarget::File(app_dir.join("logs").join("hr-dashboard.log"))
        );
    }

    #[test]
    fn test_log_target_report_uses_stderr() {
        assert_eq!(
            log_target("report", None, Path::new("/tmp")),
            LogTarget::Stderr
        );
    }

    #[test]
    fn test_log_target_explicit_file_wins() {
        let explicit = Path::new("/var/log/hr.log");
        assert_eq!(
            log_target("report", Some(explicit), Path::new("/tmp")),
            LogTarget::File(explicit.to_path_buf())
        );
    }

    #[test]
    fn test_level_directive_mapping() {
        assert_eq!(level_directive("DEBUG"), "debug");
        assert_eq!(level_directive("info"), "info");
        assert_eq!(level_directive("WARNING"), "warn");
        assert_eq!(level_directive("CRITICAL"), "error");
        assert_eq!(level_directive("hr_data=trace"), "hr_data=trace");
    }
}
