use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the HR dashboard.
#[derive(Error, Debug)]
pub enum HrError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The spreadsheet reader rejected a workbook.
    #[error("Failed to open workbook {path}: {message}")]
    Workbook { path: PathBuf, message: String },

    /// A worksheet with the requested name does not exist in the workbook.
    #[error("Sheet '{sheet}' not found in {path}")]
    SheetNotFound { path: PathBuf, sheet: String },

    /// A required column header is absent from an input sheet.
    #[error("Missing required column '{column}' in sheet '{sheet}'")]
    MissingColumn { sheet: String, column: String },

    /// A month string could not be parsed as `YYYY-MM`.
    #[error("Invalid month: {0}")]
    InvalidMonth(String),

    /// Writing the summary workbook failed.
    #[error("Export failed: {0}")]
    Export(String),

    /// An error originating from the terminal / TUI layer.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the dashboard crates.
pub type Result<T> = std::result::Result<T, HrError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = HrError::FileRead {
            path: PathBuf::from("/some/Data.xlsx"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("/some/Data.xlsx"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_workbook() {
        let err = HrError::Workbook {
            path: PathBuf::from("broken.xlsx"),
            message: "zip error".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to open workbook broken.xlsx: zip error"
        );
    }

    #[test]
    fn test_error_display_sheet_not_found() {
        let err = HrError::SheetNotFound {
            path: PathBuf::from("Data.xlsx"),
            sheet: "Bajas".to_string(),
        };
        assert_eq!(err.to_string(), "Sheet 'Bajas' not found in Data.xlsx");
    }

    #[test]
    fn test_error_display_missing_column() {
        let err = HrError::MissingColumn {
            sheet: "HC".to_string(),
            column: "HIRE DATE".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Missing required column 'HIRE DATE' in sheet 'HC'"
        );
    }

    #[test]
    fn test_error_display_invalid_month() {
        let err = HrError::InvalidMonth("2022-13".to_string());
        assert_eq!(err.to_string(), "Invalid month: 2022-13");
    }

    #[test]
    fn test_error_display_export() {
        let err = HrError::Export("disk full".to_string());
        assert_eq!(err.to_string(), "Export failed: disk full");
    }

    #[test]
    fn test_error_display_terminal() {
        let err = HrError::Terminal("crossterm failure".to_string());
        assert_eq!(err.to_string(), "Terminal error: crossterm failure");
    }

    #[test]
    fn test_error_display_config() {
        let err = HrError::Config("seed out of range".to_string());
        assert_eq!(err.to_string(), "Configuration error: seed out of range");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: HrError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_error_from_anyhow() {
        let err: HrError = anyhow::anyhow!("upstream failure").into();
        assert_eq!(err.to_string(), "upstream failure");
    }
}
