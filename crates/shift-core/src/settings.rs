use clap::Parser;
use std::path::PathBuf;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Per-shift CNC production summaries from spreadsheet exports
#[derive(Parser, Debug, Clone)]
#[command(
    name = "cnc-report",
    about = "Per-shift CNC production summaries from spreadsheet exports",
    version
)]
pub struct Settings {
    /// Spreadsheet exports (.xlsx, .xls, .ods, .csv) or directories holding them
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output view
    #[arg(long, default_value = "pivot", value_parser = ["pivot", "days", "json"])]
    pub view: String,

    /// Write the parts-per-shift chart series as CSV
    #[arg(long, value_name = "PATH")]
    pub export_parts: Option<PathBuf>,

    /// Write the minutes-per-shift chart series as CSV
    #[arg(long, value_name = "PATH")]
    pub export_minutes: Option<PathBuf>,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Settings {
    /// Parse the process arguments and apply `--debug`.
    pub fn load() -> Self {
        Self::resolve(Settings::parse())
    }

    /// Same as [`Settings::load`] but over an explicit argument list, for tests.
    pub fn load_from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Settings::try_parse_from(args).map(Self::resolve)
    }

    fn resolve(mut settings: Settings) -> Settings {
        // --debug overrides log level.
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_default_values() {
        let settings = Settings::load_from_args(["cnc-report", "13.12.2024.xlsx"]).unwrap();

        assert_eq!(settings.inputs, vec![PathBuf::from("13.12.2024.xlsx")]);
        assert_eq!(settings.view, "pivot");
        assert!(settings.export_parts.is_none());
        assert!(settings.export_minutes.is_none());
        assert_eq!(settings.log_level, "INFO");
        assert!(settings.log_file.is_none());
        assert!(!settings.debug);
    }

    #[test]
    fn test_settings_requires_an_input() {
        assert!(Settings::load_from_args(["cnc-report"]).is_err());
    }

    #[test]
    fn test_settings_multiple_inputs_and_exports() {
        let settings = Settings::load_from_args([
            "cnc-report",
            "a.xlsx",
            "exports/",
            "--view",
            "days",
            "--export-parts",
            "parts.csv",
            "--export-minutes",
            "minutes.csv",
        ])
        .unwrap();

        assert_eq!(settings.inputs.len(), 2);
        assert_eq!(settings.view, "days");
        assert_eq!(settings.export_parts, Some(PathBuf::from("parts.csv")));
        assert_eq!(settings.export_minutes, Some(PathBuf::from("minutes.csv")));
    }

    #[test]
    fn test_settings_rejects_unknown_view() {
        assert!(Settings::load_from_args(["cnc-report", "a.xlsx", "--view", "chart"]).is_err());
    }

    #[test]
    fn test_debug_overrides_log_level() {
        let settings =
            Settings::load_from_args(["cnc-report", "a.xlsx", "--log-level", "ERROR", "--debug"])
                .unwrap();
        assert_eq!(settings.log_level, "DEBUG");
    }
}
