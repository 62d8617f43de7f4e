//! Presentation-level configuration
//!
//! Settings that only change how results are shown.

use council_domain::OutputFormat;

/// Output configuration for the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Enable colored terminal output
    pub color: bool,
    /// Hide per-candidate progress lines
    pub quiet: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Table,
            color: true,
            quiet: false,
        }
    }
}

impl OutputConfig {
    /// Combine command-line flags with the config file. Flags win.
    pub fn resolve(
        cli_format: Option<OutputFormat>,
        no_color: bool,
        quiet: bool,
        file_format: Option<OutputFormat>,
        file_color: bool,
    ) -> Self {
        let format = cli_format.or(file_format).unwrap_or_default();
        Self {
            format,
            // JSON goes to other programs; never color it.
            color: file_color && !no_color && format != OutputFormat::Json,
            quiet,
        }
    }

    /// Apply the color setting to every `colored` string.
    pub fn apply(&self) {
        if !self.color {
            colored::control::set_override(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_beats_file() {
        let config = OutputConfig::resolve(
            Some(OutputFormat::Table),
            false,
            false,
            Some(OutputFormat::Json),
            true,
        );
        assert_eq!(config.format, OutputFormat::Table);
        assert!(config.color);
    }

    #[test]
    fn test_file_format_used_without_flag() {
        let config = OutputConfig::resolve(None, false, false, Some(OutputFormat::Json), true);
        assert_eq!(config.format, OutputFormat::Json);
        assert!(!config.color);
    }

    #[test]
    fn test_no_color_flag() {
        let config = OutputConfig::resolve(None, true, true, None, true);
        assert_eq!(config.format, OutputFormat::Table);
        assert!(!config.color);
        assert!(config.quiet);
    }
}
