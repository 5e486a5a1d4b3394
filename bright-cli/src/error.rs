//! CLI-specific error types and exit code mapping

use bright_core::error::BrightError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// `scan wait` saw issues at or above the requested severity.
    #[error("threshold reached: {0}")]
    Threshold(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from bright-core.
    #[error("{0}")]
    Core(#[from] BrightError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                                   |
    /// |------|-------------------------------------------|
    /// | 0    | Success                                   |
    /// | 1    | General / command / dispatch error        |
    /// | 2    | Configuration or credentials error        |
    /// | 4    | Severity threshold reached (`scan wait`)  |
    /// | 10   | IO error                                  |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Threshold(_) => 4,
            Self::Io(_) => 10,
            Self::Core(e) => core_exit_code(e),
            Self::JsonSerialize(_) | Self::Command(_) => 1,
        }
    }
}

fn core_exit_code(error: &BrightError) -> i32 {
    match error {
        BrightError::Config(_) | BrightError::Credentials(_) => 2,
        // missing credentials surface from Configuration::credentials()
        BrightError::IllegalOperation { component, .. } if component == "Configuration" => 2,
        BrightError::Io(_) => 10,
        _ => 1,
    }
}

impl From<bright_reporter::ReportError> for CliError {
    fn from(e: bright_reporter::ReportError) -> Self {
        Self::Core(e.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bright_core::error::{ConfigError, DispatchError, ValidationError};

    #[test]
    fn test_exit_code_config() {
        assert_eq!(CliError::Config("bad".to_owned()).exit_code(), 2);
    }

    #[test]
    fn test_exit_code_command() {
        assert_eq!(CliError::Command("failed".to_owned()).exit_code(), 1);
    }

    #[test]
    fn test_exit_code_threshold() {
        let err = CliError::Threshold("1 High issue".to_owned());
        assert_eq!(err.exit_code(), 4);
        assert_eq!(err.to_string(), "threshold reached: 1 High issue");
    }

    #[test]
    fn test_exit_code_io() {
        let err = CliError::from(std::io::Error::other("disk"));
        assert_eq!(err.exit_code(), 10);
    }

    #[test]
    fn test_exit_code_core_config() {
        let err = CliError::from(BrightError::Config(ConfigError::FileNotFound {
            path: "bright.toml".to_owned(),
        }));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_exit_code_missing_credentials() {
        let err = CliError::from(BrightError::illegal_operation(
            "Configuration",
            "please provide credentials",
        ));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_exit_code_other_illegal_operation() {
        let err = CliError::from(BrightError::illegal_operation("EventBus", "no handler"));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_exit_code_dispatch() {
        let err = CliError::from(BrightError::Dispatch(DispatchError::Status {
            method: "GET".to_owned(),
            url: "https://app.brightsec.com/api/v1/scans/x".to_owned(),
            status: 404,
            code: "ERR_BAD_REQUEST".to_owned(),
            message: "Not Found".to_owned(),
        }));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_exit_code_validation() {
        let err = CliError::from(BrightError::Validation(ValidationError::MissingField(
            "head_sha".to_owned(),
        )));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_report_error_converts() {
        let err = CliError::from(bright_reporter::ReportError::MissingField("head_sha".to_owned()));
        assert!(matches!(err, CliError::Core(BrightError::Validation(_))));
    }

    #[test]
    fn test_core_error_message_is_passed_through() {
        let err = CliError::from(BrightError::illegal_operation(
            "Configuration",
            "please provide credentials",
        ));
        assert!(err.to_string().contains("please provide credentials"));
    }
}
