//! Error handling module for archwizard
//!
//! Provides the top-level error type. Each concern keeps its own narrow error
//! (`ValidationError`, `NavigationError`, `EnvFileError`, `InstallError`) next
//! to the code that raises it; all of them convert into `WizardError`.

use thiserror::Error;

use crate::env_file::EnvFileError;
use crate::install::InstallError;
use crate::wizard::NavigationError;

/// Main error type for archwizard
#[derive(Error, Debug)]
pub enum WizardError {
    /// IO errors (file operations, terminal, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing of settings files or lsblk output
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Settings file could not be loaded or holds invalid values
    #[error("Settings error: {0}")]
    Settings(String),

    /// Installer input file could not be parsed
    #[error("Input file error: {0}")]
    EnvFile(#[from] EnvFileError),

    /// Wizard navigation was refused
    #[error("Navigation error: {0}")]
    Navigation(#[from] NavigationError),

    /// Installer could not be started
    #[error("Install error: {0}")]
    Install(#[from] InstallError),

    /// Terminal/UI errors
    #[error("Terminal error: {0}")]
    Terminal(String),
}

/// Result type alias for archwizard operations
pub type Result<T> = std::result::Result<T, WizardError>;

impl WizardError {
    /// Create a settings error
    pub fn settings(msg: impl Into<String>) -> Self {
        Self::Settings(msg.into())
    }

    /// Create a terminal error
    pub fn terminal(msg: impl Into<String>) -> Self {
        Self::Terminal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::ValidationError;

    #[test]
    fn test_error_display() {
        let err = WizardError::settings("flush_interval_ms must be positive");
        assert_eq!(
            err.to_string(),
            "Settings error: flush_interval_ms must be positive"
        );

        let err = WizardError::terminal("raw mode unavailable");
        assert_eq!(err.to_string(), "Terminal error: raw mode unavailable");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: WizardError = io_err.into();
        assert!(matches!(err, WizardError::Io(_)));
    }

    #[test]
    fn test_navigation_error_conversion_keeps_reason() {
        let nav = NavigationError::Validation(ValidationError::new("passwords are required"));
        let err: WizardError = nav.into();
        assert!(matches!(err, WizardError::Navigation(_)));
        assert!(err.to_string().contains("passwords are required"));
    }

    #[test]
    fn test_install_error_conversion() {
        let err: WizardError = InstallError::AlreadyStarted.into();
        assert!(matches!(err, WizardError::Install(_)));
    }
}
