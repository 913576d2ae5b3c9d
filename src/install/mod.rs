//! Installer execution and log streaming
//!
//! - `runner` - spawns the installer on its own thread and pumps its merged
//!   output into a channel
//! - `aggregator` - drains that channel on the UI thread at a fixed cadence,
//!   filters and cleans the lines and keeps the accumulated log
//!
//! Exactly one install runs per process. Failures are reported as the last
//! log line and never rewind the wizard.

pub mod aggregator;
pub mod runner;

use thiserror::Error;

pub use aggregator::{FlushUpdate, LogAggregator, LogMessage, NoiseFilter, strip_ansi};
pub use runner::{InstallReport, InstallRunner, InstallSession, RunnerSettings};

/// Line appended after the installer exits successfully
pub const SUCCESS_LINE: &str = "Installation SUCCESS! You can reboot now.";

/// Install failures. The display text of each variant is the log line shown
/// to the operator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InstallError {
    /// `start` was called a second time
    #[error("installation already started")]
    AlreadyStarted,

    /// The execution thread could not be created or died
    #[error("Install thread failed: {0}")]
    Thread(String),

    /// The input file could not be written; nothing was spawned
    #[error("Error writing config: {0}")]
    WriteConfig(String),

    /// The output pipe or the installer process could not be created
    #[error("Error starting installer: {0}")]
    Spawn(String),

    /// The installer exited unsuccessfully or could not be waited on
    #[error("Installation FAILED: {0}")]
    Failed(String),
}

/// Final result of the one install run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Succeeded,
    Failed(InstallError),
}

impl InstallOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, InstallOutcome::Succeeded)
    }

    /// Status line closing the install log
    pub fn status_line(&self) -> String {
        match self {
            InstallOutcome::Succeeded => SUCCESS_LINE.to_string(),
            InstallOutcome::Failed(err) => err.to_string(),
        }
    }
}
