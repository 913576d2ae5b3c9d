//! Runtime settings
//!
//! Settings decide where the installer lives and how its output is paced.
//! They are resolved in layers: built-in defaults, an optional JSON file,
//! `ARCHWIZARD_*` environment variables, then command-line flags (applied by
//! the binary).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, WizardError};
use crate::install::RunnerSettings;

/// Environment variable overriding the interpreter
pub const ENV_INTERPRETER: &str = "ARCHWIZARD_INTERPRETER";
/// Environment variable overriding the installer script path
pub const ENV_SCRIPT: &str = "ARCHWIZARD_SCRIPT";
/// Environment variable overriding the input file path
pub const ENV_ENV_FILE: &str = "ARCHWIZARD_ENV_FILE";

/// Wizard settings. Every field may be omitted from the JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Program that runs the installer script
    pub interpreter: String,
    /// Installer script, relative to the working directory unless absolute
    pub script: PathBuf,
    /// Where the KEY=VALUE input file is written
    pub env_file: PathBuf,
    /// Log view refresh cadence
    pub flush_interval_ms: u64,
    /// Pause before the installer starts so the install view can draw
    pub settle_delay_ms: u64,
    /// Partition editor command line
    pub partition_editor: Vec<String>,
    /// Output lines containing any of these are dropped
    pub noise_filters: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            interpreter: "bash".to_string(),
            script: PathBuf::from("backend/arch-install.sh"),
            env_file: PathBuf::from("/tmp/install.env"),
            flush_interval_ms: 100,
            settle_delay_ms: 500,
            partition_editor: vec!["xterm".to_string(), "-e".to_string(), "cfdisk".to_string()],
            noise_filters: vec![
                "Failed to read: session".to_string(),
                "Setting default value".to_string(),
            ],
        }
    }
}

impl Settings {
    /// Defaults, overlaid with `path` when given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let settings = match path {
            Some(path) => {
                let text = fs::read_to_string(path).map_err(|e| {
                    WizardError::settings(format!("cannot read {}: {}", path.display(), e))
                })?;
                let settings: Settings = serde_json::from_str(&text)?;
                info!("Loaded settings from {}", path.display());
                settings
            }
            None => Settings::default(),
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Apply `ARCHWIZARD_*` overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any variable lookup
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_INTERPRETER).filter(|v| !v.is_empty()) {
            debug!("{} overrides interpreter", ENV_INTERPRETER);
            self.interpreter = value;
        }
        if let Some(value) = lookup(ENV_SCRIPT).filter(|v| !v.is_empty()) {
            debug!("{} overrides script", ENV_SCRIPT);
            self.script = PathBuf::from(value);
        }
        if let Some(value) = lookup(ENV_ENV_FILE).filter(|v| !v.is_empty()) {
            debug!("{} overrides input file", ENV_ENV_FILE);
            self.env_file = PathBuf::from(value);
        }
    }

    /// Reject values the runner cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.interpreter.trim().is_empty() {
            return Err(WizardError::settings("interpreter must not be empty"));
        }
        if self.flush_interval_ms == 0 {
            return Err(WizardError::settings("flush_interval_ms must be positive"));
        }
        Ok(())
    }

    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Settings handed to the install runner
    pub fn runner_settings(&self) -> RunnerSettings {
        RunnerSettings {
            interpreter: self.interpreter.clone(),
            script: self.script.clone(),
            env_file: self.env_file.clone(),
            settle_delay: self.settle_delay(),
            flush_interval: self.flush_interval(),
            noise_filters: self.noise_filters.clone(),
        }
    }
}
