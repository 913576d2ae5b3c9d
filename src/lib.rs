//! archwizard library
//!
//! Step-by-step Arch Linux installation wizard: configuration model, wizard
//! state machine, installer input file, install runner with log streaming,
//! and the terminal front end.

pub mod app;
pub mod cli;
pub mod components;
pub mod config;
pub mod devices;
pub mod env_file;
pub mod error;
pub mod install;
pub mod process_guard;
pub mod settings;
pub mod theme;
pub mod types;
pub mod ui;
pub mod wizard;

// Re-export main types for convenience
pub use config::ConfigState;
pub use devices::DeviceCatalog;
pub use env_file::EnvFileError;
pub use error::{Result, WizardError};
pub use install::{
    InstallError, InstallOutcome, InstallReport, InstallRunner, InstallSession, LogAggregator,
    LogMessage, RunnerSettings, SUCCESS_LINE,
};
pub use process_guard::{ChildRegistry, GuardedCommand, ProcessGuard};
pub use settings::Settings;
pub use types::{DesktopEnvironment, Filesystem, PartitionMode, ShellChoice};
pub use wizard::{
    Field, FieldEdit, NavState, NavigationError, PageKind, Transition, ValidationError, Wizard,
    WizardControl,
};
