use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// archwizard - step-by-step Arch Linux installation wizard
#[derive(Parser, Debug)]
#[command(name = "archwizard")]
#[command(about = "Collects installation parameters step by step and runs the Arch installer")]
#[command(version)]
pub struct Cli {
    /// JSON settings file (interpreter, script, timings, noise filters)
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// Installer script to run
    #[arg(long, global = true)]
    pub script: Option<PathBuf>,

    /// Program used to run the installer script
    #[arg(long, global = true)]
    pub interpreter: Option<String>,

    /// Where the installer input file is written
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,

    /// Log file for diagnostics (the terminal belongs to the UI)
    #[arg(long, global = true, default_value = "/tmp/archwizard.log")]
    pub log_file: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the interactive wizard (default)
    Wizard,
    /// Check an installer input file against every step's rules
    Validate {
        /// KEY=VALUE input file
        env: PathBuf,
    },
    /// Run the installer headless from an existing input file
    Install {
        /// KEY=VALUE input file
        env: PathBuf,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as clap::Parser>::parse()
    }
}
