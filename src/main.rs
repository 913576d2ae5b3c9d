//! archwizard - main entry point
//!
//! Collects installation parameters in a step-by-step terminal wizard and
//! hands them to the Arch installer script.

use std::fs::OpenOptions;
use std::io::{Write, stdout};
use std::panic;
use std::path::Path;
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use archwizard::app::App;
use archwizard::cli::{Cli, Commands};
use archwizard::devices::DeviceCatalog;
use archwizard::env_file;
use archwizard::install::InstallRunner;
use archwizard::process_guard::{self, ProcessGuard};
use archwizard::settings::Settings;
use archwizard::wizard::{PageKind, WizardControl};

/// Send diagnostics to `path`; the terminal belongs to the UI
fn init_logging(path: &Path) {
    let file = match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Cannot open log file {}: {}", path.display(), e);
            return;
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}

/// Defaults, then the settings file, then `ARCHWIZARD_*`, then flags
fn resolve_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = Settings::load(cli.settings.as_deref())?;
    settings.apply_env();
    if let Some(interpreter) = &cli.interpreter {
        settings.interpreter = interpreter.clone();
    }
    if let Some(script) = &cli.script {
        settings.script = script.clone();
    }
    if let Some(env_file) = &cli.env_file {
        settings.env_file = env_file.clone();
    }
    settings.validate()?;
    debug!("Resolved settings: {:?}", settings);
    Ok(settings)
}

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    init_logging(&cli.log_file);
    info!("archwizard {} starting", env!("CARGO_PKG_VERSION"));

    if let Err(e) = process_guard::init_signal_handlers() {
        warn!("Failed to initialize signal handlers: {}", e);
    }

    let settings = resolve_settings(&cli)?;

    match cli.command.unwrap_or(Commands::Wizard) {
        Commands::Wizard => run_wizard(&settings),
        Commands::Validate { env } => validate_env_file(&env),
        Commands::Install { env } => run_headless(&settings, &env),
    }
}

fn restore_terminal() -> std::io::Result<()> {
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)
}

/// Run the interactive wizard
fn run_wizard(settings: &Settings) -> Result<()> {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));

    let catalog = DeviceCatalog::detect();

    enable_raw_mode().context("Failed to enable raw mode")?;
    execute!(stdout(), EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let mut terminal =
        Terminal::new(CrosstermBackend::new(stdout())).context("Failed to create terminal")?;

    let mut app = App::new(settings, catalog);
    let result = app.run(&mut terminal);

    // Always attempt cleanup, even if the app failed
    let _ = restore_terminal();
    let _ = terminal.show_cursor();

    if let Err(ref e) = result {
        error!("Application error: {}", e);
    }
    Ok(result?)
}

/// Check an input file against every step's rules
fn validate_env_file(path: &Path) -> Result<()> {
    info!("Validating input file {}", path.display());
    let config = env_file::load(path)?;

    let mut failures = 0;
    for page in PageKind::ALL {
        match page.validate(&config) {
            Ok(()) => debug!("{} step valid", page),
            Err(e) => {
                failures += 1;
                println!("✗ {}: {}", page.title(), e);
            }
        }
    }

    if failures > 0 {
        bail!("{} step(s) failed validation", failures);
    }
    println!("✓ Input file is valid: {}", path.display());
    for line in config.summary_lines() {
        println!("  {line}");
    }
    Ok(())
}

/// Steering for a run without a wizard on screen
#[derive(Default)]
struct HeadlessControl {
    errors: Vec<String>,
}

impl WizardControl for HeadlessControl {
    fn set_forward_enabled(&mut self, _enabled: bool) {}

    fn lock_navigation(&mut self) {}

    fn report_error(&mut self, message: String) {
        self.errors.push(message);
    }
}

/// Run the installer from an existing input file, streaming its log
fn run_headless(settings: &Settings, path: &Path) -> Result<()> {
    let config = env_file::load(path)?;
    for page in PageKind::ALL {
        page.validate(&config)
            .with_context(|| format!("{} step is not valid", page.title()))?;
    }

    let _guard = ProcessGuard::new();
    let mut runner_settings = settings.runner_settings();
    runner_settings.settle_delay = Duration::ZERO;
    let mut runner = InstallRunner::new(runner_settings);
    let mut control = HeadlessControl::default();

    info!("Headless install from {}", path.display());
    let mut session = match runner.start(&config, &mut control) {
        Ok(session) => session,
        Err(e) => {
            for message in &control.errors {
                error!("{}", message);
            }
            return Err(e.into());
        }
    };

    let interval = settings.flush_interval();
    let mut out = stdout();
    while !session.is_finished() {
        if let Some(update) = session.tick(Instant::now()) {
            out.write_all(update.appended.as_bytes())?;
            out.flush()?;
        }
        thread::sleep(interval);
    }

    let printed = session.text().len();
    let report = session.finish();
    if let Some(rest) = report.log.get(printed..) {
        out.write_all(rest.as_bytes())?;
        out.flush()?;
    }

    if !report.outcome.is_success() {
        bail!("{}", report.outcome.status_line());
    }
    Ok(())
}
