//! Installer execution
//!
//! `InstallRunner::start` locks the wizard and hands a snapshot of the
//! configuration to a dedicated execution thread. That thread waits for the
//! UI to settle, writes the input file, spawns the installer with stdout and
//! stderr sharing one pipe and starts a reader thread on the other end. It
//! then waits for the child, joins the reader and sends the status line
//! followed by `LogMessage::Finished`, so the status is always the last line
//! of the log.

use std::io::{BufRead, BufReader, PipeReader};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use super::aggregator::{FlushUpdate, LogAggregator, LogMessage, NoiseFilter};
use super::{InstallError, InstallOutcome};
use crate::config::ConfigState;
use crate::env_file;
use crate::process_guard::{ChildRegistry, GuardedCommand};
use crate::wizard::WizardControl;

/// Everything the runner needs to know about the installer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerSettings {
    pub interpreter: String,
    pub script: PathBuf,
    pub env_file: PathBuf,
    pub settle_delay: Duration,
    pub flush_interval: Duration,
    pub noise_filters: Vec<String>,
}

/// Starts the installer, at most once
#[derive(Debug)]
pub struct InstallRunner {
    settings: RunnerSettings,
    started: bool,
}

impl InstallRunner {
    pub fn new(settings: RunnerSettings) -> Self {
        Self {
            settings,
            started: false,
        }
    }

    pub fn settings(&self) -> &RunnerSettings {
        &self.settings
    }

    pub fn has_started(&self) -> bool {
        self.started
    }

    /// Lock navigation and launch the install in the background.
    ///
    /// Returns immediately; progress and the outcome arrive through the
    /// returned session.
    pub fn start(
        &mut self,
        config: &ConfigState,
        control: &mut dyn WizardControl,
    ) -> Result<InstallSession, InstallError> {
        if self.started {
            return Err(InstallError::AlreadyStarted);
        }
        self.started = true;

        control.lock_navigation();
        control.set_forward_enabled(false);

        let (tx, rx) = mpsc::channel();
        let snapshot = config.clone();
        let settings = self.settings.clone();
        let worker = thread::Builder::new()
            .name("installer".to_string())
            .spawn(move || run_install(&settings, &snapshot, &tx))
            .map_err(|e| {
                let err = InstallError::Thread(e.to_string());
                control.report_error(err.to_string());
                err
            })?;

        info!(
            "Install started: {} {} --config {}",
            self.settings.interpreter,
            self.settings.script.display(),
            self.settings.env_file.display()
        );

        let noise = NoiseFilter::new(self.settings.noise_filters.clone());
        Ok(InstallSession {
            aggregator: LogAggregator::new(rx, noise, self.settings.flush_interval),
            worker: Some(worker),
        })
    }
}

/// Final log and outcome of a finished install
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub outcome: InstallOutcome,
    pub log: String,
}

/// Handle on the running install, owned by the install step
#[derive(Debug)]
pub struct InstallSession {
    aggregator: LogAggregator,
    worker: Option<JoinHandle<()>>,
}

impl InstallSession {
    /// Flush cycle; call from the UI loop between event polls
    pub fn tick(&mut self, now: Instant) -> Option<FlushUpdate> {
        self.aggregator.tick(now)
    }

    /// Flush whatever is queued right now
    pub fn flush_now(&mut self) -> Option<FlushUpdate> {
        self.aggregator.flush_now()
    }

    pub fn text(&self) -> &str {
        self.aggregator.text()
    }

    pub fn outcome(&self) -> Option<&InstallOutcome> {
        self.aggregator.outcome()
    }

    pub fn is_finished(&self) -> bool {
        self.aggregator.outcome().is_some()
    }

    /// Block until the install ends and return the complete log.
    pub fn finish(mut self) -> InstallReport {
        let panicked = self
            .worker
            .take()
            .is_some_and(|worker| worker.join().is_err());
        self.aggregator.flush_now();

        let outcome = match self.aggregator.outcome() {
            Some(outcome) => outcome.clone(),
            None if panicked => {
                InstallOutcome::Failed(InstallError::Thread("install thread panicked".to_string()))
            }
            None => InstallOutcome::Failed(InstallError::Thread(
                "install thread ended without a result".to_string(),
            )),
        };
        InstallReport {
            outcome,
            log: self.aggregator.text().to_string(),
        }
    }
}

/// Body of the execution thread
fn run_install(settings: &RunnerSettings, config: &ConfigState, tx: &Sender<LogMessage>) {
    if !settings.settle_delay.is_zero() {
        thread::sleep(settings.settle_delay);
    }

    let outcome = execute(settings, config, tx);
    match &outcome {
        InstallOutcome::Succeeded => info!("Installer finished successfully"),
        InstallOutcome::Failed(err) => error!("{}", err),
    }

    // Receiver may be gone if the front end exited; nothing left to do then
    let _ = tx.send(LogMessage::Line(outcome.status_line()));
    let _ = tx.send(LogMessage::Finished(outcome));
}

fn execute(settings: &RunnerSettings, config: &ConfigState, tx: &Sender<LogMessage>) -> InstallOutcome {
    let contents = env_file::render(config);
    if let Err(e) = env_file::write(&settings.env_file, &contents) {
        return InstallOutcome::Failed(InstallError::WriteConfig(e.to_string()));
    }

    let (reader, writer) = match std::io::pipe() {
        Ok(pair) => pair,
        Err(e) => return InstallOutcome::Failed(InstallError::Spawn(e.to_string())),
    };
    let stderr_writer = match writer.try_clone() {
        Ok(w) => w,
        Err(e) => return InstallOutcome::Failed(InstallError::Spawn(e.to_string())),
    };

    let mut cmd = Command::new(&settings.interpreter);
    cmd.arg(&settings.script)
        .arg("--config")
        .arg(&settings.env_file)
        .stdin(Stdio::null())
        .stdout(writer)
        .stderr(stderr_writer)
        .guarded();
    let spawned = cmd.spawn();
    // The command holds the write ends; drop them so the reader sees EOF
    drop(cmd);

    let mut child = match spawned {
        Ok(child) => child,
        Err(e) => return InstallOutcome::Failed(InstallError::Spawn(e.to_string())),
    };
    let pid = child.id();
    ChildRegistry::global().register(pid);
    debug!("Installer spawned with pid {}", pid);

    let pump_tx = tx.clone();
    let pump = thread::Builder::new()
        .name("installer-output".to_string())
        .spawn(move || pump_output(reader, &pump_tx));
    if let Err(e) = &pump {
        warn!("Could not start output reader, installer output is lost: {}", e);
    }

    let status = child.wait();
    ChildRegistry::global().unregister(pid);

    if let Ok(handle) = pump {
        if handle.join().is_err() {
            warn!("Output reader panicked");
        }
    }

    match status {
        Ok(status) if status.success() => InstallOutcome::Succeeded,
        Ok(status) => InstallOutcome::Failed(InstallError::Failed(status.to_string())),
        Err(e) => InstallOutcome::Failed(InstallError::Failed(e.to_string())),
    }
}

/// Forward each output line until end of stream.
///
/// Lines are split on raw `\n` bytes and decoded lossily, so invalid UTF-8
/// never ends the stream early.
fn pump_output(reader: PipeReader, tx: &Sender<LogMessage>) {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    let mut lines = 0usize;

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                while matches!(buf.last(), Some(b'\n' | b'\r')) {
                    buf.pop();
                }
                let line = String::from_utf8_lossy(&buf).into_owned();
                lines += 1;
                if tx.send(LogMessage::Line(line)).is_err() {
                    break;
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!("Reading installer output failed: {}", e);
                break;
            }
        }
    }
    debug!("Installer output closed after {} line(s)", lines);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        locked: bool,
        forward: Option<bool>,
        errors: Vec<String>,
    }

    impl WizardControl for Recorder {
        fn set_forward_enabled(&mut self, enabled: bool) {
            self.forward = Some(enabled);
        }
        fn lock_navigation(&mut self) {
            self.locked = true;
        }
        fn report_error(&mut self, message: String) {
            self.errors.push(message);
        }
    }

    fn settings(dir: &std::path::Path, body: &str) -> RunnerSettings {
        let script = dir.join("install.sh");
        std::fs::write(&script, body).unwrap();
        RunnerSettings {
            interpreter: "sh".to_string(),
            script,
            env_file: dir.join("install.env"),
            settle_delay: Duration::ZERO,
            flush_interval: Duration::from_millis(10),
            noise_filters: vec!["Setting default value".to_string()],
        }
    }

    #[test]
    fn test_start_locks_and_runs_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut runner = InstallRunner::new(settings(dir.path(), "echo hi\n"));
        let mut control = Recorder::default();

        let session = runner.start(&ConfigState::default(), &mut control).unwrap();
        assert!(control.locked);
        assert_eq!(control.forward, Some(false));
        assert!(runner.has_started());

        let again = runner.start(&ConfigState::default(), &mut control);
        assert_eq!(again.unwrap_err(), InstallError::AlreadyStarted);

        let report = session.finish();
        assert!(report.outcome.is_success());
        assert_eq!(report.log, "hi\nInstallation SUCCESS! You can reboot now.\n");
    }

    #[test]
    fn test_script_receives_config_path() {
        let dir = tempfile::tempdir().unwrap();
        let body = "[ \"$1\" = --config ] && grep '^HOSTNAME=' \"$2\"\n";
        let mut runner = InstallRunner::new(settings(dir.path(), body));
        let config = ConfigState {
            hostname: "myarch".to_string(),
            ..ConfigState::default()
        };

        let report = runner
            .start(&config, &mut Recorder::default())
            .unwrap()
            .finish();
        assert!(report.outcome.is_success(), "{}", report.log);
        assert!(report.log.starts_with("HOSTNAME=myarch\n"));
    }

    #[test]
    fn test_invalid_utf8_does_not_stop_stream() {
        let dir = tempfile::tempdir().unwrap();
        let body = "printf 'bad \\377 byte\\r\\nnext\\n'\n";
        let mut runner = InstallRunner::new(settings(dir.path(), body));

        let report = runner
            .start(&ConfigState::default(), &mut Recorder::default())
            .unwrap()
            .finish();
        let lines: Vec<&str> = report.log.lines().collect();
        assert_eq!(lines[0], "bad \u{FFFD} byte");
        assert_eq!(lines[1], "next");
    }
}
