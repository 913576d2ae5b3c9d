//! Rate-limited log aggregation
//!
//! The reader thread pushes raw lines into an unbounded channel. The UI
//! thread calls `tick` between event polls; once per interval it drains the
//! channel, drops noise, strips terminal escapes and appends the result to
//! the accumulated log. A cycle that added text yields one `FlushUpdate`
//! carrying the whole log, which the view takes over wholesale.

use std::borrow::Cow;
use std::sync::LazyLock;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::{Duration, Instant};

use regex::Regex;
use tracing::debug;

use super::InstallOutcome;

/// OSC strings, CSI sequences (SGR colors included) and two-byte escapes
static ANSI_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)|\x1b\[[0-?]*[ -/]*[@-~]|\x1b[@-_]")
        .expect("static ANSI pattern is valid")
});

/// Remove terminal escape sequences from `text`
pub fn strip_ansi(text: &str) -> Cow<'_, str> {
    ANSI_ESCAPE.replace_all(text, "")
}

/// Message from the execution side to the aggregator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogMessage {
    /// One raw output line without its terminator
    Line(String),
    /// The run is over; always the last message
    Finished(InstallOutcome),
}

/// Substring denylist for known-noisy installer output
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoiseFilter {
    patterns: Vec<String>,
}

impl NoiseFilter {
    pub fn new(patterns: Vec<String>) -> Self {
        Self {
            patterns: patterns.into_iter().filter(|p| !p.is_empty()).collect(),
        }
    }

    pub fn is_noise(&self, line: &str) -> bool {
        self.patterns.iter().any(|p| line.contains(p.as_str()))
    }
}

/// Result of a flush cycle that produced new text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlushUpdate {
    /// Entire accumulated log
    pub text: String,
    /// Text added by this cycle
    pub appended: String,
}

/// Consumer side of the log pipeline
#[derive(Debug)]
pub struct LogAggregator {
    rx: Receiver<LogMessage>,
    noise: NoiseFilter,
    interval: Duration,
    last_cycle: Option<Instant>,
    accumulated: String,
    outcome: Option<InstallOutcome>,
    disconnected: bool,
    dropped: usize,
}

impl LogAggregator {
    pub fn new(rx: Receiver<LogMessage>, noise: NoiseFilter, interval: Duration) -> Self {
        Self {
            rx,
            noise,
            interval,
            last_cycle: None,
            accumulated: String::new(),
            outcome: None,
            disconnected: false,
            dropped: 0,
        }
    }

    /// Run a flush cycle if at least one interval passed since the last one.
    pub fn tick(&mut self, now: Instant) -> Option<FlushUpdate> {
        if let Some(last) = self.last_cycle {
            if now.saturating_duration_since(last) < self.interval {
                return None;
            }
        }
        self.last_cycle = Some(now);
        self.cycle()
    }

    /// Run a flush cycle regardless of the cadence
    pub fn flush_now(&mut self) -> Option<FlushUpdate> {
        self.cycle()
    }

    /// Everything flushed so far
    pub fn text(&self) -> &str {
        &self.accumulated
    }

    pub fn outcome(&self) -> Option<&InstallOutcome> {
        self.outcome.as_ref()
    }

    /// Whether the producer side has gone away
    pub fn is_disconnected(&self) -> bool {
        self.disconnected
    }

    /// Lines removed by the noise filter so far
    pub fn dropped_lines(&self) -> usize {
        self.dropped
    }

    fn cycle(&mut self) -> Option<FlushUpdate> {
        let mut appended = String::new();

        loop {
            match self.rx.try_recv() {
                Ok(LogMessage::Line(line)) => {
                    let line = strip_ansi(&line);
                    if self.noise.is_noise(&line) {
                        self.dropped += 1;
                        continue;
                    }
                    appended.push_str(&line);
                    appended.push('\n');
                }
                Ok(LogMessage::Finished(outcome)) => {
                    debug!("Install finished: {:?}", outcome);
                    self.outcome = Some(outcome);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.disconnected = true;
                    break;
                }
            }
        }

        if appended.is_empty() {
            return None;
        }
        self.accumulated.push_str(&appended);
        Some(FlushUpdate {
            text: self.accumulated.clone(),
            appended,
        })
    }
}
