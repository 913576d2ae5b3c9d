//! Log aggregation tests
//!
//! Feed the aggregator by hand and check flush cadence, filtering, ANSI
//! cleaning and how the outcome is picked up.

use std::sync::mpsc;
use std::time::{Duration, Instant};

use archwizard::install::{
    InstallError, InstallOutcome, LogAggregator, LogMessage, NoiseFilter, SUCCESS_LINE,
};

fn aggregator(interval_ms: u64) -> (mpsc::Sender<LogMessage>, LogAggregator) {
    let (tx, rx) = mpsc::channel();
    let noise = NoiseFilter::new(vec![
        "Failed to read: session".to_string(),
        "Setting default value".to_string(),
    ]);
    (
        tx,
        LogAggregator::new(rx, noise, Duration::from_millis(interval_ms)),
    )
}

fn line(text: &str) -> LogMessage {
    LogMessage::Line(text.to_string())
}

#[test]
fn test_flush_respects_interval() {
    let (tx, mut agg) = aggregator(100);
    let start = Instant::now();

    tx.send(line("one")).unwrap();
    assert_eq!(agg.tick(start).unwrap().text, "one\n");

    tx.send(line("two")).unwrap();
    assert!(agg.tick(start + Duration::from_millis(50)).is_none());
    assert_eq!(agg.text(), "one\n");

    let update = agg.tick(start + Duration::from_millis(100)).unwrap();
    assert_eq!(update.appended, "two\n");
    assert_eq!(update.text, "one\ntwo\n");
}

#[test]
fn test_empty_cycle_produces_nothing() {
    let (_tx, mut agg) = aggregator(10);
    assert!(agg.tick(Instant::now()).is_none());
    assert!(agg.flush_now().is_none());
    assert_eq!(agg.text(), "");
}

#[test]
fn test_noise_only_cycle_produces_nothing() {
    let (tx, mut agg) = aggregator(10);
    tx.send(line("Failed to read: session 5")).unwrap();
    tx.send(line("  Setting default value for LANG")).unwrap();
    assert!(agg.flush_now().is_none());
    assert_eq!(agg.dropped_lines(), 2);
}

#[test]
fn test_colored_noise_is_dropped() {
    let (tx, mut agg) = aggregator(10);
    tx.send(line("\x1b[33mSetting\x1b[0m default value for X")).unwrap();
    tx.send(line("\x1b[1mkeep\x1b[0m")).unwrap();

    assert_eq!(agg.flush_now().unwrap().text, "keep\n");
    assert_eq!(agg.dropped_lines(), 1);
}

#[test]
fn test_lines_are_cleaned_in_order() {
    let (tx, mut agg) = aggregator(10);
    tx.send(line("\x1b[1m==>\x1b[0m Partitioning /dev/sda")).unwrap();
    tx.send(line("Setting default value")).unwrap();
    tx.send(line("\x1b]0;pacstrap\x07Installing base")).unwrap();
    tx.send(line("")).unwrap();

    let update = agg.flush_now().unwrap();
    assert_eq!(update.text, "==> Partitioning /dev/sda\nInstalling base\n\n");
}

#[test]
fn test_outcome_after_status_line() {
    let (tx, mut agg) = aggregator(10);
    tx.send(line("done")).unwrap();
    tx.send(line(SUCCESS_LINE)).unwrap();
    tx.send(LogMessage::Finished(InstallOutcome::Succeeded)).unwrap();
    drop(tx);

    let update = agg.flush_now().unwrap();
    assert!(update.text.ends_with(&format!("{SUCCESS_LINE}\n")));
    assert_eq!(agg.outcome(), Some(&InstallOutcome::Succeeded));
    assert!(agg.is_disconnected());
}

#[test]
fn test_failure_outcome() {
    let (tx, mut agg) = aggregator(10);
    let outcome = InstallOutcome::Failed(InstallError::Failed("exit status: 2".to_string()));
    tx.send(line(&outcome.status_line())).unwrap();
    tx.send(LogMessage::Finished(outcome.clone())).unwrap();

    agg.flush_now();
    assert_eq!(agg.text(), "Installation FAILED: exit status: 2\n");
    assert_eq!(agg.outcome(), Some(&outcome));
    assert!(!agg.is_disconnected());
}
