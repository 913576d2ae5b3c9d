//! Front-end key handling tests
//!
//! Drive `App` with key events only, from the welcome step through a full
//! install run against a stand-in installer script.

use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use archwizard::app::{App, AppMode};
use archwizard::devices::DeviceCatalog;
use archwizard::install::SUCCESS_LINE;
use archwizard::settings::Settings;
use archwizard::theme::UiText;
use archwizard::wizard::{Field, PageKind};

fn settings(dir: &Path, body: &str) -> Settings {
    let script = dir.join("arch-install.sh");
    std::fs::write(&script, body).unwrap();
    Settings {
        interpreter: "sh".to_string(),
        script,
        env_file: dir.join("install.env"),
        flush_interval_ms: 10,
        settle_delay_ms: 0,
        partition_editor: vec![dir.join("no-such-editor").display().to_string()],
        ..Settings::default()
    }
}

fn catalog() -> DeviceCatalog {
    DeviceCatalog {
        disks: vec!["/dev/vda (32G)".to_string()],
        partitions: vec!["/dev/vda1 (1G)".to_string()],
    }
}

fn press(app: &mut App, code: KeyCode) -> bool {
    app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        press(app, KeyCode::Char(c));
    }
}

/// Focus `field` on the current page with arrow keys
fn focus(app: &mut App, field: Field) {
    for _ in 0..app.visible_fields().len() {
        press(app, KeyCode::Up);
    }
    while app.focused_field() != Some(field) {
        assert!(
            app.state().focus + 1 < app.visible_fields().len(),
            "{field:?} not on page"
        );
        press(app, KeyCode::Down);
    }
}

fn set_text(app: &mut App, field: Field, value: &str) {
    focus(app, field);
    press(app, KeyCode::Enter);
    assert_eq!(app.state().mode, AppMode::Editing);
    type_text(app, value);
    press(app, KeyCode::Enter);
    assert_eq!(app.state().mode, AppMode::Form);
}

fn wait_until_finished(app: &mut App) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while app.state().mode != AppMode::Finished {
        assert!(Instant::now() < deadline, "install did not finish");
        app.tick(Instant::now());
        thread::sleep(Duration::from_millis(10));
    }
}

#[test]
fn test_full_run_from_keys() {
    let dir = tempfile::tempdir().unwrap();
    let body = "echo \"config: $2\"\nsleep 0.3\necho done\n";
    let mut app = App::new(&settings(dir.path(), body), catalog());

    press(&mut app, KeyCode::Char('n'));
    assert_eq!(app.wizard().current(), PageKind::Storage);
    assert_eq!(app.wizard().config().disk, "/dev/vda");

    press(&mut app, KeyCode::Char('n'));
    press(&mut app, KeyCode::Char('n'));
    assert_eq!(app.wizard().current(), PageKind::Account);
    set_text(&mut app, Field::RootPassword, "rootpw");
    set_text(&mut app, Field::UserPassword, "userpw");

    focus(&mut app, Field::Shell);
    press(&mut app, KeyCode::Right);
    assert_eq!(app.wizard().config().shell.to_string(), "zsh");

    press(&mut app, KeyCode::Char('n'));
    press(&mut app, KeyCode::Char('n'));
    assert_eq!(app.wizard().current(), PageKind::Summary);
    assert_eq!(app.wizard().nav().forward_label, "Install");

    press(&mut app, KeyCode::Char('n'));
    assert_eq!(app.wizard().current(), PageKind::Install);
    assert_eq!(app.state().mode, AppMode::Installing);
    assert!(app.wizard().is_locked());

    // Quitting is refused while the installer runs
    assert!(!press(&mut app, KeyCode::Char('q')));
    assert_eq!(app.state().status_message, UiText::QUIT_BLOCKED);
    assert!(!press(&mut app, KeyCode::Char('b')));
    assert_eq!(app.wizard().current(), PageKind::Install);

    wait_until_finished(&mut app);
    assert_eq!(app.install_succeeded(), Some(true));
    assert_eq!(app.state().status_message, SUCCESS_LINE);

    let log = app.state().log.text().to_string();
    assert!(log.starts_with(&format!("config: {}\n", dir.path().join("install.env").display())));
    assert!(log.ends_with(&format!("done\n{SUCCESS_LINE}\n")));

    let env = std::fs::read_to_string(dir.path().join("install.env")).unwrap();
    assert!(env.contains("ROOT_PASSWORD=rootpw\n"));
    assert!(env.contains("SHELL_CHOICE=zsh\n"));

    assert!(press(&mut app, KeyCode::Char('q')));
}

#[test]
fn test_failed_run_finishes_with_error_status() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = App::new(&settings(dir.path(), "echo boom\nexit 4\n"), catalog());

    for _ in 0..3 {
        press(&mut app, KeyCode::Char('n'));
    }
    set_text(&mut app, Field::RootPassword, "r");
    set_text(&mut app, Field::UserPassword, "u");
    for _ in 0..3 {
        press(&mut app, KeyCode::Char('n'));
    }
    wait_until_finished(&mut app);

    assert_eq!(app.install_succeeded(), Some(false));
    assert_eq!(
        app.state().status_message,
        "Installation FAILED: exit status: 4"
    );
    assert!(app.state().popup.is_none());
    assert_eq!(app.wizard().current(), PageKind::Install);
}

#[test]
fn test_validation_popup_blocks_until_dismissed() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = App::new(&settings(dir.path(), "exit 0\n"), DeviceCatalog::default());

    press(&mut app, KeyCode::Char('n'));
    press(&mut app, KeyCode::Char('n'));
    assert_eq!(app.wizard().current(), PageKind::Storage);
    assert_eq!(
        app.state().popup.as_deref(),
        Some("please select a Target Disk")
    );

    // Keys other than Enter/Esc are swallowed by the popup
    press(&mut app, KeyCode::Char('b'));
    assert_eq!(app.wizard().current(), PageKind::Storage);

    press(&mut app, KeyCode::Esc);
    assert!(app.state().popup.is_none());
    press(&mut app, KeyCode::Char('b'));
    assert_eq!(app.wizard().current(), PageKind::Welcome);
}

#[test]
fn test_encrypt_toggle_reveals_passphrase_row() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = App::new(&settings(dir.path(), "exit 0\n"), catalog());
    press(&mut app, KeyCode::Char('n'));

    assert!(!app.visible_fields().contains(&Field::LuksPassword));
    focus(&mut app, Field::Encrypt);
    press(&mut app, KeyCode::Char(' '));
    assert!(app.wizard().config().encrypt);
    assert_eq!(app.visible_fields().last(), Some(&Field::LuksPassword));

    set_text(&mut app, Field::LuksPassword, "cryptpass");
    assert_eq!(app.wizard().config().luks_password, "cryptpass");
}

#[test]
fn test_manual_mode_switch_clamps_focus() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = App::new(&settings(dir.path(), "exit 0\n"), catalog());
    press(&mut app, KeyCode::Char('n'));

    focus(&mut app, Field::PartitionMode);
    press(&mut app, KeyCode::Right);
    assert!(app.wizard().config().manual_partitioning);
    assert_eq!(app.focused_field(), Some(Field::PartitionMode));

    focus(&mut app, Field::RootPartition);
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.wizard().config().target_root, "/dev/vda1");
}

#[test]
fn test_partition_editor_failure_shows_popup() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = App::new(&settings(dir.path(), "exit 0\n"), catalog());

    // Only available on the storage step
    press(&mut app, KeyCode::Char('p'));
    assert!(app.state().popup.is_none());

    press(&mut app, KeyCode::Char('n'));
    press(&mut app, KeyCode::Char('p'));
    let popup = app.state().popup.clone().unwrap();
    assert!(popup.starts_with("Failed to launch"), "{popup}");
}

#[test]
fn test_help_overlay_toggles() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = App::new(&settings(dir.path(), "exit 0\n"), catalog());

    press(&mut app, KeyCode::Char('?'));
    assert!(app.state().help_visible);
    // Navigation keys are ignored while help is open
    press(&mut app, KeyCode::Char('n'));
    assert_eq!(app.wizard().current(), PageKind::Welcome);
    press(&mut app, KeyCode::Esc);
    assert!(!app.state().help_visible);
}

#[test]
fn test_ctrl_c_quits_from_editing() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = App::new(&settings(dir.path(), "exit 0\n"), catalog());
    for _ in 0..3 {
        press(&mut app, KeyCode::Char('n'));
    }
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.state().mode, AppMode::Editing);
    assert!(app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
}

#[test]
fn test_device_scan_is_applied_by_tick() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = App::new(&settings(dir.path(), "exit 0\n"), DeviceCatalog::default());
    press(&mut app, KeyCode::Char('n'));
    assert!(app.wizard().config().disk.is_empty());

    // The scan blocks until released, the caller does not
    let (release, gate) = mpsc::channel::<()>();
    app.scan_devices(move || {
        gate.recv().unwrap();
        catalog()
    });
    assert!(app.is_scanning());
    assert_eq!(app.state().status_message, "Scanning devices...");
    app.tick(Instant::now());
    assert!(app.wizard().config().disk.is_empty());

    release.send(()).unwrap();
    let deadline = Instant::now() + Duration::from_secs(5);
    while app.is_scanning() {
        assert!(Instant::now() < deadline, "scan result never arrived");
        app.tick(Instant::now());
        thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(app.wizard().config().disk, "/dev/vda");
    assert_eq!(app.state().status_message, "Device list refreshed (2 entries)");
}
