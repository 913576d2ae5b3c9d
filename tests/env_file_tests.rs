//! Installer input file tests
//!
//! The installer script reads these files line by line, so the exact text
//! matters: key order, `yes`/`no` flags, the trailing marker and the file
//! mode.

use std::os::unix::fs::PermissionsExt;

use archwizard::config::ConfigState;
use archwizard::env_file::{self, CONFIG_KEYS, EnvFileError, NONINTERACTIVE_MARKER};
use archwizard::types::{DesktopEnvironment, Filesystem, ShellChoice};
use archwizard::wizard::PageKind;

fn scenario() -> ConfigState {
    ConfigState {
        disk: "/dev/sda".to_string(),
        hostname: "myarch".to_string(),
        encrypt: true,
        luks_password: "cryptpass".to_string(),
        desktop: DesktopEnvironment::Kde,
        install_nvidia: true,
        root_password: "rootpw".to_string(),
        user_password: "userpw".to_string(),
        ..ConfigState::default()
    }
}

#[test]
fn test_render_contains_scenario_lines() {
    let text = env_file::render(&scenario());
    let lines: Vec<&str> = text.lines().collect();

    for expected in [
        "DISK=/dev/sda",
        "HOSTNAME=myarch",
        "USE_LUKS=yes",
        "LUKS_PASSWORD=cryptpass",
        "DESKTOP_ENV=kde",
        "HAS_NVIDIA=yes",
        "MANUAL_PARTITIONING=no",
        "FORMAT_ROOT=yes",
        "FORMAT_EFI=no",
        "FS_TYPE=ext4",
        "SHELL_CHOICE=bash",
    ] {
        assert!(lines.contains(&expected), "missing {expected}");
    }
    assert_eq!(lines.last(), Some(&NONINTERACTIVE_MARKER));
    assert!(text.ends_with('\n'));
}

#[test]
fn test_render_key_order() {
    let text = env_file::render(&ConfigState::default());
    let keys: Vec<&str> = text
        .lines()
        .filter_map(|line| line.split_once('=').map(|(k, _)| k))
        .collect();
    assert_eq!(keys.len(), CONFIG_KEYS.len() + 1);
    assert_eq!(&keys[..CONFIG_KEYS.len()], &CONFIG_KEYS[..]);
    assert_eq!(keys[CONFIG_KEYS.len()], "NONINTERACTIVE");
}

#[test]
fn test_empty_values_are_written() {
    let text = env_file::render(&ConfigState::default());
    assert!(text.lines().any(|l| l == "DISK="));
    assert!(text.lines().any(|l| l == "LUKS_PASSWORD="));
}

#[test]
fn test_parse_round_trip() {
    let config = ConfigState {
        manual_partitioning: true,
        target_root: "/dev/sda2".to_string(),
        target_efi: "/dev/sda1".to_string(),
        format_efi: true,
        filesystem: Filesystem::Btrfs,
        shell: ShellChoice::ZshOhMyZsh,
        full_name: "Jo Doe".to_string(),
        ..scenario()
    };
    let parsed = env_file::parse(&env_file::render(&config)).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn test_value_may_contain_equals() {
    let config = ConfigState {
        root_password: "a=b=c".to_string(),
        ..scenario()
    };
    let parsed = env_file::parse(&env_file::render(&config)).unwrap();
    assert_eq!(parsed.root_password, "a=b=c");
}

#[test]
fn test_parse_rejects_bad_input() {
    let good = env_file::render(&scenario());

    let missing = good.replace("HOSTNAME=myarch\n", "");
    assert_eq!(
        env_file::parse(&missing),
        Err(EnvFileError::MissingKey { key: "HOSTNAME" })
    );

    let duplicated = format!("{good}DISK=/dev/sdb\n");
    assert_eq!(
        env_file::parse(&duplicated),
        Err(EnvFileError::DuplicateKey {
            key: "DISK".to_string()
        })
    );

    let bad_flag = good.replace("USE_LUKS=yes", "USE_LUKS=true");
    assert_eq!(
        env_file::parse(&bad_flag),
        Err(EnvFileError::InvalidValue {
            key: "USE_LUKS",
            value: "true".to_string()
        })
    );

    let bad_desktop = good.replace("DESKTOP_ENV=kde", "DESKTOP_ENV=unity");
    assert!(matches!(
        env_file::parse(&bad_desktop),
        Err(EnvFileError::InvalidValue { key: "DESKTOP_ENV", .. })
    ));

    let malformed = format!("garbage\n{good}");
    assert_eq!(
        env_file::parse(&malformed),
        Err(EnvFileError::MalformedLine { line: 1 })
    );
}

#[test]
fn test_parse_ignores_unknown_keys_and_blank_lines() {
    let text = format!("\nEXTRA=1\n{}\n", env_file::render(&scenario()));
    assert_eq!(env_file::parse(&text).unwrap(), scenario());
}

#[test]
fn test_write_is_owner_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("install.env");
    std::fs::write(&path, "old").unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

    let text = env_file::render(&scenario());
    env_file::write(&path, &text).unwrap();

    let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o600);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), text);
}

#[test]
fn test_write_refuses_symlink() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("elsewhere");
    std::fs::write(&target, "keep").unwrap();
    std::fs::set_permissions(&target, std::fs::Permissions::from_mode(0o644)).unwrap();
    let link = dir.path().join("install.env");
    std::os::unix::fs::symlink(&target, &link).unwrap();

    assert!(env_file::write(&link, &env_file::render(&scenario())).is_err());

    assert_eq!(std::fs::read_to_string(&target).unwrap(), "keep");
    let mode = std::fs::metadata(&target).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o644);
}

#[test]
fn test_load_and_validate_every_step() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("install.env");
    env_file::write(&path, &env_file::render(&scenario())).unwrap();

    let config = env_file::load(&path).unwrap();
    for page in PageKind::ALL {
        assert!(page.validate(&config).is_ok(), "{page} failed");
    }
}

#[test]
fn test_load_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = env_file::load(&dir.path().join("absent.env")).unwrap_err();
    assert!(err.to_string().starts_with("IO error"));
}
