//! Installer input file
//!
//! The installer script takes its whole configuration from a flat `KEY=VALUE`
//! file: one pair per line, no quoting, no escaping. Booleans are the literal
//! strings `yes`/`no` and the file always ends with `NONINTERACTIVE=yes`.
//!
//! Values are written verbatim, so a value containing a newline would split
//! into two lines. The wizard's single-line inputs never produce one.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::Path;
use std::str::FromStr;

use nix::fcntl::OFlag;
use thiserror::Error;
use tracing::debug;

use crate::config::ConfigState;
use crate::types::{parse_yes_no, yes_no};

/// Keys carrying configuration, in the order they are written.
pub const CONFIG_KEYS: [&str; 20] = [
    "DISK",
    "MANUAL_PARTITIONING",
    "TARGET_ROOT",
    "TARGET_EFI",
    "FORMAT_ROOT",
    "FORMAT_EFI",
    "HOSTNAME",
    "FULL_NAME",
    "USERNAME",
    "ROOT_PASSWORD",
    "USER_PASSWORD",
    "TIMEZONE",
    "LOCALE",
    "KEYMAP",
    "FS_TYPE",
    "USE_LUKS",
    "LUKS_PASSWORD",
    "DESKTOP_ENV",
    "SHELL_CHOICE",
    "HAS_NVIDIA",
];

/// Fixed marker telling the script not to prompt.
pub const NONINTERACTIVE_MARKER: &str = "NONINTERACTIVE=yes";

/// Errors raised while reading an input file back into a `ConfigState`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvFileError {
    /// Line without a `=` separator
    #[error("line {line}: expected KEY=VALUE")]
    MalformedLine { line: usize },

    /// The same key appears twice
    #[error("duplicate key {key}")]
    DuplicateKey { key: String },

    /// A required key is absent
    #[error("missing key {key}")]
    MissingKey { key: &'static str },

    /// A value is not valid for its key
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
}

/// Render `config` as installer input text.
pub fn render(config: &ConfigState) -> String {
    let pairs: [(&str, &str); 20] = [
        ("DISK", &config.disk),
        ("MANUAL_PARTITIONING", yes_no(config.manual_partitioning)),
        ("TARGET_ROOT", &config.target_root),
        ("TARGET_EFI", &config.target_efi),
        ("FORMAT_ROOT", yes_no(config.format_root)),
        ("FORMAT_EFI", yes_no(config.format_efi)),
        ("HOSTNAME", &config.hostname),
        ("FULL_NAME", &config.full_name),
        ("USERNAME", &config.username),
        ("ROOT_PASSWORD", &config.root_password),
        ("USER_PASSWORD", &config.user_password),
        ("TIMEZONE", &config.timezone),
        ("LOCALE", &config.locale),
        ("KEYMAP", &config.keymap),
        ("FS_TYPE", &config.filesystem.to_string()),
        ("USE_LUKS", yes_no(config.encrypt)),
        ("LUKS_PASSWORD", &config.luks_password),
        ("DESKTOP_ENV", &config.desktop.to_string()),
        ("SHELL_CHOICE", &config.shell.to_string()),
        ("HAS_NVIDIA", yes_no(config.install_nvidia)),
    ];

    let mut out = String::new();
    for (key, value) in pairs {
        out.push_str(key);
        out.push('=');
        out.push_str(value);
        out.push('\n');
    }
    out.push_str(NONINTERACTIVE_MARKER);
    out.push('\n');
    out
}

/// Parse installer input text back into a `ConfigState`.
///
/// Blank lines and unknown keys are ignored; every key in `CONFIG_KEYS` must
/// appear exactly once.
pub fn parse(text: &str) -> Result<ConfigState, EnvFileError> {
    let mut values: HashMap<&str, &str> = HashMap::new();

    for (idx, line) in text.split('\n').enumerate() {
        if line.is_empty() {
            continue;
        }
        let (key, value) = line
            .split_once('=')
            .ok_or(EnvFileError::MalformedLine { line: idx + 1 })?;
        if values.insert(key, value).is_some() {
            return Err(EnvFileError::DuplicateKey {
                key: key.to_string(),
            });
        }
    }

    let text_value = |key: &'static str| -> Result<String, EnvFileError> {
        values
            .get(key)
            .map(|v| v.to_string())
            .ok_or(EnvFileError::MissingKey { key })
    };
    let flag_value = |key: &'static str| -> Result<bool, EnvFileError> {
        let raw = values.get(key).ok_or(EnvFileError::MissingKey { key })?;
        parse_yes_no(raw).ok_or_else(|| EnvFileError::InvalidValue {
            key,
            value: raw.to_string(),
        })
    };
    fn choice_value<T: FromStr>(
        values: &HashMap<&str, &str>,
        key: &'static str,
    ) -> Result<T, EnvFileError> {
        let raw = values.get(key).ok_or(EnvFileError::MissingKey { key })?;
        raw.parse().map_err(|_| EnvFileError::InvalidValue {
            key,
            value: raw.to_string(),
        })
    }

    Ok(ConfigState {
        disk: text_value("DISK")?,
        manual_partitioning: flag_value("MANUAL_PARTITIONING")?,
        target_root: text_value("TARGET_ROOT")?,
        target_efi: text_value("TARGET_EFI")?,
        format_root: flag_value("FORMAT_ROOT")?,
        format_efi: flag_value("FORMAT_EFI")?,
        hostname: text_value("HOSTNAME")?,
        full_name: text_value("FULL_NAME")?,
        username: text_value("USERNAME")?,
        root_password: text_value("ROOT_PASSWORD")?,
        user_password: text_value("USER_PASSWORD")?,
        timezone: text_value("TIMEZONE")?,
        locale: text_value("LOCALE")?,
        keymap: text_value("KEYMAP")?,
        filesystem: choice_value(&values, "FS_TYPE")?,
        encrypt: flag_value("USE_LUKS")?,
        luks_password: text_value("LUKS_PASSWORD")?,
        desktop: choice_value(&values, "DESKTOP_ENV")?,
        shell: choice_value(&values, "SHELL_CHOICE")?,
        install_nvidia: flag_value("HAS_NVIDIA")?,
    })
}

/// Write input text to `path`, readable and writable by the owner only.
///
/// The file carries passwords, so permissions are forced to 0600 even when
/// a previous run left a file with wider ones. A symlink at `path` is
/// refused rather than followed.
pub fn write(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .custom_flags(OFlag::O_NOFOLLOW.bits())
        .open(path)?;
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()?;

    debug!("Installer input written: {:?} ({} bytes)", path, contents.len());
    Ok(())
}

/// Read and parse an input file from disk.
pub fn load(path: &Path) -> crate::error::Result<ConfigState> {
    let text = fs::read_to_string(path)?;
    Ok(parse(&text)?)
}
