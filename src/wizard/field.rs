//! Editable configuration fields
//!
//! A `Field` names one `ConfigState` member together with how it is edited
//! and which page owns it. All writes to the configuration go through
//! `Field::apply`.

use strum::EnumIter;

use super::NavigationError;
use super::page::PageKind;
use crate::config::ConfigState;
use crate::devices;
use crate::types::{PartitionMode, cycle};

/// One editable member of `ConfigState`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Field {
    // Storage
    PartitionMode,
    Disk,
    Filesystem,
    Encrypt,
    LuksPassword,
    RootPartition,
    FormatRoot,
    EfiPartition,
    FormatEfi,
    // Localization
    Timezone,
    Locale,
    Keymap,
    // Account
    Hostname,
    FullName,
    Username,
    RootPassword,
    UserPassword,
    Shell,
    // Desktop
    Desktop,
    Nvidia,
}

/// Where a device field takes its options from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceSource {
    Disks,
    Partitions,
}

/// How a field is edited and displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free-form single line
    Text,
    /// Free-form single line, masked on screen
    Secret,
    /// Checkbox
    Toggle,
    /// Fixed set of options
    Choice,
    /// Block device picked from a detected list
    Device(DeviceSource),
}

/// A requested change to a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEdit {
    /// Replace a text or secret value
    Text(String),
    /// Flip a checkbox
    Toggle,
    /// Step a choice or device field to its next or previous option
    Cycle { forward: bool },
    /// Select a device by its display entry, e.g. `/dev/sda (20G)`
    Device(String),
}

impl Field {
    /// Page that owns this field
    pub fn page(self) -> PageKind {
        match self {
            Field::PartitionMode
            | Field::Disk
            | Field::Filesystem
            | Field::Encrypt
            | Field::LuksPassword
            | Field::RootPartition
            | Field::FormatRoot
            | Field::EfiPartition
            | Field::FormatEfi => PageKind::Storage,
            Field::Timezone | Field::Locale | Field::Keymap => PageKind::Localization,
            Field::Hostname
            | Field::FullName
            | Field::Username
            | Field::RootPassword
            | Field::UserPassword
            | Field::Shell => PageKind::Account,
            Field::Desktop | Field::Nvidia => PageKind::Desktop,
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Field::Timezone
            | Field::Locale
            | Field::Keymap
            | Field::Hostname
            | Field::FullName
            | Field::Username => FieldKind::Text,
            Field::LuksPassword | Field::RootPassword | Field::UserPassword => FieldKind::Secret,
            Field::Encrypt | Field::FormatRoot | Field::FormatEfi | Field::Nvidia => {
                FieldKind::Toggle
            }
            Field::PartitionMode | Field::Filesystem | Field::Shell | Field::Desktop => {
                FieldKind::Choice
            }
            Field::Disk => FieldKind::Device(DeviceSource::Disks),
            Field::RootPartition | Field::EfiPartition => {
                FieldKind::Device(DeviceSource::Partitions)
            }
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::PartitionMode => "Partitioning Mode",
            Field::Disk => "Target Disk",
            Field::Filesystem => "Filesystem",
            Field::Encrypt => "Encrypt Disk (LUKS)",
            Field::LuksPassword => "LUKS Password",
            Field::RootPartition => "Root Partition (/)",
            Field::FormatRoot => "Format Root?",
            Field::EfiPartition => "EFI Partition (/boot)",
            Field::FormatEfi => "Format EFI?",
            Field::Timezone => "Timezone",
            Field::Locale => "Locale",
            Field::Keymap => "Keymap",
            Field::Hostname => "Hostname",
            Field::FullName => "Full Name",
            Field::Username => "Username",
            Field::RootPassword => "Root Password",
            Field::UserPassword => "User Password",
            Field::Shell => "Preferred Shell",
            Field::Desktop => "Desktop",
            Field::Nvidia => "Install NVIDIA Drivers",
        }
    }

    /// Example shown while a text field is empty
    pub fn placeholder(self) -> Option<&'static str> {
        match self {
            Field::Timezone => Some("Europe/London"),
            Field::Locale => Some("en_US"),
            Field::Keymap => Some("us"),
            Field::FullName => Some("Firstname Lastname"),
            _ => None,
        }
    }

    /// Current raw value of a text or secret field
    pub fn text<'a>(self, config: &'a ConfigState) -> Option<&'a str> {
        let value = match self {
            Field::LuksPassword => &config.luks_password,
            Field::Timezone => &config.timezone,
            Field::Locale => &config.locale,
            Field::Keymap => &config.keymap,
            Field::Hostname => &config.hostname,
            Field::FullName => &config.full_name,
            Field::Username => &config.username,
            Field::RootPassword => &config.root_password,
            Field::UserPassword => &config.user_password,
            _ => return None,
        };
        Some(value.as_str())
    }

    /// Current value of a toggle field
    pub fn flag(self, config: &ConfigState) -> Option<bool> {
        match self {
            Field::Encrypt => Some(config.encrypt),
            Field::FormatRoot => Some(config.format_root),
            Field::FormatEfi => Some(config.format_efi),
            Field::Nvidia => Some(config.install_nvidia),
            _ => None,
        }
    }

    /// Device path currently stored in a device field
    pub fn device<'a>(self, config: &'a ConfigState) -> Option<&'a str> {
        match self {
            Field::Disk => Some(&config.disk),
            Field::RootPartition => Some(&config.target_root),
            Field::EfiPartition => Some(&config.target_efi),
            _ => None,
        }
    }

    /// Value as shown on screen. Secrets are masked.
    pub fn display_value(self, config: &ConfigState) -> String {
        match self.kind() {
            FieldKind::Secret => "*".repeat(self.text(config).map_or(0, |s| s.chars().count())),
            FieldKind::Text => self.text(config).unwrap_or_default().to_string(),
            FieldKind::Toggle => {
                if self.flag(config).unwrap_or(false) {
                    "[x]".to_string()
                } else {
                    "[ ]".to_string()
                }
            }
            FieldKind::Device(_) => match self.device(config) {
                Some(path) if !path.is_empty() => path.to_string(),
                _ => "(none)".to_string(),
            },
            FieldKind::Choice => match self {
                Field::PartitionMode => partition_mode(config).to_string(),
                Field::Filesystem => config.filesystem.to_string(),
                Field::Shell => config.shell.to_string(),
                Field::Desktop => config.desktop.to_string(),
                _ => String::new(),
            },
        }
    }

    /// Apply `edit` to this field of `config`.
    ///
    /// Cycling a device field needs the detected option list, so the wizard
    /// resolves it into a `FieldEdit::Device` before calling this.
    pub fn apply(self, config: &mut ConfigState, edit: FieldEdit) -> Result<(), NavigationError> {
        match (self.kind(), edit) {
            (FieldKind::Text | FieldKind::Secret, FieldEdit::Text(value)) => {
                // One KEY=VALUE line per key in the installer input file
                if value.contains(['\n', '\r']) {
                    return Err(NavigationError::InvalidValue { field: self });
                }
                *self.text_mut(config)? = value;
            }
            (FieldKind::Toggle, FieldEdit::Toggle) => {
                let flag = self.flag_mut(config)?;
                *flag = !*flag;
            }
            (FieldKind::Choice, FieldEdit::Cycle { forward }) => match self {
                Field::PartitionMode => {
                    let mode = cycle(partition_mode(config), forward);
                    config.manual_partitioning = mode == PartitionMode::Manual;
                }
                Field::Filesystem => config.filesystem = cycle(config.filesystem, forward),
                Field::Shell => config.shell = cycle(config.shell, forward),
                Field::Desktop => config.desktop = cycle(config.desktop, forward),
                _ => return Err(NavigationError::UnsupportedEdit { field: self }),
            },
            (FieldKind::Device(_), FieldEdit::Device(entry)) => {
                // Placeholder entries ("No disks found") clear the selection
                let path = devices::device_path(&entry).unwrap_or_default();
                *self.device_mut(config)? = path;
            }
            _ => return Err(NavigationError::UnsupportedEdit { field: self }),
        }
        Ok(())
    }

    fn text_mut(self, config: &mut ConfigState) -> Result<&mut String, NavigationError> {
        Ok(match self {
            Field::LuksPassword => &mut config.luks_password,
            Field::Timezone => &mut config.timezone,
            Field::Locale => &mut config.locale,
            Field::Keymap => &mut config.keymap,
            Field::Hostname => &mut config.hostname,
            Field::FullName => &mut config.full_name,
            Field::Username => &mut config.username,
            Field::RootPassword => &mut config.root_password,
            Field::UserPassword => &mut config.user_password,
            _ => return Err(NavigationError::UnsupportedEdit { field: self }),
        })
    }

    fn flag_mut(self, config: &mut ConfigState) -> Result<&mut bool, NavigationError> {
        Ok(match self {
            Field::Encrypt => &mut config.encrypt,
            Field::FormatRoot => &mut config.format_root,
            Field::FormatEfi => &mut config.format_efi,
            Field::Nvidia => &mut config.install_nvidia,
            _ => return Err(NavigationError::UnsupportedEdit { field: self }),
        })
    }

    fn device_mut(self, config: &mut ConfigState) -> Result<&mut String, NavigationError> {
        Ok(match self {
            Field::Disk => &mut config.disk,
            Field::RootPartition => &mut config.target_root,
            Field::EfiPartition => &mut config.target_efi,
            _ => return Err(NavigationError::UnsupportedEdit { field: self }),
        })
    }
}

fn partition_mode(config: &ConfigState) -> PartitionMode {
    if config.manual_partitioning {
        PartitionMode::Manual
    } else {
        PartitionMode::Automatic
    }
}
