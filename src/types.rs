//! Type-safe choice types for the wizard
//!
//! Selection fields use these enums instead of raw strings so the form can
//! cycle through options and the input file only ever carries values the
//! installer script understands.

use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Root filesystem for automatic partitioning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[derive(Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Filesystem {
    #[default]
    #[strum(serialize = "ext4")]
    Ext4,
    #[strum(serialize = "btrfs")]
    Btrfs,
}

/// Desktop environment selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[derive(Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum DesktopEnvironment {
    #[strum(serialize = "none")]
    None,
    #[default]
    #[strum(serialize = "xfce")]
    Xfce,
    #[strum(serialize = "gnome")]
    Gnome,
    #[strum(serialize = "kde")]
    Kde,
    #[strum(serialize = "i3")]
    I3,
    #[strum(serialize = "sway")]
    Sway,
    #[strum(serialize = "hyprland")]
    Hyprland,
    #[strum(serialize = "cinnamon")]
    Cinnamon,
    #[strum(serialize = "mate")]
    Mate,
    #[strum(serialize = "lxqt")]
    Lxqt,
    #[strum(serialize = "budgie")]
    Budgie,
}

/// Login shell for the primary user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[derive(Display, EnumString, EnumIter)]
pub enum ShellChoice {
    #[default]
    #[strum(serialize = "bash")]
    Bash,
    #[strum(serialize = "zsh")]
    Zsh,
    /// zsh with oh-my-zsh preinstalled
    #[strum(serialize = "zsh-ohmyzsh")]
    ZshOhMyZsh,
}

/// Partitioning mode on the storage page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[derive(Display, EnumString, EnumIter)]
pub enum PartitionMode {
    /// Wipe the selected disk and let the installer lay it out
    #[default]
    #[strum(serialize = "Automatic")]
    Automatic,
    /// Use partitions the operator created beforehand
    #[strum(serialize = "Manual")]
    Manual,
}

/// Step an enum value forward or backward through its variants, wrapping around.
pub fn cycle<T>(current: T, forward: bool) -> T
where
    T: IntoEnumIterator + PartialEq + Copy,
{
    let all: Vec<T> = T::iter().collect();
    let pos = all.iter().position(|v| *v == current).unwrap_or(0);
    let len = all.len();
    let next = if forward {
        (pos + 1) % len
    } else {
        (pos + len - 1) % len
    };
    all[next]
}

/// Render a boolean the way the installer script expects it.
pub fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

/// Parse a `yes`/`no` flag. Anything else is rejected.
pub fn parse_yes_no(value: &str) -> Option<bool> {
    match value {
        "yes" => Some(true),
        "no" => Some(false),
        _ => None,
    }
}
