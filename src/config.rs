//! Installation parameters collected by the wizard
//!
//! `ConfigState` is the single record every page reads from and writes to.
//! It carries no behavior beyond defaults and a human-readable summary; which
//! page may touch which field is decided by `wizard::field`.

use crate::types::{DesktopEnvironment, Filesystem, ShellChoice};

/// Every parameter handed to the installer script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigState {
    // Storage
    pub disk: String,
    pub manual_partitioning: bool,
    /// Root partition, only used in manual mode
    pub target_root: String,
    /// EFI system partition, only used in manual mode
    pub target_efi: String,
    pub format_root: bool,
    pub format_efi: bool,
    pub filesystem: Filesystem,
    pub encrypt: bool,
    pub luks_password: String,

    // Identity
    pub hostname: String,
    pub full_name: String,
    pub username: String,
    pub root_password: String,
    pub user_password: String,

    // Localization (free-form)
    pub timezone: String,
    pub locale: String,
    pub keymap: String,

    // Desktop
    pub desktop: DesktopEnvironment,
    pub install_nvidia: bool,
    pub shell: ShellChoice,
}

impl Default for ConfigState {
    fn default() -> Self {
        Self {
            disk: String::new(),
            manual_partitioning: false,
            target_root: String::new(),
            target_efi: String::new(),
            // Root is formatted even in manual mode unless unchecked; the ESP is
            // left alone by default so an existing bootloader survives.
            format_root: true,
            format_efi: false,
            filesystem: Filesystem::Ext4,
            encrypt: false,
            luks_password: String::new(),
            hostname: "archlinux".to_string(),
            full_name: String::new(),
            username: "user".to_string(),
            root_password: String::new(),
            user_password: String::new(),
            timezone: "UTC".to_string(),
            locale: "en_US".to_string(),
            keymap: "us".to_string(),
            desktop: DesktopEnvironment::Xfce,
            install_nvidia: false,
            shell: ShellChoice::Bash,
        }
    }
}

impl ConfigState {
    /// Create a configuration with the installer's defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines shown on the summary page before the install starts.
    ///
    /// Secrets are never part of the summary.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Target Disk: {}", self.disk),
            format!("Manual Partitioning: {}", self.manual_partitioning),
            format!("Filesystem: {}", self.filesystem),
            format!("Encrypt: {}", self.encrypt),
            String::new(),
            format!("Hostname: {}", self.hostname),
            format!("User: {} (Full: {})", self.username, self.full_name),
            format!("Shell: {}", self.shell),
            String::new(),
            format!("Timezone: {}", self.timezone),
            format!("Locale: {}", self.locale),
            format!("Keymap: {}", self.keymap),
            String::new(),
            format!("Desktop: {}", self.desktop),
            format!("Nvidia: {}", self.install_nvidia),
        ];

        if self.manual_partitioning {
            lines.push(String::new());
            lines.push("Manual Targets:".to_string());
            lines.push(format!(
                "Root: {} (Format: {})",
                self.target_root, self.format_root
            ));
            lines.push(format!(
                "EFI: {} (Format: {})",
                self.target_efi, self.format_efi
            ));
        }

        lines
    }
}
