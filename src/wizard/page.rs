//! Wizard steps
//!
//! Each step is a closed variant with a pure validation rule and the set of
//! configuration fields it owns. Dispatch is an exhaustive `match`; adding a
//! step means touching every table here and nothing else.

use strum::{Display, EnumIter};

use super::ValidationError;
use super::field::Field;
use crate::config::ConfigState;

/// One step of the wizard sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum PageKind {
    Welcome,
    Storage,
    Localization,
    Account,
    Desktop,
    Summary,
    Install,
}

impl PageKind {
    /// All steps in wizard order
    pub const ALL: [PageKind; 7] = [
        PageKind::Welcome,
        PageKind::Storage,
        PageKind::Localization,
        PageKind::Account,
        PageKind::Desktop,
        PageKind::Summary,
        PageKind::Install,
    ];

    /// Title shown in the header
    pub fn title(self) -> &'static str {
        match self {
            PageKind::Welcome => "Welcome",
            PageKind::Storage => "Storage Configuration",
            PageKind::Localization => "Localization",
            PageKind::Account => "User Account",
            PageKind::Desktop => "Desktop Environment",
            PageKind::Summary => "Installation Summary",
            PageKind::Install => "Installing",
        }
    }

    /// Short label for the step indicator
    pub fn short_name(self) -> &'static str {
        match self {
            PageKind::Welcome => "Welcome",
            PageKind::Storage => "Storage",
            PageKind::Localization => "Locale",
            PageKind::Account => "Account",
            PageKind::Desktop => "Desktop",
            PageKind::Summary => "Summary",
            PageKind::Install => "Install",
        }
    }

    /// Whether this is the step that runs the installer
    pub fn is_terminal(self) -> bool {
        self == PageKind::Install
    }

    /// Check whether the wizard may leave this step going forward.
    pub fn validate(self, config: &ConfigState) -> Result<(), ValidationError> {
        match self {
            PageKind::Storage => validate_storage(config),
            PageKind::Account => validate_account(config),
            PageKind::Welcome
            | PageKind::Localization
            | PageKind::Desktop
            | PageKind::Summary
            | PageKind::Install => Ok(()),
        }
    }

    /// Every field this step may modify
    pub fn fields(self) -> &'static [Field] {
        match self {
            PageKind::Storage => &[
                Field::PartitionMode,
                Field::Disk,
                Field::Filesystem,
                Field::Encrypt,
                Field::LuksPassword,
                Field::RootPartition,
                Field::FormatRoot,
                Field::EfiPartition,
                Field::FormatEfi,
            ],
            PageKind::Localization => &[Field::Timezone, Field::Locale, Field::Keymap],
            PageKind::Account => &[
                Field::Hostname,
                Field::FullName,
                Field::Username,
                Field::RootPassword,
                Field::UserPassword,
                Field::Shell,
            ],
            PageKind::Desktop => &[Field::Desktop, Field::Nvidia],
            PageKind::Welcome | PageKind::Summary | PageKind::Install => &[],
        }
    }

    /// Fields shown for the current configuration.
    ///
    /// The storage step shows either the automatic or the manual form, and
    /// the LUKS passphrase only while encryption is on.
    pub fn visible_fields(self, config: &ConfigState) -> Vec<Field> {
        match self {
            PageKind::Storage if config.manual_partitioning => vec![
                Field::PartitionMode,
                Field::RootPartition,
                Field::FormatRoot,
                Field::EfiPartition,
                Field::FormatEfi,
            ],
            PageKind::Storage => {
                let mut fields = vec![
                    Field::PartitionMode,
                    Field::Disk,
                    Field::Filesystem,
                    Field::Encrypt,
                ];
                if config.encrypt {
                    fields.push(Field::LuksPassword);
                }
                fields
            }
            other => other.fields().to_vec(),
        }
    }

    /// Whether `field` belongs to this step
    pub fn owns(self, field: Field) -> bool {
        self.fields().contains(&field)
    }
}

fn validate_storage(config: &ConfigState) -> Result<(), ValidationError> {
    if config.manual_partitioning {
        if config.target_root.is_empty() {
            return Err(ValidationError::new("please select a Root partition"));
        }
        return Ok(());
    }

    if config.disk.is_empty() {
        return Err(ValidationError::new("please select a Target Disk"));
    }
    if config.encrypt && config.luks_password.is_empty() {
        return Err(ValidationError::new("LUKS Password is required"));
    }
    Ok(())
}

fn validate_account(config: &ConfigState) -> Result<(), ValidationError> {
    if config.username.is_empty() || config.hostname.is_empty() {
        return Err(ValidationError::new("username and hostname are required"));
    }
    if config.root_password.is_empty() || config.user_password.is_empty() {
        return Err(ValidationError::new("passwords are required"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn account_ready() -> ConfigState {
        ConfigState {
            root_password: "root".to_string(),
            user_password: "user".to_string(),
            ..ConfigState::default()
        }
    }

    #[test]
    fn test_all_matches_declaration_order() {
        let iterated: Vec<PageKind> = PageKind::iter().collect();
        assert_eq!(iterated, PageKind::ALL.to_vec());
        assert!(PageKind::ALL[6].is_terminal());
    }

    #[test]
    fn test_pages_without_rules_always_pass() {
        let config = ConfigState::default();
        for page in [
            PageKind::Welcome,
            PageKind::Localization,
            PageKind::Desktop,
            PageKind::Summary,
            PageKind::Install,
        ] {
            assert!(page.validate(&config).is_ok(), "{page} should validate");
        }
    }

    #[test]
    fn test_storage_automatic_rules() {
        let mut config = ConfigState::default();
        let err = PageKind::Storage.validate(&config).unwrap_err();
        assert_eq!(err.reason(), "please select a Target Disk");

        config.disk = "/dev/sda".to_string();
        assert!(PageKind::Storage.validate(&config).is_ok());

        config.encrypt = true;
        let err = PageKind::Storage.validate(&config).unwrap_err();
        assert_eq!(err.reason(), "LUKS Password is required");

        config.luks_password = "cryptpass".to_string();
        assert!(PageKind::Storage.validate(&config).is_ok());
    }

    #[test]
    fn test_storage_manual_ignores_disk() {
        let mut config = ConfigState {
            manual_partitioning: true,
            encrypt: true,
            ..ConfigState::default()
        };
        let err = PageKind::Storage.validate(&config).unwrap_err();
        assert_eq!(err.reason(), "please select a Root partition");

        config.target_root = "/dev/sda2".to_string();
        assert!(PageKind::Storage.validate(&config).is_ok());
    }

    #[test]
    fn test_account_rules() {
        let mut config = account_ready();
        assert!(PageKind::Account.validate(&config).is_ok());

        config.hostname.clear();
        assert_eq!(
            PageKind::Account.validate(&config).unwrap_err().reason(),
            "username and hostname are required"
        );

        let mut config = account_ready();
        config.username.clear();
        assert!(PageKind::Account.validate(&config).is_err());

        let mut config = account_ready();
        config.user_password.clear();
        assert_eq!(
            PageKind::Account.validate(&config).unwrap_err().reason(),
            "passwords are required"
        );
    }

    #[test]
    fn test_every_field_has_exactly_one_owner() {
        for field in Field::iter() {
            let owners: Vec<PageKind> = PageKind::ALL
                .into_iter()
                .filter(|p| p.owns(field))
                .collect();
            assert_eq!(owners, vec![field.page()], "{field:?}");
        }
    }

    #[test]
    fn test_storage_visible_fields_follow_mode() {
        let mut config = ConfigState::default();
        let auto = PageKind::Storage.visible_fields(&config);
        assert!(auto.contains(&Field::Disk));
        assert!(!auto.contains(&Field::LuksPassword));
        assert!(!auto.contains(&Field::RootPartition));

        config.encrypt = true;
        assert!(PageKind::Storage.visible_fields(&config).contains(&Field::LuksPassword));

        config.manual_partitioning = true;
        let manual = PageKind::Storage.visible_fields(&config);
        assert!(manual.contains(&Field::RootPartition));
        assert!(manual.contains(&Field::FormatEfi));
        assert!(!manual.contains(&Field::Disk));
    }
}
