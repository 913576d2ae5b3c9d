//! Wizard navigation state machine
//!
//! The wizard owns the ordered step list, the cursor and the single
//! `ConfigState`. The cursor moves by exactly one step per action and only
//! moves forward when the current step validates. Entering the final step
//! locks navigation for good: from then on the configuration is read-only
//! and neither direction is available.
//!
//! ```text
//! Welcome -> Storage -> Localization -> Account -> Desktop -> Summary -> Install
//! ```

pub mod field;
pub mod page;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::ConfigState;
use crate::devices::{self, DeviceCatalog};
pub use field::{DeviceSource, Field, FieldEdit, FieldKind};
pub use page::PageKind;

/// Narrow capability handed to code that must steer the wizard without
/// owning it (the install runner, page side effects).
pub trait WizardControl {
    /// Allow or forbid forward navigation from the current step
    fn set_forward_enabled(&mut self, enabled: bool);
    /// Disable both directions permanently
    fn lock_navigation(&mut self);
    /// Show a blocking error to the operator
    fn report_error(&mut self, message: String);
}

/// Reason a step refused to let the wizard advance
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct ValidationError {
    reason: String,
}

impl ValidationError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// Human-readable reason shown in the error popup
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Refused navigation or edit
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("already at the final step")]
    AtTerminal,

    #[error("already at the first step")]
    AtStart,

    #[error("navigation is locked while the installer runs")]
    Locked,

    #[error("this step is not ready to continue")]
    ProgressionDisabled,

    #[error("{field:?} is not editable on the {page} step")]
    FieldNotOnPage { field: Field, page: PageKind },

    #[error("{field:?} does not accept this kind of edit")]
    UnsupportedEdit { field: Field },

    #[error("{field:?} must be a single line")]
    InvalidValue { field: Field },
}

/// Result of a successful forward move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Moved to an ordinary step
    Moved(PageKind),
    /// Entered the final step; the caller must start the installer
    EnteredTerminal,
}

/// Navigation bar state derived from the cursor and the lock flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavState {
    pub back_enabled: bool,
    pub forward_enabled: bool,
    pub forward_label: &'static str,
}

/// Step-by-step controller over one `ConfigState`
#[derive(Debug)]
pub struct Wizard {
    pages: Vec<PageKind>,
    index: usize,
    config: ConfigState,
    catalog: DeviceCatalog,
    forward_enabled: bool,
    locked: bool,
    pending_error: Option<String>,
}

impl Wizard {
    /// Start at the first step with default configuration
    pub fn new(catalog: DeviceCatalog) -> Self {
        Self::with_config(ConfigState::default(), catalog)
    }

    /// Start at the first step with a prepared configuration
    pub fn with_config(config: ConfigState, catalog: DeviceCatalog) -> Self {
        Self {
            pages: PageKind::ALL.to_vec(),
            index: 0,
            config,
            catalog,
            forward_enabled: true,
            locked: false,
            pending_error: None,
        }
    }

    pub fn current(&self) -> PageKind {
        self.pages[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn pages(&self) -> &[PageKind] {
        &self.pages
    }

    pub fn config(&self) -> &ConfigState {
        &self.config
    }

    pub fn catalog(&self) -> &DeviceCatalog {
        &self.catalog
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Error waiting to be shown, if any
    pub fn pending_error(&self) -> Option<&str> {
        self.pending_error.as_deref()
    }

    /// Take the pending error so it is shown once
    pub fn take_error(&mut self) -> Option<String> {
        self.pending_error.take()
    }

    /// Move forward one step if the current step validates.
    ///
    /// A validation failure is also reported through `report_error` so the
    /// UI can show it without inspecting the return value.
    pub fn advance(&mut self) -> Result<Transition, NavigationError> {
        let page = self.current();
        if page.is_terminal() {
            return Err(NavigationError::AtTerminal);
        }
        if self.locked {
            return Err(NavigationError::Locked);
        }
        if !self.forward_enabled {
            return Err(NavigationError::ProgressionDisabled);
        }

        if let Err(err) = page.validate(&self.config) {
            warn!("Validation failed on {}: {}", page, err);
            self.report_error(err.reason().to_string());
            return Err(err.into());
        }

        self.index += 1;
        self.forward_enabled = true;
        let entered = self.current();
        debug!("Wizard advanced: {} -> {}", page, entered);
        self.on_enter(entered);

        if entered.is_terminal() {
            info!("Entered {} step, navigation locked", entered);
            self.lock_navigation();
            return Ok(Transition::EnteredTerminal);
        }
        Ok(Transition::Moved(entered))
    }

    /// Move back one step.
    pub fn retreat(&mut self) -> Result<PageKind, NavigationError> {
        if self.locked {
            return Err(NavigationError::Locked);
        }
        if self.index == 0 {
            return Err(NavigationError::AtStart);
        }

        let from = self.current();
        self.index -= 1;
        self.forward_enabled = true;
        debug!("Wizard retreated: {} -> {}", from, self.current());
        Ok(self.current())
    }

    /// Navigation bar state for the current step
    pub fn nav(&self) -> NavState {
        let at_terminal = self.current().is_terminal();
        let forward_label = if self.index + 2 == self.len() {
            "Install"
        } else {
            "Next"
        };
        NavState {
            back_enabled: self.index > 0 && !self.locked && !at_terminal,
            forward_enabled: !at_terminal && !self.locked && self.forward_enabled,
            forward_label,
        }
    }

    /// Edit a field owned by the current step.
    pub fn apply(&mut self, field: Field, edit: FieldEdit) -> Result<(), NavigationError> {
        if self.locked {
            return Err(NavigationError::Locked);
        }
        let page = self.current();
        if !page.owns(field) {
            return Err(NavigationError::FieldNotOnPage { field, page });
        }

        let edit = match (field.kind(), edit) {
            (FieldKind::Device(source), FieldEdit::Cycle { forward }) => {
                match self.next_device_entry(field, source, forward) {
                    Some(entry) => FieldEdit::Device(entry),
                    None => return Ok(()),
                }
            }
            (_, edit) => edit,
        };
        field.apply(&mut self.config, edit)
    }

    /// Replace the detected device lists.
    ///
    /// Selections are kept even if the device vanished; validation only
    /// checks that something is selected.
    pub fn set_catalog(&mut self, catalog: DeviceCatalog) {
        self.catalog = catalog;
        if self.current() == PageKind::Storage && !self.locked {
            self.preselect_disk();
        }
    }

    fn on_enter(&mut self, page: PageKind) {
        if page == PageKind::Storage {
            self.preselect_disk();
        }
    }

    fn preselect_disk(&mut self) {
        if !self.config.disk.is_empty() {
            return;
        }
        if let Some(path) = self
            .catalog
            .disks
            .first()
            .and_then(|entry| devices::device_path(entry))
        {
            debug!("Preselecting first detected disk {}", path);
            self.config.disk = path;
        }
    }

    fn next_device_entry(&self, field: Field, source: DeviceSource, forward: bool) -> Option<String> {
        let options = self.catalog.options(source);
        if options.is_empty() {
            return None;
        }
        let current = field.device(&self.config).unwrap_or_default();
        let position = options
            .iter()
            .position(|entry| devices::device_path(entry).as_deref() == Some(current));
        let len = options.len();
        let next = match (position, forward) {
            (Some(pos), true) => (pos + 1) % len,
            (Some(pos), false) => (pos + len - 1) % len,
            (None, true) => 0,
            (None, false) => len - 1,
        };
        Some(options[next].clone())
    }
}

impl WizardControl for Wizard {
    fn set_forward_enabled(&mut self, enabled: bool) {
        self.forward_enabled = enabled;
    }

    fn lock_navigation(&mut self) {
        self.locked = true;
        self.forward_enabled = false;
    }

    fn report_error(&mut self, message: String) {
        self.pending_error = Some(message);
    }
}
