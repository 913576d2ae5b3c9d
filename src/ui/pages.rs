//! Wizard step rendering
//!
//! Each step is drawn as a list of lines: optional fixed text followed by
//! the step's form rows.

use crate::app::{AppMode, EditBuffer};
use crate::config::ConfigState;
use crate::theme::{Styles, UiText};
use crate::wizard::{Field, FieldKind, PageKind};
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

/// Width of the label column in form rows
const LABEL_WIDTH: usize = 24;

/// What a page needs to draw itself
pub struct PageView<'a> {
    pub page: PageKind,
    pub config: &'a ConfigState,
    pub fields: &'a [Field],
    pub focus: usize,
    pub mode: AppMode,
    pub edit: Option<&'a EditBuffer>,
}

impl PageView<'_> {
    /// All lines of the page body
    pub fn lines(&self) -> Vec<Line<'static>> {
        let mut lines = self.intro();
        for (i, field) in self.fields.iter().enumerate() {
            lines.push(self.field_row(*field, i == self.focus));
        }
        lines
    }

    fn intro(&self) -> Vec<Line<'static>> {
        match self.page {
            PageKind::Welcome => vec![
                Line::from(""),
                Line::styled("Welcome to Arch Linux Installer", Styles::title()).centered(),
                Line::from(""),
                Line::from("This wizard will guide you through the installation process.").centered(),
                Line::from("You can choose between Automatic and Manual partitioning.").centered(),
                Line::from(""),
                Line::from("Press n to begin.").centered(),
            ],
            PageKind::Storage if self.config.manual_partitioning => vec![
                Line::styled("Manual Partitioning", Styles::title()),
                Line::from("1. Press p to open cfdisk and create partitions."),
                Line::from("2. Press r to refresh, then select partitions to use."),
                Line::from(""),
            ],
            PageKind::Storage => vec![
                Line::styled("Automatic Partitioning", Styles::title()),
                Line::styled(UiText::WIPE_WARNING, Styles::warning()),
                Line::from(""),
            ],
            PageKind::Localization => vec![
                Line::styled("Configure Localization", Styles::title()),
                Line::from(""),
            ],
            PageKind::Account => vec![
                Line::styled("System & User Account", Styles::title()),
                Line::from(""),
            ],
            PageKind::Desktop => vec![
                Line::styled("Choose Desktop Environment", Styles::title()),
                Line::from(""),
            ],
            PageKind::Summary => {
                let mut lines = vec![
                    Line::styled("Ready to Install", Styles::title()),
                    Line::from("Please review your settings below."),
                    Line::from(""),
                ];
                lines.extend(
                    self.config
                        .summary_lines()
                        .into_iter()
                        .map(|l| Line::styled(l, Styles::text_secondary())),
                );
                lines.push(Line::from(""));
                lines.push(Line::styled(UiText::INSTALL_WARNING, Styles::warning()));
                lines
            }
            PageKind::Install => Vec::new(),
        }
    }

    fn field_row(&self, field: Field, focused: bool) -> Line<'static> {
        let label = format!("{:<width$}", field.label(), width = LABEL_WIDTH);
        let editing = self
            .edit
            .filter(|e| self.mode == AppMode::Editing && e.field == field);

        let value = match editing {
            Some(edit) => {
                let shown = if field.kind() == FieldKind::Secret {
                    "*".repeat(edit.value.chars().count())
                } else {
                    edit.value.clone()
                };
                Span::styled(format!("{shown}_"), Styles::editing())
            }
            None => {
                let shown = field.display_value(self.config);
                match field.placeholder() {
                    Some(hint) if shown.is_empty() => Span::styled(hint.to_string(), Styles::text_muted()),
                    _ => Span::styled(shown, Styles::text()),
                }
            }
        };

        let marker = if focused { "> " } else { "  " };
        let label_style = if focused && editing.is_none() {
            Styles::selected()
        } else {
            Styles::text_secondary()
        };
        Line::from(vec![
            Span::raw(marker),
            Span::styled(label, label_style),
            Span::raw(" "),
            value,
        ])
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(Span::styled(format!(" {} ", self.page.title()), Styles::title()))
            .borders(Borders::ALL)
            .border_style(Styles::border_inactive());
        let body = Paragraph::new(self.lines())
            .block(block)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: false });
        f.render_widget(body, area);
    }
}
