//! Catalogue & services dropdown controller.
//!
//! The dialog owns the loaded catalogues and the live [`SelectionState`].
//! Opening it takes a backup of the selection; "Done" keeps the edits and
//! "Cancel" restores the backup. Rendering is left to the caller, which reads
//! [`SelectionDialog::rows`].
//!
//! Checkbox rules while open:
//! - unchecking a catalogue clears its services and hides them
//! - checking a catalogue only reveals its services
//! - checking a service checks its catalogue
//! - unchecking the last service of a catalogue unchecks and hides it

use indexmap::IndexSet;
use log::{debug, warn};

use crate::error::CategoryError;
use crate::format::GroupMap;
use crate::selection::SelectionState;

/// Whether the dropdown is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogState {
    Closed,
    Open,
}

/// One visible line of the dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Row<'a> {
    /// A catalogue checkbox with its selected/total service counts.
    Group {
        name: &'a str,
        checked: bool,
        selected: usize,
        total: usize,
    },
    /// A service checkbox under an expanded catalogue.
    Item {
        group: &'a str,
        name: &'a str,
        checked: bool,
    },
}

/// Hierarchical multi-select dropdown over catalogues and their services.
#[derive(Debug, Clone, Default)]
pub struct SelectionDialog {
    groups: GroupMap,
    selection: SelectionState,
    /// Present exactly while the dialog is open.
    backup: Option<SelectionState>,
    /// Catalogue checkboxes shown as checked; their services are visible.
    checked: IndexSet<String>,
}

impl SelectionDialog {
    /// Create a closed dialog over the given catalogues.
    pub fn new(groups: GroupMap) -> Self {
        let mut dialog = Self::default();
        dialog.update_groups(groups);
        dialog
    }

    /// Replace the catalogue data, keeping selections already made.
    pub fn update_groups(&mut self, groups: GroupMap) {
        debug!("catalogue data updated: {} catalogues", groups.len());
        self.selection.initialize(groups.keys().cloned());
        self.groups = groups;
        if self.is_open() {
            self.sync_checkboxes();
        }
    }

    /// Loaded catalogues in display order.
    pub const fn groups(&self) -> &GroupMap {
        &self.groups
    }

    /// Current selection. Reflects live edits while open.
    pub const fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// Text for the dropdown anchor.
    pub fn summary(&self) -> String {
        self.selection.summary()
    }

    pub const fn state(&self) -> DialogState {
        if self.backup.is_some() {
            DialogState::Open
        } else {
            DialogState::Closed
        }
    }

    pub const fn is_open(&self) -> bool {
        self.backup.is_some()
    }

    /// Pre-select services from a stored category string.
    ///
    /// Catalogues that are not loaded are ignored.
    pub fn restore_from_serialized(&mut self, text: &str) {
        self.selection.load_serialized(text, self.groups.keys().cloned());
        if self.is_open() {
            self.sync_checkboxes();
        }
    }

    /// Open the dropdown.
    ///
    /// Fails with [`CategoryError::EmptyGroupData`] when no catalogues are
    /// loaded. Showing an already open dropdown keeps its original backup.
    pub fn show(&mut self) -> Result<(), CategoryError> {
        if self.groups.is_empty() {
            warn!("refusing to open dropdown without catalogue data");
            return Err(CategoryError::EmptyGroupData);
        }
        if self.is_open() {
            debug!("dropdown already open");
            return Ok(());
        }

        self.backup = Some(self.selection.snapshot());
        self.sync_checkboxes();
        debug!("dropdown opened with {} selected", self.selection.selected_count());
        Ok(())
    }

    /// Close the dropdown keeping the edits ("Done").
    pub fn commit(&mut self) {
        if self.backup.take().is_some() {
            debug!("dropdown committed: {}", self.selection.to_serialized());
        }
    }

    /// Close the dropdown discarding the edits made since it was opened.
    pub fn cancel(&mut self) {
        if let Some(backup) = self.backup.take() {
            self.selection.restore(&backup);
            debug!("dropdown cancelled, selection restored");
        }
    }

    /// Check or uncheck a catalogue checkbox.
    pub fn toggle_group(&mut self, group: &str, checked: bool) -> Result<(), CategoryError> {
        self.ensure_open()?;
        if !self.selection.contains_group(group) {
            return Err(CategoryError::InvalidGroup(group.to_string()));
        }

        if checked {
            self.checked.insert(group.to_string());
        } else {
            self.selection.clear_group(group);
            self.checked.shift_remove(group);
        }
        Ok(())
    }

    /// Check or uncheck a service checkbox.
    pub fn toggle_item(
        &mut self,
        group: &str,
        item: &str,
        checked: bool,
    ) -> Result<(), CategoryError> {
        self.ensure_open()?;
        self.selection.toggle_item(group, item, checked)?;

        if checked {
            self.checked.insert(group.to_string());
        } else if !self.selection.is_group_checked(group) {
            self.checked.shift_remove(group);
        }
        Ok(())
    }

    /// Whether a catalogue checkbox shows as checked.
    ///
    /// While closed this is derived from the selection.
    pub fn is_group_checked(&self, group: &str) -> bool {
        if self.is_open() {
            self.checked.contains(group)
        } else {
            self.selection.is_group_checked(group)
        }
    }

    /// Whether the services of a catalogue are visible.
    pub fn is_expanded(&self, group: &str) -> bool {
        self.is_open() && self.checked.contains(group)
    }

    /// Visible rows, catalogues in load order with their services beneath.
    pub fn rows(&self) -> Vec<Row<'_>> {
        let mut rows = Vec::new();

        for (group, items) in &self.groups {
            let selected = items
                .iter()
                .filter(|item| self.selection.is_selected(group, item))
                .count();
            rows.push(Row::Group {
                name: group.as_str(),
                checked: self.is_group_checked(group),
                selected,
                total: items.len(),
            });

            if self.is_expanded(group) {
                rows.extend(items.iter().map(|item| Row::Item {
                    group: group.as_str(),
                    name: item.as_str(),
                    checked: self.selection.is_selected(group, item),
                }));
            }
        }

        rows
    }

    fn ensure_open(&self) -> Result<(), CategoryError> {
        if self.is_open() {
            Ok(())
        } else {
            Err(CategoryError::NotOpen)
        }
    }

    fn sync_checkboxes(&mut self) {
        self.checked = self
            .groups
            .keys()
            .filter(|group| self.selection.is_group_checked(group))
            .cloned()
            .collect();
    }
}
