//! Selected services per catalogue for one editing session.
//!
//! Every initialized catalogue has an entry, possibly empty. A catalogue is
//! considered checked exactly when its set is non-empty; that flag is always
//! derived, never stored.

use indexmap::IndexSet;
use log::debug;

use crate::error::CategoryError;
use crate::format::{self, PLACEHOLDER, Selection};

/// Catalogue to selected services mapping with snapshot/restore support.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    selected: Selection,
}

impl SelectionState {
    /// Create an empty state with no catalogues.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure every catalogue has an entry.
    ///
    /// Existing selections are kept, so this can be called again when
    /// catalogue data arrives after the state was created.
    pub fn initialize<I, S>(&mut self, groups: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for group in groups {
            self.selected.entry(group.into()).or_default();
        }
    }

    /// Select or deselect a service under a catalogue.
    ///
    /// Deselecting a service that is not selected is a no-op. The catalogue
    /// itself must have been initialized.
    pub fn toggle_item(
        &mut self,
        group: &str,
        item: &str,
        selected: bool,
    ) -> Result<(), CategoryError> {
        let items = self
            .selected
            .get_mut(group)
            .ok_or_else(|| CategoryError::InvalidGroup(group.to_string()))?;

        if selected {
            items.insert(item.to_string());
        } else {
            items.shift_remove(item);
        }
        Ok(())
    }

    /// Deselect every service under a catalogue.
    pub fn clear_group(&mut self, group: &str) {
        if let Some(items) = self.selected.get_mut(group) {
            items.clear();
        }
    }

    /// Independent copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    /// Replace the current contents with a copy of `snapshot`.
    pub fn restore(&mut self, snapshot: &Self) {
        self.selected.clone_from(&snapshot.selected);
    }

    /// Reset the state from a stored category string.
    ///
    /// Only catalogues in `known_groups` are kept; all of them get an entry.
    pub fn load_serialized<I, S>(&mut self, text: &str, known_groups: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected = format::parse(text, known_groups);
        debug!("selection restored: {} services", self.selected_count());
    }

    /// Build a state from a stored category string.
    pub fn from_serialized<I, S>(text: &str, known_groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut state = Self::new();
        state.load_serialized(text, known_groups);
        state
    }

    /// Encode the state as a category string.
    pub fn to_serialized(&self) -> String {
        format::serialize(&self.selected)
    }

    /// Whether a catalogue has at least one selected service.
    pub fn is_group_checked(&self, group: &str) -> bool {
        self.selected.get(group).is_some_and(|items| !items.is_empty())
    }

    /// Whether a catalogue has an entry.
    pub fn contains_group(&self, group: &str) -> bool {
        self.selected.contains_key(group)
    }

    /// Whether a specific service is selected.
    pub fn is_selected(&self, group: &str, item: &str) -> bool {
        self.selected
            .get(group)
            .is_some_and(|items| items.contains(item))
    }

    /// Selected services under a catalogue, in selection order.
    pub fn selected_items(&self, group: &str) -> Vec<String> {
        self.selected
            .get(group)
            .map(|items| items.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Copy of the whole mapping.
    pub fn selection(&self) -> Selection {
        self.selected.clone()
    }

    /// Catalogue names in order.
    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.selected.keys().map(String::as_str)
    }

    /// Total number of selected services.
    pub fn selected_count(&self) -> usize {
        self.selected.values().map(IndexSet::len).sum()
    }

    /// True when no service is selected anywhere.
    pub fn is_empty(&self) -> bool {
        self.selected.values().all(IndexSet::is_empty)
    }

    /// Text for the dropdown anchor: the category string, or a prompt.
    pub fn summary(&self) -> String {
        if self.is_empty() {
            PLACEHOLDER.to_string()
        } else {
            self.to_serialized()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(groups: &[&str]) -> SelectionState {
        let mut state = SelectionState::new();
        state.initialize(groups.iter().copied());
        state
    }

    #[test]
    fn initialize_creates_empty_entries() {
        let state = state(&["Home", "Auto"]);
        assert!(state.contains_group("Home"));
        assert!(state.contains_group("Auto"));
        assert!(state.is_empty());
        assert_eq!(state.groups().collect::<Vec<_>>(), vec!["Home", "Auto"]);
    }

    #[test]
    fn initialize_keeps_existing_selections() {
        let mut state = state(&["Home"]);
        state.toggle_item("Home", "Plumbing", true).unwrap();

        state.initialize(["Home", "Auto"]);

        assert_eq!(state.selected_items("Home"), vec!["Plumbing"]);
        assert!(state.contains_group("Auto"));
    }

    #[test]
    fn toggle_item_adds_and_removes() {
        let mut state = state(&["Home"]);
        state.toggle_item("Home", "Plumbing", true).unwrap();
        assert!(state.is_selected("Home", "Plumbing"));
        assert!(state.is_group_checked("Home"));

        state.toggle_item("Home", "Plumbing", false).unwrap();
        assert!(!state.is_selected("Home", "Plumbing"));
        assert!(!state.is_group_checked("Home"));
    }

    #[test]
    fn removing_absent_item_is_noop() {
        let mut state = state(&["Home"]);
        assert!(state.toggle_item("Home", "Plumbing", false).is_ok());
        assert!(state.is_empty());
    }

    #[test]
    fn toggle_item_on_unknown_group_fails() {
        let mut state = state(&["Home"]);
        let err = state.toggle_item("Garden", "Mowing", true).unwrap_err();
        assert_eq!(err, CategoryError::InvalidGroup("Garden".to_string()));
        assert!(!state.contains_group("Garden"));
    }

    #[test]
    fn clear_group_empties_set() {
        let mut state = state(&["Home", "Auto"]);
        state.toggle_item("Home", "Plumbing", true).unwrap();
        state.toggle_item("Home", "Electrical", true).unwrap();
        state.toggle_item("Auto", "Oil Change", true).unwrap();

        state.clear_group("Home");
        state.clear_group("Unknown");

        assert!(!state.is_group_checked("Home"));
        assert!(state.contains_group("Home"));
        assert_eq!(state.selected_items("Auto"), vec!["Oil Change"]);
    }

    #[test]
    fn snapshot_is_independent() {
        let mut state = state(&["Home"]);
        state.toggle_item("Home", "Plumbing", true).unwrap();

        let mut copy = state.snapshot();
        copy.toggle_item("Home", "Electrical", true).unwrap();
        state.toggle_item("Home", "Plumbing", false).unwrap();

        assert_eq!(copy.selected_items("Home"), vec!["Plumbing", "Electrical"]);
        assert!(state.selected_items("Home").is_empty());
    }

    #[test]
    fn restore_replaces_contents() {
        let mut state = state(&["Home", "Auto"]);
        state.toggle_item("Home", "Plumbing", true).unwrap();
        let backup = state.snapshot();

        state.toggle_item("Auto", "Oil Change", true).unwrap();
        state.clear_group("Home");
        state.restore(&backup);

        assert_eq!(state, backup);
        assert_eq!(state.selected_items("Home"), vec!["Plumbing"]);
        assert!(!state.is_group_checked("Auto"));
    }

    #[test]
    fn selected_items_is_a_copy() {
        let mut state = state(&["Home"]);
        state.toggle_item("Home", "Plumbing", true).unwrap();

        let mut items = state.selected_items("Home");
        items.push("Electrical".to_string());

        let mut map = state.selection();
        map.get_mut("Home").unwrap().clear();

        assert_eq!(state.selected_items("Home"), vec!["Plumbing"]);
    }

    #[test]
    fn serialized_round_trip() {
        let mut state = state(&["Home Services", "Automotive"]);
        state.toggle_item("Home Services", "Plumbing", true).unwrap();
        state.toggle_item("Automotive", "Oil Change", true).unwrap();

        let text = state.to_serialized();
        assert_eq!(text, "Home Services: Plumbing | Automotive: Oil Change");

        let restored = SelectionState::from_serialized(&text, ["Home Services", "Automotive"]);
        assert_eq!(restored, state);
    }

    #[test]
    fn load_serialized_clears_previous_state() {
        let mut state = state(&["Home", "Auto"]);
        state.toggle_item("Auto", "Oil Change", true).unwrap();

        state.load_serialized("Home: Plumbing | Garden: Mowing", ["Home", "Auto"]);

        assert_eq!(state.selected_items("Home"), vec!["Plumbing"]);
        assert!(!state.is_group_checked("Auto"));
        assert!(!state.contains_group("Garden"));
    }

    #[test]
    fn summary_uses_placeholder_when_empty() {
        let mut state = state(&["Home"]);
        assert_eq!(state.summary(), PLACEHOLDER);

        state.toggle_item("Home", "Plumbing", true).unwrap();
        assert_eq!(state.summary(), "Home: Plumbing");
        assert_eq!(state.selected_count(), 1);
    }
}
