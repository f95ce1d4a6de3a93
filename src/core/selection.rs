//! The full currency list and the user's report selection.

use super::currency::Currency;
use tracing::debug;

/// Maximum number of currencies in a report.
pub const MAX_SELECTION: usize = 5;

/// Outcome of [`SelectionStore::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added,
    Removed,
    /// The selection is at capacity and was left unchanged. The caller
    /// should ask the user which entry to replace.
    Full,
    /// The id is not in the currency list.
    Unknown,
}

/// Holds the write-once currency list and the ordered selection.
///
/// Every mutation keeps the selection within capacity, free of duplicate
/// ids, and drawn from the currency list.
#[derive(Debug, Clone)]
pub struct SelectionStore {
    all: Vec<Currency>,
    selected: Vec<Currency>,
    capacity: usize,
}

impl SelectionStore {
    pub fn new(all: Vec<Currency>) -> Self {
        Self::with_capacity(all, MAX_SELECTION)
    }

    pub fn with_capacity(all: Vec<Currency>, capacity: usize) -> Self {
        Self {
            all,
            selected: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn all(&self) -> &[Currency] {
        &self.all
    }

    pub fn selected(&self) -> &[Currency] {
        &self.selected
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.selected.len() >= self.capacity
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.iter().any(|c| c.id == id)
    }

    pub fn find(&self, id: &str) -> Option<&Currency> {
        self.all.iter().find(|c| c.id == id)
    }

    pub fn selected_symbols(&self) -> Vec<String> {
        self.selected.iter().map(|c| c.symbol.clone()).collect()
    }

    pub fn toggle(&mut self, id: &str) -> Toggle {
        if let Some(pos) = self.selected.iter().position(|c| c.id == id) {
            let removed = self.selected.remove(pos);
            debug!(id = %removed.id, "Removed from selection");
            return Toggle::Removed;
        }

        let Some(currency) = self.find(id).cloned() else {
            debug!(%id, "Toggle for unknown currency");
            return Toggle::Unknown;
        };

        if self.is_full() {
            debug!(%id, "Selection full");
            return Toggle::Full;
        }

        debug!(%id, "Added to selection");
        self.selected.push(currency);
        Toggle::Added
    }

    /// Swaps `old_id` out of the selection and appends `new_id`.
    ///
    /// Returns `false` and leaves the selection untouched when `old_id` is
    /// not selected, `new_id` is unknown, or `new_id` is already selected.
    pub fn replace(&mut self, old_id: &str, new_id: &str) -> bool {
        let Some(pos) = self.selected.iter().position(|c| c.id == old_id) else {
            debug!(%old_id, "Replace target not selected");
            return false;
        };
        if self.is_selected(new_id) {
            debug!(%new_id, "Replacement already selected");
            return false;
        }
        let Some(currency) = self.find(new_id).cloned() else {
            debug!(%new_id, "Replacement not found");
            return false;
        };

        self.selected.remove(pos);
        self.selected.push(currency);
        debug!(%old_id, %new_id, "Replaced selection entry");
        true
    }
}
