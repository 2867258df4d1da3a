//! State types for the list controller

use crate::types::{Fields, ListItem};

/// Load phase of a controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Loading,
    Ready,
}

/// Uncommitted copy of one record's fields, tagged with the record it edits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditDraft {
    pub target_id: String,
    pub fields: Fields,
}

impl EditDraft {
    pub fn for_item(item: &ListItem) -> Self {
        Self {
            target_id: item.id.clone(),
            fields: item.fields.clone(),
        }
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.fields.insert(name.to_string(), value.into());
    }

    /// Whether this draft belongs to the given row
    pub fn edits(&self, item: &ListItem) -> bool {
        self.target_id == item.id
    }
}

/// A row as presentation should render it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowView<'a> {
    pub item: &'a ListItem,
    /// False for placeholder rows: edit and delete controls are disabled
    pub mutable: bool,
}

/// Identifies one fetch; results from a fetch started before the controller
/// was detached are dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub(crate) epoch: u64,
}
