//! Ordered message timeline of one chat session

use crate::core::traits::TimelineView;
use crate::infrastructure::entities::{EntryId, EntryKind, MessageEntry, Sender};
use std::sync::Arc;

pub struct TimelineStore {
    entries: Vec<MessageEntry>,
    view: Arc<dyn TimelineView>,
}

impl TimelineStore {
    pub fn new(view: Arc<dyn TimelineView>) -> Self {
        TimelineStore {
            entries: Vec::new(),
            view,
        }
    }

    /// Adds an entry at the end of the timeline and returns its handle.
    pub fn append(&mut self, text: impl Into<String>, sender: Sender, kind: EntryKind) -> EntryId {
        let entry = MessageEntry::new(text, sender, kind);
        let id = entry.id;
        self.entries.push(entry);
        self.refresh();
        id
    }

    /// Removes the pending entry with the given handle.
    ///
    /// Returns `false` if there is no such entry or it is not pending.
    pub fn remove_pending(&mut self, id: EntryId) -> bool {
        let Some(index) = self
            .entries
            .iter()
            .position(|entry| entry.id == id && entry.is_pending())
        else {
            return false;
        };

        self.entries.remove(index);
        self.refresh();
        true
    }

    /// Removes the most recently appended entry from `sender`, pending or not.
    ///
    /// This is positional addressing: with several requests in flight it may remove an entry
    /// that belongs to another request.
    pub fn remove_last_pending(&mut self, sender: Sender) -> Option<MessageEntry> {
        let index = self.entries.iter().rposition(|entry| entry.sender == sender)?;
        let removed = self.entries.remove(index);
        self.refresh();
        Some(removed)
    }

    pub fn entries(&self) -> &[MessageEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_pending()).count()
    }

    fn refresh(&self) {
        self.view.render(&self.entries);
        self.view.scroll_to_end(self.entries.len());
    }
}
