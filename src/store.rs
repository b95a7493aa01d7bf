//! In-memory ordered message list.
//!
//! Insertion order is display order. Within a session the list only grows,
//! except for `replace_all`, which swaps in an authoritative fetched list.

use log::debug;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::models::Message;

/// Shared handle to the message list. Clones observe the same list.
#[derive(Debug, Clone, Default)]
pub struct MessageStore {
    messages: Arc<Mutex<Vec<Message>>>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Writers never leave the Vec half-updated, so a poisoned lock is still usable
    fn lock(&self) -> MutexGuard<'_, Vec<Message>> {
        self.messages.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Overwrite the whole list with a freshly fetched one.
    pub fn replace_all(&self, messages: Vec<Message>) {
        let mut guard = self.lock();
        debug!("Replacing {} stored messages with {}", guard.len(), messages.len());
        *guard = messages;
    }

    /// Add a message at the end and return its position.
    ///
    /// The position is the message's identity: the remote service assigns
    /// no id of its own.
    pub fn append(&self, message: Message) -> usize {
        let mut guard = self.lock();
        guard.push(message);
        guard.len() - 1
    }

    /// Owned copy of the current list for rendering.
    pub fn snapshot(&self) -> Vec<Message> {
        self.lock().clone()
    }

    pub fn get(&self, index: usize) -> Option<Message> {
        self.lock().get(index).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
