//! Synchronization between the local message store and the remote board.
//!
//! `load_all` replaces the store with the server's list. `send` walks one
//! draft through `pending` to a terminal status and records it in the
//! store whatever the outcome. Observers registered with `subscribe` see
//! the `pending` transition before the request settles.

use log::{debug, info, warn};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use crate::api::{HttpMessageApi, MessageApi};
use crate::config::ClientConfig;
use crate::error::SyncError;
use crate::models::{Message, Status, StatusEvent};
use crate::store::MessageStore;

/// Notifications for a presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// The message being sent changed status
    StatusChanged { text: String, status: Status },
    /// A terminal message was recorded at `index`
    Appended { index: usize, message: Message },
    /// The store was replaced with `count` fetched messages
    Loaded { count: usize },
    /// A load failed; the store kept its previous contents
    LoadFailed { reason: String },
}

/// Result of a completed send attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct SendOutcome {
    /// The message in its terminal status, as stored
    pub message: Message,
    /// Position of `message` in the store
    pub index: usize,
    /// Fresh compose target for the caller
    pub next_draft: Message,
}

impl SendOutcome {
    pub fn is_sent(&self) -> bool {
        self.message.status == Status::Sent
    }
}

#[derive(Clone)]
pub struct SyncService {
    api: Arc<dyn MessageApi>,
    store: MessageStore,
    observers: Arc<Mutex<Vec<mpsc::UnboundedSender<SyncEvent>>>>,
}

impl SyncService {
    pub fn new(api: Arc<dyn MessageApi>, store: MessageStore) -> Self {
        Self {
            api,
            store,
            observers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Build a service talking HTTP to the endpoints in `config`.
    pub fn from_config(config: &ClientConfig, store: MessageStore) -> Result<Self, SyncError> {
        let api = HttpMessageApi::new(config)?;
        Ok(Self::new(Arc::new(api), store))
    }

    /// Reader handle on the store this service writes to.
    pub fn store(&self) -> MessageStore {
        self.store.clone()
    }

    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<SyncEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.observers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(tx);
        rx
    }

    fn emit(&self, event: SyncEvent) {
        let mut observers = self
            .observers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // Drop observers whose receiver is gone
        observers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Fetch the remote list and make it the store's contents.
    ///
    /// On any failure the store keeps what it had before the call and the
    /// error is returned to the caller.
    pub async fn load_all(&self) -> Result<usize, SyncError> {
        match self.api.fetch_messages().await {
            Ok(messages) => {
                let count = messages.len();
                self.store.replace_all(messages);
                info!("Loaded {} messages", count);
                self.emit(SyncEvent::Loaded { count });
                Ok(count)
            }
            Err(e) => {
                warn!("Failed to load messages, keeping {} cached: {}", self.store.len(), e);
                self.emit(SyncEvent::LoadFailed {
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Submit a draft and record the outcome.
    ///
    /// Blank text or a non-draft message is rejected before anything is
    /// sent. Otherwise exactly one request goes out with the trimmed text,
    /// and the message lands in the store as `sent` (on 204) or `failed`
    /// (any other code, or a transport error).
    pub async fn send(&self, mut message: Message) -> Result<SendOutcome, SyncError> {
        if message.status != Status::Draft {
            return Err(SyncError::InvalidInput(format!(
                "Only draft messages can be sent, got {}",
                message.status
            )));
        }
        if message.is_empty() {
            return Err(SyncError::InvalidInput("Message text is empty".to_string()));
        }

        message.text = message.text.trim().to_string();
        message.status = message.status.apply(StatusEvent::Submit)?;
        self.emit(SyncEvent::StatusChanged {
            text: message.text.clone(),
            status: message.status,
        });

        let event = match self.api.send_message(&message.text).await {
            Ok(receipt) if receipt.is_accepted() => StatusEvent::Accepted,
            Ok(receipt) => {
                warn!("Send rejected with status {}", receipt.status);
                StatusEvent::Rejected
            }
            Err(e) => {
                warn!("Send failed: {}", e);
                StatusEvent::Rejected
            }
        };
        message.status = message.status.apply(event)?;
        debug!("Message settled as {}", message.status);
        self.emit(SyncEvent::StatusChanged {
            text: message.text.clone(),
            status: message.status,
        });

        let index = self.store.append(message.clone());
        info!("Recorded {} message at #{}", message.status, index);
        self.emit(SyncEvent::Appended {
            index,
            message: message.clone(),
        });

        Ok(SendOutcome {
            message,
            index,
            next_draft: Message::draft(),
        })
    }
}
