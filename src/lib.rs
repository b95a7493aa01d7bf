// Message board client core: message lifecycle, local store and the
// synchronization service that keeps both in step with the remote board.
pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod store;
pub mod sync;
pub mod wire;

// Re-export main types for convenience
pub use api::{HttpMessageApi, MessageApi, SendReceipt};
pub use config::ClientConfig;
pub use error::SyncError;
pub use models::*;
pub use store::MessageStore;
pub use sync::{SendOutcome, SyncEvent, SyncService};
