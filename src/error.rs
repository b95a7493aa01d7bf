//! Error taxonomy for the sync layer.
//!
//! Every remote failure is converted into one of these variants at the
//! service boundary, so callers never see a raw transport error.

use thiserror::Error;

use crate::models::TransitionError;

#[derive(Debug, Error)]
pub enum SyncError {
    /// Read response had the wrong status or shape
    #[error("Fetch parse error: {0}")]
    FetchParse(String),

    /// Network failure on either endpoint
    #[error("Transport error: {0}")]
    Transport(String),

    /// send() called with blank text or a non-draft message
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl SyncError {
    pub fn is_fetch_parse(&self) -> bool {
        matches!(self, SyncError::FetchParse(_))
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, SyncError::Transport(_))
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, SyncError::InvalidInput(_))
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(e: reqwest::Error) -> Self {
        SyncError::Transport(e.to_string())
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(e: serde_json::Error) -> Self {
        SyncError::FetchParse(e.to_string())
    }
}

impl From<TransitionError> for SyncError {
    fn from(e: TransitionError) -> Self {
        SyncError::InvalidInput(e.to_string())
    }
}
