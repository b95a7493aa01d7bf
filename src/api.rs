//! Transport to the remote message service.
//!
//! [`MessageApi`] is the seam the sync service talks through;
//! [`HttpMessageApi`] is the reqwest implementation used in production.

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, StatusCode};

use crate::config::ClientConfig;
use crate::error::SyncError;
use crate::models::Message;
use crate::wire::{parse_messages, SendRequest};

/// Status code the send endpoint uses to accept a message
pub const SEND_ACCEPTED: u16 = 204;

/// What the send endpoint answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendReceipt {
    pub status: u16,
}

impl SendReceipt {
    /// Only 204 counts; any other code, 2xx included, is a failure.
    pub fn is_accepted(&self) -> bool {
        self.status == SEND_ACCEPTED
    }
}

#[async_trait]
pub trait MessageApi: Send + Sync {
    /// One read of the message list. No retries.
    async fn fetch_messages(&self) -> Result<Vec<Message>, SyncError>;

    /// One write carrying `text`. `Err` only for transport failures.
    async fn send_message(&self, text: &str) -> Result<SendReceipt, SyncError>;
}

pub struct HttpMessageApi {
    http: Client,
    messages_url: String,
    send_url: String,
}

impl HttpMessageApi {
    pub fn new(config: &ClientConfig) -> Result<Self, SyncError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }
        let http = builder
            .build()
            .map_err(|e| SyncError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            messages_url: config.messages_url(),
            send_url: config.send_url(),
        })
    }
}

#[async_trait]
impl MessageApi for HttpMessageApi {
    async fn fetch_messages(&self) -> Result<Vec<Message>, SyncError> {
        debug!("GET {}", self.messages_url);
        let response = self
            .http
            .get(&self.messages_url)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::FetchParse(format!(
                "Message list request returned {}",
                status
            )));
        }

        // Read as text so malformed JSON surfaces as a parse error, not a transport one
        let body = response.text().await?;
        parse_messages(&body)
    }

    async fn send_message(&self, text: &str) -> Result<SendReceipt, SyncError> {
        debug!("POST {} ({} chars)", self.send_url, text.chars().count());
        // .json() also sets Content-Type: application/json
        let response = self
            .http
            .post(&self.send_url)
            .json(&SendRequest { text })
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::NO_CONTENT {
            debug!("Send endpoint answered {}", status);
        }
        Ok(SendReceipt {
            status: status.as_u16(),
        })
    }
}
