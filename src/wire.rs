// Wire schema for the message endpoints.
//
// GET  /messages       -> {"messages": [{"text": "...", "status": "sent"}, ...]}
// POST /messages/send  <- {"text": "..."}   (204 means accepted)

use serde::{Deserialize, Serialize};

use crate::error::SyncError;
use crate::models::{Message, Status};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesResponse {
    pub messages: Vec<WireMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireMessage {
    pub text: String,
    pub status: Status,
}

#[derive(Debug, Serialize)]
pub struct SendRequest<'a> {
    pub text: &'a str,
}

impl From<WireMessage> for Message {
    fn from(wire: WireMessage) -> Self {
        Message::new(wire.text, wire.status)
    }
}

/// Parse a read-endpoint body into messages, preserving order.
///
/// Fails closed: a missing `messages` field, a record without `text` or
/// `status`, an unknown status name or malformed JSON is a `FetchParse`
/// error, never an empty list.
pub fn parse_messages(body: &str) -> Result<Vec<Message>, SyncError> {
    let response: MessagesResponse = serde_json::from_str(body)?;
    Ok(response.messages.into_iter().map(Message::from).collect())
}
