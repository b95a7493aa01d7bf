use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A single message on the board together with its lifecycle status.
///
/// Fields are public: the compose form edits `text` directly and the sync
/// service drives `status` through [`Status::apply`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub text: String,
    pub status: Status,
}

impl Message {
    /// No validation happens here; an empty draft is a legal value.
    pub fn new(text: impl Into<String>, status: Status) -> Self {
        Message {
            text: text.into(),
            status,
        }
    }

    /// A fresh compose target: empty text, `draft` status.
    pub fn draft() -> Self {
        Message::new(String::new(), Status::Draft)
    }

    /// True when the text is blank once surrounding whitespace is trimmed.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

impl Default for Message {
    fn default() -> Self {
        Message::draft()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status, self.text)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Draft,   // Composed locally, not submitted
    Pending, // Send request in flight
    Sent,    // Server answered 204
    Failed,  // Any other answer, or no answer at all
}

/// Inputs that move a message between statuses.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum StatusEvent {
    Submit,
    Accepted,
    Rejected,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("No transition from {from} on {event:?}")]
pub struct TransitionError {
    pub from: Status,
    pub event: StatusEvent,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown message status: {0}")]
pub struct UnknownStatus(pub String);

impl Status {
    /// Apply an event, returning the next status.
    ///
    /// Only `draft -> pending -> {sent, failed}` is legal. `sent` and
    /// `failed` are terminal: a resubmit has to start from a new draft.
    pub fn apply(self, event: StatusEvent) -> Result<Status, TransitionError> {
        match (self, event) {
            (Status::Draft, StatusEvent::Submit) => Ok(Status::Pending),
            (Status::Pending, StatusEvent::Accepted) => Ok(Status::Sent),
            (Status::Pending, StatusEvent::Rejected) => Ok(Status::Failed),
            (from, event) => Err(TransitionError { from, event }),
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Sent | Status::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Draft => "draft",
            Status::Pending => "pending",
            Status::Sent => "sent",
            Status::Failed => "failed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Status::Draft),
            "pending" => Ok(Status::Pending),
            "sent" => Ok(Status::Sent),
            "failed" => Ok(Status::Failed),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_empty_trims_whitespace() {
        assert!(Message::new("", Status::Draft).is_empty());
        assert!(Message::new("  ", Status::Draft).is_empty());
        assert!(Message::new("\t\n", Status::Draft).is_empty());
        assert!(!Message::new("hi", Status::Draft).is_empty());
        assert!(!Message::new("  hi  ", Status::Draft).is_empty());
    }

    #[test]
    fn test_new_does_not_validate() {
        // A blank sent message is odd but constructible; validation lives in send()
        let msg = Message::new("", Status::Sent);
        assert_eq!(msg.status, Status::Sent);
        assert!(msg.is_empty());
    }

    #[test]
    fn test_draft_defaults() {
        let draft = Message::draft();
        assert_eq!(draft.text, "");
        assert_eq!(draft.status, Status::Draft);
        assert_eq!(Message::default(), draft);
    }

    #[test]
    fn test_legal_transitions() {
        assert_eq!(Status::Draft.apply(StatusEvent::Submit), Ok(Status::Pending));
        assert_eq!(Status::Pending.apply(StatusEvent::Accepted), Ok(Status::Sent));
        assert_eq!(Status::Pending.apply(StatusEvent::Rejected), Ok(Status::Failed));
    }

    #[test]
    fn test_terminal_statuses_reject_every_event() {
        for from in [Status::Sent, Status::Failed] {
            assert!(from.is_terminal());
            for event in [StatusEvent::Submit, StatusEvent::Accepted, StatusEvent::Rejected] {
                assert_eq!(from.apply(event), Err(TransitionError { from, event }));
            }
        }
    }

    #[test]
    fn test_out_of_order_events_rejected() {
        assert!(Status::Draft.apply(StatusEvent::Accepted).is_err());
        assert!(Status::Draft.apply(StatusEvent::Rejected).is_err());
        assert!(Status::Pending.apply(StatusEvent::Submit).is_err());
        assert!(!Status::Draft.is_terminal());
        assert!(!Status::Pending.is_terminal());
    }

    #[test]
    fn test_status_wire_names() {
        for status in [Status::Draft, Status::Pending, Status::Sent, Status::Failed] {
            assert_eq!(status.as_str().parse::<Status>(), Ok(status));
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status));
        }
        assert_eq!("SENT".parse::<Status>(), Err(UnknownStatus("SENT".to_string())));
    }

    #[test]
    fn test_message_display() {
        let msg = Message::new("hello", Status::Failed);
        assert_eq!(msg.to_string(), "failed: hello");
    }
}
