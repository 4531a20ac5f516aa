//! JSON frames exchanged with gateway clients.
//!
//! ```text
//! client -> server   {"type":"subscribe","channel":"<jobId>"}
//!                    {"type":"unsubscribe","channel":"<jobId>"}
//! server -> client   {"type":"joined","channel":"<jobId>","message":"Joined <jobId>"}
//!                    {"type":"left","channel":"<jobId>"}
//!                    {"type":"message","channel":"<jobId>","data":"<raw payload>"}
//!                    {"type":"error","message":"..."}
//! ```

use axum::extract::ws::Message;
use serde::{Deserialize, Serialize};

/// A request sent by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientRequest {
    Subscribe { channel: String },
    Unsubscribe { channel: String },
}

/// An event pushed to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerEvent {
    Joined { channel: String, message: String },
    Left { channel: String },
    Message { channel: String, data: String },
    Error { message: String },
}

impl ServerEvent {
    pub fn joined(channel: &str) -> Self {
        Self::Joined {
            channel: channel.to_string(),
            message: format!("Joined {channel}"),
        }
    }

    pub fn left(channel: &str) -> Self {
        Self::Left {
            channel: channel.to_string(),
        }
    }

    /// A relayed bus payload, forwarded untouched in `data`.
    pub fn message(channel: &str, data: impl Into<String>) -> Self {
        Self::Message {
            channel: channel.to_string(),
            data: data.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Encode as a WebSocket text frame.
    pub fn to_message(&self) -> Message {
        Message::Text(serde_json::to_string(self).unwrap_or_default().into())
    }
}
