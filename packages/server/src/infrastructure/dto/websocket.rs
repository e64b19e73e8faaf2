//! WebSocket frame DTOs.
//!
//! One text frame carries one JSON object tagged by `type`. Field names are
//! part of the wire contract (`userId` is camelCase on the wire).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Frames sent by clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    PlacePixel {
        x: i64,
        y: i64,
        color: String,
        #[serde(rename = "userId")]
        user_id: String,
    },
    /// Cursor coordinates are relayed untouched, integer or not
    MoveMouse {
        #[serde(rename = "userId")]
        user_id: String,
        x: Number,
        y: Number,
    },
    /// Handshake; the server only reads it
    Init {
        #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
        user_id: Option<String>,
    },
    /// Any other `type` value
    #[serde(other)]
    Unknown,
}

/// Frames sent by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Full canvas, keyed by `"x,y"`
    Init { grid: BTreeMap<String, String> },
    UpdatePixel { x: i64, y: i64, color: String },
    MouseMove {
        #[serde(rename = "userId")]
        user_id: String,
        x: Number,
        y: Number,
    },
    Error { message: String },
}

impl ServerMessage {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
