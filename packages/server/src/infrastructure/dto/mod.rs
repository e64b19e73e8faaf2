//! Data Transfer Objects (DTOs) for the canvas protocol.
//!
//! - `websocket`: WebSocket frame DTOs (both directions)
//! - `conversion`: conversion between DTOs and domain entities

pub mod conversion;
pub mod websocket;
