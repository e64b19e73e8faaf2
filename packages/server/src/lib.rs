//! Collaborative pixel canvas server library.
//!
//! Clients share one grid of colored cells over WebSocket. Every placement is
//! rate limited per user, persisted to SQLite and broadcast to all sessions.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
