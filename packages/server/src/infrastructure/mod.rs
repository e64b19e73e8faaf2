//! Infrastructure layer: storage, WebSocket fan-out and wire formats.

pub mod dto;
pub mod grid_store;
pub mod message_pusher;
pub mod repository;

pub use grid_store::{GridReadGuard, GridStore, PixelApplied};
