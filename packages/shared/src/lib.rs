//! Shared utilities for the Pixelwall server and client.

pub mod logger;
pub mod time;
