//! Terminal client for the pixel canvas server.

pub mod command;
pub mod domain;
pub mod error;
pub mod formatter;
mod runner;
mod session;
mod ui;

pub use runner::{ClientOptions, run_client};
