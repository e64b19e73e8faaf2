//! WebSocket canvas server.

mod handler;
mod server;
mod signal;
pub mod state;

pub use handler::{DispatchOutcome, MessageDispatcher, ProtocolError};
pub use server::Server;
pub use signal::shutdown_signal;
