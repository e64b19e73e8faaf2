//! Request handlers.

pub mod dispatcher;
mod http;
mod websocket;

pub use dispatcher::{DispatchOutcome, MessageDispatcher, ProtocolError};
pub use http::health_check;
pub use websocket::{root_handler, websocket_handler};
