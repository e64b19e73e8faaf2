//! Shared application state.

use std::sync::Arc;

use crate::{
    config::TransportMode,
    usecase::{ConnectSessionUseCase, DisconnectSessionUseCase},
};

use super::handler::MessageDispatcher;

/// Everything a connection handler needs, built once at startup
pub struct AppState {
    pub connect_session_usecase: Arc<ConnectSessionUseCase>,
    pub disconnect_session_usecase: Arc<DisconnectSessionUseCase>,
    pub dispatcher: Arc<MessageDispatcher>,
    pub transport: TransportMode,
}
