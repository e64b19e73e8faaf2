//! Server execution logic.

use std::{future::Future, sync::Arc, time::Duration};

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{
    config::{ServerConfig, TransportMode},
    usecase::{ConnectSessionUseCase, DisconnectSessionUseCase, SweepCooldownsUseCase},
};

use super::{
    handler::{MessageDispatcher, health_check, root_handler, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Pixel canvas server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     connect_session_usecase,
///     disconnect_session_usecase,
///     dispatcher,
///     sweep_cooldowns_usecase,
/// );
/// server.run(&config).await?;
/// ```
pub struct Server {
    connect_session_usecase: Arc<ConnectSessionUseCase>,
    disconnect_session_usecase: Arc<DisconnectSessionUseCase>,
    dispatcher: Arc<MessageDispatcher>,
    sweep_cooldowns_usecase: Arc<SweepCooldownsUseCase>,
}

impl Server {
    pub fn new(
        connect_session_usecase: Arc<ConnectSessionUseCase>,
        disconnect_session_usecase: Arc<DisconnectSessionUseCase>,
        dispatcher: Arc<MessageDispatcher>,
        sweep_cooldowns_usecase: Arc<SweepCooldownsUseCase>,
    ) -> Self {
        Self {
            connect_session_usecase,
            disconnect_session_usecase,
            dispatcher,
            sweep_cooldowns_usecase,
        }
    }

    /// Build the router for the given transport mode
    ///
    /// `/` and `/ws` always upgrade to WebSocket. In `http` mode plain
    /// requests to `/` and `/api/health` get liveness answers.
    pub fn router(&self, transport: TransportMode) -> Router {
        let app_state = Arc::new(AppState {
            connect_session_usecase: self.connect_session_usecase.clone(),
            disconnect_session_usecase: self.disconnect_session_usecase.clone(),
            dispatcher: self.dispatcher.clone(),
            transport,
        });

        let mut app = Router::new()
            .route("/", get(root_handler))
            .route("/ws", get(websocket_handler));
        if transport == TransportMode::Http {
            app = app.route("/api/health", get(health_check));
        }

        app.layer(TraceLayer::new_for_http()).with_state(app_state)
    }

    /// Run the server until Ctrl+C / SIGTERM
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the configured address
    /// or if there's an error during server execution.
    pub async fn run(self, config: &ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = config.bind_addr();
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!(
            "Pixel canvas server listening on {} ({} transport)",
            listener.local_addr()?,
            config.transport
        );
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(
            listener,
            config.transport,
            config.sweep_interval(),
            shutdown_signal(),
        )
        .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    /// Serve on an already bound listener until `shutdown` resolves
    ///
    /// Also runs the cooldown sweeper every `sweep_interval`.
    pub async fn serve<F>(
        self,
        listener: TcpListener,
        transport: TransportMode,
        sweep_interval: Duration,
        shutdown: F,
    ) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router(transport);
        let sweeper = spawn_sweeper(self.sweep_cooldowns_usecase.clone(), sweep_interval);

        let result = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await;

        sweeper.abort();
        result
    }
}

fn spawn_sweeper(
    usecase: Arc<SweepCooldownsUseCase>,
    period: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // 最初の tick は即座に完了する
        ticker.tick().await;
        loop {
            ticker.tick().await;
            usecase.execute().await;
        }
    })
}
