//! Collaborative pixel canvas server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin pixelwall-server
//! cargo run --bin pixelwall-server -- --port 3000 --cooldown-ms 5000
//! PIXELWALL_DATABASE_URL=sqlite:///var/lib/pixelwall/grid.db cargo run --bin pixelwall-server
//! ```

use std::sync::Arc;

use clap::Parser;
use pixelwall_server::{
    config::{
        DEFAULT_COOLDOWN_MS, DEFAULT_COOLDOWN_RETENTION_MS, DEFAULT_COOLDOWN_SWEEP_INTERVAL_MS,
        DEFAULT_DATABASE_URL, DEFAULT_GRID_SIZE, DEFAULT_HOST, DEFAULT_PORT, PersistStrategy,
        RawServerConfig, ServerConfig, TransportMode,
    },
    domain::CooldownTracker,
    infrastructure::{
        GridStore, message_pusher::WebSocketMessagePusher, repository::SqliteGridRepository,
    },
    ui::{MessageDispatcher, Server},
    usecase::{
        ConnectSessionUseCase, DisconnectSessionUseCase, MoveMouseUseCase, PlacePixelUseCase,
        SweepCooldownsUseCase,
    },
};
use pixelwall_shared::{
    logger::setup_logger,
    time::{Clock, SystemClock},
};
use tokio::sync::Mutex;

#[derive(Parser, Debug)]
#[command(name = "pixelwall-server")]
#[command(about = "Collaborative pixel canvas server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "PIXELWALL_HOST", default_value = DEFAULT_HOST)]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "PIXELWALL_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Minimum interval between two placements of one user (ms)
    #[arg(long, env = "PIXELWALL_COOLDOWN_MS", default_value_t = DEFAULT_COOLDOWN_MS)]
    cooldown_ms: u64,

    /// Width and height of the canvas
    #[arg(long, env = "PIXELWALL_GRID_SIZE", default_value_t = DEFAULT_GRID_SIZE)]
    grid_size: u32,

    /// SQLite database holding the canvas
    #[arg(long, env = "PIXELWALL_DATABASE_URL", default_value = DEFAULT_DATABASE_URL)]
    database_url: String,

    /// How placements are written: upsert | full-rewrite
    #[arg(long, env = "PIXELWALL_PERSIST_STRATEGY", default_value_t = PersistStrategy::Upsert)]
    persist_strategy: PersistStrategy,

    /// What the port answers besides upgrades: websocket | http
    #[arg(long, env = "PIXELWALL_TRANSPORT", default_value_t = TransportMode::Http)]
    transport: TransportMode,

    /// Idle time after expiry before a cooldown entry is evicted (ms)
    #[arg(long, env = "PIXELWALL_COOLDOWN_RETENTION_MS", default_value_t = DEFAULT_COOLDOWN_RETENTION_MS)]
    cooldown_retention_ms: u64,

    /// Period of the cooldown sweeper (ms)
    #[arg(long, env = "PIXELWALL_COOLDOWN_SWEEP_INTERVAL_MS", default_value_t = DEFAULT_COOLDOWN_SWEEP_INTERVAL_MS)]
    cooldown_sweep_interval_ms: u64,
}

impl From<Args> for RawServerConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            listen_port: args.port,
            cooldown_ms: args.cooldown_ms,
            grid_size: args.grid_size,
            database_url: args.database_url,
            persist_strategy: args.persist_strategy,
            transport: args.transport,
            cooldown_retention_ms: args.cooldown_retention_ms,
            cooldown_sweep_interval_ms: args.cooldown_sweep_interval_ms,
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();
    let config = match ServerConfig::try_from(RawServerConfig::from(args)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    // Initialize dependencies in order:
    // 1. Repository + GridStore
    // 2. MessagePusher
    // 3. UseCases
    // 4. Server

    // 1. Storage (lazy pool: an unreachable database only costs warnings)
    let repository = Arc::new(SqliteGridRepository::connect_lazy(&config.database_url)?);
    let grid_store = Arc::new(
        GridStore::open(
            repository.clone(),
            config.grid_size,
            config.persist_strategy,
        )
        .await,
    );
    tracing::info!(
        "Canvas {}x{} ready ({} pixels, {} persistence)",
        config.grid_size.value(),
        config.grid_size.value(),
        grid_store.snapshot().await.len(),
        config.persist_strategy
    );

    // 2. MessagePusher (registry + broadcast router)
    let message_pusher = Arc::new(WebSocketMessagePusher::new());

    // 3. UseCases
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let cooldowns = Arc::new(Mutex::new(CooldownTracker::new()));
    let connect_session_usecase = Arc::new(ConnectSessionUseCase::new(
        grid_store.clone(),
        message_pusher.clone(),
        clock.clone(),
    ));
    let disconnect_session_usecase =
        Arc::new(DisconnectSessionUseCase::new(message_pusher.clone()));
    let place_pixel_usecase = Arc::new(PlacePixelUseCase::new(
        grid_store.clone(),
        cooldowns.clone(),
        message_pusher.clone(),
        clock.clone(),
        config.cooldown_ms,
    ));
    let move_mouse_usecase = Arc::new(MoveMouseUseCase::new(message_pusher.clone()));
    let sweep_cooldowns_usecase = Arc::new(SweepCooldownsUseCase::new(
        cooldowns,
        clock,
        config.cooldown_retention_ms,
    ));
    let dispatcher = Arc::new(MessageDispatcher::new(
        place_pixel_usecase,
        move_mouse_usecase,
        message_pusher,
    ));

    // 4. Create and run the server
    let server = Server::new(
        connect_session_usecase,
        disconnect_session_usecase,
        dispatcher,
        sweep_cooldowns_usecase,
    );
    server.run(&config).await?;

    repository.close().await;
    Ok(())
}
