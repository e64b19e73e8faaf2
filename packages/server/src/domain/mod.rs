//! Domain layer: canvas model, cooldown rules and the ports the use cases depend on.

pub mod connection;
pub mod cooldown;
pub mod entity;
pub mod error;
pub mod repository;
pub mod value_object;

pub use connection::{BroadcastRouter, ConnectionRegistry, PusherChannel};
pub use cooldown::{CooldownDecision, CooldownTracker};
pub use entity::{Grid, PixelRecord, Session, SessionState};
pub use error::{GridError, MessagePushError, RepositoryError};
pub use repository::GridRepository;
pub use value_object::{Color, Coordinate, GridSize, SessionId, Timestamp, UserId};
