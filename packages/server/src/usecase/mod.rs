//! UseCase layer: one struct per client-visible operation.

mod connect_session;
mod disconnect_session;
mod error;
mod move_mouse;
mod place_pixel;
mod sweep_cooldowns;

pub use connect_session::ConnectSessionUseCase;
pub use disconnect_session::DisconnectSessionUseCase;
pub use error::{ConnectError, PlacePixelError};
pub use move_mouse::MoveMouseUseCase;
pub use place_pixel::{PlacePixelUseCase, PlacementOutcome};
pub use sweep_cooldowns::SweepCooldownsUseCase;
