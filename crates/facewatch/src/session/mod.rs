//! Camera session lifecycle.

mod controller;
mod dispatch;
mod models;

pub use controller::SessionController;
pub use dispatch::{SurfaceCallbacks, SurfaceEvent, UiEvent};
pub use models::{ReloadPolicy, Session, SessionConfig};
