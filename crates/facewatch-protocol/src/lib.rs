//! Shared types for facewatch.
//!
//! Two groups of types live here:
//!
//! ```text
//! Shell (session controller) --[types: facing/model/compute]--> Engine
//!        |                                                        |
//!        +------------[events: session lifecycle + alerts]<-------+
//! ```
//!
//! The enumerations carry the integer indices used at the engine boundary so
//! that a native binding can pass them through unchanged. Events are ephemeral
//! records of what the session did; they are logged or printed, never stored.

pub mod events;
pub mod types;

pub use events::{Event, EventPayload};
pub use types::{AlertSignal, CameraFacing, ComputeMode, ModelId, ModelSelection};
