//! Facewatch Library
//!
//! Camera session shell for a face-detection inference engine: the engine
//! boundary, the session lifecycle controller and the background alert poller.

pub mod alert;
pub mod config;
pub mod engine;
pub mod events;
pub mod replay;
pub mod session;

pub use facewatch_protocol as protocol;
