//! Progress events for stage execution
//!
//! This crate provides the typed event model streamed to the caller and the
//! one-way channel the pipeline emits it on.

mod channel;
mod types;

pub use channel::EventChannel;
pub use types::*;
