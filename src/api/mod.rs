//! Inbound HTTP surface.

pub mod callbacks;

pub use callbacks::{handle_callback, CallbackState};
