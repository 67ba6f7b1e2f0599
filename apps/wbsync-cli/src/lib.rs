//! wbsync CLI library
//!
//! The binary in `main.rs` is a thin clap front end; command logic lives here
//! so integration tests can drive it directly.

pub mod commands;
pub mod error;
pub mod formats;
pub mod logging;
pub mod output;
