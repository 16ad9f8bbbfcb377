//! # Holocron Core
//!
//! Shared configuration, error type, message/tool types and the traits that
//! glue the Holocron crates together:
//! - [`traits::Provider`] for chat completions against a language model
//! - [`traits::Embedder`] for turning text into vectors
//! - [`traits::Tool`] for functions the agent may call

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::HolocronConfig;
pub use error::{HolocronError, Result};
