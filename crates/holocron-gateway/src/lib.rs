//! # Holocron Gateway
//!
//! Web chat for the Sith Holocron: an embedded single-page UI plus a small
//! JSON API. Every browser session gets its own agent and memory.

pub mod dashboard;
pub mod routes;
pub mod server;

pub use server::{AppState, build_router, start};
