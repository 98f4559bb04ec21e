//! larder-core library.
//!
//! # Conventions
//!
//! - **Errors**: Use `anyhow::Result` for return types where appropriate;
//!   domain failures carry a [`error::LarderError`] so callers can surface
//!   a stable code and hint.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod config;
pub mod db;
pub mod error;
pub mod expiry;
pub mod hash;
pub mod model;
