//! Shared types and utilities for the MCP23008 driver and CLI

pub mod config;
pub mod error;
pub mod protocol;
pub mod types;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
