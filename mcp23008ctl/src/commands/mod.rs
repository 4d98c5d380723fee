//! Subcommand implementations
//!
//! Handlers take an already-addressed device so they run unchanged against
//! the Linux bus or the simulated one.

pub mod device;
pub mod discover;
pub mod interrupt;
pub mod pin;
