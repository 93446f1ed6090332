//! Relay daemon library - exposes modules for testing.

pub mod config;
pub mod intake;
pub mod operator;
pub mod poller;
pub mod router;
pub mod state;
pub mod telegram;
pub mod texts;
pub mod transport;
