//! Daemon-mode support: configuration loading.

pub mod config;

pub use config::{Config, Secrets};
