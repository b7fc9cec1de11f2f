//! Configuration module
//!
//! Settings for the service connection and result display.

pub mod config;

pub use config::{Config, DisplayConfig, IconConfig, ServiceConfig};
