//! Command-line host for MercadoPago QR payment orders.
//!
//! Loads account credentials from a TOML configuration file and an order
//! from a JSON or TOML file, then runs [`mpqr::QrOrderNode`] once.
//!
//! # Modules
//!
//! - [`config`] - CLI configuration and order files, with environment variable expansion

pub mod config;

pub use config::{CliConfig, ConfigError, load_order};
