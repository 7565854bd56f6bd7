#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]
// DefaultNovelApiClient is meant to be used through the core port traits,
// not through its generic backend parameter
#![allow(private_interfaces)]

mod client;
mod config;
mod error;
mod http;
mod models;
mod port;

// ============================================================================
// Public API
// ============================================================================

// Client
pub use client::DefaultNovelApiClient;

// Configuration
pub use config::ApiClientConfig;

// Construction errors
pub use error::ApiError;

// Silence unused dev-dependency warnings
#[cfg(test)]
use tokio as _;
#[cfg(test)]
use tokio_test as _;
