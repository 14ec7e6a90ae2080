#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::wildcard_imports
)]

pub mod client;
pub mod config;
pub mod contracts;
pub mod error;
pub mod types;

pub use client::TodoClient;
pub use config::{Config, ContractConfig, NetworkConfig, SignerConfig, TimingConfig};
pub use error::{Result, TodoError};
pub use types::*;
