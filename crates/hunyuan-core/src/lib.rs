//! Core types and configuration for the Hunyuan 3D client.
//!
//! This crate provides the building blocks shared by the signing and client
//! crates: the environment-driven [`HunyuanConfig`], the [`ApiEndpoint`]
//! description used when signing requests, and the core error type.

mod config;
mod error;
mod types;

pub use config::HunyuanConfig;
pub use error::{HunyuanError, HunyuanResult};
pub use types::{ApiEndpoint, Region};
