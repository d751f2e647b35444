#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod config;
pub mod content;
pub mod engine;
pub mod error;
pub mod placement;
pub mod surface;
pub mod telemetry;
pub mod types;

pub type Result<T> = std::result::Result<T, error::Error>;
