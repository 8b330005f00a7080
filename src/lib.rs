//! Bank statement tooling: a MyAmeria history downloader that writes the generic CSV layout, and a
//! generator of synthetic statements in several bank layouts for testing statement parsers.

pub mod args;
pub mod bank;
pub mod commands;
pub mod config;
mod error;
pub mod format;
pub mod generator;
pub mod model;
mod utils;

pub use bank::Mode;
pub use config::{DownloaderConfig, StatementsConfig};
pub use error::Error;
pub use error::Result;
