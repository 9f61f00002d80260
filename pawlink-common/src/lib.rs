//! # Pawlink Common Library
//!
//! Shared code for the pawlink pipeline:
//! - Error taxonomy and `Result` alias
//! - TOML configuration loading (per-source field maps)

pub mod config;
pub mod error;

pub use config::{Encoding, FieldMap, PipelineConfig, SourceConfig};
pub use error::{Error, Result};
