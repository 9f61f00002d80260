//! pawlink-il library interface
//!
//! Exposes the record-normalization and identity-linking engine for
//! integration testing and embedding.

pub mod db;
pub mod ingest;
pub mod models;
pub mod pipeline;
pub mod services;

pub use models::{Link, MasterIdentity, MasterTable, MatchKeySet, SourceRecord};
