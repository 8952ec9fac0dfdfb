//! azmon-core - Core traits and types for the Azure Monitor query router
//!
//! This crate provides the abstractions shared by the three telemetry
//! backends (resource metrics, Application Insights, Log Analytics) and the
//! gateway that routes mixed query batches across them.

pub mod backend;
pub mod completion;
pub mod config;
pub mod error;
pub mod models;
pub mod routing;
pub mod testing;

pub use backend::QueryBackend;
pub use completion::{CombinedResult, Completion, LiveStream};
pub use config::DatasourceSettings;
pub use error::{BackendError, BackendResult, ConfigError};
pub use models::*;
