//! Shared data models for telemetry backends

mod frame;
mod health;
mod metadata;
mod query;

pub use frame::*;
pub use health::*;
pub use metadata::*;
pub use query::*;
