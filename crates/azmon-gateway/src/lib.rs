//! azmon-gateway - Query routing across Azure telemetry backends
//!
//! This crate provides the `MonitorGateway`, which presents the resource
//! metrics, Application Insights and Log Analytics clients as a single
//! datasource.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                         MonitorGateway                           │
//! │                                                                  │
//! │   run_queries(batch)        check_health()      find_metadata()  │
//! │          │                        │                   │          │
//! │     partition()             fan out to          first backend    │
//! │          │                 configured ones      that recognises  │
//! │     dispatch()                    │               the query      │
//! │   0 → empty                  join all,                           │
//! │   1 → as-is                  reduce()                            │
//! │   2+ → fan-in first emissions                                    │
//! │          │                                                       │
//! │    ┌─────┴─────────────┬────────────────────┐                    │
//! │    ▼                   ▼                    ▼                    │
//! │ ┌──────────────┐ ┌──────────────┐ ┌──────────────────┐           │
//! │ │ App Insights │ │ Log Analytics│ │ Resource metrics │           │
//! │ │  (deferred)  │ │    (live)    │ │      (live)      │           │
//! │ └──────────────┘ └──────────────┘ └──────────────────┘           │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use azmon_gateway::MonitorGateway;
//!
//! let mut gateway = MonitorGateway::new("Azure Monitor");
//! gateway.register_backend(Arc::new(app_insights_client));
//! gateway.register_backend(Arc::new(log_analytics_client));
//!
//! // One backend invoked: its completion comes back unchanged.
//! // Several: a deferred result with every backend's first emission.
//! let result = gateway.run_queries(&batch);
//! let mut updates = result.into_stream();
//! while let Some(response) = updates.next().await {
//!     render(response?);
//! }
//!
//! let health = gateway.check_health().await;
//! ```

pub mod dispatch;
mod gateway;
pub mod health;
mod metadata;
pub mod partition;

pub use gateway::{BackendTable, MonitorGateway};
pub use health::NOTHING_CONFIGURED;
pub use partition::{partition, Partitions};

// Re-export core types for convenience
pub use azmon_core::{
    BackendError, BackendResult, Batch, CombinedResult, CompositeHealth, Completion,
    QueryBackend, QueryResponse, QueryType,
};
