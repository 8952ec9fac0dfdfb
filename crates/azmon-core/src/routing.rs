//! Fixed backend orderings used by the gateway.
//!
//! Each gateway operation visits backends in its own order. The orders are
//! kept here so every call site agrees on them.

use crate::models::QueryType;

/// Order in which non-empty partitions are dispatched.
///
/// Only matters for which backend is seen first; fan-in makes no ordering
/// promise across backends.
pub const DISPATCH_ORDER: [QueryType; 3] = [
    QueryType::ApplicationInsights,
    QueryType::AzureLogAnalytics,
    QueryType::AzureMonitor,
];

/// Order in which connectivity checks are issued and numbered.
pub const HEALTH_ORDER: [QueryType; 3] = [
    QueryType::AzureMonitor,
    QueryType::ApplicationInsights,
    QueryType::AzureLogAnalytics,
];

/// Order in which backends are asked to recognise a free-text query.
pub const FIND_ORDER: [QueryType; 3] = [
    QueryType::ApplicationInsights,
    QueryType::AzureMonitor,
    QueryType::AzureLogAnalytics,
];
