//! Query, batch and partition models

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// The telemetry API a query is addressed to.
///
/// Variants are declared in a fixed order so that maps keyed by
/// `QueryType` iterate deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum QueryType {
    /// Resource metrics API
    #[serde(rename = "Azure Monitor")]
    AzureMonitor,
    /// Application performance (Application Insights) API
    #[serde(rename = "Application Insights")]
    ApplicationInsights,
    /// Log Analytics query API
    #[serde(rename = "Azure Log Analytics")]
    AzureLogAnalytics,
}

impl QueryType {
    /// All known query types
    pub const ALL: [QueryType; 3] = [
        QueryType::AzureMonitor,
        QueryType::ApplicationInsights,
        QueryType::AzureLogAnalytics,
    ];

    /// The tag carried in `Query::query_type`
    pub fn as_tag(&self) -> &'static str {
        match self {
            QueryType::AzureMonitor => "Azure Monitor",
            QueryType::ApplicationInsights => "Application Insights",
            QueryType::AzureLogAnalytics => "Azure Log Analytics",
        }
    }

    /// Resolve a query-type tag. Unknown tags return `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_tag() == tag)
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// A single query within a batch
///
/// Everything except `refId`, `queryType` and `hide` is kept as an opaque
/// payload for the owning backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    /// Identifier correlating the query with its result frames
    pub ref_id: String,
    /// Query-type tag selecting the owning backend
    #[serde(default)]
    pub query_type: String,
    /// Hidden queries are kept in the batch; backends decide whether to skip them
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hide: bool,
    /// Backend-specific payload
    #[serde(flatten)]
    pub payload: serde_json::Map<String, serde_json::Value>,
}

impl Query {
    /// Create a query addressed to a known backend
    pub fn new(ref_id: impl Into<String>, query_type: QueryType) -> Self {
        Self::with_tag(ref_id, query_type.as_tag())
    }

    /// Create a query with a raw tag (which may not name any backend)
    pub fn with_tag(ref_id: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            ref_id: ref_id.into(),
            query_type: tag.into(),
            hide: false,
            payload: serde_json::Map::new(),
        }
    }

    /// Add a payload field
    pub fn with_payload(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.payload.insert(key.into(), value);
        self
    }

    /// The backend this query is routed to, if its tag is recognised
    pub fn kind(&self) -> Option<QueryType> {
        QueryType::from_tag(&self.query_type)
    }
}

/// Absolute time range of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl TimeRange {
    /// Range ending now and reaching `span` into the past
    pub fn last(span: Duration) -> Self {
        let to = Utc::now();
        Self { from: to - span, to }
    }
}

/// Execution context shared by every query in a batch
///
/// Immutable once the batch is built. Partitions share it through an
/// `Arc`; a backend that needs a modified context clones it first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionContext {
    /// Requested time range
    pub range: TimeRange,
    /// Interval as a display string (e.g. "1m")
    #[serde(default)]
    pub interval: String,
    /// Interval in milliseconds
    #[serde(default)]
    pub interval_ms: u64,
    /// Upper bound on points per series
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_data_points: Option<u32>,
    /// Template variables scoped to this request
    #[serde(default)]
    pub scoped_vars: serde_json::Map<String, serde_json::Value>,
}

impl ExecutionContext {
    pub fn new(range: TimeRange) -> Self {
        Self {
            range,
            interval: String::new(),
            interval_ms: 0,
            max_data_points: None,
            scoped_vars: serde_json::Map::new(),
        }
    }

    pub fn with_interval(mut self, interval: impl Into<String>, interval_ms: u64) -> Self {
        self.interval = interval.into();
        self.interval_ms = interval_ms;
        self
    }

    pub fn with_scoped_var(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.scoped_vars.insert(name.into(), value);
        self
    }
}

/// A caller-submitted collection of queries
#[derive(Debug, Clone)]
pub struct Batch {
    /// Shared execution context
    pub context: Arc<ExecutionContext>,
    /// Queries in submission order
    pub queries: Vec<Query>,
}

impl Batch {
    pub fn new(context: ExecutionContext, queries: Vec<Query>) -> Self {
        Self {
            context: Arc::new(context),
            queries,
        }
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }
}

/// The queries of a batch routed to a single backend
#[derive(Debug, Clone)]
pub struct Partition {
    /// Backend this partition is routed to
    pub query_type: QueryType,
    /// Execution context shared with the originating batch
    pub context: Arc<ExecutionContext>,
    /// Queries in original batch order
    pub queries: Vec<Query>,
}

impl Partition {
    pub fn new(query_type: QueryType, context: Arc<ExecutionContext>) -> Self {
        Self {
            query_type,
            context,
            queries: Vec::new(),
        }
    }

    pub fn ref_ids(&self) -> Vec<&str> {
        self.queries.iter().map(|q| q.ref_id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("Azure Monitor", Some(QueryType::AzureMonitor))]
    #[case("Application Insights", Some(QueryType::ApplicationInsights))]
    #[case("Azure Log Analytics", Some(QueryType::AzureLogAnalytics))]
    #[case("azure monitor", None)]
    #[case("Insights Analytics", None)]
    #[case("", None)]
    fn query_type_from_tag(#[case] tag: &str, #[case] expected: Option<QueryType>) {
        assert_eq!(QueryType::from_tag(tag), expected);
    }

    #[test]
    fn query_payload_is_flattened() {
        let json = serde_json::json!({
            "refId": "A",
            "queryType": "Azure Log Analytics",
            "azureLogAnalytics": { "query": "AzureActivity | take 10" }
        });

        let query: Query = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(query.ref_id, "A");
        assert_eq!(query.kind(), Some(QueryType::AzureLogAnalytics));
        assert!(!query.hide);
        assert!(query.payload.contains_key("azureLogAnalytics"));

        assert_eq!(serde_json::to_value(&query).unwrap(), json);
    }

    #[test]
    fn query_without_type_has_no_kind() {
        let query: Query = serde_json::from_value(serde_json::json!({ "refId": "B" })).unwrap();
        assert_eq!(query.query_type, "");
        assert_eq!(query.kind(), None);
    }

    #[test]
    fn execution_context_deserializes_camel_case() {
        let ctx: ExecutionContext = serde_json::from_value(serde_json::json!({
            "range": { "from": "2024-01-01T00:00:00Z", "to": "2024-01-01T06:00:00Z" },
            "interval": "1m",
            "intervalMs": 60000,
            "scopedVars": { "env": "prod" }
        }))
        .unwrap();

        assert_eq!(ctx.interval_ms, 60000);
        assert_eq!(ctx.max_data_points, None);
        assert_eq!(ctx.scoped_vars["env"], "prod");
        assert_eq!((ctx.range.to - ctx.range.from).num_hours(), 6);
    }
}
