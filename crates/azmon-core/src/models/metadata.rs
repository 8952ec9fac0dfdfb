//! Metadata lookup models

use serde::{Deserialize, Serialize};

/// A text/value pair returned by metadata lookups and free-text finds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricFindValue {
    /// Display text
    pub text: String,
    /// Underlying value, when it differs from the text
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub value: Option<String>,
}

impl MetricFindValue {
    pub fn new(text: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            value: Some(value.into()),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            value: None,
        }
    }
}

/// Aggregation time grain offered for a metric
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeGrain {
    pub text: String,
    pub value: String,
}

/// Aggregation and dimension metadata of a resource metric
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricMetadata {
    pub primary_agg_type: String,
    pub supported_agg_types: Vec<String>,
    pub supported_time_grains: Vec<TimeGrain>,
    pub dimensions: Vec<MetricFindValue>,
}

/// A Log Analytics workspace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    /// ARM resource id
    pub id: String,
    pub name: String,
    /// Workspace id used by the query API
    pub customer_id: String,
}

/// Aggregation and grouping metadata of an Application Insights metric
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppInsightsMetricMetadata {
    pub primary_agg_type: String,
    pub supported_agg_types: Vec<String>,
    pub supported_group_by: Vec<String>,
}
