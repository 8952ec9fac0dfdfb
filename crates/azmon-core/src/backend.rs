//! QueryBackend trait - the core abstraction for telemetry backends

use async_trait::async_trait;

use crate::completion::Completion;
use crate::error::{BackendError, BackendResult};
use crate::models::{
    AppInsightsMetricMetadata, HealthStatus, MetricFindValue, MetricMetadata, Partition,
    QueryType, Workspace,
};

/// The trait every telemetry backend client implements.
///
/// One implementation exists per [`QueryType`]:
/// - resource metrics (`QueryType::AzureMonitor`)
/// - Application Insights (`QueryType::ApplicationInsights`)
/// - Log Analytics (`QueryType::AzureLogAnalytics`)
///
/// Metadata lookups default to `NotSupported`; each backend overrides the
/// ones it owns.
#[async_trait]
pub trait QueryBackend: Send + Sync {
    // =========================================================================
    // Identity and configuration
    // =========================================================================

    /// The query type this backend answers
    fn query_type(&self) -> QueryType;

    /// Whether the settings this backend needs are present. Must not do I/O.
    fn is_configured(&self) -> bool;

    // =========================================================================
    // Query execution
    // =========================================================================

    /// Issue the queries of a partition.
    ///
    /// Returns immediately with a handle; the request runs when the handle
    /// is polled. Errors surface through the handle.
    fn execute(&self, partition: Partition) -> Completion;

    /// Check that the API is reachable with the configured credentials.
    ///
    /// An `Err` is reported by callers as an error status carrying the
    /// error text.
    async fn test_connectivity(&self) -> BackendResult<HealthStatus>;

    /// Answer a free-text metadata query.
    ///
    /// Returns `Ok(None)` when the text is not in this backend's query
    /// grammar, so the caller can try the next backend.
    async fn find_metadata(&self, query: &str) -> BackendResult<Option<Vec<MetricFindValue>>> {
        let _ = query;
        Ok(None)
    }

    // =========================================================================
    // Resource metrics metadata
    // =========================================================================

    /// List subscriptions visible to the configured credentials
    async fn get_subscriptions(&self) -> BackendResult<Vec<MetricFindValue>> {
        Err(BackendError::NotSupported("get_subscriptions".to_string()))
    }

    /// List resource groups of a subscription
    async fn get_resource_groups(&self, subscription_id: &str) -> BackendResult<Vec<MetricFindValue>> {
        let _ = subscription_id;
        Err(BackendError::NotSupported("get_resource_groups".to_string()))
    }

    /// List resource types (metric definitions) in a resource group
    async fn get_metric_definitions(
        &self,
        subscription_id: &str,
        resource_group: &str,
    ) -> BackendResult<Vec<MetricFindValue>> {
        let _ = (subscription_id, resource_group);
        Err(BackendError::NotSupported("get_metric_definitions".to_string()))
    }

    /// List resources of one type in a resource group
    async fn get_resource_names(
        &self,
        subscription_id: &str,
        resource_group: &str,
        metric_definition: &str,
    ) -> BackendResult<Vec<MetricFindValue>> {
        let _ = (subscription_id, resource_group, metric_definition);
        Err(BackendError::NotSupported("get_resource_names".to_string()))
    }

    /// List metric namespaces of a resource
    async fn get_metric_namespaces(
        &self,
        subscription_id: &str,
        resource_group: &str,
        metric_definition: &str,
        resource_name: &str,
    ) -> BackendResult<Vec<MetricFindValue>> {
        let _ = (subscription_id, resource_group, metric_definition, resource_name);
        Err(BackendError::NotSupported("get_metric_namespaces".to_string()))
    }

    /// List metric names in a namespace of a resource
    async fn get_metric_names(
        &self,
        subscription_id: &str,
        resource_group: &str,
        metric_definition: &str,
        resource_name: &str,
        metric_namespace: &str,
    ) -> BackendResult<Vec<MetricFindValue>> {
        let _ = (
            subscription_id,
            resource_group,
            metric_definition,
            resource_name,
            metric_namespace,
        );
        Err(BackendError::NotSupported("get_metric_names".to_string()))
    }

    /// Aggregation, time grain and dimension metadata of one metric
    async fn get_metric_metadata(
        &self,
        subscription_id: &str,
        resource_group: &str,
        metric_definition: &str,
        resource_name: &str,
        metric_namespace: &str,
        metric_name: &str,
    ) -> BackendResult<MetricMetadata> {
        let _ = (
            subscription_id,
            resource_group,
            metric_definition,
            resource_name,
            metric_namespace,
            metric_name,
        );
        Err(BackendError::NotSupported("get_metric_metadata".to_string()))
    }

    // =========================================================================
    // Log Analytics metadata
    // =========================================================================

    /// List Log Analytics workspaces of a subscription
    async fn get_workspaces(&self, subscription_id: &str) -> BackendResult<Vec<Workspace>> {
        let _ = subscription_id;
        Err(BackendError::NotSupported("get_workspaces".to_string()))
    }

    // =========================================================================
    // Application Insights metadata
    // =========================================================================

    /// List metric names of the configured application
    async fn get_app_insights_metric_names(&self) -> BackendResult<Vec<MetricFindValue>> {
        Err(BackendError::NotSupported(
            "get_app_insights_metric_names".to_string(),
        ))
    }

    /// Aggregation and group-by metadata of one application metric
    async fn get_app_insights_metric_metadata(
        &self,
        metric_name: &str,
    ) -> BackendResult<AppInsightsMetricMetadata> {
        let _ = metric_name;
        Err(BackendError::NotSupported(
            "get_app_insights_metric_metadata".to_string(),
        ))
    }

    /// Column names of the last result returned for a query
    async fn get_app_insights_columns(&self, ref_id: &str) -> BackendResult<Vec<String>> {
        let _ = ref_id;
        Err(BackendError::NotSupported(
            "get_app_insights_columns".to_string(),
        ))
    }
}
