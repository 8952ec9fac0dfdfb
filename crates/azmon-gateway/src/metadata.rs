//! Metadata routing
//!
//! Each lookup is owned by exactly one backend and forwarded to it
//! unchanged. Free-text finds try backends in [`FIND_ORDER`] and stop at the
//! first one that recognises the query.

use std::sync::Arc;

use azmon_core::routing::FIND_ORDER;
use azmon_core::{
    AppInsightsMetricMetadata, BackendError, BackendResult, MetricFindValue, MetricMetadata,
    QueryBackend, QueryType, Workspace,
};
use tracing::debug;

use crate::gateway::MonitorGateway;

impl MonitorGateway {
    /// The backend owning a lookup.
    ///
    /// Configuration is not checked here: an explicit lookup names its
    /// backend, which reports its own missing settings.
    fn owner(&self, query_type: QueryType) -> BackendResult<&Arc<dyn QueryBackend>> {
        self.backends
            .get(query_type)
            .ok_or_else(|| BackendError::NotConfigured(query_type.to_string()))
    }

    /// Answer a free-text metadata query.
    ///
    /// An empty query returns no values without calling any backend. Backends
    /// that are not configured are skipped, since the query names no backend
    /// and an unconfigured one must not claim it.
    pub async fn find_metadata(&self, query: &str) -> BackendResult<Vec<MetricFindValue>> {
        if query.is_empty() {
            return Ok(Vec::new());
        }

        for query_type in FIND_ORDER {
            let Some(backend) = self.backends.configured(query_type) else {
                continue;
            };
            if let Some(values) = backend.find_metadata(query).await? {
                debug!(
                    query_type = %query_type,
                    matches = values.len(),
                    "Free-text query answered"
                );
                return Ok(values);
            }
        }

        debug!(query = %query, "Free-text query not recognised by any backend");
        Ok(Vec::new())
    }

    // =========================================================================
    // Resource metrics
    // =========================================================================

    pub async fn get_subscriptions(&self) -> BackendResult<Vec<MetricFindValue>> {
        self.owner(QueryType::AzureMonitor)?.get_subscriptions().await
    }

    pub async fn get_resource_groups(
        &self,
        subscription_id: &str,
    ) -> BackendResult<Vec<MetricFindValue>> {
        self.owner(QueryType::AzureMonitor)?
            .get_resource_groups(subscription_id)
            .await
    }

    pub async fn get_metric_definitions(
        &self,
        subscription_id: &str,
        resource_group: &str,
    ) -> BackendResult<Vec<MetricFindValue>> {
        self.owner(QueryType::AzureMonitor)?
            .get_metric_definitions(subscription_id, resource_group)
            .await
    }

    pub async fn get_resource_names(
        &self,
        subscription_id: &str,
        resource_group: &str,
        metric_definition: &str,
    ) -> BackendResult<Vec<MetricFindValue>> {
        self.owner(QueryType::AzureMonitor)?
            .get_resource_names(subscription_id, resource_group, metric_definition)
            .await
    }

    pub async fn get_metric_namespaces(
        &self,
        subscription_id: &str,
        resource_group: &str,
        metric_definition: &str,
        resource_name: &str,
    ) -> BackendResult<Vec<MetricFindValue>> {
        self.owner(QueryType::AzureMonitor)?
            .get_metric_namespaces(subscription_id, resource_group, metric_definition, resource_name)
            .await
    }

    pub async fn get_metric_names(
        &self,
        subscription_id: &str,
        resource_group: &str,
        metric_definition: &str,
        resource_name: &str,
        metric_namespace: &str,
    ) -> BackendResult<Vec<MetricFindValue>> {
        self.owner(QueryType::AzureMonitor)?
            .get_metric_names(
                subscription_id,
                resource_group,
                metric_definition,
                resource_name,
                metric_namespace,
            )
            .await
    }

    pub async fn get_metric_metadata(
        &self,
        subscription_id: &str,
        resource_group: &str,
        metric_definition: &str,
        resource_name: &str,
        metric_namespace: &str,
        metric_name: &str,
    ) -> BackendResult<MetricMetadata> {
        self.owner(QueryType::AzureMonitor)?
            .get_metric_metadata(
                subscription_id,
                resource_group,
                metric_definition,
                resource_name,
                metric_namespace,
                metric_name,
            )
            .await
    }

    // =========================================================================
    // Log Analytics
    // =========================================================================

    pub async fn get_workspaces(&self, subscription_id: &str) -> BackendResult<Vec<Workspace>> {
        self.owner(QueryType::AzureLogAnalytics)?
            .get_workspaces(subscription_id)
            .await
    }

    // =========================================================================
    // Application Insights
    // =========================================================================

    pub async fn get_app_insights_metric_names(&self) -> BackendResult<Vec<MetricFindValue>> {
        self.owner(QueryType::ApplicationInsights)?
            .get_app_insights_metric_names()
            .await
    }

    pub async fn get_app_insights_metric_metadata(
        &self,
        metric_name: &str,
    ) -> BackendResult<AppInsightsMetricMetadata> {
        self.owner(QueryType::ApplicationInsights)?
            .get_app_insights_metric_metadata(metric_name)
            .await
    }

    pub async fn get_app_insights_columns(&self, ref_id: &str) -> BackendResult<Vec<String>> {
        self.owner(QueryType::ApplicationInsights)?
            .get_app_insights_columns(ref_id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use azmon_core::testing::MockBackend;

    #[tokio::test]
    async fn lookup_without_owner_is_not_configured() {
        let gateway = MonitorGateway::new("azure");
        let err = gateway.get_workspaces("sub").await.unwrap_err();
        assert_eq!(err.to_string(), "Backend not configured: Azure Log Analytics");
    }

    #[tokio::test]
    async fn lookup_goes_to_owner_only() {
        let am = Arc::new(
            MockBackend::new(QueryType::AzureMonitor)
                .metadata(vec![MetricFindValue::new("rg-prod", "rg-prod")]),
        );
        let ai = Arc::new(MockBackend::new(QueryType::ApplicationInsights));
        let mut gateway = MonitorGateway::new("azure");
        gateway.register_backend(am.clone());
        gateway.register_backend(ai.clone());

        let groups = gateway.get_resource_groups("sub-1").await.unwrap();
        assert_eq!(groups, vec![MetricFindValue::new("rg-prod", "rg-prod")]);
        assert_eq!(am.metadata_calls(), 1);
        assert_eq!(ai.metadata_calls(), 0);
    }

    #[tokio::test]
    async fn find_skips_unconfigured_but_lookup_reaches_it() {
        let ai = Arc::new(
            MockBackend::new(QueryType::ApplicationInsights)
                .unconfigured()
                .find_result(vec![MetricFindValue::text("requests/count")])
                .metadata(vec![MetricFindValue::text("requests/count")]),
        );
        let mut gateway = MonitorGateway::new("azure");
        gateway.register_backend(ai.clone());

        assert!(gateway.find_metadata("metrics()").await.unwrap().is_empty());
        assert_eq!(ai.find_calls(), 0);

        let names = gateway.get_app_insights_metric_names().await.unwrap();
        assert_eq!(names, vec![MetricFindValue::text("requests/count")]);
        assert_eq!(ai.metadata_calls(), 1);
    }

    #[tokio::test]
    async fn empty_find_query_calls_nothing() {
        let ai = Arc::new(
            MockBackend::new(QueryType::ApplicationInsights)
                .find_result(vec![MetricFindValue::text("requests/count")]),
        );
        let mut gateway = MonitorGateway::new("azure");
        gateway.register_backend(ai.clone());

        assert!(gateway.find_metadata("").await.unwrap().is_empty());
        assert_eq!(ai.find_calls(), 0);
    }
}
