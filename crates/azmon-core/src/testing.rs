//! Mock backend for tests and demo mode
//!
//! `MockBackend` answers every partition either with scripted responses or,
//! when nothing is scripted, by echoing one frame per query. It counts every
//! call so tests can assert which backends were touched.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::backend::QueryBackend;
use crate::completion::Completion;
use crate::error::{BackendError, BackendResult};
use crate::models::{
    AppInsightsMetricMetadata, HealthStatus, MetricFindValue, MetricMetadata, Partition,
    QueryResponse, QueryType, ResultFrame, TimeGrain, Workspace,
};

/// Build the response a mock returns when nothing is scripted:
/// one single-point series per query, named `"<type>/<refId>"`.
pub fn echo_response(partition: &Partition) -> QueryResponse {
    let ts = partition.context.range.to.timestamp_millis();
    let frames = partition
        .queries
        .iter()
        .map(|q| {
            ResultFrame::time_series(
                q.ref_id.clone(),
                format!("{}/{}", partition.query_type, q.ref_id),
                vec![(Some(1.0), ts)],
            )
        })
        .collect();
    QueryResponse::new(frames)
}

/// Sender side of an open live stream served by a [`MockBackend`]
#[derive(Clone)]
pub struct LiveFeed {
    tx: mpsc::UnboundedSender<BackendResult<QueryResponse>>,
}

impl LiveFeed {
    /// Emit a response. Returns `false` once the stream has been dropped.
    pub fn push(&self, response: QueryResponse) -> bool {
        self.tx.send(Ok(response)).is_ok()
    }

    /// Emit a failure
    pub fn fail(&self, message: impl Into<String>) -> bool {
        self.tx
            .send(Err(BackendError::Transport(message.into())))
            .is_ok()
    }
}

#[derive(Default)]
struct MockCalls {
    executions: AtomicUsize,
    connectivity_checks: AtomicUsize,
    find_calls: AtomicUsize,
    metadata_calls: AtomicUsize,
}

/// Configurable in-memory backend
pub struct MockBackend {
    query_type: QueryType,
    configured: bool,
    live: bool,
    keep_open: bool,
    delay: Option<Duration>,
    /// Scripted emissions; `Err` entries become transport failures
    script: Vec<Result<QueryResponse, String>>,
    feed: Mutex<Option<mpsc::UnboundedReceiver<BackendResult<QueryResponse>>>>,
    health: Result<HealthStatus, String>,
    find: Option<Vec<MetricFindValue>>,
    metadata: Vec<MetricFindValue>,
    calls: MockCalls,
    partitions: Mutex<Vec<Partition>>,
}

impl MockBackend {
    /// A configured, deferred backend that echoes its queries
    pub fn new(query_type: QueryType) -> Self {
        Self {
            query_type,
            configured: true,
            live: false,
            keep_open: false,
            delay: None,
            script: Vec::new(),
            feed: Mutex::new(None),
            health: Ok(HealthStatus::success(format!(
                "Successfully queried {}.",
                query_type
            ))),
            find: None,
            metadata: Vec::new(),
            calls: MockCalls::default(),
            partitions: Mutex::new(Vec::new()),
        }
    }

    /// A live backend whose stream stays open; emissions are pushed through
    /// the returned [`LiveFeed`]
    pub fn with_feed(query_type: QueryType) -> (Self, LiveFeed) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut backend = Self::new(query_type).live();
        backend.feed = Mutex::new(Some(rx));
        (backend, LiveFeed { tx })
    }

    pub fn unconfigured(mut self) -> Self {
        self.configured = false;
        self
    }

    /// Answer with a live stream instead of a deferred response
    pub fn live(mut self) -> Self {
        self.live = true;
        self
    }

    /// Keep the live stream open after the scripted emissions
    pub fn keep_open(mut self) -> Self {
        self.keep_open = true;
        self
    }

    /// Wait before each emission
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Script a successful emission
    pub fn emit(mut self, response: QueryResponse) -> Self {
        self.script.push(Ok(response));
        self
    }

    /// Script a failed emission
    pub fn fail(mut self, message: impl Into<String>) -> Self {
        self.script.push(Err(message.into()));
        self
    }

    /// Status returned by `test_connectivity`
    pub fn health(mut self, status: HealthStatus) -> Self {
        self.health = Ok(status);
        self
    }

    /// Make `test_connectivity` return an error
    pub fn health_failure(mut self, message: impl Into<String>) -> Self {
        self.health = Err(message.into());
        self
    }

    /// Recognise every free-text query and answer with `values`
    pub fn find_result(mut self, values: Vec<MetricFindValue>) -> Self {
        self.find = Some(values);
        self
    }

    /// Values returned by the metadata lookups this backend owns
    pub fn metadata(mut self, values: Vec<MetricFindValue>) -> Self {
        self.metadata = values;
        self
    }

    pub fn executions(&self) -> usize {
        self.calls.executions.load(Ordering::SeqCst)
    }

    pub fn connectivity_checks(&self) -> usize {
        self.calls.connectivity_checks.load(Ordering::SeqCst)
    }

    pub fn find_calls(&self) -> usize {
        self.calls.find_calls.load(Ordering::SeqCst)
    }

    pub fn metadata_calls(&self) -> usize {
        self.calls.metadata_calls.load(Ordering::SeqCst)
    }

    /// Every partition received so far
    pub fn partitions(&self) -> Vec<Partition> {
        self.partitions.lock().clone()
    }

    fn lookup(&self, owner: QueryType, operation: &str) -> BackendResult<Vec<MetricFindValue>> {
        self.calls.metadata_calls.fetch_add(1, Ordering::SeqCst);
        if self.query_type == owner {
            Ok(self.metadata.clone())
        } else {
            Err(BackendError::NotSupported(operation.to_string()))
        }
    }

    fn texts(values: &[MetricFindValue]) -> Vec<String> {
        values.iter().map(|v| v.text.clone()).collect()
    }
}

#[async_trait]
impl QueryBackend for MockBackend {
    fn query_type(&self) -> QueryType {
        self.query_type
    }

    fn is_configured(&self) -> bool {
        self.configured
    }

    fn execute(&self, partition: Partition) -> Completion {
        self.calls.executions.fetch_add(1, Ordering::SeqCst);
        let echo = echo_response(&partition);
        self.partitions.lock().push(partition);

        if let Some(rx) = self.feed.lock().take() {
            return Completion::live(UnboundedReceiverStream::new(rx));
        }

        let scripted: Vec<BackendResult<QueryResponse>> = self
            .script
            .iter()
            .map(|r| r.clone().map_err(BackendError::Transport))
            .collect();
        let delay = self.delay;

        if self.live {
            let responses = if scripted.is_empty() {
                vec![Ok(echo)]
            } else {
                scripted
            };
            let emissions = stream::iter(responses).then(move |r| async move {
                if let Some(d) = delay {
                    tokio::time::sleep(d).await;
                }
                r
            });
            if self.keep_open {
                Completion::live(emissions.chain(stream::pending()))
            } else {
                Completion::live(emissions)
            }
        } else {
            // Deferred backends answer once: the first scripted emission, else the echo.
            let first = scripted.into_iter().next().unwrap_or(Ok(echo));
            Completion::deferred(async move {
                if let Some(d) = delay {
                    tokio::time::sleep(d).await;
                }
                first
            })
        }
    }

    async fn test_connectivity(&self) -> BackendResult<HealthStatus> {
        self.calls.connectivity_checks.fetch_add(1, Ordering::SeqCst);
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        self.health.clone().map_err(BackendError::Transport)
    }

    async fn find_metadata(&self, _query: &str) -> BackendResult<Option<Vec<MetricFindValue>>> {
        self.calls.find_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.find.clone())
    }

    async fn get_subscriptions(&self) -> BackendResult<Vec<MetricFindValue>> {
        self.lookup(QueryType::AzureMonitor, "get_subscriptions")
    }

    async fn get_resource_groups(&self, _subscription_id: &str) -> BackendResult<Vec<MetricFindValue>> {
        self.lookup(QueryType::AzureMonitor, "get_resource_groups")
    }

    async fn get_metric_definitions(
        &self,
        _subscription_id: &str,
        _resource_group: &str,
    ) -> BackendResult<Vec<MetricFindValue>> {
        self.lookup(QueryType::AzureMonitor, "get_metric_definitions")
    }

    async fn get_resource_names(
        &self,
        _subscription_id: &str,
        _resource_group: &str,
        _metric_definition: &str,
    ) -> BackendResult<Vec<MetricFindValue>> {
        self.lookup(QueryType::AzureMonitor, "get_resource_names")
    }

    async fn get_metric_namespaces(
        &self,
        _subscription_id: &str,
        _resource_group: &str,
        _metric_definition: &str,
        _resource_name: &str,
    ) -> BackendResult<Vec<MetricFindValue>> {
        self.lookup(QueryType::AzureMonitor, "get_metric_namespaces")
    }

    async fn get_metric_names(
        &self,
        _subscription_id: &str,
        _resource_group: &str,
        _metric_definition: &str,
        _resource_name: &str,
        _metric_namespace: &str,
    ) -> BackendResult<Vec<MetricFindValue>> {
        self.lookup(QueryType::AzureMonitor, "get_metric_names")
    }

    async fn get_metric_metadata(
        &self,
        _subscription_id: &str,
        _resource_group: &str,
        _metric_definition: &str,
        _resource_name: &str,
        _metric_namespace: &str,
        _metric_name: &str,
    ) -> BackendResult<MetricMetadata> {
        let dimensions = self.lookup(QueryType::AzureMonitor, "get_metric_metadata")?;
        Ok(MetricMetadata {
            primary_agg_type: "Average".to_string(),
            supported_agg_types: vec!["Average".to_string(), "Maximum".to_string()],
            supported_time_grains: vec![TimeGrain {
                text: "1 minute".to_string(),
                value: "PT1M".to_string(),
            }],
            dimensions,
        })
    }

    async fn get_workspaces(&self, _subscription_id: &str) -> BackendResult<Vec<Workspace>> {
        let values = self.lookup(QueryType::AzureLogAnalytics, "get_workspaces")?;
        Ok(values
            .into_iter()
            .map(|v| {
                let id = v.value.unwrap_or_else(|| v.text.clone());
                Workspace {
                    customer_id: id.clone(),
                    id,
                    name: v.text,
                }
            })
            .collect())
    }

    async fn get_app_insights_metric_names(&self) -> BackendResult<Vec<MetricFindValue>> {
        self.lookup(QueryType::ApplicationInsights, "get_app_insights_metric_names")
    }

    async fn get_app_insights_metric_metadata(
        &self,
        _metric_name: &str,
    ) -> BackendResult<AppInsightsMetricMetadata> {
        let values = self.lookup(
            QueryType::ApplicationInsights,
            "get_app_insights_metric_metadata",
        )?;
        Ok(AppInsightsMetricMetadata {
            primary_agg_type: "avg".to_string(),
            supported_agg_types: vec!["avg".to_string(), "sum".to_string()],
            supported_group_by: Self::texts(&values),
        })
    }

    async fn get_app_insights_columns(&self, _ref_id: &str) -> BackendResult<Vec<String>> {
        let values = self.lookup(QueryType::ApplicationInsights, "get_app_insights_columns")?;
        Ok(Self::texts(&values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Batch, ExecutionContext, Query, TimeRange};
    use chrono::Duration as ChronoDuration;

    fn partition(query_type: QueryType, ref_ids: &[&str]) -> Partition {
        let batch = Batch::new(
            ExecutionContext::new(TimeRange::last(ChronoDuration::hours(1))),
            Vec::new(),
        );
        let mut partition = Partition::new(query_type, batch.context.clone());
        partition.queries = ref_ids.iter().map(|r| Query::new(*r, query_type)).collect();
        partition
    }

    #[tokio::test]
    async fn echoes_one_frame_per_query() {
        let backend = MockBackend::new(QueryType::AzureMonitor);
        let response = backend
            .execute(partition(QueryType::AzureMonitor, &["A", "B"]))
            .first()
            .await
            .unwrap();

        assert_eq!(response.ref_ids(), vec!["A", "B"]);
        assert_eq!(response.data[0].name, "Azure Monitor/A");
        assert_eq!(backend.executions(), 1);
        assert_eq!(backend.partitions()[0].ref_ids(), vec!["A", "B"]);
    }

    #[tokio::test]
    async fn deferred_answers_with_first_scripted_emission_only() {
        let backend = MockBackend::new(QueryType::ApplicationInsights)
            .emit(QueryResponse::empty().with_key("first"))
            .emit(QueryResponse::empty().with_key("second"));
        let partition = partition(QueryType::ApplicationInsights, &["A"]);

        for _ in 0..2 {
            let response = backend.execute(partition.clone()).first().await.unwrap();
            assert_eq!(response.key.as_deref(), Some("first"));
        }
        assert_eq!(backend.executions(), 2);
    }

    #[tokio::test]
    async fn unscripted_live_backend_echoes_once() {
        let backend = MockBackend::new(QueryType::AzureMonitor).live();
        let emissions: Vec<_> = backend
            .execute(partition(QueryType::AzureMonitor, &["A", "B"]))
            .into_stream()
            .collect()
            .await;
        assert_eq!(emissions.len(), 1);
        assert_eq!(emissions[0].as_ref().unwrap().ref_ids(), vec!["A", "B"]);
    }

    #[tokio::test]
    async fn scripted_failure_is_transport_error() {
        let backend = MockBackend::new(QueryType::ApplicationInsights).fail("boom");
        let err = backend
            .execute(partition(QueryType::ApplicationInsights, &["A"]))
            .first()
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Transport error: boom");
    }

    #[tokio::test]
    async fn live_script_emits_in_order() {
        let backend = MockBackend::new(QueryType::AzureLogAnalytics)
            .live()
            .emit(QueryResponse::empty().with_key("1"))
            .emit(QueryResponse::empty().with_key("2"));

        let completion = backend.execute(partition(QueryType::AzureLogAnalytics, &["A"]));
        assert!(completion.is_live());
        let keys: Vec<_> = completion
            .into_stream()
            .map(|r| r.unwrap().key.unwrap())
            .collect()
            .await;
        assert_eq!(keys, vec!["1", "2"]);
    }

    #[tokio::test]
    async fn feed_pushes_into_open_stream() {
        let (backend, feed) = MockBackend::with_feed(QueryType::AzureMonitor);
        let mut stream = backend
            .execute(partition(QueryType::AzureMonitor, &["A"]))
            .into_stream();

        assert!(feed.push(QueryResponse::empty().with_key("first")));
        assert_eq!(
            stream.next().await.unwrap().unwrap().key.as_deref(),
            Some("first")
        );
        assert!(feed.fail("lost"));
        assert!(stream.next().await.unwrap().is_err());
    }

    #[tokio::test]
    async fn lookups_outside_owned_type_are_not_supported() {
        let backend = MockBackend::new(QueryType::AzureLogAnalytics)
            .metadata(vec![MetricFindValue::new("ws-1", "guid-1")]);

        assert!(matches!(
            backend.get_subscriptions().await,
            Err(BackendError::NotSupported(_))
        ));
        let workspaces = backend.get_workspaces("sub").await.unwrap();
        assert_eq!(workspaces[0].customer_id, "guid-1");
        assert_eq!(backend.metadata_calls(), 2);
    }
}
