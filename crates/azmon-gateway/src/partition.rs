//! Batch partitioning by query type

use std::collections::BTreeMap;
use std::sync::Arc;

use azmon_core::{Batch, Partition, QueryType};
use tracing::trace;

/// Partitions of one batch, keyed by the backend they are routed to
pub type Partitions = BTreeMap<QueryType, Partition>;

/// Split a batch into one partition per recognised query type.
///
/// Queries keep their batch order within each partition. Queries whose tag
/// names no backend are left out. Every partition shares the batch's
/// execution context; the batch itself is only read.
pub fn partition(batch: &Batch) -> Partitions {
    let mut partitions = Partitions::new();

    for query in &batch.queries {
        match query.kind() {
            Some(query_type) => partitions
                .entry(query_type)
                .or_insert_with(|| Partition::new(query_type, Arc::clone(&batch.context)))
                .queries
                .push(query.clone()),
            None => {
                trace!(
                    ref_id = %query.ref_id,
                    query_type = %query.query_type,
                    "Skipping query with unrecognised type"
                );
            }
        }
    }

    partitions
}

#[cfg(test)]
mod tests {
    use super::*;
    use azmon_core::{ExecutionContext, Query, TimeRange};
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn batch(queries: Vec<Query>) -> Batch {
        Batch::new(
            ExecutionContext::new(TimeRange::last(Duration::hours(6))).with_interval("5m", 300_000),
            queries,
        )
    }

    #[test]
    fn groups_by_type_in_batch_order() {
        let batch = batch(vec![
            Query::new("A", QueryType::AzureMonitor),
            Query::new("B", QueryType::AzureLogAnalytics),
            Query::new("C", QueryType::AzureMonitor),
            Query::new("D", QueryType::ApplicationInsights),
            Query::new("E", QueryType::AzureLogAnalytics),
        ]);

        let partitions = partition(&batch);
        assert_eq!(partitions.len(), 3);
        assert_eq!(partitions[&QueryType::AzureMonitor].ref_ids(), vec!["A", "C"]);
        assert_eq!(partitions[&QueryType::AzureLogAnalytics].ref_ids(), vec!["B", "E"]);
        assert_eq!(partitions[&QueryType::ApplicationInsights].ref_ids(), vec!["D"]);
    }

    #[test]
    fn unrecognised_types_are_dropped() {
        let batch = batch(vec![
            Query::with_tag("A", "Insights Analytics"),
            Query::new("B", QueryType::AzureMonitor),
            Query::with_tag("C", ""),
        ]);

        let partitions = partition(&batch);
        assert_eq!(partitions.len(), 1);
        assert_eq!(partitions[&QueryType::AzureMonitor].ref_ids(), vec!["B"]);
    }

    #[test]
    fn partition_key_is_query_kind() {
        let batch = batch(vec![
            Query::with_tag("A", "Azure Log Analytics"),
            Query::with_tag("B", "azure log analytics"),
            Query::with_tag("C", "Application Insights"),
        ]);

        let partitions = partition(&batch);
        for (query_type, p) in &partitions {
            assert!(p.queries.iter().all(|q| q.kind() == Some(*query_type)));
            assert_eq!(p.query_type, *query_type);
        }
        assert_eq!(partitions[&QueryType::AzureLogAnalytics].ref_ids(), vec!["A"]);
        assert_eq!(partitions.len(), 2);
    }

    #[test]
    fn no_recognised_queries_gives_no_partitions() {
        assert!(partition(&batch(Vec::new())).is_empty());
        assert!(partition(&batch(vec![Query::with_tag("A", "Prometheus")])).is_empty());
    }

    #[test]
    fn union_of_partitions_equals_recognised_queries() {
        let queries = vec![
            Query::new("A", QueryType::ApplicationInsights).with_payload(
                "appInsights",
                serde_json::json!({ "metricName": "requests/count" }),
            ),
            Query::with_tag("B", "unknown"),
            Query::new("C", QueryType::AzureLogAnalytics),
            Query::new("D", QueryType::ApplicationInsights),
        ];
        let batch = batch(queries.clone());

        let mut routed: Vec<Query> = partition(&batch)
            .into_values()
            .flat_map(|p| p.queries)
            .collect();
        routed.sort_by(|a, b| a.ref_id.cmp(&b.ref_id));

        let expected: Vec<Query> = queries.into_iter().filter(|q| q.kind().is_some()).collect();
        assert_eq!(routed, expected);
    }

    #[test]
    fn batch_is_unchanged_and_context_is_shared() {
        let batch = batch(vec![
            Query::new("A", QueryType::AzureMonitor),
            Query::new("B", QueryType::AzureLogAnalytics),
        ]);
        let before = batch.queries.clone();

        let partitions = partition(&batch);

        assert_eq!(batch.queries, before);
        for p in partitions.values() {
            assert!(Arc::ptr_eq(&p.context, &batch.context));
            assert_eq!(p.context.interval, "5m");
        }
    }
}
