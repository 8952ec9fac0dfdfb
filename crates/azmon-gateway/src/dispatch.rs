//! Dispatch coordinator
//!
//! Invokes the backend of every non-empty partition and reconciles the two
//! completion shapes into one [`CombinedResult`]:
//!
//! ```text
//! backends invoked   result
//! ----------------   ------------------------------------------------
//!        0           empty response, already resolved
//!        1           that backend's completion, unchanged (live stays live)
//!       2+           deferred: first emission of each, joined fail-fast,
//!                    frames concatenated
//! ```
//!
//! With two or more backends, live backends contribute only their first
//! emission; later updates are dropped along with the stream.

use azmon_core::routing::DISPATCH_ORDER;
use azmon_core::{Batch, CombinedResult, Completion, QueryResponse, QueryType};
use futures::future;
use tracing::{debug, warn};

use crate::gateway::BackendTable;
use crate::partition::partition;

/// Partition `batch` and dispatch each partition to its backend.
///
/// Partitions whose backend is missing or unconfigured are skipped.
/// Backends are invoked in [`DISPATCH_ORDER`] before this returns.
pub fn dispatch(backends: &BackendTable, batch: &Batch) -> CombinedResult {
    let mut partitions = partition(batch);
    let mut invoked: Vec<(QueryType, Completion)> = Vec::with_capacity(partitions.len());

    for query_type in DISPATCH_ORDER {
        let Some(partition) = partitions.remove(&query_type) else {
            continue;
        };
        let Some(backend) = backends.configured(query_type) else {
            debug!(
                query_type = %query_type,
                ref_ids = ?partition.ref_ids(),
                "Backend not configured, skipping partition"
            );
            continue;
        };

        debug!(
            query_type = %query_type,
            queries = partition.len(),
            "Dispatching partition"
        );
        invoked.push((query_type, backend.execute(partition)));
    }

    if invoked.len() > 1 {
        return fan_in(invoked);
    }

    match invoked.pop() {
        Some((query_type, completion)) => {
            debug!(
                query_type = %query_type,
                live = completion.is_live(),
                "Single backend invoked, returning its completion"
            );
            completion
        }
        None => {
            debug!(queries = batch.len(), "No backend invoked, returning empty result");
            Completion::ready(QueryResponse::empty())
        }
    }
}

/// Join the first emission of every invoked backend.
///
/// All backends are polled concurrently. The first failure fails the whole
/// result and is returned unchanged; no frames from other backends survive.
fn fan_in(invoked: Vec<(QueryType, Completion)>) -> CombinedResult {
    debug!(
        backends = ?invoked.iter().map(|(t, _)| *t).collect::<Vec<_>>(),
        "Fanning in first emissions"
    );

    let firsts: Vec<_> = invoked
        .into_iter()
        .map(|(query_type, completion)| async move {
            completion.first().await.map_err(|e| {
                warn!(query_type = %query_type, error = %e, "Backend failed, failing batch");
                e
            })
        })
        .collect();

    Completion::deferred(async move {
        let responses = future::try_join_all(firsts).await?;
        Ok(QueryResponse::merge(responses))
    })
}
