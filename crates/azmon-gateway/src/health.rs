//! Health aggregation across configured backends

use std::sync::Arc;

use azmon_core::routing::HEALTH_ORDER;
use azmon_core::{CompositeHealth, HealthState, HealthStatus, QueryBackend, QueryType};
use futures::future;
use tracing::{debug, warn};

use crate::gateway::BackendTable;

/// Message reported when no backend is configured
pub const NOTHING_CONFIGURED: &str =
    "Nothing configured. At least one of the API's must be configured.";

/// Test every configured backend concurrently and reduce the statuses.
///
/// A failing check never stops the others; its error is folded into an
/// error status. With nothing configured no backend is called.
pub(crate) async fn check_health(backends: &BackendTable) -> CompositeHealth {
    let configured: Vec<(QueryType, Arc<dyn QueryBackend>)> = HEALTH_ORDER
        .into_iter()
        .filter_map(|t| backends.configured(t).map(|b| (t, Arc::clone(b))))
        .collect();

    if configured.is_empty() {
        warn!("No backend configured, skipping connectivity checks");
        return CompositeHealth {
            status: HealthState::Error,
            message: NOTHING_CONFIGURED.to_string(),
            title: HealthState::Error.title(),
        };
    }

    let checks = configured.iter().map(|(query_type, backend)| async move {
        match backend.test_connectivity().await {
            Ok(status) => {
                debug!(query_type = %query_type, status = %status.status, "Connectivity check finished");
                status
            }
            Err(e) => {
                warn!(query_type = %query_type, error = %e, "Connectivity check failed");
                HealthStatus::error(e.to_string())
            }
        }
    });

    let statuses = future::join_all(checks).await;
    reduce(&statuses)
}

/// Reduce individual statuses, in check order, to one composite status.
///
/// The composite is `success` only if every check succeeded; otherwise it
/// takes the status of the last failing check. The message numbers each
/// check's message from 1, each entry followed by a space.
pub fn reduce(statuses: &[HealthStatus]) -> CompositeHealth {
    let mut status = HealthState::Success;
    let mut message = String::new();

    for (i, check) in statuses.iter().enumerate() {
        if !check.status.is_success() {
            status = check.status;
        }
        message.push_str(&format!("{}. {} ", i + 1, check.message));
    }

    CompositeHealth {
        status,
        message,
        title: status.title(),
    }
}
