//! Monitor gateway - one datasource over three telemetry backends
//!
//! The gateway owns a table from query type to backend client. Adding a
//! backend means registering one more table entry; the dispatch, health and
//! metadata paths all look backends up through the table.

use std::collections::HashMap;
use std::sync::Arc;

use azmon_core::{Batch, CombinedResult, CompositeHealth, QueryBackend, QueryType};
use tracing::info;

use crate::{dispatch, health};

/// Query type → backend client
#[derive(Clone, Default)]
pub struct BackendTable {
    backends: HashMap<QueryType, Arc<dyn QueryBackend>>,
}

impl BackendTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a backend under its own query type, returning any backend it replaces
    pub fn insert(&mut self, backend: Arc<dyn QueryBackend>) -> Option<Arc<dyn QueryBackend>> {
        self.backends.insert(backend.query_type(), backend)
    }

    pub fn remove(&mut self, query_type: QueryType) -> Option<Arc<dyn QueryBackend>> {
        self.backends.remove(&query_type)
    }

    /// The backend registered for a query type
    pub fn get(&self, query_type: QueryType) -> Option<&Arc<dyn QueryBackend>> {
        self.backends.get(&query_type)
    }

    /// The backend for a query type, only if it reports itself configured
    pub fn configured(&self, query_type: QueryType) -> Option<&Arc<dyn QueryBackend>> {
        self.get(query_type).filter(|b| b.is_configured())
    }

    /// Registered query types, in declaration order
    pub fn types(&self) -> Vec<QueryType> {
        QueryType::ALL
            .into_iter()
            .filter(|t| self.backends.contains_key(t))
            .collect()
    }
}

/// Gateway that routes query batches, health checks and metadata lookups
/// to the backend owning each concern
///
/// - `run_queries` partitions a mixed batch and combines the backends' results
/// - `check_health` tests every configured backend in parallel
/// - metadata lookups are forwarded to their single owning backend
pub struct MonitorGateway {
    /// Datasource name, used in log fields
    name: String,
    /// Registered backends by query type
    pub(crate) backends: BackendTable,
}

impl MonitorGateway {
    /// Create a gateway with no backends
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            backends: BackendTable::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a backend for its query type, replacing any previous one
    pub fn register_backend(
        &mut self,
        backend: Arc<dyn QueryBackend>,
    ) -> Option<Arc<dyn QueryBackend>> {
        let query_type = backend.query_type();
        info!(
            datasource = %self.name,
            query_type = %query_type,
            configured = backend.is_configured(),
            "Registering backend with gateway"
        );
        self.backends.insert(backend)
    }

    /// Unregister the backend of a query type
    pub fn unregister_backend(&mut self, query_type: QueryType) -> Option<Arc<dyn QueryBackend>> {
        let removed = self.backends.remove(query_type);
        if removed.is_some() {
            info!(datasource = %self.name, query_type = %query_type, "Unregistered backend from gateway");
        }
        removed
    }

    /// Get the backend registered for a query type
    pub fn get_backend(&self, query_type: QueryType) -> Option<&Arc<dyn QueryBackend>> {
        self.backends.get(query_type)
    }

    /// Registered query types
    pub fn backend_types(&self) -> Vec<QueryType> {
        self.backends.types()
    }

    /// Registered query types whose backend is configured
    pub fn configured_types(&self) -> Vec<QueryType> {
        self.backends
            .types()
            .into_iter()
            .filter(|t| self.backends.configured(*t).is_some())
            .collect()
    }

    /// Run a mixed batch.
    ///
    /// Backends are invoked before this returns; awaiting or polling the
    /// result drives them. See [`dispatch::dispatch`] for how the result
    /// shape is chosen.
    pub fn run_queries(&self, batch: &Batch) -> CombinedResult {
        dispatch::dispatch(&self.backends, batch)
    }

    /// Test connectivity of every configured backend
    pub async fn check_health(&self) -> CompositeHealth {
        health::check_health(&self.backends).await
    }
}
