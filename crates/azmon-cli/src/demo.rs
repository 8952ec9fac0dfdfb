//! Demo backends
//!
//! The CLI runs against in-memory backends that echo one frame per query.
//! Which of them count as configured comes from the settings file, so
//! routing, skipping and health behave as they would against the real APIs.

use std::sync::Arc;

use azmon_core::testing::MockBackend;
use azmon_core::{DatasourceSettings, MetricFindValue, QueryType};
use azmon_gateway::MonitorGateway;

/// Build a gateway with one demo backend per query type
pub fn gateway(settings: &DatasourceSettings) -> MonitorGateway {
    let mut gateway = MonitorGateway::new("Azure Monitor");
    for query_type in QueryType::ALL {
        gateway.register_backend(Arc::new(backend(query_type, settings)));
    }
    gateway
}

fn backend(query_type: QueryType, settings: &DatasourceSettings) -> MockBackend {
    let backend = match query_type {
        QueryType::ApplicationInsights => MockBackend::new(query_type)
            .metadata(vec![
                MetricFindValue::text("requests/count"),
                MetricFindValue::text("requests/duration"),
                MetricFindValue::text("exceptions/count"),
            ]),
        QueryType::AzureMonitor => {
            let subscription = settings
                .azure_monitor
                .as_ref()
                .map(|s| s.subscription_id.clone())
                .unwrap_or_default();
            MockBackend::new(query_type)
                .live()
                .find_result(vec![MetricFindValue::new("default", subscription.clone())])
                .metadata(vec![MetricFindValue::new("default", subscription)])
        }
        QueryType::AzureLogAnalytics => {
            let workspace = settings
                .log_analytics
                .as_ref()
                .and_then(|s| s.default_workspace.clone())
                .unwrap_or_default();
            MockBackend::new(query_type)
                .live()
                .metadata(vec![MetricFindValue::new("default", workspace)])
        }
    };

    if settings.is_configured(query_type) {
        backend
    } else {
        backend.unconfigured()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn only_configured_sections_are_configured() {
        let settings = DatasourceSettings::from_toml_str(
            r#"
            [azure_monitor]
            subscription_id = "sub-1"

            [log_analytics]
            same_as_azure_monitor = true
            default_workspace = "ws-1"
            "#,
        )
        .unwrap();

        let gateway = gateway(&settings);
        assert_eq!(gateway.backend_types().len(), 3);
        assert_eq!(
            gateway.configured_types(),
            vec![QueryType::AzureMonitor, QueryType::AzureLogAnalytics]
        );
    }

    #[test]
    fn empty_settings_configure_nothing() {
        let gateway = gateway(&DatasourceSettings::default());
        assert!(gateway.configured_types().is_empty());
    }
}
