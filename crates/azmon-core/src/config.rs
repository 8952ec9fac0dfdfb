//! Datasource settings
//!
//! Each backend reads its own section. A missing section, or a section
//! without the fields the backend needs, leaves that backend unconfigured.
//!
//! ```toml
//! [azure_monitor]
//! cloud = "azuremonitor"
//! tenant_id = "..."
//! client_id = "..."
//! subscription_id = "..."
//!
//! [app_insights]
//! app_id = "..."
//!
//! [log_analytics]
//! same_as_azure_monitor = true
//! default_workspace = "..."
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::models::QueryType;

/// Settings for all three backends
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasourceSettings {
    /// Resource metrics API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azure_monitor: Option<AzureMonitorSettings>,
    /// Application Insights API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_insights: Option<AppInsightsSettings>,
    /// Log Analytics API
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_analytics: Option<LogAnalyticsSettings>,
}

/// Resource metrics settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzureMonitorSettings {
    /// Azure cloud name
    #[serde(default = "default_cloud")]
    pub cloud: String,
    #[serde(default)]
    pub tenant_id: String,
    #[serde(default)]
    pub client_id: String,
    /// Default subscription
    #[serde(default)]
    pub subscription_id: String,
}

fn default_cloud() -> String {
    "azuremonitor".to_string()
}

/// Application Insights settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppInsightsSettings {
    #[serde(default)]
    pub app_id: String,
}

/// Log Analytics settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogAnalyticsSettings {
    #[serde(default)]
    pub subscription_id: String,
    /// Workspace used when a query names none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_workspace: Option<String>,
    /// Reuse the resource metrics credentials and subscription
    #[serde(default)]
    pub same_as_azure_monitor: bool,
}

impl AzureMonitorSettings {
    pub fn is_configured(&self) -> bool {
        !self.subscription_id.is_empty()
    }
}

impl AppInsightsSettings {
    pub fn is_configured(&self) -> bool {
        !self.app_id.is_empty()
    }
}

impl LogAnalyticsSettings {
    pub fn is_configured(&self) -> bool {
        !self.subscription_id.is_empty() || self.same_as_azure_monitor
    }
}

impl DatasourceSettings {
    /// Parse settings from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load settings from a TOML file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let settings = Self::from_toml_str(&content)?;
        debug!(
            path = %path.display(),
            configured = ?settings.configured_types(),
            "Loaded datasource settings"
        );
        Ok(settings)
    }

    /// Whether the settings for `query_type` are present
    pub fn is_configured(&self, query_type: QueryType) -> bool {
        match query_type {
            QueryType::AzureMonitor => self
                .azure_monitor
                .as_ref()
                .is_some_and(AzureMonitorSettings::is_configured),
            QueryType::ApplicationInsights => self
                .app_insights
                .as_ref()
                .is_some_and(AppInsightsSettings::is_configured),
            QueryType::AzureLogAnalytics => self
                .log_analytics
                .as_ref()
                .is_some_and(LogAnalyticsSettings::is_configured),
        }
    }

    /// Query types whose settings are present
    pub fn configured_types(&self) -> Vec<QueryType> {
        QueryType::ALL
            .into_iter()
            .filter(|t| self.is_configured(*t))
            .collect()
    }
}
