//! azmon - Run mixed Azure Monitor query batches from the command line
//!
//! Queries, health checks and metadata finds go through the same gateway a
//! dashboard would use, backed by in-memory demo backends.

mod config;
mod demo;
mod output;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use azmon_core::{Batch, ExecutionContext, Query};
use azmon_gateway::MonitorGateway;
use clap::{Parser, Subcommand};
use futures::StreamExt;
use serde::Deserialize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::output::{BackendRow, Output, OutputFormat};

#[derive(Parser)]
#[command(name = "azmon")]
#[command(author, version, about = "Azure Monitor query router")]
#[command(propagate_version = true)]
struct Cli {
    /// Datasource settings file
    #[arg(short, long, env = "AZMON_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    output: OutputFormat,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Minimal output (for scripting)
    #[arg(short, long)]
    quiet: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a batch of queries from a JSON file
    Query {
        /// Batch file: execution context fields plus a `targets` array
        batch: PathBuf,

        /// Keep printing emissions until the result ends (Ctrl+C to stop)
        #[arg(short, long)]
        follow: bool,
    },

    /// Test connectivity of every configured backend
    Health,

    /// Answer a free-text metadata query
    Find {
        /// Query text, e.g. `ResourceGroups()`
        query: String,
    },

    /// List registered backends
    Backends,

    /// List subscriptions known to the resource metrics backend
    Subscriptions,

    /// List Log Analytics workspaces of a subscription
    Workspaces {
        /// Subscription ID
        subscription: String,
    },

    /// List Application Insights metric names
    AppInsightsMetrics,
}

/// A batch as stored on disk
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchFile {
    #[serde(flatten)]
    context: ExecutionContext,
    #[serde(default)]
    targets: Vec<Query>,
}

impl BatchFile {
    fn load(path: &Path) -> Result<Batch> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read batch file: {}", path.display()))?;
        let file: BatchFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse batch file: {}", path.display()))?;
        Ok(Batch::new(file.context, file.targets))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    let settings = match &cli.config {
        Some(path) => config::load_from(path)?,
        None => config::load()?,
    };

    let gateway = demo::gateway(&settings);
    let out = Output::new(cli.output, cli.no_color, cli.quiet);

    match &cli.command {
        Commands::Query { batch, follow } => {
            let batch = BatchFile::load(batch)?;
            run_query(&gateway, &batch, *follow, &out).await?;
        }

        Commands::Health => {
            let health = gateway.check_health().await;
            out.health(&health);
        }

        Commands::Find { query } => {
            let values = gateway
                .find_metadata(query)
                .await
                .context("Metadata query failed")?;
            out.values(&values);
        }

        Commands::Backends => {
            let configured = gateway.configured_types();
            let rows: Vec<BackendRow> = gateway
                .backend_types()
                .into_iter()
                .map(|t| BackendRow::new(t, configured.contains(&t)))
                .collect();
            out.backends(&rows);
        }

        Commands::Subscriptions => {
            let values = gateway
                .get_subscriptions()
                .await
                .context("Failed to list subscriptions")?;
            out.values(&values);
        }

        Commands::Workspaces { subscription } => {
            let workspaces = gateway
                .get_workspaces(subscription)
                .await
                .context("Failed to list workspaces")?;
            let values: Vec<_> = workspaces
                .into_iter()
                .map(|w| azmon_core::MetricFindValue::new(w.name, w.customer_id))
                .collect();
            out.values(&values);
        }

        Commands::AppInsightsMetrics => {
            let values = gateway
                .get_app_insights_metric_names()
                .await
                .context("Failed to list Application Insights metrics")?;
            out.values(&values);
        }
    }

    Ok(())
}

/// Run a batch and print its first emission, or every emission with `follow`
async fn run_query(
    gateway: &MonitorGateway,
    batch: &Batch,
    follow: bool,
    out: &Output,
) -> Result<()> {
    let result = gateway.run_queries(batch);

    if !follow {
        let response = result.first().await.context("Query failed")?;
        out.response(1, &response);
        return Ok(());
    }

    out.info("Following results, press Ctrl+C to stop");

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    let mut updates = result.into_stream();
    let mut emission = 0;

    while running.load(Ordering::SeqCst) {
        tokio::select! {
            update = updates.next() => {
                match update {
                    Some(Ok(response)) => {
                        emission += 1;
                        out.response(emission, &response);
                    }
                    Some(Err(e)) => {
                        out.error(&format!("Query failed: {}", e));
                        break;
                    }
                    None => {
                        out.info("Result ended");
                        break;
                    }
                }
            }
            _ = tokio::time::sleep(Duration::from_millis(100)) => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use azmon_core::{DatasourceSettings, QueryType};
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const BATCH: &str = r#"{
        "range": { "from": "2024-01-01T00:00:00Z", "to": "2024-01-01T01:00:00Z" },
        "interval": "1m",
        "intervalMs": 60000,
        "maxDataPoints": 500,
        "targets": [
            { "refId": "A", "queryType": "Application Insights", "appInsights": { "metricName": "requests/count" } },
            { "refId": "B", "queryType": "Azure Log Analytics", "azureLogAnalytics": { "query": "Heartbeat | take 5" } },
            { "refId": "C", "queryType": "Grafana" }
        ]
    }"#;

    fn batch_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(BATCH.as_bytes()).unwrap();
        file
    }

    #[test]
    fn batch_file_parses_context_and_targets() {
        let file = batch_file();
        let batch = BatchFile::load(file.path()).unwrap();

        assert_eq!(batch.len(), 3);
        assert_eq!(batch.context.interval_ms, 60000);
        assert_eq!(batch.context.max_data_points, Some(500));
        assert_eq!(batch.queries[0].kind(), Some(QueryType::ApplicationInsights));
        assert_eq!(batch.queries[2].kind(), None);
    }

    #[tokio::test]
    async fn demo_batch_runs_on_configured_backends_only() {
        let settings = DatasourceSettings::from_toml_str("[app_insights]\napp_id = \"c0ffee\"").unwrap();
        let gateway = demo::gateway(&settings);
        let file = batch_file();
        let batch = BatchFile::load(file.path()).unwrap();

        let response = gateway.run_queries(&batch).first().await.unwrap();
        assert_eq!(response.ref_ids(), vec!["A"]);
    }
}
