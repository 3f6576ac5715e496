//! Multi-destination publish cycle.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use catalog::CatalogConfig;
use serde::{Deserialize, Serialize};
use tablestore::TableStore;
use tracing::{info, warn};

use crate::error::{PublishError, Result};
use crate::sink::CatalogSink;

/// Which sinks a publish cycle drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PublishTarget {
    PrimaryOnly,
    #[default]
    All,
    SecondaryOnly,
}

impl FromStr for PublishTarget {
    type Err = PublishError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "primary_only" | "primary" => Ok(Self::PrimaryOnly),
            "all" | "" => Ok(Self::All),
            "secondary_only" | "secondary" => Ok(Self::SecondaryOnly),
            other => Err(PublishError::Config {
                reason: format!("unknown publish target: {other}"),
            }),
        }
    }
}

/// Best-effort refresh of caches that depend on the published catalog.
#[async_trait]
pub trait DependentRefresh: Send + Sync {
    async fn refresh(&self) -> std::result::Result<(), String>;
}

/// Verdict for one sink within a cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SinkOutcome {
    pub sink: String,
    pub ok: bool,
    pub message: String,
}

/// Structured result of one publish cycle, one entry per attempted sink,
/// so operators can tell fully degraded from fully healthy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishReport {
    pub success: bool,
    pub sinks: Vec<SinkOutcome>,
}

pub struct PublishPipeline {
    store: Arc<dyn TableStore>,
    catalog_config: CatalogConfig,
    primary: Arc<dyn CatalogSink>,
    secondaries: Vec<Arc<dyn CatalogSink>>,
    target: PublishTarget,
    refresh: Option<Arc<dyn DependentRefresh>>,
    snapshot_name: String,
}

impl PublishPipeline {
    pub fn new(
        store: Arc<dyn TableStore>,
        catalog_config: CatalogConfig,
        primary: Arc<dyn CatalogSink>,
        snapshot_name: impl Into<String>,
    ) -> Self {
        Self {
            store,
            catalog_config,
            primary,
            secondaries: Vec::new(),
            target: PublishTarget::default(),
            refresh: None,
            snapshot_name: snapshot_name.into(),
        }
    }

    pub fn with_secondary(mut self, sink: Arc<dyn CatalogSink>) -> Self {
        self.secondaries.push(sink);
        self
    }

    pub fn with_target(mut self, target: PublishTarget) -> Self {
        self.target = target;
        self
    }

    pub fn with_refresh(mut self, refresh: Arc<dyn DependentRefresh>) -> Self {
        self.refresh = Some(refresh);
        self
    }

    /// Runs one cycle: one snapshot, primary first, then every enabled
    /// secondary with per-sink failure capture.
    #[tracing::instrument(skip(self), fields(target = ?self.target))]
    pub async fn publish(&self) -> Result<PublishReport> {
        let started = std::time::Instant::now();

        // Exactly one snapshot per cycle, shared by all sinks.
        let snapshot = catalog::build_catalog(self.store.as_ref(), &self.catalog_config).await?;
        let payload = serde_json::to_value(&snapshot)?;

        let mut outcomes: Vec<SinkOutcome> = Vec::new();

        // With SecondaryOnly the primary is not attempted and counts as
        // vacuously healthy for the verdict.
        if self.target != PublishTarget::SecondaryOnly {
            if let Err(err) = self.primary.upload(&self.snapshot_name, &payload).await {
                metrics::counter!("publish_primary_failures_total").increment(1);
                return Err(PublishError::Primary {
                    sink: self.primary.name().to_string(),
                    message: err.message,
                });
            }
            outcomes.push(SinkOutcome {
                sink: self.primary.name().to_string(),
                ok: true,
                message: String::new(),
            });
        }

        let mut any_secondary_ok = false;
        let mut secondaries_enabled = false;
        if self.target != PublishTarget::PrimaryOnly {
            for sink in &self.secondaries {
                secondaries_enabled = true;
                match sink.upload(&self.snapshot_name, &payload).await {
                    Ok(()) => {
                        any_secondary_ok = true;
                        outcomes.push(SinkOutcome {
                            sink: sink.name().to_string(),
                            ok: true,
                            message: String::new(),
                        });
                    }
                    Err(err) => {
                        warn!(sink = sink.name(), error = %err, "Secondary sink failed, continuing");
                        metrics::counter!("publish_secondary_failures_total").increment(1);
                        outcomes.push(SinkOutcome {
                            sink: sink.name().to_string(),
                            ok: false,
                            message: err.message,
                        });
                    }
                }
            }
        }

        if let Some(refresh) = &self.refresh
            && let Err(message) = refresh.refresh().await
        {
            warn!(error = %message, "Dependent cache refresh failed, outcome unaffected");
        }

        let success = !secondaries_enabled || any_secondary_ok;
        info!(success, sinks = outcomes.len(), "Publish cycle finished");
        metrics::counter!("publish_cycles_total").increment(1);
        metrics::histogram!("publish_cycle_duration_seconds").record(started.elapsed().as_secs_f64());
        Ok(PublishReport { success, sinks: outcomes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_parses_known_values() {
        assert_eq!("all".parse::<PublishTarget>().unwrap(), PublishTarget::All);
        assert_eq!(
            "PRIMARY_ONLY".parse::<PublishTarget>().unwrap(),
            PublishTarget::PrimaryOnly
        );
        assert_eq!(
            " secondary_only ".parse::<PublishTarget>().unwrap(),
            PublishTarget::SecondaryOnly
        );
        assert!("sideways".parse::<PublishTarget>().is_err());
    }
}
