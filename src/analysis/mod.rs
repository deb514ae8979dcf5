pub mod charts;
pub mod classifier;
pub mod dispatcher;
pub mod insights;
pub mod metrics;
pub mod types;

use chrono::Utc;
use log::{info, warn};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::providers::ApplicationSource;
use crate::report::{FleetReport, OperationalInsights};

use self::types::AnalysisWindow;

/// Orchestrates one run: list the fleet, fan out fetch-and-classify
/// under the bounded worker pool, then fold the collected results into
/// the report. Fetches each application exactly once; every metric and
/// insight is a pure fold over the same collected set.
pub struct MetricsEngine<S> {
    source: S,
    config: EngineConfig,
    cluster: String,
}

impl<S: ApplicationSource> MetricsEngine<S> {
    pub fn new(source: S, config: EngineConfig, cluster: impl Into<String>) -> Self {
        Self {
            source,
            config,
            cluster: cluster.into(),
        }
    }

    pub async fn run(&self) -> Result<FleetReport> {
        info!(
            "Generating delivery metrics for cluster '{}' over the last {} days",
            self.cluster, self.config.days
        );

        let started = std::time::Instant::now();

        // A failed listing is fatal: there is nothing to fan out over.
        let apps = self.source.list_applications(&self.config.filter).await?;

        if apps.is_empty() {
            warn!("No applications matched; report will be empty");
        }

        let window = AnalysisWindow::last_days(self.config.days);

        let results =
            dispatcher::process_applications(&self.source, &apps, &window, &self.config).await;

        let metrics = metrics::aggregate_metrics(&results, &window);
        let operational_insights = OperationalInsights {
            stuck_syncs: insights::analyze_stuck_syncs(&results, &self.config),
            staleness_analysis: insights::analyze_staleness(&results, &self.config),
            sync_performance: insights::analyze_sync_performance(&results),
            namespace_breakdown: insights::analyze_by_namespace(&results),
            chart_compliance: charts::analyze_chart_compliance(&apps),
        };

        let report = FleetReport {
            cluster: self.cluster.clone(),
            time_period_days: self.config.days,
            total_applications: apps.len(),
            generated_at: Utc::now(),
            generation_time_seconds: started.elapsed().as_secs_f64(),
            api_calls_made: self.source.api_calls(),
            metrics,
            operational_insights,
        };

        info!(
            "Report for '{}' complete: {} applications, {} API calls in {:.1}s",
            self.cluster,
            report.total_applications,
            report.api_calls_made,
            report.generation_time_seconds
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppFilter;
    use crate::error::ArgoLensError;
    use crate::providers::argocd::types::{
        AppMetadata, AppSource, AppSpec, AppStatus, Application, HealthStatus, HistoryEntry,
        OperationState, SyncStatus,
    };
    use crate::report::DoraLevel;
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use std::collections::HashMap;

    struct StaticSource {
        listing: Vec<Application>,
        details: HashMap<String, Application>,
        fail_listing: bool,
    }

    #[async_trait]
    impl ApplicationSource for StaticSource {
        async fn list_applications(
            &self,
            _filter: &AppFilter,
        ) -> crate::error::Result<Vec<Application>> {
            if self.fail_listing {
                return Err(ArgoLensError::Api("listing unavailable".to_string()));
            }
            Ok(self.listing.clone())
        }

        async fn get_application_detail(&self, name: &str) -> crate::error::Result<Application> {
            self.details
                .get(name)
                .cloned()
                .ok_or_else(|| ArgoLensError::Api(format!("no detail for {name}")))
        }

        fn api_calls(&self) -> u64 {
            (self.listing.len() + 1) as u64
        }
    }

    fn ts(hours_ago: i64) -> String {
        (Utc::now() - Duration::hours(hours_ago)).to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
    }

    fn listed(name: &str, chart: Option<&str>, version: &str) -> Application {
        Application {
            metadata: AppMetadata {
                name: Some(name.to_string()),
                namespace: Some("prod".to_string()),
            },
            spec: AppSpec {
                project: Some("default".to_string()),
                source: Some(AppSource {
                    repo_url: Some("https://example.com".to_string()),
                    chart: chart.map(String::from),
                    target_revision: Some(version.to_string()),
                    path: None,
                }),
                sync_policy: None,
            },
            status: None,
        }
    }

    fn detail(name: &str, entries: Vec<(&str, i64)>) -> Application {
        let history = entries
            .into_iter()
            .map(|(phase, hours_ago)| HistoryEntry {
                revision: Some("r".to_string()),
                deployed_at: Some(ts(hours_ago)),
                operation_state: Some(OperationState {
                    phase: Some(phase.to_string()),
                    started_at: None,
                    finished_at: None,
                }),
                sync_result: None,
            })
            .collect();

        Application {
            metadata: AppMetadata {
                name: Some(name.to_string()),
                namespace: Some("prod".to_string()),
            },
            spec: AppSpec::default(),
            status: Some(AppStatus {
                history,
                sync: Some(SyncStatus {
                    status: Some("Synced".to_string()),
                }),
                health: Some(HealthStatus {
                    status: Some("Healthy".to_string()),
                }),
                operation_state: None,
            }),
        }
    }

    #[tokio::test]
    async fn test_run_produces_complete_report() {
        let listing = vec![
            listed("a", Some("redis"), "1.9.0"),
            listed("b", Some("redis"), "1.10.0"),
            listed("c", None, "main"),
        ];
        let mut details = HashMap::new();
        // Oldest first: a failure 30h ago recovered 24h ago.
        details.insert(
            "a".to_string(),
            detail("a", vec![("Failed", 30), ("Succeeded", 24), ("Succeeded", 2)]),
        );
        details.insert("b".to_string(), detail("b", vec![("Succeeded", 10)]));
        details.insert("c".to_string(), detail("c", vec![("Succeeded", 5)]));

        let engine = MetricsEngine::new(
            StaticSource {
                listing,
                details,
                fail_listing: false,
            },
            EngineConfig::default(),
            "production",
        );

        let report = engine.run().await.unwrap();

        assert_eq!(report.cluster, "production");
        assert_eq!(report.total_applications, 3);
        assert_eq!(report.metrics.deployment_frequency.total_deployments, 5);
        assert_eq!(report.metrics.change_failure_rate.failed_deployments, 1);
        assert_eq!(report.metrics.mean_time_to_recovery.incidents_recovered, 1);
        assert!(
            (report.metrics.mean_time_to_recovery.avg_mttr_hours - 6.0).abs() < 0.01,
            "expected ~6h recovery"
        );
        assert_eq!(
            report.metrics.lead_time_for_changes.dora_level,
            DoraLevel::Unknown
        );

        let compliance = &report.operational_insights.chart_compliance;
        assert_eq!(compliance.total_helm_apps, 2);
        assert_eq!(compliance.total_git_apps, 1);
        assert_eq!(compliance.outdated_apps.len(), 1);
        assert_eq!(compliance.outdated_apps[0].app_name, "a");
    }

    #[tokio::test]
    async fn test_run_survives_missing_detail() {
        let listing = vec![listed("a", None, "main"), listed("ghost", None, "main")];
        let mut details = HashMap::new();
        details.insert("a".to_string(), detail("a", vec![("Succeeded", 5)]));

        let engine = MetricsEngine::new(
            StaticSource {
                listing,
                details,
                fail_listing: false,
            },
            EngineConfig::default(),
            "staging",
        );

        let report = engine.run().await.unwrap();

        // The broken app still counts against the fleet size but adds
        // no events.
        assert_eq!(report.total_applications, 2);
        assert_eq!(report.metrics.deployment_frequency.total_deployments, 1);
    }

    #[tokio::test]
    async fn test_run_fails_when_listing_fails() {
        let engine = MetricsEngine::new(
            StaticSource {
                listing: Vec::new(),
                details: HashMap::new(),
                fail_listing: true,
            },
            EngineConfig::default(),
            "production",
        );

        assert!(engine.run().await.is_err());
    }

    #[tokio::test]
    async fn test_run_with_empty_fleet_is_not_an_error() {
        let engine = MetricsEngine::new(
            StaticSource {
                listing: Vec::new(),
                details: HashMap::new(),
                fail_listing: false,
            },
            EngineConfig::default(),
            "production",
        );

        let report = engine.run().await.unwrap();

        assert_eq!(report.total_applications, 0);
        assert_eq!(report.metrics.deployment_frequency.total_deployments, 0);
        assert_eq!(
            report.metrics.mean_time_to_recovery.dora_level,
            DoraLevel::Unknown
        );
    }
}
