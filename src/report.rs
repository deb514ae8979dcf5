use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

use crate::config::StalenessThresholds;

/// DORA performance level, shared by all metric blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DoraLevel {
    Elite,
    High,
    Medium,
    Low,
    Unknown,
}

impl DoraLevel {
    pub fn score(self) -> Option<f64> {
        match self {
            Self::Elite => Some(4.0),
            Self::High => Some(3.0),
            Self::Medium => Some(2.0),
            Self::Low => Some(1.0),
            Self::Unknown => None,
        }
    }

    pub fn for_deployment_frequency(per_day: f64, per_week: f64, per_month: f64) -> Self {
        if per_day >= 1.0 {
            Self::Elite
        } else if per_week >= 1.0 {
            Self::High
        } else if per_month >= 1.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn for_failure_rate(rate_percent: f64) -> Self {
        if rate_percent < 15.0 {
            Self::Elite
        } else if rate_percent < 30.0 {
            Self::High
        } else if rate_percent < 45.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn for_mttr_hours(hours: f64) -> Self {
        if hours < 1.0 {
            Self::Elite
        } else if hours < 24.0 {
            Self::High
        } else if hours < 168.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn describe_deployment_frequency(self) -> &'static str {
        match self {
            Self::Elite => "Multiple deploys per day",
            Self::High => "Between once per day and once per week",
            Self::Medium => "Between once per week and once per month",
            Self::Low => "Fewer than once per month",
            Self::Unknown => "Unknown",
        }
    }

    pub fn describe_failure_rate(self) -> &'static str {
        match self {
            Self::Elite => "< 15%",
            Self::High => "15-30%",
            Self::Medium => "30-45%",
            Self::Low => "> 45%",
            Self::Unknown => "Unknown",
        }
    }

    pub fn describe_mttr(self) -> &'static str {
        match self {
            Self::Elite => "< 1 hour",
            Self::High => "< 1 day",
            Self::Medium => "< 1 week",
            Self::Low => "> 1 week",
            Self::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeploymentFrequency {
    pub total_deployments: usize,
    pub deployments_per_day: f64,
    pub deployments_per_week: f64,
    pub deployments_per_month: f64,
    pub dora_level: DoraLevel,
    pub dora_description: &'static str,
    /// Deployments per application over the window.
    pub app_breakdown: BTreeMap<String, usize>,
    /// Deployments per calendar day, keyed YYYY-MM-DD.
    pub daily_breakdown: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeadTimeForChanges {
    pub dora_level: DoraLevel,
    pub note: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChangeFailureRate {
    pub total_deployments: usize,
    pub failed_deployments: usize,
    pub change_failure_rate: f64,
    pub dora_level: DoraLevel,
    pub dora_description: &'static str,
    /// Per-app failure rate, only for apps with at least one deployment.
    pub app_breakdown: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MeanTimeToRecovery {
    pub avg_mttr_hours: f64,
    pub avg_mttr_minutes: f64,
    pub median_mttr_hours: f64,
    pub incidents_recovered: usize,
    pub dora_level: DoraLevel,
    pub dora_description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<&'static str>,
    /// Per-app mean recovery time, only for apps with recoveries.
    pub app_breakdown: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OverallPerformance {
    pub dora_level: DoraLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_score: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DoraMetrics {
    pub deployment_frequency: DeploymentFrequency,
    pub lead_time_for_changes: LeadTimeForChanges,
    pub change_failure_rate: ChangeFailureRate,
    pub mean_time_to_recovery: MeanTimeToRecovery,
    pub overall: OverallPerformance,
}

#[derive(Debug, Clone, Serialize)]
pub struct StuckApp {
    pub app_name: String,
    pub namespace: String,
    pub minutes_stuck: i64,
    pub sync_status: String,
    pub health_status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StuckSyncReport {
    pub total_stuck: usize,
    pub threshold_minutes: i64,
    pub apps: Vec<StuckApp>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StalenessEntry {
    pub app_name: String,
    pub namespace: String,
    pub days_since_deploy: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_deployed: Option<DateTime<Utc>>,
    pub sync_status: String,
    pub health_status: String,
    pub auto_sync_enabled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct StalenessReport {
    pub stable_apps: Vec<StalenessEntry>,
    pub stale_apps: Vec<StalenessEntry>,
    pub active_apps: Vec<StalenessEntry>,
    pub recent_apps: Vec<StalenessEntry>,
    pub thresholds: StalenessThresholds,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlowSyncApp {
    pub app_name: String,
    pub avg_seconds: f64,
    pub max_seconds: f64,
    pub sync_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncPerformance {
    pub avg_sync_seconds: f64,
    pub median_sync_seconds: f64,
    pub p95_sync_seconds: f64,
    pub p99_sync_seconds: f64,
    pub total_syncs: usize,
    pub slowest_apps: Vec<SlowSyncApp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NamespaceMetrics {
    pub app_count: usize,
    pub total_deployments: usize,
    pub failed_deployments: usize,
    pub failure_rate: f64,
    pub avg_mttr_hours: f64,
    pub dora_level: DoraLevel,
}

#[derive(Debug, Clone, Serialize)]
pub struct NamespaceBreakdown {
    pub total_namespaces: usize,
    /// Sorted by deployment count, busiest first.
    pub namespaces: IndexMap<String, NamespaceMetrics>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartRecord {
    pub app_name: String,
    pub namespace: String,
    pub chart_name: String,
    pub chart_version: String,
    pub repo_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartVersionGroup {
    pub count: usize,
    pub is_latest: bool,
    pub apps: Vec<ChartRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartSummary {
    pub latest_version: String,
    pub total_apps: usize,
    pub apps_on_latest: usize,
    pub apps_outdated: usize,
    pub versions: IndexMap<String, ChartVersionGroup>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutdatedApp {
    pub app_name: String,
    pub namespace: String,
    pub chart_name: String,
    pub current_version: String,
    pub latest_version: String,
    pub repo_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartCompliance {
    pub total_helm_apps: usize,
    pub total_git_apps: usize,
    pub total_charts: usize,
    pub apps_on_latest: usize,
    pub apps_outdated: usize,
    pub charts: IndexMap<String, ChartSummary>,
    /// Sorted by (chart_name, app_name).
    pub outdated_apps: Vec<OutdatedApp>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OperationalInsights {
    pub stuck_syncs: StuckSyncReport,
    pub staleness_analysis: StalenessReport,
    pub sync_performance: SyncPerformance,
    pub namespace_breakdown: NamespaceBreakdown,
    pub chart_compliance: ChartCompliance,
}

/// Complete per-run report: four DORA metric blocks plus the
/// operational insight blocks, fully computed with no further I/O
/// required to render it.
#[derive(Debug, Clone, Serialize)]
pub struct FleetReport {
    pub cluster: String,
    pub time_period_days: i64,
    pub total_applications: usize,
    pub generated_at: DateTime<Utc>,
    pub generation_time_seconds: f64,
    pub api_calls_made: u64,
    pub metrics: DoraMetrics,
    pub operational_insights: OperationalInsights,
}
