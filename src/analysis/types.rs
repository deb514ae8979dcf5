use chrono::{DateTime, Duration, Utc};

use crate::providers::argocd::types::Application;

/// Identity of one application for the duration of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationRef {
    pub name: String,
    pub namespace: String,
    pub project: String,
}

impl From<&Application> for ApplicationRef {
    fn from(app: &Application) -> Self {
        Self {
            name: app
                .metadata
                .name
                .clone()
                .unwrap_or_else(|| "unknown".to_string()),
            namespace: app
                .metadata
                .namespace
                .clone()
                .unwrap_or_else(|| "default".to_string()),
            project: app
                .spec
                .project
                .clone()
                .unwrap_or_else(|| "default".to_string()),
        }
    }
}

/// The run's analysis window, fixed once. Every timestamp comparison in
/// the classifier uses this single window; `end` doubles as the run's
/// "now" for the stuck and staleness checks.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub days: i64,
}

impl AnalysisWindow {
    pub fn last_days(days: i64) -> Self {
        let end = Utc::now();
        Self::ending_at(end, days)
    }

    pub fn ending_at(end: DateTime<Utc>, days: i64) -> Self {
        Self {
            start: end - Duration::days(days),
            end,
            days,
        }
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.start && ts <= self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationPhase {
    Succeeded,
    Failed,
    Error,
    Running,
    Progressing,
    Unknown,
}

impl OperationPhase {
    pub fn parse(phase: Option<&str>) -> Self {
        match phase {
            Some("Succeeded") => Self::Succeeded,
            Some("Failed") => Self::Failed,
            Some("Error") => Self::Error,
            Some("Running") => Self::Running,
            Some("Progressing") => Self::Progressing,
            _ => Self::Unknown,
        }
    }

    pub fn is_failure(self) -> bool {
        matches!(self, Self::Failed | Self::Error)
    }

    pub fn is_in_progress(self) -> bool {
        matches!(self, Self::Running | Self::Progressing)
    }
}

/// One classified deployment inside the analysis window.
#[derive(Debug, Clone)]
pub struct DeploymentEvent {
    pub revision: String,
    pub deployed_at: DateTime<Utc>,
    pub phase: OperationPhase,
    pub sync_duration_seconds: Option<f64>,
    pub is_failure: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StalenessCategory {
    Recent,
    Active,
    Stable,
    Stale,
}

#[derive(Debug, Clone)]
pub struct StalenessAssessment {
    pub days_since_deploy: i64,
    pub last_deployed: Option<DateTime<Utc>>,
    pub sync_status: String,
    pub health_status: String,
    pub auto_sync_enabled: bool,
    pub category: StalenessCategory,
    pub is_problematic: bool,
}

impl StalenessAssessment {
    /// Neutral assessment for applications whose live status is missing.
    pub fn neutral() -> Self {
        Self {
            days_since_deploy: 0,
            last_deployed: None,
            sync_status: "Unknown".to_string(),
            health_status: "Unknown".to_string(),
            auto_sync_enabled: false,
            category: StalenessCategory::Recent,
            is_problematic: false,
        }
    }
}

/// Everything the aggregators need about one application, produced once
/// by the dispatcher and read-only afterwards.
#[derive(Debug, Clone)]
pub struct AppProcessingResult {
    pub app: ApplicationRef,
    /// True when the detail fetch failed; collections are empty and the
    /// app contributes nothing to the aggregate sums, but it still
    /// counts against the fleet size.
    pub error: bool,
    pub deployments: Vec<DeploymentEvent>,
    pub recovery_hours: Vec<f64>,
    pub sync_durations: Vec<f64>,
    pub sync_status: String,
    pub health_status: String,
    pub stuck_in_sync: bool,
    pub stuck_minutes: i64,
    pub staleness: StalenessAssessment,
}

impl AppProcessingResult {
    pub fn error_marker(app: ApplicationRef) -> Self {
        Self {
            app,
            error: true,
            deployments: Vec::new(),
            recovery_hours: Vec::new(),
            sync_durations: Vec::new(),
            sync_status: "Unknown".to_string(),
            health_status: "Unknown".to_string(),
            stuck_in_sync: false,
            stuck_minutes: 0,
            staleness: StalenessAssessment::neutral(),
        }
    }

    pub fn failed_deployments(&self) -> usize {
        self.deployments.iter().filter(|d| d.is_failure).count()
    }
}
