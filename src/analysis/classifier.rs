use chrono::{DateTime, Utc};

use crate::config::EngineConfig;
use crate::providers::argocd::types::{Application, HistoryEntry, OperationState};

use super::types::{
    AnalysisWindow, AppProcessingResult, ApplicationRef, DeploymentEvent, OperationPhase,
    StalenessAssessment, StalenessCategory,
};

/// Classify one application's raw state into an `AppProcessingResult`.
///
/// Single pass over the history, which Argo CD returns oldest-first;
/// the failure-to-recovery pairing below depends on that direction.
/// A malformed timestamp skips that entry only, never the application.
pub fn classify_application(
    app_ref: ApplicationRef,
    app: &Application,
    window: &AnalysisWindow,
    config: &EngineConfig,
) -> AppProcessingResult {
    let Some(status) = app.status.as_ref() else {
        // No live status snapshot at all: produce a neutral result so
        // the fleet size still reconciles downstream.
        return AppProcessingResult {
            error: false,
            ..AppProcessingResult::error_marker(app_ref)
        };
    };

    let sync_status = status
        .sync
        .as_ref()
        .and_then(|s| s.status.clone())
        .unwrap_or_else(|| "Unknown".to_string());
    let health_status = status
        .health
        .as_ref()
        .and_then(|h| h.status.clone())
        .unwrap_or_else(|| "Unknown".to_string());

    let mut deployments = Vec::new();
    let mut recovery_hours = Vec::new();
    let mut sync_durations = Vec::new();

    // Time of the most recent deployment that failed and has not yet
    // been followed by a non-failure. Updated on every failure, so a
    // recovery is measured from the latest unresolved failure. Left
    // open at the end of the scan it is simply dropped.
    let mut open_failure: Option<DateTime<Utc>> = None;

    for entry in &status.history {
        let Some(deployed_at) = entry.deployed_at.as_deref().and_then(parse_timestamp) else {
            continue;
        };

        if !window.contains(deployed_at) {
            continue;
        }

        if let Some(duration) = sync_duration_seconds(entry, deployed_at) {
            sync_durations.push(duration);
        }

        let phase = OperationPhase::parse(
            entry
                .operation_state
                .as_ref()
                .and_then(|op| op.phase.as_deref()),
        );
        let is_failure = phase.is_failure() || has_failed_resources(entry);

        deployments.push(DeploymentEvent {
            revision: entry.revision.clone().unwrap_or_default(),
            deployed_at,
            phase,
            sync_duration_seconds: sync_duration_seconds(entry, deployed_at),
            is_failure,
        });

        if is_failure {
            open_failure = Some(deployed_at);
        } else if let Some(failed_at) = open_failure.take() {
            recovery_hours.push(hours_between(failed_at, deployed_at));
        }
    }

    let (stuck_in_sync, stuck_minutes) =
        check_stuck_sync(status.operation_state.as_ref(), window.end, config);

    let staleness = assess_staleness(app, &sync_status, &health_status, window.end, config);

    AppProcessingResult {
        app: app_ref,
        error: false,
        deployments,
        recovery_hours,
        sync_durations,
        sync_status,
        health_status,
        stuck_in_sync,
        stuck_minutes,
        staleness,
    }
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn hours_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_seconds() as f64 / 3600.0
}

/// Operation duration in seconds, recorded only when positive. A
/// missing finish time falls back to the deployment timestamp.
fn sync_duration_seconds(entry: &HistoryEntry, deployed_at: DateTime<Utc>) -> Option<f64> {
    let op = entry.operation_state.as_ref()?;
    let started = op.started_at.as_deref().and_then(parse_timestamp)?;
    let finished = op
        .finished_at
        .as_deref()
        .and_then(parse_timestamp)
        .unwrap_or(deployed_at);

    let seconds = (finished - started).num_seconds() as f64;
    (seconds > 0.0).then_some(seconds)
}

fn has_failed_resources(entry: &HistoryEntry) -> bool {
    entry.sync_result.as_ref().is_some_and(|sync_result| {
        sync_result
            .resources
            .iter()
            .any(|r| matches!(r.status.as_deref(), Some("Failed") | Some("Error")))
    })
}

/// A current operation still Running/Progressing past the configured
/// threshold is stuck, window or not.
fn check_stuck_sync(
    operation_state: Option<&OperationState>,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> (bool, i64) {
    let Some(op) = operation_state else {
        return (false, 0);
    };

    let phase = OperationPhase::parse(op.phase.as_deref());
    if !phase.is_in_progress() {
        return (false, 0);
    }

    let Some(started_at) = op.started_at.as_deref().and_then(parse_timestamp) else {
        return (false, 0);
    };

    let minutes_running = (now - started_at).num_minutes();
    if minutes_running > config.stuck_sync_threshold_minutes {
        (true, minutes_running)
    } else {
        (false, 0)
    }
}

fn assess_staleness(
    app: &Application,
    sync_status: &str,
    health_status: &str,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> StalenessAssessment {
    let auto_sync_enabled = app
        .spec
        .sync_policy
        .as_ref()
        .is_some_and(|p| p.automated.is_some());

    // History is oldest-first, so the last entry is the latest deploy.
    let last_deployed = app.status.as_ref().and_then(|status| {
        status
            .history
            .last()
            .and_then(|entry| entry.deployed_at.as_deref())
            .and_then(parse_timestamp)
    });

    let days_since_deploy = last_deployed.map_or(0, |ts| (now - ts).num_days());

    let synced_and_healthy = sync_status == "Synced" && health_status == "Healthy";
    let thresholds = &config.staleness;

    let (category, is_problematic) = if days_since_deploy >= thresholds.critical_days {
        if synced_and_healthy {
            (StalenessCategory::Stable, false)
        } else {
            (StalenessCategory::Stale, true)
        }
    } else if days_since_deploy >= thresholds.warning_days {
        if synced_and_healthy && auto_sync_enabled {
            (StalenessCategory::Stable, false)
        } else {
            (StalenessCategory::Stale, true)
        }
    } else if days_since_deploy >= thresholds.info_days {
        (StalenessCategory::Active, false)
    } else {
        (StalenessCategory::Recent, false)
    };

    StalenessAssessment {
        days_since_deploy,
        last_deployed,
        sync_status: sync_status.to_string(),
        health_status: health_status.to_string(),
        auto_sync_enabled,
        category,
        is_problematic,
    }
}
