use std::collections::HashMap;

use indexmap::IndexMap;

use crate::config::EngineConfig;
use crate::report::{
    DoraLevel, NamespaceBreakdown, NamespaceMetrics, SlowSyncApp, StalenessEntry, StalenessReport,
    StuckApp, StuckSyncReport, SyncPerformance,
};

use super::types::{AppProcessingResult, StalenessCategory};

const NO_SYNC_DATA_NOTE: &str = "No sync duration data available";
const SLOWEST_APPS_LIMIT: usize = 10;

/// Applications whose current sync operation has run past the
/// threshold, longest-stuck first.
pub fn analyze_stuck_syncs(
    results: &[AppProcessingResult],
    config: &EngineConfig,
) -> StuckSyncReport {
    let mut apps: Vec<StuckApp> = results
        .iter()
        .filter(|r| !r.error && r.stuck_in_sync)
        .map(|r| StuckApp {
            app_name: r.app.name.clone(),
            namespace: r.app.namespace.clone(),
            minutes_stuck: r.stuck_minutes,
            sync_status: r.sync_status.clone(),
            health_status: r.health_status.clone(),
        })
        .collect();

    apps.sort_by(|a, b| b.minutes_stuck.cmp(&a.minutes_stuck));

    StuckSyncReport {
        total_stuck: apps.len(),
        threshold_minutes: config.stuck_sync_threshold_minutes,
        apps,
    }
}

/// Partition the fleet into staleness buckets. The stable and stale
/// buckets are the interesting ones and get sorted oldest-deploy first.
pub fn analyze_staleness(
    results: &[AppProcessingResult],
    config: &EngineConfig,
) -> StalenessReport {
    let mut stable_apps = Vec::new();
    let mut stale_apps = Vec::new();
    let mut active_apps = Vec::new();
    let mut recent_apps = Vec::new();

    for result in results.iter().filter(|r| !r.error) {
        let staleness = &result.staleness;
        let entry = StalenessEntry {
            app_name: result.app.name.clone(),
            namespace: result.app.namespace.clone(),
            days_since_deploy: staleness.days_since_deploy,
            last_deployed: staleness.last_deployed,
            sync_status: staleness.sync_status.clone(),
            health_status: staleness.health_status.clone(),
            auto_sync_enabled: staleness.auto_sync_enabled,
        };

        match staleness.category {
            StalenessCategory::Stable => stable_apps.push(entry),
            StalenessCategory::Stale => stale_apps.push(entry),
            StalenessCategory::Active => active_apps.push(entry),
            StalenessCategory::Recent => recent_apps.push(entry),
        }
    }

    stable_apps.sort_by(|a, b| b.days_since_deploy.cmp(&a.days_since_deploy));
    stale_apps.sort_by(|a, b| b.days_since_deploy.cmp(&a.days_since_deploy));

    StalenessReport {
        stable_apps,
        stale_apps,
        active_apps,
        recent_apps,
        thresholds: config.staleness,
    }
}

/// Nearest-rank percentile over a sorted slice: index = floor(count * p),
/// clamped to the last element.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let index = ((sorted.len() as f64 * p) as usize).min(sorted.len() - 1);
    sorted[index]
}

pub fn analyze_sync_performance(results: &[AppProcessingResult]) -> SyncPerformance {
    let mut durations = Vec::new();
    let mut per_app: HashMap<&str, &[f64]> = HashMap::new();

    for result in results.iter().filter(|r| !r.error) {
        if !result.sync_durations.is_empty() {
            durations.extend_from_slice(&result.sync_durations);
            per_app.insert(result.app.name.as_str(), result.sync_durations.as_slice());
        }
    }

    if durations.is_empty() {
        return SyncPerformance {
            avg_sync_seconds: 0.0,
            median_sync_seconds: 0.0,
            p95_sync_seconds: 0.0,
            p99_sync_seconds: 0.0,
            total_syncs: 0,
            slowest_apps: Vec::new(),
            note: Some(NO_SYNC_DATA_NOTE),
        };
    }

    durations.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let count = durations.len();
    let avg = durations.iter().sum::<f64>() / count as f64;

    let mut slowest_apps: Vec<SlowSyncApp> = per_app
        .into_iter()
        .map(|(name, app_durations)| SlowSyncApp {
            app_name: name.to_string(),
            avg_seconds: app_durations.iter().sum::<f64>() / app_durations.len() as f64,
            max_seconds: app_durations.iter().copied().fold(f64::MIN, f64::max),
            sync_count: app_durations.len(),
        })
        .collect();

    slowest_apps.sort_by(|a, b| {
        b.avg_seconds
            .partial_cmp(&a.avg_seconds)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.app_name.cmp(&b.app_name))
    });
    slowest_apps.truncate(SLOWEST_APPS_LIMIT);

    SyncPerformance {
        avg_sync_seconds: avg,
        median_sync_seconds: durations[count / 2],
        p95_sync_seconds: percentile(&durations, 0.95),
        p99_sync_seconds: percentile(&durations, 0.99),
        total_syncs: count,
        slowest_apps,
        note: None,
    }
}

struct NamespaceAccumulator {
    apps: usize,
    deployments: usize,
    failures: usize,
    recovery_hours: Vec<f64>,
}

/// Per-namespace rollup with the change-failure-rate thresholds reused
/// as the namespace's DORA level, busiest namespaces first.
pub fn analyze_by_namespace(results: &[AppProcessingResult]) -> NamespaceBreakdown {
    let mut accumulators: HashMap<&str, NamespaceAccumulator> = HashMap::new();

    for result in results.iter().filter(|r| !r.error) {
        let acc = accumulators
            .entry(result.app.namespace.as_str())
            .or_insert_with(|| NamespaceAccumulator {
                apps: 0,
                deployments: 0,
                failures: 0,
                recovery_hours: Vec::new(),
            });

        acc.apps += 1;
        acc.deployments += result.deployments.len();
        acc.failures += result.failed_deployments();
        acc.recovery_hours.extend_from_slice(&result.recovery_hours);
    }

    let mut rows: Vec<(String, NamespaceMetrics)> = accumulators
        .into_iter()
        .filter(|(_, acc)| acc.deployments > 0)
        .map(|(namespace, acc)| {
            let failure_rate = acc.failures as f64 / acc.deployments as f64 * 100.0;
            let avg_mttr = if acc.recovery_hours.is_empty() {
                0.0
            } else {
                acc.recovery_hours.iter().sum::<f64>() / acc.recovery_hours.len() as f64
            };

            (
                namespace.to_string(),
                NamespaceMetrics {
                    app_count: acc.apps,
                    total_deployments: acc.deployments,
                    failed_deployments: acc.failures,
                    failure_rate,
                    avg_mttr_hours: avg_mttr,
                    dora_level: DoraLevel::for_failure_rate(failure_rate),
                },
            )
        })
        .collect();

    rows.sort_by(|a, b| {
        b.1.total_deployments
            .cmp(&a.1.total_deployments)
            .then_with(|| a.0.cmp(&b.0))
    });

    let namespaces: IndexMap<String, NamespaceMetrics> = rows.into_iter().collect();

    NamespaceBreakdown {
        total_namespaces: namespaces.len(),
        namespaces,
    }
}
