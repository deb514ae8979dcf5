use std::collections::BTreeMap;

use crate::report::{
    ChangeFailureRate, DeploymentFrequency, DoraLevel, DoraMetrics, LeadTimeForChanges,
    MeanTimeToRecovery, OverallPerformance,
};

use super::types::{AnalysisWindow, AppProcessingResult};

const LEAD_TIME_NOTE: &str = "Lead time calculation requires Git integration";
const NO_RECOVERY_NOTE: &str = "No recovery incidents detected in time period";

/// Fold the collected result set into the four DORA metric blocks plus
/// the overall level. Pure over the inputs; error-marker results have
/// empty collections and contribute nothing to the sums.
pub fn aggregate_metrics(results: &[AppProcessingResult], window: &AnalysisWindow) -> DoraMetrics {
    let deployment_frequency = deployment_frequency(results, window);
    let lead_time_for_changes = lead_time();
    let change_failure_rate = change_failure_rate(results);
    let mean_time_to_recovery = mean_time_to_recovery(results);

    let overall = overall_performance(&[
        deployment_frequency.dora_level,
        lead_time_for_changes.dora_level,
        change_failure_rate.dora_level,
        mean_time_to_recovery.dora_level,
    ]);

    DoraMetrics {
        deployment_frequency,
        lead_time_for_changes,
        change_failure_rate,
        mean_time_to_recovery,
        overall,
    }
}

fn deployment_frequency(
    results: &[AppProcessingResult],
    window: &AnalysisWindow,
) -> DeploymentFrequency {
    let mut app_breakdown = BTreeMap::new();
    let mut daily_breakdown = BTreeMap::new();
    let mut total = 0usize;

    for result in results {
        for event in &result.deployments {
            total += 1;
            *app_breakdown.entry(result.app.name.clone()).or_insert(0) += 1;
            let day_key = event.deployed_at.format("%Y-%m-%d").to_string();
            *daily_breakdown.entry(day_key).or_insert(0) += 1;
        }
    }

    let per_day = if window.days > 0 {
        total as f64 / window.days as f64
    } else {
        0.0
    };
    let per_week = per_day * 7.0;
    let per_month = per_day * 30.0;

    let level = DoraLevel::for_deployment_frequency(per_day, per_week, per_month);

    DeploymentFrequency {
        total_deployments: total,
        deployments_per_day: per_day,
        deployments_per_week: per_week,
        deployments_per_month: per_month,
        dora_level: level,
        dora_description: level.describe_deployment_frequency(),
        app_breakdown,
        daily_breakdown,
    }
}

fn lead_time() -> LeadTimeForChanges {
    // Never approximated from deployment timestamps alone.
    LeadTimeForChanges {
        dora_level: DoraLevel::Unknown,
        note: LEAD_TIME_NOTE,
    }
}

fn change_failure_rate(results: &[AppProcessingResult]) -> ChangeFailureRate {
    let mut total = 0usize;
    let mut failed = 0usize;
    let mut app_breakdown = BTreeMap::new();

    for result in results {
        let app_total = result.deployments.len();
        let app_failed = result.failed_deployments();

        total += app_total;
        failed += app_failed;

        if app_total > 0 {
            app_breakdown.insert(
                result.app.name.clone(),
                app_failed as f64 / app_total as f64 * 100.0,
            );
        }
    }

    let rate = if total > 0 {
        failed as f64 / total as f64 * 100.0
    } else {
        0.0
    };
    let level = DoraLevel::for_failure_rate(rate);

    ChangeFailureRate {
        total_deployments: total,
        failed_deployments: failed,
        change_failure_rate: rate,
        dora_level: level,
        dora_description: level.describe_failure_rate(),
        app_breakdown,
    }
}

fn mean_time_to_recovery(results: &[AppProcessingResult]) -> MeanTimeToRecovery {
    let mut recovery_hours = Vec::new();
    let mut app_breakdown = BTreeMap::new();

    for result in results {
        recovery_hours.extend_from_slice(&result.recovery_hours);

        if !result.recovery_hours.is_empty() {
            let mean =
                result.recovery_hours.iter().sum::<f64>() / result.recovery_hours.len() as f64;
            app_breakdown.insert(result.app.name.clone(), mean);
        }
    }

    if recovery_hours.is_empty() {
        return MeanTimeToRecovery {
            avg_mttr_hours: 0.0,
            avg_mttr_minutes: 0.0,
            median_mttr_hours: 0.0,
            incidents_recovered: 0,
            dora_level: DoraLevel::Unknown,
            dora_description: DoraLevel::Unknown.describe_mttr(),
            note: Some(NO_RECOVERY_NOTE),
            app_breakdown,
        };
    }

    let avg_hours = recovery_hours.iter().sum::<f64>() / recovery_hours.len() as f64;

    recovery_hours.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let median_hours = recovery_hours[recovery_hours.len() / 2];

    let level = DoraLevel::for_mttr_hours(avg_hours);

    MeanTimeToRecovery {
        avg_mttr_hours: avg_hours,
        avg_mttr_minutes: avg_hours * 60.0,
        median_mttr_hours: median_hours,
        incidents_recovered: recovery_hours.len(),
        dora_level: level,
        dora_description: level.describe_mttr(),
        note: None,
        app_breakdown,
    }
}

fn overall_performance(levels: &[DoraLevel]) -> OverallPerformance {
    let scores: Vec<f64> = levels.iter().filter_map(|l| l.score()).collect();

    if scores.is_empty() {
        return OverallPerformance {
            dora_level: DoraLevel::Unknown,
            average_score: None,
        };
    }

    let avg = scores.iter().sum::<f64>() / scores.len() as f64;
    let level = if avg >= 3.5 {
        DoraLevel::Elite
    } else if avg >= 2.5 {
        DoraLevel::High
    } else if avg >= 1.5 {
        DoraLevel::Medium
    } else {
        DoraLevel::Low
    };

    OverallPerformance {
        dora_level: level,
        average_score: Some(avg),
    }
}
