use std::cmp::Ordering;
use std::collections::BTreeMap;

use indexmap::IndexMap;

use crate::providers::argocd::types::Application;
use crate::report::{ChartCompliance, ChartRecord, ChartSummary, ChartVersionGroup, OutdatedApp};

/// Compare two chart versions segment by segment. Numeric segments
/// compare numerically so "1.10.0" beats "1.9.0"; anything non-numeric
/// falls back to a lexicographic compare of the segment. Total order
/// for equal-format inputs.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let a_segments: Vec<&str> = a.split('.').collect();
    let b_segments: Vec<&str> = b.split('.').collect();

    for (sa, sb) in a_segments.iter().zip(b_segments.iter()) {
        let ordering = match (sa.parse::<u64>(), sb.parse::<u64>()) {
            (Ok(na), Ok(nb)) => na.cmp(&nb),
            _ => sa.cmp(sb),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }

    a_segments.len().cmp(&b_segments.len())
}

/// Partition the raw application list into Helm-sourced and Git-sourced
/// apps and flag every Helm app running behind its chart's latest
/// fleet-wide version.
pub fn analyze_chart_compliance(apps: &[Application]) -> ChartCompliance {
    let mut helm_apps = 0usize;
    let mut git_apps = 0usize;
    // BTreeMap keyed by chart name so the summary is alphabetical.
    let mut by_chart: BTreeMap<String, Vec<ChartRecord>> = BTreeMap::new();

    for app in apps {
        let Some(source) = app.spec.source.as_ref() else {
            continue;
        };

        let Some(chart_name) = source.chart.as_ref() else {
            git_apps += 1;
            continue;
        };

        helm_apps += 1;
        by_chart
            .entry(chart_name.clone())
            .or_default()
            .push(ChartRecord {
                app_name: app
                    .metadata
                    .name
                    .clone()
                    .unwrap_or_else(|| "unknown".to_string()),
                namespace: app
                    .metadata
                    .namespace
                    .clone()
                    .unwrap_or_else(|| "default".to_string()),
                chart_name: chart_name.clone(),
                chart_version: source
                    .target_revision
                    .clone()
                    .unwrap_or_else(|| "unknown".to_string()),
                repo_url: source
                    .repo_url
                    .clone()
                    .unwrap_or_else(|| "unknown".to_string()),
            });
    }

    let mut charts = IndexMap::new();
    let mut outdated_apps = Vec::new();
    let mut apps_on_latest = 0usize;

    for (chart_name, records) in by_chart {
        let latest_version = records
            .iter()
            .map(|r| r.chart_version.as_str())
            .max_by(|a, b| compare_versions(a, b))
            .unwrap_or("unknown")
            .to_string();

        let mut versions: IndexMap<String, ChartVersionGroup> = IndexMap::new();
        for record in records {
            let version = record.chart_version.clone();
            let group = versions.entry(version.clone()).or_insert_with(|| {
                ChartVersionGroup {
                    count: 0,
                    is_latest: version == latest_version,
                    apps: Vec::new(),
                }
            });
            group.count += 1;
            group.apps.push(record);
        }

        versions.sort_by(|va, _, vb, _| compare_versions(vb, va));

        let total_apps: usize = versions.values().map(|g| g.count).sum();
        let chart_apps_on_latest = versions
            .get(&latest_version)
            .map_or(0, |g| g.count);
        apps_on_latest += chart_apps_on_latest;

        for (version, group) in &versions {
            if *version == latest_version {
                continue;
            }
            for app in &group.apps {
                outdated_apps.push(OutdatedApp {
                    app_name: app.app_name.clone(),
                    namespace: app.namespace.clone(),
                    chart_name: chart_name.clone(),
                    current_version: version.clone(),
                    latest_version: latest_version.clone(),
                    repo_url: app.repo_url.clone(),
                });
            }
        }

        charts.insert(
            chart_name,
            ChartSummary {
                latest_version,
                total_apps,
                apps_on_latest: chart_apps_on_latest,
                apps_outdated: total_apps - chart_apps_on_latest,
                versions,
            },
        );
    }

    outdated_apps.sort_by(|a, b| {
        a.chart_name
            .cmp(&b.chart_name)
            .then_with(|| a.app_name.cmp(&b.app_name))
    });

    ChartCompliance {
        total_helm_apps: helm_apps,
        total_git_apps: git_apps,
        total_charts: charts.len(),
        apps_on_latest,
        apps_outdated: outdated_apps.len(),
        charts,
        outdated_apps,
    }
}
