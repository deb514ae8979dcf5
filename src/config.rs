/// Application filters applied to the listing call before any analysis.
///
/// Namespace matching is by substring, mirroring Argo CD's common
/// `prod-*`-style namespace families; project matching is exact.
#[derive(Debug, Clone, Default)]
pub struct AppFilter {
    pub namespaces: Vec<String>,
    pub projects: Vec<String>,
    pub exclude_namespaces: Vec<String>,
}

impl AppFilter {
    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty() && self.projects.is_empty() && self.exclude_namespaces.is_empty()
    }

    /// Returns true if an application with this namespace/project should
    /// be analyzed.
    pub fn matches(&self, namespace: &str, project: &str) -> bool {
        if self
            .exclude_namespaces
            .iter()
            .any(|ns| namespace.contains(ns.as_str()))
        {
            return false;
        }

        if !self.namespaces.is_empty()
            && !self
                .namespaces
                .iter()
                .any(|ns| namespace.contains(ns.as_str()))
        {
            return false;
        }

        if !self.projects.is_empty() && !self.projects.iter().any(|p| p == project) {
            return false;
        }

        true
    }
}

/// Staleness category thresholds, in days since the last deployment.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct StalenessThresholds {
    pub critical_days: i64,
    pub warning_days: i64,
    pub info_days: i64,
}

impl Default for StalenessThresholds {
    fn default() -> Self {
        Self {
            critical_days: 180,
            warning_days: 90,
            info_days: 30,
        }
    }
}

/// Engine configuration, fixed once per run. Multiple engines with
/// different thresholds can run concurrently since nothing here is
/// global.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Analysis window, in days back from now.
    pub days: i64,
    /// Bounded worker-pool size for detail fetches.
    pub workers: usize,
    /// Log a progress line every N completed applications.
    pub progress_interval: usize,
    /// A Running/Progressing operation older than this is stuck.
    pub stuck_sync_threshold_minutes: i64,
    pub staleness: StalenessThresholds,
    pub filter: AppFilter,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            days: 30,
            workers: 20,
            progress_interval: 50,
            stuck_sync_threshold_minutes: 30,
            staleness: StalenessThresholds::default(),
            filter: AppFilter::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = AppFilter::default();

        assert!(filter.is_empty());
        assert!(filter.matches("kube-system", "default"));
        assert!(filter.matches("prod-payments", "platform"));
    }

    #[test]
    fn test_exclude_namespaces_match_by_substring() {
        let filter = AppFilter {
            exclude_namespaces: vec!["kube-".to_string()],
            ..AppFilter::default()
        };

        assert!(!filter.matches("kube-system", "default"));
        assert!(!filter.matches("kube-public", "default"));
        assert!(filter.matches("payments", "default"));
    }

    #[test]
    fn test_include_namespaces_match_by_substring() {
        let filter = AppFilter {
            namespaces: vec!["prod".to_string()],
            ..AppFilter::default()
        };

        assert!(filter.matches("prod-payments", "default"));
        assert!(filter.matches("eu-prod", "default"));
        assert!(!filter.matches("staging", "default"));
    }

    #[test]
    fn test_projects_match_exactly() {
        let filter = AppFilter {
            projects: vec!["platform".to_string()],
            ..AppFilter::default()
        };

        assert!(filter.matches("anything", "platform"));
        assert!(!filter.matches("anything", "platform-services"));
    }

    #[test]
    fn test_exclude_wins_over_include() {
        let filter = AppFilter {
            namespaces: vec!["prod".to_string()],
            exclude_namespaces: vec!["prod-legacy".to_string()],
            ..AppFilter::default()
        };

        assert!(filter.matches("prod-payments", "default"));
        assert!(!filter.matches("prod-legacy", "default"));
    }
}
