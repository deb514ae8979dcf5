use serde::Deserialize;

/// Wire types for the Argo CD application API (`/api/v1/applications`).
///
/// Every leaf field is optional: a single malformed history entry must
/// not sink the whole payload, so timestamps stay strings here and are
/// parsed entry-by-entry during classification.
#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationList {
    #[serde(default)]
    pub items: Vec<Application>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Application {
    #[serde(default)]
    pub metadata: AppMetadata,
    #[serde(default)]
    pub spec: AppSpec,
    pub status: Option<AppStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppMetadata {
    pub name: Option<String>,
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppSpec {
    pub project: Option<String>,
    pub source: Option<AppSource>,
    #[serde(rename = "syncPolicy")]
    pub sync_policy: Option<SyncPolicy>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppSource {
    #[serde(rename = "repoURL")]
    pub repo_url: Option<String>,
    /// Present iff the application is sourced from a Helm chart.
    pub chart: Option<String>,
    #[serde(rename = "targetRevision")]
    pub target_revision: Option<String>,
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SyncPolicy {
    /// Any value here means auto-sync is enabled.
    pub automated: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppStatus {
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    pub sync: Option<SyncStatus>,
    pub health: Option<HealthStatus>,
    #[serde(rename = "operationState")]
    pub operation_state: Option<OperationState>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SyncStatus {
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HealthStatus {
    pub status: Option<String>,
}

/// One retained deployment record. Argo CD returns these oldest-first.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryEntry {
    pub revision: Option<String>,
    #[serde(rename = "deployedAt")]
    pub deployed_at: Option<String>,
    #[serde(rename = "operationState")]
    pub operation_state: Option<OperationState>,
    #[serde(rename = "syncResult")]
    pub sync_result: Option<SyncResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OperationState {
    pub phase: Option<String>,
    #[serde(rename = "startedAt")]
    pub started_at: Option<String>,
    #[serde(rename = "finishedAt")]
    pub finished_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SyncResult {
    #[serde(default)]
    pub resources: Vec<ResourceResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourceResult {
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_application() {
        let json = r#"{
            "metadata": {"name": "payments", "namespace": "prod"},
            "spec": {
                "project": "platform",
                "source": {
                    "repoURL": "https://charts.example.com",
                    "chart": "payments",
                    "targetRevision": "1.10.0"
                },
                "syncPolicy": {"automated": {"prune": true}}
            },
            "status": {
                "history": [
                    {
                        "revision": "abc123",
                        "deployedAt": "2026-08-20T10:00:00Z",
                        "operationState": {
                            "phase": "Succeeded",
                            "startedAt": "2026-08-20T09:58:00Z",
                            "finishedAt": "2026-08-20T10:00:00Z"
                        },
                        "syncResult": {"resources": [{"status": "Synced"}]}
                    }
                ],
                "sync": {"status": "Synced"},
                "health": {"status": "Healthy"},
                "operationState": {"phase": "Succeeded", "startedAt": "2026-08-20T09:58:00Z"}
            }
        }"#;

        let app: Application = serde_json::from_str(json).unwrap();

        assert_eq!(app.metadata.name.as_deref(), Some("payments"));
        assert_eq!(app.metadata.namespace.as_deref(), Some("prod"));
        assert_eq!(app.spec.project.as_deref(), Some("platform"));

        let source = app.spec.source.unwrap();
        assert_eq!(source.chart.as_deref(), Some("payments"));
        assert_eq!(source.target_revision.as_deref(), Some("1.10.0"));

        assert!(app.spec.sync_policy.unwrap().automated.is_some());

        let status = app.status.unwrap();
        assert_eq!(status.history.len(), 1);
        assert_eq!(
            status.history[0].deployed_at.as_deref(),
            Some("2026-08-20T10:00:00Z")
        );
        assert_eq!(
            status.history[0]
                .operation_state
                .as_ref()
                .unwrap()
                .phase
                .as_deref(),
            Some("Succeeded")
        );
    }

    #[test]
    fn test_deserialize_sparse_application() {
        // Apps that never synced have no status at all.
        let app: Application = serde_json::from_str(r#"{"metadata": {"name": "new-app"}}"#).unwrap();

        assert_eq!(app.metadata.name.as_deref(), Some("new-app"));
        assert!(app.metadata.namespace.is_none());
        assert!(app.status.is_none());
        assert!(app.spec.source.is_none());
    }

    #[test]
    fn test_deserialize_list_without_items() {
        let list: ApplicationList = serde_json::from_str("{}").unwrap();
        assert!(list.items.is_empty());
    }
}
