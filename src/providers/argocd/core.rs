use async_trait::async_trait;
use log::info;

use crate::auth::Token;
use crate::config::AppFilter;
use crate::error::Result;
use crate::providers::argocd::client::ArgoCdClient;
use crate::providers::argocd::types::Application;
use crate::providers::ApplicationSource;

pub struct ArgoCdProvider {
    pub client: ArgoCdClient,
}

impl ArgoCdProvider {
    pub fn new(base_url: &str, token: Option<Token>) -> Result<Self> {
        let client = ArgoCdClient::new(base_url, token)?;
        Ok(Self { client })
    }
}

fn filter_applications(apps: Vec<Application>, filter: &AppFilter) -> Vec<Application> {
    if filter.is_empty() {
        return apps;
    }

    apps.into_iter()
        .filter(|app| {
            let namespace = app.metadata.namespace.as_deref().unwrap_or("");
            let project = app.spec.project.as_deref().unwrap_or("");
            filter.matches(namespace, project)
        })
        .collect()
}

#[async_trait]
impl ApplicationSource for ArgoCdProvider {
    async fn list_applications(&self, filter: &AppFilter) -> Result<Vec<Application>> {
        let all_apps = self.client.fetch_applications().await?;
        info!("Fetched {} total applications from API", all_apps.len());

        let total = all_apps.len();
        let filtered = filter_applications(all_apps, filter);

        if filtered.len() < total {
            info!(
                "Filtered to {} applications based on configuration",
                filtered.len()
            );
        }

        Ok(filtered)
    }

    async fn get_application_detail(&self, name: &str) -> Result<Application> {
        self.client.fetch_application(name).await
    }

    fn api_calls(&self) -> u64 {
        self.client.api_calls()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::argocd::types::{AppMetadata, AppSpec};

    fn app(name: &str, namespace: &str, project: &str) -> Application {
        Application {
            metadata: AppMetadata {
                name: Some(name.to_string()),
                namespace: Some(namespace.to_string()),
            },
            spec: AppSpec {
                project: Some(project.to_string()),
                ..AppSpec::default()
            },
            status: None,
        }
    }

    fn names(apps: &[Application]) -> Vec<&str> {
        apps.iter()
            .filter_map(|a| a.metadata.name.as_deref())
            .collect()
    }

    #[test]
    fn test_empty_filter_keeps_all() {
        let apps = vec![app("a", "kube-system", "default"), app("b", "prod", "p")];
        let filtered = filter_applications(apps, &AppFilter::default());

        assert_eq!(names(&filtered), vec!["a", "b"]);
    }

    #[test]
    fn test_filter_excludes_system_namespaces() {
        let filter = AppFilter {
            exclude_namespaces: vec!["kube-system".to_string(), "kube-public".to_string()],
            ..AppFilter::default()
        };
        let apps = vec![
            app("dns", "kube-system", "default"),
            app("payments", "prod", "platform"),
        ];

        let filtered = filter_applications(apps, &filter);
        assert_eq!(names(&filtered), vec!["payments"]);
    }

    #[test]
    fn test_filter_combines_namespace_and_project() {
        let filter = AppFilter {
            namespaces: vec!["prod".to_string()],
            projects: vec!["platform".to_string()],
            ..AppFilter::default()
        };
        let apps = vec![
            app("a", "prod-eu", "platform"),
            app("b", "prod-eu", "services"),
            app("c", "staging", "platform"),
        ];

        let filtered = filter_applications(apps, &filter);
        assert_eq!(names(&filtered), vec!["a"]);
    }

    #[test]
    fn test_filter_handles_missing_metadata() {
        let filter = AppFilter {
            namespaces: vec!["prod".to_string()],
            ..AppFilter::default()
        };
        let apps = vec![Application::default()];

        let filtered = filter_applications(apps, &filter);
        assert!(filtered.is_empty());
    }

    #[tokio::test]
    async fn test_list_applications_applies_filter() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v1/applications")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"items": [
                    {"metadata": {"name": "dns", "namespace": "kube-system"}},
                    {"metadata": {"name": "payments", "namespace": "prod"}}
                ]}"#,
            )
            .create_async()
            .await;

        let provider = ArgoCdProvider::new(&server.url(), None).unwrap();
        let filter = AppFilter {
            exclude_namespaces: vec!["kube-".to_string()],
            ..AppFilter::default()
        };

        let apps = provider.list_applications(&filter).await.unwrap();
        assert_eq!(names(&apps), vec!["payments"]);
        assert_eq!(provider.api_calls(), 1);
    }
}
