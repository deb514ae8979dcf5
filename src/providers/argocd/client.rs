use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::auth::Token;
use crate::error::{ArgoLensError, Result};
use crate::providers::argocd::types::{Application, ApplicationList};

const LIST_TIMEOUT: Duration = Duration::from_secs(30);
const DETAIL_TIMEOUT: Duration = Duration::from_secs(10);

pub struct ArgoCdClient {
    pub client: Client,
    pub api_url: Url,
    pub token: Option<Token>,
    api_calls: AtomicU64,
}

impl ArgoCdClient {
    pub fn new(base_url: &str, token: Option<Token>) -> Result<Self> {
        let client = Client::builder()
            .user_agent("ArgoLens/0.1.0")
            .build()
            .map_err(|e| ArgoLensError::Config(format!("Failed to create HTTP client: {e}")))?;

        let api_url = Url::parse(base_url)
            .map_err(|e| ArgoLensError::Config(format!("Invalid base URL: {e}")))?
            .join("api/v1/")
            .map_err(|e| ArgoLensError::Config(format!("Invalid API base URL: {e}")))?;

        Ok(Self {
            client,
            api_url,
            token,
            api_calls: AtomicU64::new(0),
        })
    }

    pub fn auth_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(token) = &self.token {
            request.bearer_auth(token.as_str())
        } else {
            request
        }
    }

    pub fn api_calls(&self) -> u64 {
        self.api_calls.load(Ordering::Relaxed)
    }

    fn applications_url(&self) -> Result<Url> {
        self.api_url
            .join("applications")
            .map_err(|e| ArgoLensError::Config(format!("Invalid applications URL: {e}")))
    }

    fn application_url(&self, name: &str) -> Result<Url> {
        self.api_url
            .join(&format!("applications/{name}"))
            .map_err(|e| ArgoLensError::Config(format!("Invalid application URL: {e}")))
    }

    /// Fetch the full (unfiltered) application list.
    pub async fn fetch_applications(&self) -> Result<Vec<Application>> {
        self.api_calls.fetch_add(1, Ordering::Relaxed);

        let request = self
            .client
            .get(self.applications_url()?)
            .timeout(LIST_TIMEOUT);
        let response = self.auth_request(request).send().await?;

        if !response.status().is_success() {
            return Err(ArgoLensError::Api(format!(
                "Listing applications failed with status {}",
                response.status()
            )));
        }

        let list: ApplicationList = response.json().await?;
        Ok(list.items)
    }

    /// Fetch one application's full state, history included. The
    /// per-request timeout guarantees a stalled call fails this task
    /// alone instead of hanging the worker pool.
    pub async fn fetch_application(&self, name: &str) -> Result<Application> {
        self.api_calls.fetch_add(1, Ordering::Relaxed);

        let request = self
            .client
            .get(self.application_url(name)?)
            .timeout(DETAIL_TIMEOUT);
        let response = self.auth_request(request).send().await?;

        if !response.status().is_success() {
            return Err(ArgoLensError::Api(format!(
                "Fetching application '{name}' failed with status {}",
                response.status()
            )));
        }

        Ok(response.json().await?)
    }
}
