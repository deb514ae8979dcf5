pub mod argocd;

use async_trait::async_trait;

use crate::config::AppFilter;
use crate::error::Result;
use crate::providers::argocd::types::Application;

/// Read-only gateway to the GitOps control plane.
///
/// The engine needs exactly two operations: list the fleet (with
/// server-side-ish filtering applied locally) and fetch one
/// application's full state. Implementations must be safe to call
/// concurrently from the dispatcher's worker pool.
#[async_trait]
pub trait ApplicationSource: Send + Sync {
    /// Fetch the filtered application list. Failure here is fatal to a
    /// run: there is nothing to fan out over.
    async fn list_applications(&self, filter: &AppFilter) -> Result<Vec<Application>>;

    /// Fetch one application's detail (history + live status). Failures
    /// are isolated to that application by the dispatcher.
    async fn get_application_detail(&self, name: &str) -> Result<Application>;

    /// Total upstream calls made so far, for reporting.
    fn api_calls(&self) -> u64;
}
