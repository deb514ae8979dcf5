use std::sync::atomic::{AtomicUsize, Ordering};

use futures::stream::{self, StreamExt};
use log::{info, warn};

use crate::config::EngineConfig;
use crate::providers::argocd::types::Application;
use crate::providers::ApplicationSource;

use super::classifier::classify_application;
use super::types::{AnalysisWindow, AppProcessingResult, ApplicationRef};

/// Fetch and classify every application under a bounded worker budget.
///
/// Produces exactly one result per input application; a failed detail
/// fetch becomes an error-marker result so downstream counts always
/// reconcile against the input list size. Completion order is
/// unspecified and the aggregations downstream are order-independent.
pub async fn process_applications<S: ApplicationSource>(
    source: &S,
    apps: &[Application],
    window: &AnalysisWindow,
    config: &EngineConfig,
) -> Vec<AppProcessingResult> {
    let total = apps.len();
    let completed = AtomicUsize::new(0);
    let progress_interval = config.progress_interval.max(1);

    info!(
        "Processing {total} applications with {} workers",
        config.workers
    );

    stream::iter(apps.iter().map(|app| {
        let app_ref = ApplicationRef::from(app);
        let completed = &completed;
        async move {
            let result = match source.get_application_detail(&app_ref.name).await {
                Ok(detail) => classify_application(app_ref, &detail, window, config),
                Err(e) => {
                    warn!("Error fetching details for {}: {e}", app_ref.name);
                    AppProcessingResult::error_marker(app_ref)
                }
            };

            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
            if done % progress_interval == 0 || done == total {
                info!(
                    "Progress: {done}/{total} apps processed ({:.1}%)",
                    done as f64 / total.max(1) as f64 * 100.0
                );
            }

            result
        }
    }))
    .buffer_unordered(config.workers.max(1))
    .collect()
    .await
}
