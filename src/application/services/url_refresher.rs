//! Batch renewal of expiring CDN links.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, error, warn};

use super::cdn_link::needs_refresh;
use crate::domain::errors::IngestError;
use crate::domain::ports::UrlRefreshPort;

/// Renews stale CDN links through one batch call.
pub struct UrlRefresher {
    port: Arc<dyn UrlRefreshPort>,
}

impl UrlRefresher {
    /// Creates refresher backed by `port`.
    #[must_use]
    pub fn new(port: Arc<dyn UrlRefreshPort>) -> Self {
        Self { port }
    }

    /// Returns `urls` with every stale CDN link replaced by a renewed one.
    ///
    /// The output is 1:1 with the input and keeps its order. No request is
    /// made when nothing needs renewal.
    ///
    /// # Errors
    /// Returns `RefreshFailed` if the batch request fails.
    pub async fn refresh(&self, urls: &[String]) -> Result<Vec<String>, IngestError> {
        self.refresh_at(urls, Utc::now()).await
    }

    /// Same as [`Self::refresh`] with an explicit clock.
    ///
    /// # Errors
    /// Returns `RefreshFailed` if the batch request fails.
    pub async fn refresh_at(
        &self,
        urls: &[String],
        now: DateTime<Utc>,
    ) -> Result<Vec<String>, IngestError> {
        let mut result = urls.to_vec();

        let mut seen = HashSet::new();
        let stale: Vec<String> = urls
            .iter()
            .filter(|url| needs_refresh(url, now) && seen.insert(url.as_str()))
            .cloned()
            .collect();

        if stale.is_empty() {
            return Ok(result);
        }

        debug!(count = stale.len(), "Refreshing expiring attachment URLs");

        let refreshed = self
            .port
            .refresh_urls(stale.clone())
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to refresh attachment URLs");
                IngestError::refresh_failed(e)
            })?;

        for pair in &refreshed {
            if pair.original.is_empty() || pair.refreshed.is_empty() {
                warn!(original = %pair.original, "Invalid entry in refresh response");
                continue;
            }

            let mut matched = false;
            for (current, original) in result.iter_mut().zip(urls) {
                if *original == pair.original {
                    current.clone_from(&pair.refreshed);
                    matched = true;
                }
            }
            if !matched {
                warn!(original = %pair.original, "Refreshed URL not found in request batch");
            }
        }

        for url in &stale {
            if !refreshed.iter().any(|pair| &pair.original == url) {
                warn!(url = %url, "URL missing from refresh response, keeping original");
            }
        }

        Ok(result)
    }
}
