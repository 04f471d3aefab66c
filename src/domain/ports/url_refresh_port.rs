//! Port for renewing expiring CDN links.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::errors::TransportError;

/// One renewed link as returned by the refresh endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshedUrl {
    /// URL as sent.
    pub original: String,
    /// Freshly signed replacement.
    pub refreshed: String,
}

/// Port for batch URL renewal.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlRefreshPort: Send + Sync {
    /// Renews all `urls` in one request.
    async fn refresh_urls(&self, urls: Vec<String>) -> Result<Vec<RefreshedUrl>, TransportError>;
}
