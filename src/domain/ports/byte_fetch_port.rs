//! Port for downloading raw file bytes.

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::errors::TransportError;

/// Port for simple GET-and-buffer downloads.
#[async_trait]
pub trait ByteFetchPort: Send + Sync {
    /// Downloads the full body at `url`.
    async fn fetch_bytes(&self, url: &str) -> Result<Bytes, TransportError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves canned bodies and counts requests.
    #[derive(Default)]
    pub struct MockByteFetcher {
        bodies: HashMap<String, Bytes>,
        calls: AtomicUsize,
    }

    impl MockByteFetcher {
        /// Creates mock with no bodies; every request fails with 404.
        pub fn new() -> Self {
            Self::default()
        }

        /// Serves `body` for `url`.
        pub fn with_body(mut self, url: impl Into<String>, body: impl Into<Bytes>) -> Self {
            self.bodies.insert(url.into(), body.into());
            self
        }

        /// Number of requests made so far.
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ByteFetchPort for MockByteFetcher {
        async fn fetch_bytes(&self, url: &str) -> Result<Bytes, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.bodies
                .get(url)
                .cloned()
                .ok_or_else(|| TransportError::status(404, "Not Found"))
        }
    }
}
