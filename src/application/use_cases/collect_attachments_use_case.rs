//! Channel-wide attachment discovery.

use std::sync::Arc;

use tracing::{debug, info};

use crate::application::services::ReferenceExtractor;
use crate::domain::entities::{Attachment, ChannelId};
use crate::domain::errors::IngestError;
use crate::domain::ports::{FetchMessagesOptions, MAX_PAGE_SIZE, MessageHistoryPort};

/// Bot account whose messages are treated like user messages.
pub const DEFAULT_SYSTEM_AUTHOR_ID: &str = "1392335374722007261";

/// Walks a channel's full history and collects every attachment reference.
pub struct CollectAttachmentsUseCase {
    history_port: Arc<dyn MessageHistoryPort>,
    system_author_id: String,
}

impl CollectAttachmentsUseCase {
    /// Creates new use case.
    #[must_use]
    pub fn new(history_port: Arc<dyn MessageHistoryPort>, system_author_id: impl Into<String>) -> Self {
        Self {
            history_port,
            system_author_id: system_author_id.into(),
        }
    }

    /// Collects attachments from every message in `channel_id`.
    ///
    /// Pages newest-first in pages of 100, skipping bot messages unless the bot
    /// is the configured system author.
    ///
    /// # Errors
    /// Returns error if a history page cannot be fetched.
    pub async fn execute(&self, channel_id: ChannelId) -> Result<Vec<Attachment>, IngestError> {
        let mut attachments = Vec::new();
        let mut options = FetchMessagesOptions::default().with_limit(MAX_PAGE_SIZE);
        let mut pages = 0usize;
        let mut scanned = 0usize;

        loop {
            let page = self
                .history_port
                .fetch_messages(channel_id, options)
                .await
                .map_err(IngestError::History)?;

            let Some(oldest) = page.last() else {
                break;
            };
            options = options.before_message(oldest.id());
            pages += 1;

            for message in &page {
                scanned += 1;
                let author = message.author();
                if author.is_bot() && author.id() != self.system_author_id {
                    debug!(message_id = %message.id(), "Skipping bot message");
                    continue;
                }
                ReferenceExtractor::extract_from_message(message, &mut attachments);
            }
        }

        info!(
            channel_id = %channel_id,
            pages,
            scanned,
            found = attachments.len(),
            "Collected channel attachments"
        );

        Ok(attachments)
    }
}
