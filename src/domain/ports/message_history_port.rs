//! Port for paging through channel history.

use async_trait::async_trait;

use crate::domain::entities::{ChannelId, Message, MessageId};
use crate::domain::errors::TransportError;

/// Largest page Discord returns for one history request.
pub const MAX_PAGE_SIZE: u8 = 100;

/// Options for fetching messages from a channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchMessagesOptions {
    /// Page size, capped at [`MAX_PAGE_SIZE`].
    pub limit: Option<u8>,
    /// Only messages older than this id.
    pub before: Option<MessageId>,
}

impl FetchMessagesOptions {
    /// Sets the page size.
    #[must_use]
    pub const fn with_limit(mut self, limit: u8) -> Self {
        self.limit = Some(if limit < MAX_PAGE_SIZE {
            limit
        } else {
            MAX_PAGE_SIZE
        });
        self
    }

    /// Restricts the page to messages older than `message_id`.
    #[must_use]
    pub const fn before_message(mut self, message_id: MessageId) -> Self {
        self.before = Some(message_id);
        self
    }
}

/// Port for reading a channel's messages, newest first.
#[async_trait]
pub trait MessageHistoryPort: Send + Sync {
    /// Fetches one page of messages.
    async fn fetch_messages(
        &self,
        channel_id: ChannelId,
        options: FetchMessagesOptions,
    ) -> Result<Vec<Message>, TransportError>;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_is_capped() {
        let options = FetchMessagesOptions::default().with_limit(250);
        assert_eq!(options.limit, Some(MAX_PAGE_SIZE));
    }

    #[test]
    fn test_before_cursor() {
        let options = FetchMessagesOptions::default().before_message(MessageId(7));
        assert_eq!(options.before, Some(MessageId(7)));
    }
}
