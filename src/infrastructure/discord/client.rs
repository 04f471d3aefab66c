//! Discord API HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, RequestBuilder, StatusCode, header};
use tracing::{debug, warn};

use super::dto::{
    ErrorResponse, MessageResponse, RateLimitResponse, RefreshUrlsRequest, RefreshUrlsResponse,
};
use crate::domain::entities::{BotToken, ChannelId, Message};
use crate::domain::errors::TransportError;
use crate::domain::ports::{
    ByteFetchPort, FetchMessagesOptions, MessageHistoryPort, RefreshedUrl, UrlRefreshPort,
};

/// Default Discord REST endpoint.
pub const DISCORD_API_BASE: &str = "https://discord.com/api/v10";
/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const USER_AGENT: &str = concat!(
    "DiscordBot (https://github.com/submission-ingest, ",
    env!("CARGO_PKG_VERSION"),
    ")"
);

/// Discord REST client for history reads, link renewal, and file downloads.
pub struct DiscordRestClient {
    client: Client,
    base_url: String,
    token: BotToken,
}

impl DiscordRestClient {
    /// Creates new client with default base URL.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn new(token: BotToken) -> Result<Self, TransportError> {
        Self::with_base_url(token, DISCORD_API_BASE, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates client with custom base URL and timeout.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn with_base_url(
        token: BotToken,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(header::AUTHORIZATION, self.token.authorization())
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, TransportError> {
        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "Request to Discord failed");
            map_reqwest_error(&e)
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::handle_error_response(status, response).await);
        }

        Ok(response)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    async fn handle_error_response(status: StatusCode, response: reqwest::Response) -> TransportError {
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_ms = response
                .json::<RateLimitResponse>()
                .await
                .map_or(5000, |r| (r.retry_after * 1000.0).ceil() as u64);
            return TransportError::RateLimited { retry_after_ms };
        }

        let error_message = match response.json::<ErrorResponse>().await {
            Ok(error) => error.message,
            Err(_) => format!("HTTP {status}"),
        };

        match status {
            StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => {
                TransportError::network("Discord API is temporarily unavailable")
            }
            _ => TransportError::status(status.as_u16(), error_message),
        }
    }
}

fn map_reqwest_error(e: &reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::network("request timed out")
    } else if e.is_connect() {
        TransportError::network("failed to connect")
    } else {
        TransportError::network(e.to_string())
    }
}

#[async_trait]
impl UrlRefreshPort for DiscordRestClient {
    async fn refresh_urls(&self, urls: Vec<String>) -> Result<Vec<RefreshedUrl>, TransportError> {
        let url = format!("{}/attachments/refresh-urls", self.base_url);

        debug!(count = urls.len(), "Requesting attachment URL refresh");

        let request = self.authorized(self.client.post(&url)).json(&RefreshUrlsRequest {
            attachment_urls: &urls,
        });
        let response = self.send(request).await?;

        let body: RefreshUrlsResponse = response.json().await.map_err(|e| {
            warn!(error = %e, "Failed to parse refresh response");
            TransportError::invalid_response(format!("failed to parse response: {e}"))
        })?;

        Ok(body.refreshed_urls.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl MessageHistoryPort for DiscordRestClient {
    async fn fetch_messages(
        &self,
        channel_id: ChannelId,
        options: FetchMessagesOptions,
    ) -> Result<Vec<Message>, TransportError> {
        let url = format!("{}/channels/{}/messages", self.base_url, channel_id);

        let mut query: Vec<(&str, String)> = Vec::with_capacity(2);
        if let Some(limit) = options.limit {
            query.push(("limit", limit.to_string()));
        }
        if let Some(before) = options.before {
            query.push(("before", before.to_string()));
        }

        debug!(channel_id = %channel_id, before = ?options.before, "Fetching message page");

        let response = self
            .send(self.authorized(self.client.get(&url)).query(&query))
            .await?;

        let payloads: Vec<MessageResponse> = response.json().await.map_err(|e| {
            warn!(error = %e, "Failed to parse messages response");
            TransportError::invalid_response(format!("failed to parse response: {e}"))
        })?;

        Ok(payloads.into_iter().map(Message::from).collect())
    }
}

#[async_trait]
impl ByteFetchPort for DiscordRestClient {
    async fn fetch_bytes(&self, url: &str) -> Result<Bytes, TransportError> {
        let response = self.send(self.client.get(url)).await?;

        response
            .bytes()
            .await
            .map_err(|e| TransportError::network(format!("failed to read body: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = DiscordRestClient::new(BotToken::new_unchecked("token"));
        assert!(client.is_ok());
    }

    #[test]
    fn test_base_url_is_normalized() {
        let client = DiscordRestClient::with_base_url(
            BotToken::new_unchecked("token"),
            "http://localhost:8080/api/",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(client.base_url, "http://localhost:8080/api");
    }
}
