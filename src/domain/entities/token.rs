//! Discord bot token value object.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Bot token with format validation and masking; wiped from memory on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct BotToken {
    value: String,
}

impl BotToken {
    const MIN_TOKEN_LENGTH: usize = 50;

    /// Creates new token with format validation.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        let value = value.trim().strip_prefix("Bot ").unwrap_or(value.trim());

        if value.len() < Self::MIN_TOKEN_LENGTH || value.split('.').count() != 3 {
            return None;
        }

        Some(Self {
            value: value.to_string(),
        })
    }

    /// Creates token without validation.
    #[must_use]
    pub fn new_unchecked(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Value for the `Authorization` header.
    #[must_use]
    pub fn authorization(&self) -> String {
        format!("Bot {}", self.value)
    }

    /// Returns masked token for display.
    #[must_use]
    pub fn masked(&self) -> String {
        if self.value.len() <= 10 {
            return "*".repeat(self.value.len());
        }

        let visible_prefix = &self.value[..4];
        let visible_suffix = &self.value[self.value.len() - 4..];
        format!("{visible_prefix}...{visible_suffix}")
    }
}

impl fmt::Debug for BotToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotToken")
            .field("value", &self.masked())
            .finish()
    }
}

impl fmt::Display for BotToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.masked())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_valid_token() -> String {
        "MTIzNDU2Nzg5MDEyMzQ1Njc4OQ.XXXXXX.YYYYYYYYYYYYYYYYYYYYYYYYYYYY".to_string()
    }

    #[test]
    fn test_valid_token_creation() {
        assert!(BotToken::new(make_valid_token()).is_some());
        assert!(BotToken::new(format!("Bot {}", make_valid_token())).is_some());
    }

    #[test]
    fn test_invalid_tokens() {
        assert!(BotToken::new("short").is_none());
        assert!(BotToken::new("a".repeat(60)).is_none());
    }

    #[test]
    fn test_authorization_header() {
        let token = BotToken::new_unchecked("abc");
        assert_eq!(token.authorization(), "Bot abc");
    }

    #[test]
    fn test_debug_does_not_leak_token() {
        let token = BotToken::new_unchecked(make_valid_token());
        let debug_output = format!("{token:?}");

        assert!(!debug_output.contains(&make_valid_token()));
        assert!(debug_output.contains("..."));
    }
}
