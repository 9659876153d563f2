//! Reminder delivery over the messaging bot API.
//!
//! [`MessageChannel`] is the seam between the dispatch job and the outside world.
//! [`deliver`] wraps a single send in a timeout and turns every failure into a log
//! line and a [`DeliveryOutcome`]; it never returns an error. There is no retry.

use crate::errors::{Error, Result};
use async_trait::async_trait;
use std::{fmt, time::Duration};
use tracing::{debug, warn};

/// Sends a text message to one recipient.
#[async_trait]
pub trait MessageChannel: Send + Sync {
    /// Sends `text` to the chat identified by `chat_id`.
    ///
    /// # Errors
    /// Returns an error on transport failure or a non-success API response.
    async fn send_message(&self, text: &str, chat_id: &str) -> Result<()>;
}

/// Result of one delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The API accepted the message
    Delivered,
    /// Transport error or non-success response
    Failed,
    /// The attempt did not finish within the timeout
    TimedOut,
}

/// Makes one best-effort attempt to deliver `text` to `chat_id`.
///
/// Failures are logged and reported through the returned outcome only.
pub async fn deliver(
    channel: &dyn MessageChannel,
    text: &str,
    chat_id: &str,
    timeout: Duration,
) -> DeliveryOutcome {
    match tokio::time::timeout(timeout, channel.send_message(text, chat_id)).await {
        Ok(Ok(())) => {
            debug!("Delivered reminder to chat {}", chat_id);
            DeliveryOutcome::Delivered
        }
        Ok(Err(e)) => {
            warn!("Failed to deliver reminder to chat {}: {}", chat_id, e);
            DeliveryOutcome::Failed
        }
        Err(_) => {
            warn!(
                "Delivery to chat {} timed out after {:?}",
                chat_id, timeout
            );
            DeliveryOutcome::TimedOut
        }
    }
}

/// [`MessageChannel`] backed by a Telegram-style bot API
/// (`GET {api_base_url}{bot_token}/sendMessage?text=..&chat_id=..`).
pub struct HttpMessageChannel {
    client: reqwest::Client,
    api_base_url: String,
    bot_token: String,
}

impl HttpMessageChannel {
    /// Builds a channel whose HTTP client gives up after `request_timeout`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(
        api_base_url: impl Into<String>,
        bot_token: impl Into<String>,
        request_timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;

        Ok(Self {
            client,
            api_base_url: api_base_url.into(),
            bot_token: bot_token.into(),
        })
    }

    fn send_message_url(&self) -> String {
        format!("{}{}/sendMessage", self.api_base_url, self.bot_token)
    }
}

// The URL embeds the bot token, keep it out of logs.
impl fmt::Debug for HttpMessageChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpMessageChannel")
            .field("api_base_url", &self.api_base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl MessageChannel for HttpMessageChannel {
    async fn send_message(&self, text: &str, chat_id: &str) -> Result<()> {
        let response = self
            .client
            .get(self.send_message_url())
            .query(&[("text", text), ("chat_id", chat_id)])
            .send()
            .await
            .map_err(|e| Error::Delivery {
                message: format!("request failed: {}", e.without_url()),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Delivery {
                message: format!("messaging API returned {status}: {body}"),
            });
        }

        Ok(())
    }
}
