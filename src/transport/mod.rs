//! Outbound message transport for feedcast.
//!
//! Delivery happens through the [`MessageSender`] collaborator; the
//! production implementation POSTs messages as JSON to a webhook endpoint.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::Serialize;

use crate::error::{FeedcastError, Result};

/// Request timeout for outbound sends, in seconds.
const SEND_TIMEOUT_SECS: u64 = 15;

/// Outbound message sender.
pub trait MessageSender: Send + Sync {
    /// Deliver `text` to the given recipient.
    fn send(&self, recipient_id: &str, text: &str) -> impl Future<Output = Result<()>> + Send;
}

/// Outbound message payload.
#[derive(Debug, Serialize)]
struct OutboundMessage<'a> {
    recipient: &'a str,
    text: &'a str,
}

/// Sender that POSTs messages to a webhook endpoint.
pub struct WebhookSender {
    client: Client,
    endpoint: String,
}

impl WebhookSender {
    /// Create a sender for the given endpoint URL.
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(SEND_TIMEOUT_SECS))
            .build()
            .map_err(|e| FeedcastError::Transport(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

impl MessageSender for WebhookSender {
    fn send(&self, recipient_id: &str, text: &str) -> impl Future<Output = Result<()>> + Send {
        let payload = OutboundMessage {
            recipient: recipient_id,
            text,
        };
        let request = self.client.post(&self.endpoint).json(&payload);
        async move {
            let response = request
                .send()
                .await
                .map_err(|e| FeedcastError::Transport(format!("send failed: {}", e)))?;

            if !response.status().is_success() {
                return Err(FeedcastError::Transport(format!(
                    "send rejected: HTTP {}",
                    response.status()
                )));
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outbound_message_serializes() {
        let msg = OutboundMessage {
            recipient: "chat-1",
            text: "Storm hits city. Flooding reported",
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"recipient\":\"chat-1\""));
        assert!(json.contains("Flooding reported"));
    }

    #[test]
    fn test_webhook_sender_builds() {
        assert!(WebhookSender::new("http://127.0.0.1:8081/send").is_ok());
    }
}
