//! Ships replies back to the chat platform.
//!
//! Replies go either to the one-shot `response_url` of the invocation or,
//! bot-authenticated, to a channel via `chat.postMessage`. Large text goes
//! through `files.upload`. The chat API answers 200 even when it refuses a
//! request, so the `ok` flag in the body is what decides success.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::blocks::{ChatMessage, FileUpload};
use crate::error::{ChatOpsError, ChatOpsResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryTarget {
    /// One-shot reply scoped to the command invocation.
    ReplyUrl(String),
    /// Persistent post into a channel, using the bot token.
    Channel(String),
}

#[async_trait]
pub trait ResponseDelivery: Send + Sync {
    async fn post_message(&self, target: &DeliveryTarget, message: &ChatMessage)
        -> ChatOpsResult<()>;

    async fn upload_file(&self, upload: FileUpload) -> ChatOpsResult<()>;
}

/// Body envelope shared by chat API methods.
#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

impl ApiEnvelope {
    fn into_result(self) -> ChatOpsResult<()> {
        if self.ok {
            Ok(())
        } else {
            Err(ChatOpsError::Api(
                self.error.unwrap_or_else(|| "unknown_error".to_string()),
            ))
        }
    }
}

#[derive(Serialize)]
struct ChannelPost<'a> {
    channel: &'a str,
    #[serde(flatten)]
    message: &'a ChatMessage,
}

pub struct SlackDelivery {
    client: Client,
    api_url: String,
    bot_token: String,
}

impl SlackDelivery {
    pub fn new(client: Client, api_url: impl Into<String>, bot_token: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            bot_token: bot_token.into(),
        }
    }

    async fn post_to_reply_url(&self, url: &str, message: &ChatMessage) -> ChatOpsResult<()> {
        debug!("Sending delayed response to: {}", url);

        let response = self.client.post(url).json(message).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Failed to send delayed response: {} - {}", status, body);
            return Err(ChatOpsError::Http {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }

    async fn post_to_channel(&self, channel: &str, message: &ChatMessage) -> ChatOpsResult<()> {
        debug!(channel, "Posting message to channel");

        let envelope: ApiEnvelope = self
            .client
            .post(format!("{}/chat.postMessage", self.api_url))
            .bearer_auth(&self.bot_token)
            .json(&ChannelPost { channel, message })
            .send()
            .await?
            .error_for_status()
            .map_err(http_error)?
            .json()
            .await?;

        envelope.into_result()
    }
}

#[async_trait]
impl ResponseDelivery for SlackDelivery {
    async fn post_message(
        &self,
        target: &DeliveryTarget,
        message: &ChatMessage,
    ) -> ChatOpsResult<()> {
        match target {
            DeliveryTarget::ReplyUrl(url) => self.post_to_reply_url(url, message).await,
            DeliveryTarget::Channel(channel) => self.post_to_channel(channel, message).await,
        }
    }

    async fn upload_file(&self, upload: FileUpload) -> ChatOpsResult<()> {
        debug!(channel = %upload.channel_id, filename = %upload.filename, "Uploading file");

        let envelope: ApiEnvelope = self
            .client
            .post(format!("{}/files.upload", self.api_url))
            .bearer_auth(&self.bot_token)
            .multipart(upload.into_form())
            .send()
            .await?
            .error_for_status()
            .map_err(http_error)?
            .json()
            .await?;

        envelope.into_result()
    }
}

fn http_error(err: reqwest::Error) -> ChatOpsError {
    match err.status() {
        Some(status) => ChatOpsError::Http {
            status: status.as_u16(),
            body: err.to_string(),
        },
        None => err.into(),
    }
}
