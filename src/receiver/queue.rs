use aka_chatops::{ChatOpsError, ChatOpsResult, CommandQueue, InboundCommand, QueuedCommand};
use async_trait::async_trait;
use aws_sdk_sqs::error::DisplayErrorContext;
use chrono::Utc;
use tracing::info;

/// Hands acknowledged commands to the processor lambda through SQS.
pub struct SqsCommandQueue {
    client: aws_sdk_sqs::Client,
    queue_url: String,
}

impl SqsCommandQueue {
    pub fn new(client: aws_sdk_sqs::Client, queue_url: String) -> Self {
        Self { client, queue_url }
    }
}

#[async_trait]
impl CommandQueue for SqsCommandQueue {
    async fn enqueue(&self, command: InboundCommand) -> ChatOpsResult<()> {
        let message = QueuedCommand {
            command,
            received_at: Utc::now(),
        };
        let message_body = serde_json::to_string(&message)?;

        let output = self
            .client
            .send_message()
            .queue_url(&self.queue_url)
            .message_body(message_body)
            .send()
            .await
            .map_err(|e| ChatOpsError::Queue(DisplayErrorContext(&e).to_string()))?;

        info!(
            message_id = output.message_id().unwrap_or_default(),
            channel = %message.command.channel_id,
            "Command queued"
        );
        Ok(())
    }
}
