mod channels;

use std::sync::Arc;

use aka_chatops::{
    AkkerisClient, ChatOpsConfig, CommandRouter, InMemoryMembershipStore, QueuedCommand,
    SlackDelivery,
};
use aws_lambda_events::event::sqs::SqsEvent;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use tracing::{info, warn};

use channels::ChannelRefresher;

/// Built once per cold start and shared by every invocation.
struct Processor {
    router: CommandRouter,
    refresher: ChannelRefresher,
    config: ChatOpsConfig,
}

impl Processor {
    fn from_config(config: ChatOpsConfig) -> Self {
        let client = reqwest::Client::new();
        let store = Arc::new(InMemoryMembershipStore::new());

        let api = Arc::new(AkkerisClient::new(client.clone(), config.akkeris_api.clone()));
        let delivery = Arc::new(SlackDelivery::new(
            client.clone(),
            config.slack_api_url.clone(),
            config.bot_token.clone(),
        ));
        let refresher = ChannelRefresher::new(
            client,
            config.slack_api_url.clone(),
            config.bot_token.clone(),
            store.clone(),
        );
        let router = CommandRouter::new(&config, api, delivery, store);

        Self {
            router,
            refresher,
            config,
        }
    }
}

async fn function_handler(processor: &Processor, event: LambdaEvent<SqsEvent>) -> Result<(), Error> {
    processor
        .refresher
        .refresh_if_stale(processor.config.membership_refresh)
        .await;

    for record in event.payload.records {
        let Some(body) = record.body else {
            continue;
        };

        // Malformed records are dropped, not retried.
        let queued: QueuedCommand = match serde_json::from_str(&body) {
            Ok(queued) => queued,
            Err(e) => {
                warn!(message_id = ?record.message_id, "Skipping malformed queue record: {}", e);
                continue;
            }
        };

        info!(
            message_id = ?record.message_id,
            received_at = %queued.received_at,
            "Processing queued command"
        );
        processor.router.dispatch(queued.command).await;
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .without_time()
        .init();

    let config = ChatOpsConfig::from_env()?;
    info!(?config, "Processor configured");
    let processor = Processor::from_config(config);
    let processor_ref = &processor;

    run(service_fn(move |event: LambdaEvent<SqsEvent>| async move {
        function_handler(processor_ref, event).await
    }))
    .await
}
