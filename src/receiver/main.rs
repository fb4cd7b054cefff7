mod queue;
mod slack;

use aka_chatops::CommandQueue;
use lambda_http::{run, service_fn, Body, Error, Request, Response};
use tracing::warn;

use queue::SqsCommandQueue;

async fn function_handler(
    queue: &dyn CommandQueue,
    event: Request,
) -> Result<Response<Body>, Error> {
    let body_string = String::from_utf8_lossy(event.body());

    let ack = match slack::parse_command(&body_string, event.headers()) {
        Ok(command) => aka_chatops::handle(queue, command).await,
        Err(e) => {
            warn!("Unparseable slash command body: {}", e);
            aka_chatops::acknowledgment()
        }
    };

    Ok(Response::builder()
        .status(200)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_string(&ack)?))?)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .without_time()
        .init();

    let config = aws_config::load_from_env().await;
    let queue = SqsCommandQueue::new(
        aws_sdk_sqs::Client::new(&config),
        std::env::var("SQS_QUEUE_URL")?,
    );
    let queue_ref = &queue;

    run(service_fn(move |event: Request| async move {
        function_handler(queue_ref, event).await
    }))
    .await
}
