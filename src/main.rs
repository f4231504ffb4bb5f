use aws_config::BehaviorVersion;
use aws_lambda_events::event::kinesis::KinesisEvent;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use tokio::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kinesis_log_forwarder::config::Config;
use kinesis_log_forwarder::forwarder::{ForwardResponse, Forwarder};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kinesis_log_forwarder=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = Config::from_env();
    let shared_config = aws_config::load_defaults(BehaviorVersion::v2025_01_17()).await;
    let logs_client = aws_sdk_cloudwatchlogs::Client::new(&shared_config);
    let s3_client = aws_sdk_s3::Client::new(&shared_config);

    // The sequence-token registry inside the forwarder outlives individual
    // invocations. The mutex serializes invocations in case the runtime
    // ever drives this process concurrently.
    let forwarder = Mutex::new(Forwarder::new(logs_client, s3_client, &config));

    run(service_fn(|event: LambdaEvent<KinesisEvent>| {
        handle(&forwarder, event)
    }))
    .await
}

async fn handle(
    forwarder: &Mutex<Forwarder>,
    event: LambdaEvent<KinesisEvent>,
) -> Result<ForwardResponse, Error> {
    let mut forwarder = forwarder.lock().await;
    Ok(forwarder.process_batch(&event.payload).await?)
}
