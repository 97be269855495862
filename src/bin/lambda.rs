//! AWS Lambda entry point for reddit-ingest
//!
//! Deploy with `cargo lambda build --release --features lambda`
//! Invoke with a `{"subreddit": "..."}` event.

use lambda_runtime::{Error as LambdaError, service_fn};
use reddit_ingest::lambda::handler;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the AWS Lambda function.
#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("reddit-ingest Lambda starting...");
    lambda_runtime::run(service_fn(handler)).await
}
