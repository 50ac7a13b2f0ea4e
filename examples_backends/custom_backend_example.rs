use std::sync::Arc;

use async_trait::async_trait;
use tokio::time::{sleep, Duration};
use tracing_log_context::batch::{BatchConfig, BatchingSink};
use tracing_log_context::env::{env_or, LOG_CONTEXT_SERVICE_NAME_ENV};
use tracing_log_context::init::{init_tracing, LoggingConfig};
use tracing_log_context::{EventBuilder, Level, LogContext, LogEvent, LogSink, Marker};

/// Example of plugging a custom backend behind the tracer by implementing
/// the `LogSink` trait. Imagine this talks to some proprietary store; for
/// the sake of example we just print each event as a JSON line.
struct JsonLinesBackend;

#[async_trait]
impl LogSink for JsonLinesBackend {
    async fn send(&self, event: &LogEvent) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        println!("[my-custom-db] {}", event.to_json()?);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing(&LoggingConfig::from_env()?)?;

    let (sink, handle) = BatchingSink::spawn(Arc::new(JsonLinesBackend), BatchConfig::from_env()?);
    let ctx = LogContext::new(Arc::new(sink), env_or(LOG_CONTEXT_SERVICE_NAME_ENV, "ratings"));
    let console = LogContext::tracing("ratings");

    console.log(EventBuilder::new("custom backend example started").level(Level::Info));

    let category = Marker::new("RATING");
    let created = ctx
        .operation("rating-create")
        .category(category.clone())
        .trace_required(|| async {
            ctx.log(
                EventBuilder::new("Request for rating-create")
                    .level(Level::Info)
                    .payload(serde_json::json!({ "title": "Solaris", "score": 5 })),
            );
            sleep(Duration::from_millis(12)).await;
            Ok::<_, String>("rating-1")
        })
        .await?;

    let missing = ctx
        .operation("rating-get")
        .category(category)
        .suppress_on_failure(true)
        .trace_optional(|| async { Err::<&str, _>("rating-2 not found".to_string()) })
        .await?;

    console.log(
        EventBuilder::new("custom backend example finished")
            .level(Level::Info)
            .attr("created", created)
            .attr("suppressed", missing.is_suppressed()),
    );

    drop(ctx);
    handle.await?;
    Ok(())
}
