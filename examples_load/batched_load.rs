use std::sync::Arc;
use std::time::Instant;
use tokio::time::Duration;

use tracing_log_context::batch::{BatchConfig, BatchingSink};
use tracing_log_context::noop_sink::NoopSink;
use tracing_log_context::LogContext;

#[tokio::main]
async fn main() {
    let config = BatchConfig {
        channel_buffer: 50_000,
        batch_size: 1_000,
        flush_interval: Duration::from_millis(200),
        ..BatchConfig::default()
    };

    let (sink, handle) = BatchingSink::spawn(Arc::new(NoopSink), config);
    let stats = sink.stats();
    let ctx = LogContext::new(Arc::new(sink), "load");

    let n: u64 = 100_000;
    let start = Instant::now();

    for i in 0..n {
        let _ = ctx
            .operation("load-op")
            .trace_required(|| async move { Ok::<_, String>(i) })
            .await;
    }

    let elapsed = start.elapsed();
    println!("batched: traced {} operations in {:?} (~{:.0} ops/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );

    // Closing the last sender lets the background task drain and exit.
    drop(ctx);
    if let Err(e) = handle.await {
        eprintln!("batching task failed: {}", e);
    }
    println!("events: total={} sent={} dropped={}", stats.total(), stats.sent(), stats.dropped());
}
