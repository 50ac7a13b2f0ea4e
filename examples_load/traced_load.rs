use std::sync::Arc;
use std::time::Instant;

use tracing_log_context::noop_sink::NoopSink;
use tracing_log_context::LogContext;

#[tokio::main]
async fn main() {
    let ctx = LogContext::new(Arc::new(NoopSink), "load");

    let n: u64 = 100_000;
    let start = Instant::now();

    for i in 0..n {
        let _ = ctx
            .operation("load-op")
            .trace_required(|| async move {
                if i % 10 == 0 {
                    Err(format!("iteration {} failed", i))
                } else {
                    Ok(i)
                }
            })
            .await;
    }

    let elapsed = start.elapsed();
    println!("traced {} operations in {:?} (~{:.0} ops/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );
}
