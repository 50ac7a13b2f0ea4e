use std::sync::Arc;

use tokio::time::{sleep, Duration};
use tracing_log_context::batch::{BatchConfig, BatchingSink};
use tracing_log_context::memory_sink::MemorySink;
use tracing_log_context::noop_sink::NoopSink;
use tracing_log_context::{LogContext, LogEvent, LogSink};

const TASKS: u64 = 16;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_operations_keep_their_own_pairs() {
    let sink = MemorySink::new();
    let ctx = LogContext::new(Arc::new(sink.clone()), "worker");

    let mut handles = Vec::new();
    for i in 0..TASKS {
        let ctx = ctx.clone();
        handles.push(tokio::spawn(async move {
            ctx.operation(format!("op-{}", i))
                .trace_required(|| async move {
                    sleep(Duration::from_millis((TASKS - i) * 2)).await;
                    if i % 3 == 0 {
                        Err(format!("op-{} failed", i))
                    } else {
                        Ok(i)
                    }
                })
                .await
        }));
    }
    for (i, handle) in handles.into_iter().enumerate() {
        let result = handle.await.unwrap();
        if i % 3 == 0 {
            assert_eq!(result, Err(format!("op-{} failed", i)));
        } else {
            assert_eq!(result, Ok(i as u64));
        }
    }

    let events = sink.events();
    assert_eq!(events.len(), (TASKS * 2) as usize);

    for i in 0..TASKS {
        let entering = format!("Entering op-{}", i);
        let closing = if i % 3 == 0 {
            format!("Failing op-{}", i)
        } else {
            format!("Finishing op-{}", i)
        };

        let own: Vec<&LogEvent> = events
            .iter()
            .filter(|e| e.message.ends_with(&format!(" op-{}", i)))
            .collect();
        assert_eq!(own.len(), 2, "events for op-{}", i);
        assert_eq!(own[0].message, entering);
        assert_eq!(own[1].message, closing);

        if let Some(cause) = &own[1].cause {
            assert_eq!(cause.message, format!("op-{} failed", i));
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn traced_events_reach_async_backend() {
    #[derive(Default)]
    struct Collect(std::sync::Mutex<Vec<String>>);

    #[async_trait::async_trait]
    impl LogSink for Collect {
        async fn send(
            &self,
            event: &LogEvent,
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            self.0.lock().unwrap().push(event.to_json()?);
            Ok(())
        }
    }

    let backend = Arc::new(Collect::default());
    let (sink, handle) = BatchingSink::spawn(backend.clone(), BatchConfig::default());
    let stats = sink.stats();
    let ctx = LogContext::new(Arc::new(sink), "pipeline");

    ctx.operation("rating-create")
        .trace_required(|| async { Ok::<_, String>(()) })
        .await
        .unwrap();
    drop(ctx);
    handle.await.unwrap();

    let lines = backend.0.lock().unwrap().clone();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains(r#""message":"Entering rating-create""#));
    assert!(lines[1].contains(r#""metricHandleTime":"#));
    assert!(lines[1].contains(r#""marker":{"name":"END","references":[{"name":"DEV"}]}"#));
    assert_eq!(stats.sent(), 2);

    // NoopSink doubles as a backend.
    let (noop, noop_handle) = BatchingSink::spawn(Arc::new(NoopSink), BatchConfig::default());
    drop(noop);
    noop_handle.await.unwrap();
}
