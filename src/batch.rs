use crate::event::LogEvent;
use crate::sink::{EventSink, LogSink};
use std::error::Error;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, Duration, MissedTickBehavior};

/// Buffering and retry settings for [`BatchingSink`].
///
/// **Fields**
/// - `channel_buffer`: maximum number of queued events before new ones
///   are dropped.
/// - `batch_size`: number of events collected before a send.
/// - `flush_interval`: longest wait before a partial batch is sent.
/// - `initial_backoff` / `max_backoff`: retry delay, doubled after each
///   failed attempt.
/// - `max_retries`: retries per batch before it is discarded.
#[derive(Clone, Debug)]
pub struct BatchConfig {
    pub channel_buffer: usize,
    pub batch_size: usize,
    pub flush_interval: Duration,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub max_retries: u32,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            channel_buffer: 1024,
            batch_size: 128,
            flush_interval: Duration::from_secs(1),
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(10),
            max_retries: 5,
        }
    }
}

impl BatchConfig {
    /// Clamp values into a usable range.
    fn normalized(mut self) -> Self {
        self.channel_buffer = self.channel_buffer.max(16);
        self.batch_size = self.batch_size.max(1);
        self.flush_interval = self.flush_interval.max(Duration::from_millis(10));
        self.max_backoff = self.max_backoff.max(self.initial_backoff);
        self
    }
}

/// Counters shared between a [`BatchingSink`] and its background task.
#[derive(Debug, Default)]
pub struct SinkStats {
    /// Events passed to `emit`.
    pub total: AtomicU64,
    /// Events pulled from the channel by the background task.
    pub enqueued: AtomicU64,
    /// Events dropped because the channel was full or closed.
    pub dropped: AtomicU64,
    /// Events accepted by the backend.
    pub sent: AtomicU64,
    /// Events discarded after the retry budget ran out.
    pub failed: AtomicU64,
}

impl SinkStats {
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    pub fn enqueued(&self) -> u64 {
        self.enqueued.load(Ordering::Relaxed)
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn sent(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Count a dropped event. Only the first drop is reported on stderr;
    /// later ones are visible through [`dropped`](Self::dropped). Returns
    /// whether this call reported.
    fn record_drop(&self, reason: &str) -> bool {
        if self.dropped.fetch_add(1, Ordering::Relaxed) == 0 {
            eprintln!("{}, dropping log events (further drops are only counted)", reason);
            return true;
        }
        false
    }
}

/// [`EventSink`] that hands events to an asynchronous [`LogSink`].
///
/// `emit` never waits: events go through a bounded channel to a
/// background Tokio task that batches them and sends them to the backend.
/// Backend I/O is therefore fully decoupled from traced operations.
#[derive(Clone)]
pub struct BatchingSink {
    sender: mpsc::Sender<LogEvent>,
    stats: Arc<SinkStats>,
}

impl BatchingSink {
    /// Create the sink and spawn its background task.
    ///
    /// Must be called from within a Tokio runtime. The task ends once
    /// every clone of the returned sink has been dropped and the remaining
    /// events have been delivered and flushed.
    pub fn spawn(backend: Arc<dyn LogSink>, config: BatchConfig) -> (Self, JoinHandle<()>) {
        let config = config.normalized();
        let (tx, mut rx) = mpsc::channel::<LogEvent>(config.channel_buffer);

        let stats = Arc::new(SinkStats::default());
        let stats_bg = Arc::clone(&stats);

        let handle = tokio::spawn(async move {
            let mut batch = Vec::with_capacity(config.batch_size);
            // One ticker for the whole loop, so incoming events do not push
            // the next flush further out.
            let mut ticker = interval(config.flush_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    received = rx.recv() => match received {
                        Some(event) => {
                            batch.push(event);
                            stats_bg.enqueued.fetch_add(1, Ordering::Relaxed);
                            if batch.len() >= config.batch_size {
                                send_batch(&*backend, &mut batch, &config, &stats_bg).await;
                            }
                        }
                        None => break,
                    },
                    _ = ticker.tick() => {
                        if !batch.is_empty() {
                            send_batch(&*backend, &mut batch, &config, &stats_bg).await;
                        }
                    }
                }
            }

            if !batch.is_empty() {
                send_batch(&*backend, &mut batch, &config, &stats_bg).await;
            }
            if let Err(e) = backend.flush().await {
                eprintln!("error flushing log backend: {}", e);
            }
        });

        (Self { sender: tx, stats }, handle)
    }

    pub fn stats(&self) -> Arc<SinkStats> {
        Arc::clone(&self.stats)
    }
}

impl EventSink for BatchingSink {
    fn emit(&self, event: LogEvent) {
        self.stats.total.fetch_add(1, Ordering::Relaxed);
        match self.sender.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                self.stats.record_drop("log channel full");
            }
            Err(TrySendError::Closed(_)) => {
                self.stats.record_drop("log channel closed");
            }
        }
    }
}

async fn send_batch(
    backend: &dyn LogSink,
    batch: &mut Vec<LogEvent>,
    config: &BatchConfig,
    stats: &SinkStats,
) {
    let mut backoff = config.initial_backoff;
    let mut attempt = 0;
    // Events before `delivered` were accepted on an earlier attempt.
    let mut delivered = 0;

    loop {
        let mut last_err: Option<Box<dyn Error + Send + Sync>> = None;
        for event in &batch[delivered..] {
            if let Err(e) = backend.send(event).await {
                last_err = Some(e);
                break;
            }
            delivered += 1;
            stats.sent.fetch_add(1, Ordering::Relaxed);
        }

        let Some(e) = last_err else {
            batch.clear();
            return;
        };

        if attempt >= config.max_retries {
            let lost = (batch.len() - delivered) as u64;
            stats.failed.fetch_add(lost, Ordering::Relaxed);
            eprintln!("log backend send failed, discarding {} events: {}", lost, e);
            batch.clear();
            return;
        }

        eprintln!("log backend send failed, retrying in {:?}: {}", backoff, e);
        sleep(backoff).await;
        backoff = std::cmp::min(backoff * 2, config.max_backoff);
        attempt += 1;
    }
}
