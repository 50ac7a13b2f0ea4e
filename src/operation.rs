use std::fmt;
use std::future::{poll_fn, Future};
use std::pin::pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::builder::EventBuilder;
use crate::context::LogContext;
use crate::event::{ErrorCause, METRIC_HANDLE_TIME_KEY};
use crate::level::Level;
use crate::marker::Marker;

/// What a best-effort trace does with a failure after logging it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Return the error to the caller.
    #[default]
    Propagate,
    /// Swallow the error and return [`Outcome::Suppressed`].
    Suppress,
}

/// Result of [`Operation::trace_optional`].
///
/// `Suppressed` is distinct from any value the operation itself can
/// produce, including `Completed(None)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome<T> {
    Completed(T),
    Suppressed,
}

impl<T> Outcome<T> {
    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed(_))
    }

    pub fn is_suppressed(&self) -> bool {
        matches!(self, Outcome::Suppressed)
    }

    pub fn completed(self) -> Option<T> {
        match self {
            Outcome::Completed(value) => Some(value),
            Outcome::Suppressed => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Completed(value) => Outcome::Completed(f(value)),
            Outcome::Suppressed => Outcome::Suppressed,
        }
    }
}

/// One traced invocation, created by [`LogContext::operation`].
///
/// Holds the operation id, the caller's category marker (default
/// [`Marker::dev`]), the level of the entry/exit events (default
/// [`Level::Info`]) and the failure policy used by `trace_optional`.
/// Running it consumes it, so no state outlives the invocation.
#[derive(Debug)]
pub struct Operation<'a> {
    context: &'a LogContext,
    id: String,
    category: Marker,
    level: Level,
    policy: FailurePolicy,
}

impl<'a> Operation<'a> {
    pub(crate) fn new(context: &'a LogContext, id: String) -> Self {
        Self {
            context,
            id,
            category: Marker::dev(),
            level: Level::Info,
            policy: FailurePolicy::default(),
        }
    }

    pub fn category(mut self, category: Marker) -> Self {
        self.category = category;
        self
    }

    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn on_failure(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn suppress_on_failure(self, suppress: bool) -> Self {
        self.on_failure(if suppress {
            FailurePolicy::Suppress
        } else {
            FailurePolicy::Propagate
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Run `callable` between an entry event and either a finish event
    /// (with `metricHandleTime` in milliseconds) or an `ERROR` failure
    /// event. The callable's error is always returned unchanged.
    ///
    /// Dropping the returned future before the callable resolves, or a
    /// panic inside it, still produces the failure event.
    pub async fn trace_required<F, Fut, T, E>(self, callable: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display + fmt::Debug,
    {
        let started = Instant::now();
        self.context.log(
            EventBuilder::new(format!("Entering {}", self.id))
                .level(self.level)
                .marker(Marker::start(&self.category)),
        );

        let guard = FailureGuard::arm(&self);
        let result = guard.run(callable).await;
        guard.disarm();

        match result {
            Ok(value) => {
                let elapsed = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
                self.context.log(
                    EventBuilder::new(format!("Finishing {}", self.id))
                        .level(self.level)
                        .marker(Marker::end(&self.category))
                        .attr(METRIC_HANDLE_TIME_KEY, elapsed),
                );
                Ok(value)
            }
            Err(error) => {
                self.log_failure(ErrorCause::capture(&error));
                Err(error)
            }
        }
    }

    /// Run `callable` logging only its failure.
    ///
    /// Success is silent and yields [`Outcome::Completed`]. A failure is
    /// logged exactly like in [`trace_required`](Self::trace_required)
    /// and then returned or, under [`FailurePolicy::Suppress`], replaced
    /// by [`Outcome::Suppressed`].
    pub async fn trace_optional<F, Fut, T, E>(self, callable: F) -> Result<Outcome<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display + fmt::Debug,
    {
        let guard = FailureGuard::arm(&self);
        let result = guard.run(callable).await;
        guard.disarm();

        match result {
            Ok(value) => Ok(Outcome::Completed(value)),
            Err(error) => {
                self.log_failure(ErrorCause::capture(&error));
                match self.policy {
                    FailurePolicy::Propagate => Err(error),
                    FailurePolicy::Suppress => Ok(Outcome::Suppressed),
                }
            }
        }
    }

    // Failure events are always ERROR, whatever level the caller chose.
    fn log_failure(&self, cause: ErrorCause) {
        self.context.log(
            EventBuilder::new(format!("Failing {}", self.id))
                .level(Level::Error)
                .marker(Marker::error(&self.category))
                .cause(cause),
        );
    }
}

/// Emits the failure event if the callable never got to report back,
/// i.e. the future was dropped mid-flight or the callable panicked.
struct FailureGuard<'o> {
    operation: &'o Operation<'o>,
    armed: bool,
    /// Set only while control is inside the callable, so a panic raised
    /// by the caller around a pending operation counts as cancellation.
    in_callable: AtomicBool,
}

impl<'o> FailureGuard<'o> {
    fn arm(operation: &'o Operation<'o>) -> Self {
        Self {
            operation,
            armed: true,
            in_callable: AtomicBool::new(false),
        }
    }

    async fn run<F, Fut>(&self, callable: F) -> Fut::Output
    where
        F: FnOnce() -> Fut,
        Fut: Future,
    {
        self.in_callable.store(true, Ordering::Relaxed);
        let mut fut = pin!(callable());
        self.in_callable.store(false, Ordering::Relaxed);

        poll_fn(|cx| {
            self.in_callable.store(true, Ordering::Relaxed);
            let poll = fut.as_mut().poll(cx);
            self.in_callable.store(false, Ordering::Relaxed);
            poll
        })
        .await
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for FailureGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let cause = if std::thread::panicking() && self.in_callable.load(Ordering::Relaxed) {
            ErrorCause::panicked()
        } else {
            ErrorCause::cancelled()
        };
        self.operation.log_failure(cause);
    }
}
