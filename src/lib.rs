pub mod level;
pub mod marker;
pub mod event;
pub mod builder;
pub mod sink;
pub mod context;
pub mod operation;

pub mod tracing_sink;
pub mod memory_sink;
pub mod noop_sink;
pub mod batch;

pub mod error;
pub mod env;
pub mod init;

pub use builder::EventBuilder;
pub use context::LogContext;
pub use event::{CauseKind, ErrorCause, LogEvent};
pub use level::Level;
pub use marker::Marker;
pub use operation::{FailurePolicy, Operation, Outcome};
pub use sink::{EventSink, LogSink};
