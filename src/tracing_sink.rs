use crate::event::LogEvent;
use crate::level::Level;
use crate::sink::EventSink;

/// Target used for every event forwarded by [`TracingSink`].
pub const TRACING_TARGET: &str = "log_context";

/// Forwards events into the `tracing` ecosystem.
///
/// Each [`LogEvent`] becomes one `tracing` event at the level given by
/// [`Level::as_tracing`], with the marker, logger, thread, attributes (as
/// a JSON object) and cause recorded as fields. Whatever subscriber is installed (see
/// [`init_tracing`](crate::init::init_tracing)) decides the final format.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

macro_rules! forward {
    ($level:expr, $event:ident, $attributes:ident) => {
        match &$event.cause {
            Some(cause) => tracing::event!(
                target: TRACING_TARGET,
                $level,
                logger = %$event.logger,
                marker = %$event.marker,
                thread = %$event.thread,
                attributes = %$attributes,
                cause = %cause.message,
                cause_kind = ?cause.kind,
                cause_type = %cause.type_name,
                "{}",
                $event.message
            ),
            None => tracing::event!(
                target: TRACING_TARGET,
                $level,
                logger = %$event.logger,
                marker = %$event.marker,
                thread = %$event.thread,
                attributes = %$attributes,
                "{}",
                $event.message
            ),
        }
    };
}

impl EventSink for TracingSink {
    fn emit(&self, event: LogEvent) {
        let attributes = event.attributes_json();
        // `tracing` needs the level as a constant at each callsite.
        match event.level {
            Level::Fatal | Level::Error => forward!(tracing::Level::ERROR, event, attributes),
            Level::Warning => forward!(tracing::Level::WARN, event, attributes),
            Level::Info => forward!(tracing::Level::INFO, event, attributes),
            Level::Debug => forward!(tracing::Level::DEBUG, event, attributes),
            Level::Trace => forward!(tracing::Level::TRACE, event, attributes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::EventBuilder;
    use crate::event::ErrorCause;
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};
    use tracing::field::{Field, Visit};
    use tracing::{Event, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
    use tracing_subscriber::Registry;

    #[derive(Debug, Clone)]
    struct Captured {
        level: tracing::Level,
        target: String,
        fields: BTreeMap<String, String>,
    }

    struct CaptureLayer(Arc<Mutex<Vec<Captured>>>);

    struct FieldVisitor<'a>(&'a mut BTreeMap<String, String>);

    impl<'a> Visit for FieldVisitor<'a> {
        fn record_str(&mut self, field: &Field, value: &str) {
            self.0.insert(field.name().to_string(), value.to_string());
        }

        fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
            self.0.insert(field.name().to_string(), format!("{:?}", value));
        }
    }

    impl<S: Subscriber> Layer<S> for CaptureLayer {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut fields = BTreeMap::new();
            event.record(&mut FieldVisitor(&mut fields));
            self.0.lock().unwrap().push(Captured {
                level: *event.metadata().level(),
                target: event.metadata().target().to_string(),
                fields,
            });
        }
    }

    fn capture(f: impl FnOnce()) -> Vec<Captured> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let subscriber = Registry::default().with(CaptureLayer(Arc::clone(&seen)));
        tracing::subscriber::with_default(subscriber, f);
        let out = seen.lock().unwrap().clone();
        out
    }

    #[test]
    fn forwards_fields_at_mapped_level() {
        let seen = capture(|| {
            TracingSink.emit(
                EventBuilder::new("Finishing rating-get")
                    .level(Level::Info)
                    .logger("ratings")
                    .attr("metricHandleTime", 3)
                    .build(),
            );
        });

        assert_eq!(seen.len(), 1);
        let e = &seen[0];
        assert_eq!(e.level, tracing::Level::INFO);
        assert_eq!(e.target, TRACING_TARGET);
        assert_eq!(e.fields["message"], "Finishing rating-get");
        assert_eq!(e.fields["logger"], "ratings");
        assert_eq!(e.fields["marker"], "DEV");
        assert_eq!(e.fields["attributes"], r#"{"metricHandleTime":3}"#);
        assert!(!e.fields.contains_key("cause"));
    }

    #[test]
    fn fatal_becomes_error_with_cause() {
        let seen = capture(|| {
            TracingSink.emit(
                EventBuilder::new("Failing db")
                    .level(Level::Fatal)
                    .cause(ErrorCause::cancelled())
                    .build(),
            );
        });

        assert_eq!(seen[0].level, tracing::Level::ERROR);
        assert_eq!(seen[0].fields["cause"], "operation cancelled before completion");
        assert_eq!(seen[0].fields["cause_kind"], "Cancelled");
    }
}
